use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::types::{EventItem, Venue};

/// Locations of the two asset files the app bundles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenAssets {
    pub venues: PathBuf,
    pub programme: PathBuf,
}

pub fn write_assets(
    venues_path: &Path,
    programme_path: &Path,
    venues: &[Venue],
    programme: &[EventItem],
) -> Result<WrittenAssets> {
    write_json(venues_path, venues)?;
    write_json(programme_path, programme)?;
    Ok(WrittenAssets {
        venues: venues_path.to_path_buf(),
        programme: programme_path.to_path_buf(),
    })
}

/// Pretty-print `value` to `path` through a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(value)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), "Wrote asset file");
    Ok(())
}
