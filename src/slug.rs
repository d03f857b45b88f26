use unicode_normalization::UnicodeNormalization;

/// Derive a stable identifier from a display name.
///
/// Diacritics are stripped after NFKD decomposition, the result is lower-cased,
/// and every run of characters outside `[a-z0-9]` becomes a single hyphen.
/// Leading and trailing hyphens are never emitted.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input
        .nfkd()
        .filter(|c| !is_combining_diacritic(*c))
        .flat_map(char::to_lowercase)
    {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
