use uuid::Uuid;

/// Turn arbitrary text into a URL slug
///
/// Lowercases ASCII alphanumerics, collapses every other run of characters
/// into a single `-`, and trims dashes from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Slug with a short random suffix, for records whose titles repeat (jobs)
pub fn unique_slug(text: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    let base = slugify(text);
    if base.is_empty() {
        suffix[..8].to_string()
    } else {
        format!("{}-{}", base, &suffix[..8])
    }
}

/// Use the caller's slug if given, otherwise derive one from the name
pub fn slug_or_derive(slug: Option<&str>, name: &str) -> String {
    match slug.map(slugify) {
        Some(s) if !s.is_empty() => s,
        _ => slugify(name),
    }
}
