//! Slug and identifier derivation.

use std::path::Path;

use deunicode::deunicode;

/// Slugify text: transliterate Unicode to ASCII, lowercase, collapse
/// non-alphanumeric runs to a single `-`, trim leading/trailing separators.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Derive the unique record identifier from a file's relative path.
///
/// The directory structure participates: many source files are named
/// `index.mdx`, so the filename alone collides. An `index` stem is dropped
/// (the directory already identifies the document).
///
/// `providers/acme/index.mdx` -> `providers-acme`
/// `rates/tx/dallas.mdx`      -> `rates-tx-dallas`
pub fn identifier_from_path(rel_path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in rel_path.iter() {
        let piece = component.to_string_lossy();
        parts.push(piece.into_owned());
    }
    if let Some(last) = parts.last_mut() {
        // Strip the content extension
        if let Some(stem) = Path::new(last.as_str())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
        {
            *last = stem;
        }
    }
    if parts.last().is_some_and(|s| s == "index") && parts.len() > 1 {
        parts.pop();
    }

    let joined = parts.join("-");
    slugify(&joined)
}
