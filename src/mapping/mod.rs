//! Field mapper: raw frontmatter -> normalized target record.
//!
//! Maps the untyped frontmatter mapping onto the target schema, applying
//! defaults and type coercion. The record identifier comes from the file's
//! full relative path, never the filename alone.

pub mod slug;

pub use slug::{identifier_from_path, slugify};

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::MigrateError;
use crate::source::Frontmatter;
use crate::utils::hash;

/// SEO sub-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Seo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Publish status in the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
}

/// Normalized record matching the target collection schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    /// Unique upsert key, derived from the relative source path.
    pub identifier: String,
    pub title: String,
    pub slug: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    pub seo: Seo,
    /// blake3 of the raw source file; unchanged hash skips the upsert.
    pub source_hash: String,
    /// Frontmatter fields with no dedicated column, kept as-is.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: Frontmatter,
}

/// Frontmatter keys consumed into dedicated record fields.
const MAPPED_KEYS: &[&str] = &[
    "title",
    "slug",
    "status",
    "draft",
    "date",
    "published",
    "publishedAt",
    "heroImage",
    "hero",
    "image",
    "seo",
    "seoTitle",
    "seoDescription",
];

/// Map raw frontmatter plus the file's logical identity to a normalized
/// record, or fail with the list of missing required fields.
pub fn map_fields(
    meta: &Frontmatter,
    rel_path: &Path,
    raw: &str,
) -> Result<NormalizedRecord, MigrateError> {
    let mut missing = Vec::new();

    let title = match meta.get("title").and_then(value_as_text) {
        Some(t) if !t.is_empty() => t,
        _ => {
            missing.push("title".to_string());
            String::new()
        }
    };

    if !missing.is_empty() {
        return Err(MigrateError::MissingRequiredFields(missing));
    }

    let slug = meta
        .get("slug")
        .and_then(value_as_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(&title));

    let status = map_status(meta);
    let published_at = ["publishedAt", "published", "date"]
        .iter()
        .find_map(|k| meta.get(*k).and_then(value_as_text));
    let hero_image = ["heroImage", "hero", "image"]
        .iter()
        .find_map(|k| meta.get(*k).and_then(value_as_text));
    let seo = map_seo(meta);
    let locale = locale_from_path(rel_path);

    let extra: Frontmatter = meta
        .iter()
        .filter(|(k, _)| !MAPPED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(NormalizedRecord {
        identifier: identifier_from_path(rel_path),
        title,
        slug,
        status,
        published_at,
        locale,
        hero_image,
        seo,
        source_hash: hash::source_hash(raw),
        extra,
    })
}

/// Publish status coercion.
///
/// The corpus uses boolean `status` (true = published) and boolean `draft`
/// (true = draft) inconsistently; strings pass through when recognized.
/// Absent both, a record defaults to draft - migrated content should not
/// go live by accident.
fn map_status(meta: &Frontmatter) -> Status {
    match meta.get("status") {
        Some(Value::Bool(true)) => return Status::Published,
        Some(Value::Bool(false)) => return Status::Draft,
        Some(Value::String(s)) => match s.as_str() {
            "published" => return Status::Published,
            "draft" => return Status::Draft,
            _ => {}
        },
        _ => {}
    }
    match meta.get("draft") {
        Some(Value::Bool(true)) => Status::Draft,
        Some(Value::Bool(false)) => Status::Published,
        _ => Status::Draft,
    }
}

fn map_seo(meta: &Frontmatter) -> Seo {
    if let Some(Value::Object(seo)) = meta.get("seo") {
        return Seo {
            title: seo.get("title").and_then(value_as_text),
            description: seo.get("description").and_then(value_as_text),
        };
    }
    Seo {
        title: meta.get("seoTitle").and_then(value_as_text),
        description: meta.get("seoDescription").and_then(value_as_text),
    }
}

/// Treat a leading two-letter path component as the locale directory.
fn locale_from_path(rel_path: &Path) -> Option<String> {
    let first = rel_path.iter().next()?.to_string_lossy();
    (first.len() == 2 && first.chars().all(|c| c.is_ascii_lowercase()))
        .then(|| first.into_owned())
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn meta(pairs: &[(&str, Value)]) -> Frontmatter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_basic_mapping() {
        let m = meta(&[("title", json!("Acme Energy")), ("status", json!(false))]);
        let record = map_fields(&m, &PathBuf::from("providers/acme/index.mdx"), "raw").unwrap();
        assert_eq!(record.title, "Acme Energy");
        assert_eq!(record.slug, "acme-energy");
        assert_eq!(record.status, Status::Draft);
        assert_eq!(record.identifier, "providers-acme");
    }

    #[test]
    fn test_missing_title_lists_field() {
        let m = meta(&[("status", json!(true))]);
        let err = map_fields(&m, &PathBuf::from("x.mdx"), "raw").unwrap_err();
        match err {
            MigrateError::MissingRequiredFields(fields) => {
                assert_eq!(fields, vec!["title".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_coercion() {
        let published = meta(&[("title", json!("x")), ("status", json!(true))]);
        let r = map_fields(&published, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.status, Status::Published);

        let draft_flag = meta(&[("title", json!("x")), ("draft", json!(true))]);
        let r = map_fields(&draft_flag, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.status, Status::Draft);

        // No status signal at all defaults to draft
        let bare = meta(&[("title", json!("x"))]);
        let r = map_fields(&bare, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.status, Status::Draft);
    }

    #[test]
    fn test_explicit_slug_wins() {
        let m = meta(&[("title", json!("Acme Energy")), ("slug", json!("acme-tx"))]);
        let r = map_fields(&m, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.slug, "acme-tx");
    }

    #[test]
    fn test_seo_nested_and_flat() {
        let nested = meta(&[
            ("title", json!("x")),
            ("seo", json!({"title": "T", "description": "D"})),
        ]);
        let r = map_fields(&nested, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.seo.title.as_deref(), Some("T"));
        assert_eq!(r.seo.description.as_deref(), Some("D"));

        let flat = meta(&[("title", json!("x")), ("seoTitle", json!("T2"))]);
        let r = map_fields(&flat, &PathBuf::from("x.mdx"), "").unwrap();
        assert_eq!(r.seo.title.as_deref(), Some("T2"));
    }

    #[test]
    fn test_locale_and_extra() {
        let m = meta(&[("title", json!("x")), ("phone", json!("555-1234"))]);
        let r = map_fields(&m, &PathBuf::from("es/providers/acme/index.mdx"), "").unwrap();
        assert_eq!(r.locale.as_deref(), Some("es"));
        assert_eq!(r.extra.get("phone"), Some(&json!("555-1234")));
    }

    #[test]
    fn test_identifier_unique_across_dirs() {
        let m = meta(&[("title", json!("Same"))]);
        let a = map_fields(&m, &PathBuf::from("a/index.mdx"), "").unwrap();
        let b = map_fields(&m, &PathBuf::from("b/index.mdx"), "").unwrap();
        assert_ne!(a.identifier, b.identifier);
    }
}
