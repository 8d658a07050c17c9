//! Migration error taxonomy.
//!
//! Per-file errors (`MigrateError`) never abort a batch; they are recorded
//! in the run report with the stage they occurred at. Store-level and
//! configuration errors abort immediately.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a file can fail at.
///
/// Mirrors the per-file state machine:
/// `pending -> parsed -> mapped -> converted -> resolved -> split -> upserted`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Parsed,
    Mapped,
    Converted,
    Resolved,
    Split,
    Upserted,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Mapped => "mapped",
            Self::Converted => "converted",
            Self::Resolved => "resolved",
            Self::Split => "split",
            Self::Upserted => "upserted",
        };
        f.write_str(name)
    }
}

/// Errors produced while migrating a single source file.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// No valid `---` header delimiter pair at the start of the file.
    #[error("malformed frontmatter header: {0}")]
    MalformedHeader(String),

    /// The mapped record is missing required target-schema fields.
    #[error("missing required field{}: {}", if .0.len() == 1 { "" } else { "s" }, .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    /// A component marked required could not be resolved.
    #[error("required component unresolved: {name} (slug `{slug}` not found)")]
    RequiredComponentUnresolved { name: String, slug: String },

    /// Network or validation failure writing to the target store.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

impl MigrateError {
    /// The stage this error belongs to in the per-file state machine.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedHeader(_) | Self::Io(..) => Stage::Parsed,
            Self::MissingRequiredFields(_) => Stage::Mapped,
            Self::RequiredComponentUnresolved { .. } => Stage::Resolved,
            Self::StoreWrite(_) => Stage::Upserted,
        }
    }
}

/// Errors that abort the whole batch.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Fetch loop did not terminate within the iteration cap. Indicates a
    /// store-side paging bug; continuing would spin or silently skip records.
    #[error("pagination did not terminate after {iterations} iterations on `{collection}`")]
    PaginationExhaustion {
        collection: String,
        iterations: usize,
    },

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_stage_mapping() {
        assert_eq!(
            MigrateError::MalformedHeader("no header".into()).stage(),
            Stage::Parsed
        );
        assert_eq!(
            MigrateError::MissingRequiredFields(vec!["title".into()]).stage(),
            Stage::Mapped
        );
        assert_eq!(
            MigrateError::RequiredComponentUnresolved {
                name: "AcmePhone".into(),
                slug: "acme-phone".into(),
            }
            .stage(),
            Stage::Resolved
        );
        assert_eq!(
            MigrateError::StoreWrite("timeout".into()).stage(),
            Stage::Upserted
        );
    }

    #[test]
    fn test_missing_fields_message() {
        let err = MigrateError::MissingRequiredFields(vec!["title".into(), "slug".into()]);
        assert_eq!(err.to_string(), "missing required fields: title, slug");

        let err = MigrateError::MissingRequiredFields(vec!["title".into()]);
        assert_eq!(err.to_string(), "missing required field: title");
    }
}
