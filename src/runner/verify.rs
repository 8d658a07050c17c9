//! Post-migration verification.
//!
//! Two checks against the live store: a total count (walked across every
//! page, since a first-page-only count is exactly the bug this tool exists
//! to avoid) and a deep-field spot check over a sample of documents.

use crate::error::StoreError;
use crate::store::{Filter, Store, StoredDoc, read_all_pages};

use super::report::VerifyReport;

/// Required fields every migrated document must carry.
const REQUIRED_FIELDS: &[&str] = &["identifier", "title", "slug", "sourceHash"];

/// Verify the target collection: count vs `expected` (0 skips the count
/// check) and a deep check over up to `sample` evenly spaced documents.
pub fn verify_collection(
    store: &dyn Store,
    collection: &str,
    expected: usize,
    sample: usize,
) -> Result<VerifyReport, StoreError> {
    let docs = read_all_pages(store, collection, &Filter::All)?;
    let total = docs.len();
    let count_ok = expected == 0 || total == expected;

    let mut sample_failures = Vec::new();
    let sampled: Vec<&StoredDoc> = if sample == 0 || total == 0 {
        Vec::new()
    } else {
        // Evenly spaced sample so re-runs check the same documents
        let step = (total / sample).max(1);
        docs.iter().step_by(step).take(sample).collect()
    };
    let sampled_count = sampled.len();

    for doc in sampled {
        let problems = check_document(doc);
        if !problems.is_empty() {
            let identifier = doc
                .get_str("identifier")
                .unwrap_or(doc.id.as_str())
                .to_string();
            sample_failures.push((identifier, problems));
        }
    }

    Ok(VerifyReport {
        expected,
        total,
        count_ok,
        sampled: sampled_count,
        sample_failures,
    })
}

/// Deep-field check on one document.
fn check_document(doc: &StoredDoc) -> Vec<String> {
    let mut problems = Vec::new();

    for field in REQUIRED_FIELDS {
        let present = doc.get_str(field).is_some_and(|v| !v.is_empty());
        if !present {
            problems.push(format!("missing field `{field}`"));
        }
    }

    match doc.data.get("blocks").and_then(|v| v.as_array()) {
        Some(blocks) if !blocks.is_empty() => {}
        Some(_) => problems.push("empty blocks array".to_string()),
        None => problems.push("missing field `blocks`".to_string()),
    }

    problems
}
