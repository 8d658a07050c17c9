//! Machine-readable run report.
//!
//! Emitted on every run, success or not: operators retry from the report's
//! failure lists instead of re-running the whole corpus.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::error::Stage;
use crate::log;
use crate::utils::plural::plural_count;

/// One failed file: path, stage reached, human-readable reason.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub stage: Stage,
    pub reason: String,
}

/// One component that did not resolve (non-fatal).
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedComponent {
    pub path: String,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub reason: String,
}

/// A document rejected for missing required fields.
#[derive(Debug, Clone, Serialize)]
pub struct MissingFields {
    pub path: String,
    pub fields: Vec<String>,
}

/// Verification pass results.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Expected record count (0 = check skipped).
    pub expected: usize,
    /// Records actually in the collection.
    pub total: usize,
    pub count_ok: bool,
    /// Identifiers sampled for the deep-field check.
    pub sampled: usize,
    /// Sampled documents with problems (identifier, problem list).
    pub sample_failures: Vec<(String, Vec<String>)>,
}

impl VerifyReport {
    pub fn ok(&self) -> bool {
        self.count_ok && self.sample_failures.is_empty()
    }
}

/// Full run report, serialized to JSON at the configured path.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub total_files: usize,
    /// Files upserted (created or updated).
    pub succeeded: usize,
    /// Files skipped because the stored source hash was unchanged.
    pub skipped: usize,
    pub failed: usize,
    /// Failure counts keyed by stage name.
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub failed_by_stage: std::collections::BTreeMap<String, usize>,
    pub elapsed_secs: f64,
    pub failures: Vec<FileFailure>,
    pub unresolved: Vec<UnresolvedComponent>,
    pub missing_required: Vec<MissingFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerifyReport>,
}

impl RunReport {
    /// Whether the run as a whole succeeded (drives the exit code).
    pub fn ok(&self) -> bool {
        self.failed == 0 && self.verification.as_ref().is_none_or(VerifyReport::ok)
    }

    /// Failure count for one stage.
    pub fn failed_at(&self, stage: Stage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }

    /// Recompute the per-stage tallies from the failure list.
    pub fn tally_stages(&mut self) {
        self.failed_by_stage.clear();
        for failure in &self.failures {
            *self
                .failed_by_stage
                .entry(failure.stage.to_string())
                .or_default() += 1;
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing run report to {}", path.display()))?;
        Ok(())
    }

    /// Log the operator-facing summary.
    pub fn log_summary(&self) {
        log!("migrate"; "{} migrated, {} skipped, {} failed ({:.1}s)",
            self.succeeded, self.skipped, self.failed, self.elapsed_secs);

        if !self.unresolved.is_empty() {
            log!("warn"; "{} unresolved", plural_count(self.unresolved.len(), "component"));
        }
        for failure in &self.failures {
            log!("error"; "{} failed@{}: {}", failure.path, failure.stage, failure.reason);
        }
        if let Some(verify) = &self.verification {
            if verify.ok() {
                log!("verify"; "count {} ok, {} sampled ok", verify.total, verify.sampled);
            } else {
                if !verify.count_ok {
                    log!("error"; "count mismatch: expected {}, found {}",
                        verify.expected, verify.total);
                }
                for (identifier, problems) in &verify.sample_failures {
                    log!("error"; "{}: {}", identifier, problems.join(", "));
                }
            }
        }
    }
}
