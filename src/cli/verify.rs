//! `ferry verify` - check the target collection without writing anything.

use anyhow::Result;

use crate::config::MigrateConfig;
use crate::log;
use crate::runner::verify_collection;

pub fn run(config: &MigrateConfig) -> Result<()> {
    let store = super::connect(config)?;
    let report = verify_collection(
        &store,
        &config.target.collection,
        config.run.expected_count,
        config.run.verify_sample,
    )?;

    if report.expected > 0 {
        log!("verify"; "count: {} of {} expected", report.total, report.expected);
    } else {
        log!("verify"; "count: {} (no expected_count configured)", report.total);
    }
    log!("verify"; "sampled {} for deep-field check", report.sampled);

    for (identifier, problems) in &report.sample_failures {
        log!("error"; "{identifier}: {}", problems.join(", "));
    }

    if !report.ok() {
        if !report.count_ok {
            log!("error"; "count mismatch: expected {}, found {}",
                report.expected, report.total);
        }
        anyhow::bail!("verification failed");
    }
    log!("verify"; "ok");
    Ok(())
}
