//! `ferry migrate` - run the batch migration.

use anyhow::Result;

use crate::config::MigrateConfig;
use crate::runner::{BatchOptions, run_migration};
use crate::store::{Filter, MemoryStore, Store, read_all_pages};
use crate::utils::plural::plural_count;
use crate::{debug, log};

use super::MigrateArgs;

pub fn run(args: &MigrateArgs, config: &MigrateConfig) -> Result<()> {
    let options = BatchOptions {
        dry_run: args.dry_run,
        purge: args.purge,
        offset: args.offset,
    };

    let report = if args.dry_run {
        log!("migrate"; "dry run: writing to an in-memory store");
        let store = dry_run_store(config);
        run_migration(config, &store, &options)?
    } else {
        let store = super::connect(config)?;
        run_migration(config, &store, &options)?
    };

    report.log_summary();
    log!("migrate"; "report written to {}", config.run.report.display());

    if report.failed > 0 {
        anyhow::bail!(
            "migration completed with {}; see {}",
            plural_count(report.failed, "failure"),
            config.run.report.display()
        );
    }
    if !report.ok() {
        anyhow::bail!("verification failed; see {}", config.run.report.display());
    }
    Ok(())
}

/// In-memory store for dry runs, with the registry mirrored from the live
/// target when reachable. An unreachable target is not an error here; the
/// run proceeds with an empty registry and the resolution manifest shows
/// what would have failed.
fn dry_run_store(config: &MigrateConfig) -> MemoryStore {
    let memory = MemoryStore::new();
    let registry = &config.target.registry_collection;

    let live = match super::connect(config) {
        Ok(store) => store,
        Err(e) => {
            debug!("migrate"; "target unreachable, registry not mirrored: {e}");
            return memory;
        }
    };
    match read_all_pages(&live, registry, &Filter::All) {
        Ok(docs) => {
            let count = docs.len();
            for doc in docs {
                if let Err(e) = memory.create(registry, doc.data) {
                    debug!("migrate"; "mirroring registry entry failed: {e}");
                }
            }
            debug!("migrate"; "mirrored {count} registry entries from `{registry}`");
        }
        Err(e) => {
            log!("warn"; "could not read `{registry}` for the dry run ({e}); \
                registry components will show as unresolved");
        }
    }
    memory
}
