//! `ferry purge` - empty the target collection.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::config::MigrateConfig;
use crate::log;
use crate::store::purge_collection;
use crate::utils::plural::plural_count;

pub fn run(config: &MigrateConfig, yes: bool) -> Result<()> {
    let collection = &config.target.collection;

    if !yes && !confirm(collection)? {
        log!("migrate"; "aborted");
        return Ok(());
    }

    let store = super::connect(config)?;
    let deleted = purge_collection(&store, collection)?;
    log!("migrate"; "purged {} from `{collection}`", plural_count(deleted, "document"));
    Ok(())
}

fn confirm(collection: &str) -> Result<bool> {
    print!("delete every document in `{collection}`? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
