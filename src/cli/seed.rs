//! `ferry seed` - upsert registry entries from a TOML fixture.
//!
//! Fixture format:
//!
//! ```toml
//! [[entries]]
//! slug = "acme-phone"
//! value = "1-800-555-0100"
//! provider = "acme"
//! ```
//!
//! Entries upsert by slug, so re-seeding after a fixture edit updates in
//! place instead of duplicating.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::component::RegistryEntry;
use crate::config::MigrateConfig;
use crate::log;
use crate::store::upsert_by_field;

#[derive(Debug, Deserialize)]
struct SeedFixture {
    #[serde(default)]
    entries: Vec<RegistryEntry>,
}

pub fn run(config: &MigrateConfig, fixture: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(fixture)
        .with_context(|| format!("reading fixture {}", fixture.display()))?;
    let fixture: SeedFixture = toml::from_str(&raw).context("parsing seed fixture")?;

    if fixture.entries.is_empty() {
        log!("warn"; "fixture contains no entries");
        return Ok(());
    }

    let store = super::connect(config)?;
    let collection = &config.target.registry_collection;

    let mut created = 0;
    let mut updated = 0;
    for entry in &fixture.entries {
        let Value::Object(data) = serde_json::to_value(entry)? else {
            anyhow::bail!("entry `{}` did not serialize to an object", entry.slug);
        };
        let (_, was_created) = upsert_by_field(&store, collection, "slug", &entry.slug, data)
            .with_context(|| format!("seeding `{}`", entry.slug))?;
        if was_created {
            created += 1;
        } else {
            updated += 1;
        }
    }

    log!("migrate"; "seeded `{collection}`: {created} created, {updated} updated");
    Ok(())
}
