//! Command-line interface module.

mod args;
pub mod migrate;
pub mod purge;
pub mod schema;
pub mod seed;
pub mod verify;

pub use args::{Cli, Commands, MigrateArgs, SchemaArgs};

use std::time::Duration;

use anyhow::Result;

use crate::config::MigrateConfig;
use crate::store::HttpStore;

/// Build the HTTP store from the target section of the config.
pub fn connect(config: &MigrateConfig) -> Result<HttpStore> {
    let store = HttpStore::new(
        &config.target.base_url,
        config.target.api_key.clone(),
        Duration::from_secs(config.target.timeout_secs),
        config.target.page_limit,
    )?;
    Ok(store)
}
