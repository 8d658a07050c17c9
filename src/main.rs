//! Ferry - batch migration of an MDX content corpus into Payload CMS.

mod blocks;
mod cli;
mod component;
mod config;
mod error;
mod logger;
mod mapping;
mod richtext;
mod runner;
mod source;
mod store;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::MigrateConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = MigrateConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Migrate { args } => cli::migrate::run(args, &config),
        Commands::Verify => cli::verify::run(&config),
        Commands::Purge { yes } => cli::purge::run(&config, *yes),
        Commands::Seed { fixture } => cli::seed::run(&config, fixture),
        Commands::Schema { args } => cli::schema::run(args, &config),
    }
}
