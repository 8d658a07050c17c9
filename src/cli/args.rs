//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Ferry content migration CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: ferry.toml)
    #[arg(short = 'C', long, default_value = "ferry.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Migrate the source corpus into the target collection
    #[command(visible_alias = "m")]
    Migrate {
        #[command(flatten)]
        args: MigrateArgs,
    },

    /// Verify the target collection (count + sampled deep-field check)
    #[command(visible_alias = "v")]
    Verify,

    /// Delete every document in the target collection
    Purge {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Upsert registry entries from a TOML fixture
    #[command(visible_alias = "s")]
    Seed {
        /// Fixture file with `[[entries]]` tables
        #[arg(value_hint = clap::ValueHint::FilePath)]
        fixture: PathBuf,
    },

    /// Report frontmatter field usage across the source corpus
    #[command(visible_alias = "q")]
    Schema {
        #[command(flatten)]
        args: SchemaArgs,
    },
}

/// Migrate command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Run the full pipeline against an in-memory store; the target is
    /// never written
    #[arg(short, long)]
    pub dry_run: bool,

    /// Purge the target collection before migrating
    #[arg(long)]
    pub purge: bool,

    /// Skip the first N files (resume a partial run; file order is
    /// sorted by path, so offsets are stable)
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

/// Schema command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Emit the catalog as JSON instead of a table
    #[arg(short, long)]
    pub json: bool,

    /// Only show fields absent from the declared list
    #[arg(short, long, value_delimiter = ',')]
    pub declared: Option<Vec<String>>,
}

#[allow(unused)]
impl Cli {
    pub const fn is_migrate(&self) -> bool {
        matches!(self.command, Commands::Migrate { .. })
    }
    pub const fn is_verify(&self) -> bool {
        matches!(self.command, Commands::Verify)
    }
    pub const fn is_purge(&self) -> bool {
        matches!(self.command, Commands::Purge { .. })
    }
}
