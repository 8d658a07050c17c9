//! `ferry schema` - frontmatter field catalog for the source corpus.
//!
//! The declared schema of a legacy corpus rarely matches what the files
//! actually contain; this command reports every field observed, its
//! corpus-wide kind, and how many files carry it. `--declared` filters
//! to the fields a schema definition is missing.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::MigrateConfig;
use crate::source::{FieldCatalog, FieldStat, read_corpus, split_frontmatter};
use crate::utils::plural::plural_count;
use crate::{debug, log};

use super::SchemaArgs;

pub fn run(args: &SchemaArgs, config: &MigrateConfig) -> Result<()> {
    let corpus = read_corpus(&config.source.root, &config.source.extensions)?;
    let mut catalog = FieldCatalog::new();
    let mut unparsed = 0;

    for doc in &corpus {
        match split_frontmatter(&doc.raw) {
            Ok((meta, _)) => catalog.observe(&meta),
            Err(e) => {
                unparsed += 1;
                debug!("schema"; "{}: {e}", doc.rel_path.display());
            }
        }
    }

    if unparsed > 0 {
        log!("warn"; "{} could not be parsed and were excluded",
            plural_count(unparsed, "file"));
    }

    let fields: Vec<&FieldStat> = match &args.declared {
        Some(declared) => catalog.undeclared(declared),
        None => catalog.fields(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    log!("schema"; "{} across {}",
        plural_count(fields.len(), "field"), plural_count(catalog.files, "file"));
    for field in fields {
        println!(
            "  {:<24} {:<16} {}",
            field.name.cyan(),
            format!("{:?}", field.kind).to_ascii_lowercase(),
            plural_count(field.occurrences, "file").dimmed()
        );
    }
    Ok(())
}
