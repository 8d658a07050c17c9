//! Batch migration runner.
//!
//! Drives the per-file pipeline over the whole corpus:
//!
//! ```text
//! pending -> parsed -> mapped -> converted -> resolved -> split -> upserted
//! ```
//!
//! One failing file demotes to `failed` with its stage and reason; the
//! batch keeps going and the run report carries the manifest. Files fan
//! out in fixed-size chunks so a pathological file stalls at most one
//! chunk, not the whole run.

pub mod report;
pub mod verify;

pub use report::{FileFailure, MissingFields, RunReport, UnresolvedComponent, VerifyReport};
pub use verify::verify_collection;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde_json::Value;

use crate::blocks::{OnUnresolved, blocks_to_json, split_blocks};
use crate::component::{ComponentTable, Resolution, ResolvedComponent};
use crate::component::{extract_components, resolve_components};
use crate::config::MigrateConfig;
use crate::error::MigrateError;
use crate::logger::ProgressLine;
use crate::mapping::{NormalizedRecord, map_fields};
use crate::richtext::from_markdown;
use crate::richtext::text::InlineLabels;
use crate::source::{SourceDocument, collect_source_files, split_frontmatter};
use crate::store::{Filter, RegistryCache, Store, purge_collection};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Batch-level options from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub dry_run: bool,
    /// Purge the target collection before migrating.
    pub purge: bool,
    /// Skip the first N files (resume; file order is sorted, so offsets
    /// are stable across runs).
    pub offset: usize,
}

/// Outcome of one successfully processed file.
struct FileOutcome {
    /// Skipped because the stored source hash matched.
    skipped: bool,
    unresolved: Vec<UnresolvedComponent>,
}

/// Shared per-file pipeline state. One instance serves the whole batch;
/// every field is read-only during the fan-out.
struct Pipeline<'a> {
    store: &'a dyn Store,
    table: ComponentTable,
    registry: RegistryCache,
    collection: &'a str,
    required: &'a [String],
    media_dir: Option<&'a Path>,
}

impl Pipeline<'_> {
    fn migrate_file(&self, doc: &SourceDocument) -> Result<FileOutcome, MigrateError> {
        let rel = doc.rel_path.display().to_string();

        // parsed
        let (meta, body) = split_frontmatter(&doc.raw)?;

        // mapped
        let mut record = map_fields(&meta, &doc.rel_path, &doc.raw)?;

        // converted
        let tree = from_markdown(body);

        // resolved
        let (tree, usages) = extract_components(tree);
        let resolved = resolve_components(usages, &self.table, &self.registry);
        self.enforce_required(&resolved)?;
        let unresolved = unresolved_manifest(&rel, &resolved);

        // split
        let blocks = split_blocks(&tree, &resolved, OnUnresolved::Placeholder)?;
        let labels: InlineLabels = resolved
            .iter()
            .map(|r| (r.usage.id, r.inline_label().to_string()))
            .collect();

        // upserted
        self.upload_hero(&mut record)?;
        let Value::Object(mut data) = serde_json::to_value(&record)
            .map_err(|e| MigrateError::StoreWrite(e.to_string()))?
        else {
            return Err(MigrateError::StoreWrite(
                "record did not serialize to an object".into(),
            ));
        };
        data.insert("blocks".into(), blocks_to_json(&blocks, &labels));

        let filter = Filter::eq("identifier", record.identifier.as_str());
        let existing = self
            .store
            .find(self.collection, &filter, 1)
            .map_err(|e| MigrateError::StoreWrite(e.to_string()))?;

        match existing.docs.into_iter().next() {
            Some(stored) if stored.get_str("sourceHash") == Some(record.source_hash.as_str()) => {
                debug!("migrate"; "{rel}: source unchanged, skipping");
                return Ok(FileOutcome {
                    skipped: true,
                    unresolved,
                });
            }
            Some(stored) => {
                self.store
                    .update(self.collection, &stored.id, data)
                    .map_err(|e| MigrateError::StoreWrite(e.to_string()))?;
            }
            None => {
                self.store
                    .create(self.collection, data)
                    .map_err(|e| MigrateError::StoreWrite(e.to_string()))?;
            }
        }

        Ok(FileOutcome {
            skipped: false,
            unresolved,
        })
    }

    /// Fail the file when a component in a required category did not
    /// resolve. Non-required failures fall through to placeholder blocks.
    fn enforce_required(&self, resolved: &[ResolvedComponent]) -> Result<(), MigrateError> {
        for component in resolved {
            if !component.is_failure() {
                continue;
            }
            let required = component
                .category()
                .is_some_and(|c| self.required.iter().any(|r| r == c));
            if required {
                return Err(MigrateError::RequiredComponentUnresolved {
                    name: component.usage.name.clone(),
                    slug: component.inline_label().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a hero-image path against the media directory and upload
    /// it, replacing the record field with the stored media id. Missing
    /// files keep the original reference (string paths are valid content).
    fn upload_hero(&self, record: &mut NormalizedRecord) -> Result<(), MigrateError> {
        let (Some(dir), Some(hero)) = (self.media_dir, &record.hero_image) else {
            return Ok(());
        };
        let path = dir.join(hero.trim_start_matches('/'));
        if !path.is_file() {
            debug!("migrate"; "hero image `{}` not found locally, keeping reference", hero);
            return Ok(());
        }

        let bytes = std::fs::read(&path).map_err(|e| MigrateError::Io(path.clone(), e))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("hero")
            .to_string();
        let media = self
            .store
            .upload(&filename, bytes, mime_for(&path))
            .map_err(|e| MigrateError::StoreWrite(e.to_string()))?;
        record.hero_image = Some(media.id);
        Ok(())
    }
}

/// Run the migration batch against a store and produce the run report.
///
/// The report is also written to the configured report path, success or
/// not, so failed runs stay inspectable.
pub fn run_migration(
    config: &MigrateConfig,
    store: &dyn Store,
    options: &BatchOptions,
) -> Result<RunReport> {
    let start = Instant::now();

    if options.purge {
        let deleted = purge_collection(store, &config.target.collection)
            .with_context(|| format!("purging `{}`", config.target.collection))?;
        log!("migrate"; "purged {} from `{}`",
            plural_count(deleted, "document"), config.target.collection);
    }

    let files = collect_source_files(&config.source.root, &config.source.extensions)?;
    let total_files = files.len();
    if options.offset > 0 {
        log!("migrate"; "resuming at file {} of {}", options.offset, total_files);
    }
    let files: Vec<std::path::PathBuf> = files.into_iter().skip(options.offset).collect();

    let table = config.component_table();
    let registry = RegistryCache::load(store, &config.target.registry_collection)
        .with_context(|| format!("loading registry `{}`", config.target.registry_collection))?;
    if table.needs_registry() && registry.is_empty() {
        log!("warn"; "component table references the registry but `{}` is empty; \
            seed it first or every registry component will fail to resolve",
            config.target.registry_collection);
    }

    let pipeline = Pipeline {
        store,
        table,
        registry,
        collection: &config.target.collection,
        required: &config.components.required,
        media_dir: config.target.media_dir.as_deref(),
    };

    let report = Mutex::new(RunReport {
        dry_run: options.dry_run,
        total_files,
        ..Default::default()
    });
    let progress = ProgressLine::new(&[("files", files.len()), ("skipped", 0), ("failed", 0)]);

    // Fixed-size chunks bound in-flight work; within a chunk files run in
    // parallel and one slow store call cannot starve the others. Files are
    // read inside the fan-out: an unreadable file fails alone at `parsed`.
    for chunk in files.chunks(config.run.concurrency.max(1)) {
        chunk.par_iter().for_each(|path| {
            let outcome = SourceDocument::read(&config.source.root, path.clone())
                .and_then(|doc| pipeline.migrate_file(&doc));
            progress.inc("files");

            let mut report = report.lock();
            match outcome {
                Ok(FileOutcome {
                    skipped,
                    unresolved,
                }) => {
                    if skipped {
                        progress.inc("skipped");
                        report.skipped += 1;
                    } else {
                        report.succeeded += 1;
                    }
                    report.unresolved.extend(unresolved);
                }
                Err(err) => {
                    progress.inc("failed");
                    report.failed += 1;
                    let path = path
                        .strip_prefix(&config.source.root)
                        .unwrap_or(path)
                        .display()
                        .to_string();
                    if let MigrateError::MissingRequiredFields(fields) = &err {
                        report.missing_required.push(MissingFields {
                            path: path.clone(),
                            fields: fields.clone(),
                        });
                    }
                    report.failures.push(FileFailure {
                        path,
                        stage: err.stage(),
                        reason: err.to_string(),
                    });
                }
            }
        });
    }
    progress.finish();

    let mut report = report.into_inner();
    report.verification = Some(verify_collection(
        store,
        &config.target.collection,
        config.run.expected_count,
        config.run.verify_sample,
    )?);
    report.elapsed_secs = start.elapsed().as_secs_f64();
    report.tally_stages();

    report.write(&config.run.report)?;
    debug!("migrate"; "report written to {}", config.run.report.display());
    Ok(report)
}

/// Collect the failure entries for the run report's component manifest.
fn unresolved_manifest(path: &str, resolved: &[ResolvedComponent]) -> Vec<UnresolvedComponent> {
    resolved
        .iter()
        .filter(|r| r.is_failure())
        .map(|r| match &r.resolution {
            Resolution::SlugNotFound { category, slug } => UnresolvedComponent {
                path: path.to_string(),
                component: r.usage.name.clone(),
                category: Some(category.clone()),
                slug: Some(slug.clone()),
                reason: "slug not found in registry".to_string(),
            },
            _ => UnresolvedComponent {
                path: path.to_string(),
                component: r.usage.name.clone(),
                category: None,
                slug: None,
                reason: "component not in table".to_string(),
            },
        })
        .collect()
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
