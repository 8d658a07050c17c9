//! Source tree enumeration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use crate::error::MigrateError;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// One input file: read once, never mutated.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the source root. Drives identifier derivation, so
    /// it must include the directory structure.
    pub rel_path: PathBuf,
    /// Raw UTF-8 file content.
    pub raw: String,
}

impl SourceDocument {
    pub fn read(root: &Path, path: PathBuf) -> Result<Self, MigrateError> {
        let raw =
            std::fs::read_to_string(&path).map_err(|e| MigrateError::Io(path.clone(), e))?;
        let rel_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        Ok(Self {
            path,
            rel_path,
            raw,
        })
    }
}

/// Collect all content files under a root directory, sorted by path.
///
/// Sorting makes batch order deterministic, which is what makes the
/// `--offset` resume flag meaningful across runs.
pub fn collect_source_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("source root `{}` is not a directory", root.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == ext))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Read every source document under a root (enumeration + read).
pub fn read_corpus(root: &Path, extensions: &[String]) -> Result<Vec<SourceDocument>> {
    let files = collect_source_files(root, extensions)?;
    files
        .into_iter()
        .map(|path| {
            SourceDocument::read(root, path.clone())
                .with_context(|| format!("reading {}", path.display()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts() -> Vec<String> {
        vec!["mdx".to_string(), "md".to_string()]
    }

    #[test]
    fn test_collect_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("b/index.mdx"), "x").unwrap();
        fs::write(dir.path().join("a/index.mdx"), "x").unwrap();
        fs::write(dir.path().join("a/notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".DS_Store"), "x").unwrap();

        let files = collect_source_files(dir.path(), &exts()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/index.mdx"));
        assert!(files[1].ends_with("b/index.mdx"));
    }

    #[test]
    fn test_rel_path_keeps_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("providers/acme")).unwrap();
        let path = dir.path().join("providers/acme/index.mdx");
        fs::write(&path, "---\ntitle: x\n---\n").unwrap();

        let doc = SourceDocument::read(dir.path(), path).unwrap();
        assert_eq!(doc.rel_path, PathBuf::from("providers/acme/index.mdx"));
    }

    #[test]
    fn test_missing_root_fails() {
        assert!(collect_source_files(Path::new("/nonexistent/ferry"), &exts()).is_err());
    }
}
