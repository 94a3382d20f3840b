// src/discovery.rs
//! Source file enumeration: walk, prune, filter, sort.

use crate::error::{Context, Result};
use crate::lang::Lang;
use crate::types::SourceFile;
use crate::utils::to_posix;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

/// Directory names never descended into. `.repomap` is the index
/// directory itself.
const PRUNED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
    ".cache",
    "dist",
    "build",
    "out",
    ".next",
    "coverage",
    ".repomap",
];

fn should_prune(name: &str) -> bool {
    PRUNED_DIRS.contains(&name)
}

/// Walks `root` and returns every supported source file, sorted by its
/// repository-relative POSIX path. Symlinks are not followed and file
/// contents are never read here.
///
/// # Errors
/// Returns error if an ignore glob fails to compile.
pub fn discover(root: &Path, ignore_globs: &[String]) -> Result<Vec<SourceFile>> {
    let ignore = compile_globs(ignore_globs)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && should_prune(&e.file_name().to_string_lossy())));

    let mut files = Vec::new();
    let mut errors = 0usize;

    for item in walker {
        match item {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(source) = classify(root, entry.path(), &ignore) {
                    files.push(source);
                }
            }
            Err(_) => errors += 1,
        }
    }

    if errors > 0 {
        eprintln!("WARN: Encountered {errors} errors during file walk");
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}

fn classify(root: &Path, path: &Path, ignore: &GlobSet) -> Option<SourceFile> {
    let ext = path.extension().and_then(|s| s.to_str())?;
    let language = Lang::from_ext(ext)?;

    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel_path = to_posix(&rel.to_string_lossy());

    if ignore.is_match(&rel_path) {
        return None;
    }

    Some(SourceFile {
        abs_path: path.to_path_buf(),
        rel_path,
        language,
    })
}

fn compile_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid ignore glob: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build ignore glob set")
}
