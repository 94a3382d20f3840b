// src/index.rs
//! The file index: `{rel path -> FileRecord}` keyed by content hash.
//! Unchanged files reuse their cached record; only the rest are parsed.

use crate::parser::ParserPool;
use crate::types::{FileRecord, SourceFile};
use crate::utils::compute_sha256;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;

/// Result of refreshing the index against a set of discovered files.
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub files: BTreeMap<String, FileRecord>,
    pub parsed: usize,
    pub reused: usize,
}

enum FileOutcome {
    Parsed(FileRecord),
    Reused(FileRecord),
    /// Unreadable or unparseable; the previous record survives if one exists.
    Skipped(Option<FileRecord>),
}

/// Reads, hashes and (where needed) parses every source file. Parsing runs
/// on the rayon pool; the merge below is ordered by rel path, so completion
/// order never affects the result.
#[must_use]
pub fn refresh(
    pool: &ParserPool,
    sources: &[SourceFile],
    previous: &BTreeMap<String, FileRecord>,
) -> IndexOutcome {
    let results: Vec<(String, FileOutcome)> = sources
        .par_iter()
        .map(|src| (src.rel_path.clone(), process_file(pool, src, previous)))
        .collect();

    let mut outcome = IndexOutcome::default();
    for (rel_path, result) in results {
        match result {
            FileOutcome::Parsed(record) => {
                outcome.parsed += 1;
                outcome.files.insert(rel_path, record);
            }
            FileOutcome::Reused(record) => {
                outcome.reused += 1;
                outcome.files.insert(rel_path, record);
            }
            FileOutcome::Skipped(Some(record)) => {
                outcome.files.insert(rel_path, record);
            }
            FileOutcome::Skipped(None) => {}
        }
    }

    outcome
}

fn process_file(
    pool: &ParserPool,
    src: &SourceFile,
    previous: &BTreeMap<String, FileRecord>,
) -> FileOutcome {
    let prior = previous.get(&src.rel_path);

    let content = match fs::read_to_string(&src.abs_path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("WARN: Skipping unreadable file {}: {err}", src.rel_path);
            return FileOutcome::Skipped(prior.cloned());
        }
    };

    let hash = compute_sha256(&content);
    if let Some(record) = prior {
        if record.hash == hash {
            return FileOutcome::Reused(record.clone());
        }
    }

    match pool.parse(src, &content) {
        Ok(output) => FileOutcome::Parsed(FileRecord {
            hash,
            language: src.language,
            tags: output.tags,
            imports: output.imports,
            last_parsed_at: chrono::Utc::now().to_rfc3339(),
        }),
        Err(err) => {
            eprintln!("WARN: Skipping unparseable file {}: {err}", src.rel_path);
            FileOutcome::Skipped(prior.cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use std::path::PathBuf;

    fn write_source(dir: &std::path::Path, rel: &str, content: &str) -> SourceFile {
        let abs = dir.join(rel);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&abs, content).unwrap();
        SourceFile {
            abs_path: abs,
            rel_path: rel.to_string(),
            language: Lang::from_ext(rel.rsplit('.').next().unwrap()).unwrap(),
        }
    }

    #[test]
    fn test_reuse_on_matching_hash() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ParserPool::new().unwrap();
        let src = write_source(dir.path(), "a.py", "def f():\n    pass\n");

        let first = refresh(&pool, &[src.clone()], &BTreeMap::new());
        assert_eq!(first.parsed, 1);
        assert_eq!(first.reused, 0);

        let second = refresh(&pool, &[src], &first.files);
        assert_eq!(second.parsed, 0);
        assert_eq!(second.reused, 1);
        assert_eq!(second.files, first.files);
    }

    #[test]
    fn test_changed_content_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ParserPool::new().unwrap();
        let src = write_source(dir.path(), "a.py", "def f():\n    pass\n");
        let first = refresh(&pool, &[src.clone()], &BTreeMap::new());

        fs::write(&src.abs_path, "def g():\n    pass\n").unwrap();
        let second = refresh(&pool, &[src], &first.files);
        assert_eq!(second.parsed, 1);
        assert_eq!(second.reused, 0);
        assert!(second.files["a.py"].tags.iter().any(|t| t.name == "g"));
    }

    #[test]
    fn test_missing_file_keeps_prior_record() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ParserPool::new().unwrap();
        let src = write_source(dir.path(), "a.py", "def f():\n    pass\n");
        let first = refresh(&pool, &[src.clone()], &BTreeMap::new());

        fs::remove_file(&src.abs_path).unwrap();
        let second = refresh(&pool, &[src], &first.files);
        assert_eq!(second.parsed, 0);
        assert_eq!(second.files["a.py"], first.files["a.py"]);
    }

    #[test]
    fn test_missing_file_without_prior_is_dropped() {
        let pool = ParserPool::new().unwrap();
        let src = SourceFile {
            abs_path: PathBuf::from("/nonexistent/never.py"),
            rel_path: "never.py".to_string(),
            language: Lang::Python,
        };
        let outcome = refresh(&pool, &[src], &BTreeMap::new());
        assert!(outcome.files.is_empty());
    }
}
