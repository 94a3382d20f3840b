// src/engine.rs
//! Build orchestration: the batch pipeline, the incremental update path
//! and the ranking entry points over persisted state.

use crate::discovery;
use crate::error::{bail, Context, Result};
use crate::graph::builder;
use crate::graph::resolver::PathResolver;
use crate::graph::DepGraph;
use crate::index;
use crate::parser::ParserPool;
use crate::rank::{self, ContextBuckets, RankedFile};
use crate::store::{self, IndexState};
use crate::types::SourceFile;
use crate::utils::to_posix;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Supplies changed and deleted path lists for the incremental path.
/// Paths are repository-relative POSIX.
pub trait DiffSource {
    /// # Errors
    /// Returns error if the underlying diff retrieval fails.
    fn changed(&self, root: &Path, range: Option<&str>) -> Result<Vec<String>>;

    /// # Errors
    /// Returns error if the underlying diff retrieval fails.
    fn deleted(&self, root: &Path, range: Option<&str>) -> Result<Vec<String>>;
}

/// Diff retrieval via the git CLI.
pub struct GitDiff;

impl GitDiff {
    fn run(root: &Path, filter: &str, range: Option<&str>) -> Result<Vec<String>> {
        let range = range.unwrap_or("HEAD");
        let output = Command::new("git")
            .current_dir(root)
            .args(["diff", "--name-only", filter, range])
            .output()
            .context("Failed to run git diff")?;

        if !output.status.success() {
            bail!(
                "git diff failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(to_posix)
            .collect())
    }
}

impl DiffSource for GitDiff {
    fn changed(&self, root: &Path, range: Option<&str>) -> Result<Vec<String>> {
        GitDiff::run(root, "--diff-filter=d", range)
    }

    fn deleted(&self, root: &Path, range: Option<&str>) -> Result<Vec<String>> {
        GitDiff::run(root, "--diff-filter=D", range)
    }
}

/// Outcome of a build or update run.
#[derive(Debug)]
pub struct BuildReport {
    pub state: IndexState,
    pub graph: DepGraph,
    pub parsed: usize,
    pub reused: usize,
    pub dropped: usize,
}

pub struct Engine {
    root: PathBuf,
    ignore_globs: Vec<String>,
}

impl Engine {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_globs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_ignore_globs(mut self, globs: Vec<String>) -> Self {
        self.ignore_globs = globs;
        self
    }

    /// Full pipeline: discover, refresh the index (reusing cached records
    /// from any previous state), build the graph, persist both artifacts.
    ///
    /// # Errors
    /// Returns error on discovery, parser-pool or persistence failure.
    /// A corrupt previous state is downgraded to a cold start here; the
    /// build command exists precisely to recover from one.
    pub fn build(&self) -> Result<BuildReport> {
        let previous = match store::load_state(&self.root) {
            Ok(Some(state)) => state.files,
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                eprintln!("WARN: Ignoring unreadable index state: {err}");
                BTreeMap::new()
            }
        };

        let sources = discovery::discover(&self.root, &self.ignore_globs)?;
        // The old records serve as a parse cache only; the fresh discovery
        // set alone decides which paths survive.
        self.run_pipeline(&sources, &previous, BTreeMap::new(), 0)
    }

    /// Incremental path: re-parse only changed or newly discovered files,
    /// drop deleted or vanished entries, rebuild the graph from the merge.
    ///
    /// # Errors
    /// Returns error on corrupt previous state (callers may fall back to
    /// `build`), diff retrieval failure, or any `build` error.
    pub fn update(&self, diff: &dyn DiffSource, range: Option<&str>) -> Result<BuildReport> {
        let Some(previous) = store::load_state(&self.root)? else {
            return self.build();
        };

        let sources = discovery::discover(&self.root, &self.ignore_globs)?;
        let changed: HashSet<String> = diff.changed(&self.root, range)?.into_iter().collect();
        let deleted: HashSet<String> = diff.deleted(&self.root, range)?.into_iter().collect();
        let discovered: HashSet<&str> = sources.iter().map(|s| s.rel_path.as_str()).collect();

        let candidates: Vec<SourceFile> = sources
            .iter()
            .filter(|s| changed.contains(&s.rel_path) || !previous.files.contains_key(&s.rel_path))
            .cloned()
            .collect();

        let mut merged = previous.files;
        let before = merged.len();
        merged.retain(|path, _| discovered.contains(path.as_str()) && !deleted.contains(path));
        let dropped = before - merged.len();

        let cache = merged.clone();
        self.run_pipeline(&candidates, &cache, merged, dropped)
    }

    fn run_pipeline(
        &self,
        sources: &[SourceFile],
        cache: &BTreeMap<String, crate::types::FileRecord>,
        base: BTreeMap<String, crate::types::FileRecord>,
        dropped: usize,
    ) -> Result<BuildReport> {
        let pool = ParserPool::new()?;
        let outcome = index::refresh(&pool, sources, cache);

        let mut files = base;
        files.extend(outcome.files);

        let resolver = PathResolver::from_root(&self.root);
        let graph = builder::build(&files, resolver.as_ref());
        let state = IndexState::new(&self.root, files);

        store::save_state(&self.root, &state)?;
        store::save_graph(&self.root, &graph)?;

        Ok(BuildReport {
            state,
            graph,
            parsed: outcome.parsed,
            reused: outcome.reused,
            dropped,
        })
    }

    /// Ranks files against the persisted index.
    ///
    /// # Errors
    /// Returns a build-first error when no index exists; propagates
    /// corrupt-artifact errors.
    pub fn rank(&self, seeds: &[String], top_k: usize) -> Result<Vec<RankedFile>> {
        let (state, graph) = self.load_artifacts()?;
        Ok(rank::rank_files(&graph, &state.files, seeds, top_k))
    }

    /// Ranks and buckets files for context assembly.
    ///
    /// # Errors
    /// Same contract as [`Engine::rank`].
    pub fn buckets(&self, seeds: &[String], top_k: usize) -> Result<ContextBuckets> {
        let (state, graph) = self.load_artifacts()?;
        Ok(rank::select_buckets(&graph, &state.files, seeds, top_k))
    }

    fn load_artifacts(&self) -> Result<(IndexState, DepGraph)> {
        let state = store::load_state(&self.root)?
            .context("No index found. Run `repomap build` first.")?;
        let graph = store::load_graph(&self.root)?
            .context("No graph found. Run `repomap build` first.")?;
        Ok((state, graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-answer diff source for exercising the incremental path.
    pub struct FakeDiff {
        pub changed: Vec<String>,
        pub deleted: Vec<String>,
    }

    impl DiffSource for FakeDiff {
        fn changed(&self, _root: &Path, _range: Option<&str>) -> Result<Vec<String>> {
            Ok(self.changed.clone())
        }

        fn deleted(&self, _root: &Path, _range: Option<&str>) -> Result<Vec<String>> {
            Ok(self.deleted.clone())
        }
    }

    #[test]
    fn test_rank_without_index_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::new(dir.path());
        let err = engine.rank(&[], 10).unwrap_err();
        assert!(err.to_string().contains("build"), "message: {err}");
    }

    #[test]
    fn test_update_without_state_delegates_to_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();

        let engine = Engine::new(dir.path());
        let diff = FakeDiff {
            changed: Vec::new(),
            deleted: Vec::new(),
        };
        let report = engine.update(&diff, None).unwrap();
        assert_eq!(report.parsed, 1);
        assert!(report.state.files.contains_key("a.py"));
    }
}
