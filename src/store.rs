// src/store.rs
//! Durable artifacts under `<root>/.repomap/`: the authoritative index
//! state and the serialized graph. Absent files read back as `None`;
//! malformed content is a real error the caller decides how to handle.

use crate::error::{bail, Context, Result};
use crate::graph::{DepGraph, GraphDoc};
use crate::types::FileRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const INDEX_DIR: &str = ".repomap";
pub const STATE_VERSION: u32 = 1;

const STATE_FILE: &str = "state.json";
const GRAPH_FILE: &str = "graph.json";

/// The persisted index: everything needed to rebuild the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexState {
    pub version: u32,
    pub generated_at: String,
    pub repo_root: String,
    pub files: BTreeMap<String, FileRecord>,
}

impl IndexState {
    #[must_use]
    pub fn new(repo_root: &Path, files: BTreeMap<String, FileRecord>) -> Self {
        Self {
            version: STATE_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            repo_root: repo_root.to_string_lossy().into_owned(),
            files,
        }
    }
}

#[must_use]
pub fn index_dir(root: &Path) -> PathBuf {
    root.join(INDEX_DIR)
}

/// # Errors
/// Returns error if the index directory cannot be created or written.
pub fn save_state(root: &Path, state: &IndexState) -> Result<()> {
    write_json(&index_dir(root).join(STATE_FILE), state)
}

/// # Errors
/// Returns error on unreadable or malformed content, or a version this
/// build does not understand. A missing file is `Ok(None)`.
pub fn load_state(root: &Path) -> Result<Option<IndexState>> {
    let Some(state) = read_json::<IndexState>(&index_dir(root).join(STATE_FILE))? else {
        return Ok(None);
    };
    if state.version != STATE_VERSION {
        bail!(
            "Unsupported index state version {} (expected {STATE_VERSION})",
            state.version
        );
    }
    Ok(Some(state))
}

/// # Errors
/// Returns error if the index directory cannot be created or written.
pub fn save_graph(root: &Path, graph: &DepGraph) -> Result<()> {
    write_json(&index_dir(root).join(GRAPH_FILE), &graph.to_doc())
}

/// # Errors
/// Returns error on unreadable or malformed content; missing is `Ok(None)`.
pub fn load_graph(root: &Path) -> Result<Option<DepGraph>> {
    Ok(read_json::<GraphDoc>(&index_dir(root).join(GRAPH_FILE))?.map(DepGraph::from_doc))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value).context("Serialization failed")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Malformed JSON in {}", path.display()))?;
    Ok(Some(value))
}
