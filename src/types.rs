// src/types.rs
//! Common data structures: the per-file parse contract.

use crate::lang::Lang;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A source file found by discovery. `rel_path` is repository-relative
/// with POSIX separators and is the key used everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub abs_path: PathBuf,
    pub rel_path: String,
    pub language: Lang,
}

/// Whether a captured identifier defines or references a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Def,
    Ref,
}

/// A captured identifier occurrence in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub kind: TagKind,
    /// Grammar-specific label such as `function`, `class`, `method`, `call`.
    #[serde(rename = "type")]
    pub tag_type: String,
    /// 1-based line number.
    pub line: usize,
}

/// How an import binding entered the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Import,
    ReExport,
}

/// Prefix for the synthetic local name of a side-effect import
/// (`import './setup'` introduces no names).
pub const SIDE_EFFECT_PREFIX: &str = "__side_effect__:";

/// A lexical import entry produced by a file.
///
/// `imported_name` is `"default"` for default imports, `"*"` for namespace
/// and side-effect imports, otherwise the exported identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBinding {
    pub local_name: String,
    pub imported_name: String,
    pub module_specifier: String,
    pub is_type_only: bool,
    pub source_kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Cached parse result for one file, keyed by content hash in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub hash: String,
    pub language: Lang,
    pub tags: Vec<Tag>,
    pub imports: Vec<ImportBinding>,
    /// RFC-3339 timestamp of the last parse. Kept as a string on disk; the
    /// ranker degrades gracefully when it does not parse back.
    pub last_parsed_at: String,
}

impl ImportBinding {
    /// Builds the synthetic binding for a bare `import 'x'` statement.
    #[must_use]
    pub fn side_effect(specifier: &str, line: usize) -> Self {
        Self {
            local_name: format!("{SIDE_EFFECT_PREFIX}{specifier}"),
            imported_name: "*".to_string(),
            module_specifier: specifier.to_string(),
            is_type_only: false,
            source_kind: SourceKind::Import,
            line: Some(line),
        }
    }
}
