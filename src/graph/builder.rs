// src/graph/builder.rs
//! Graph construction: definitions, import resolution, edge emission.
//!
//! The build is a pure function of the record set. Files are processed in
//! lexicographic path order and edge keys are deterministic, so equal
//! inputs always serialize to an equal graph.

use super::resolver::PathResolver;
use super::{file_id, symbol_id, Confidence, DepGraph, Edge, EdgeAttrs, NodeAttrs, Relation, Resolution};
use crate::types::{FileRecord, TagKind};
use crate::utils::{join_relative, normalize_posix};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Extension fallback order for extension-less import candidates.
const RESOLUTION_EXTENSIONS: [&str; 10] = [
    ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs", ".py", ".d.ts",
];

#[derive(Debug, Clone)]
struct DefEntry {
    file: String,
    node_id: String,
}

/// An import binding with its module specifier resolved against the index.
/// `owner_file` is `None` when no candidate matched; the binding still
/// suppresses name-match fallback for its local name.
#[derive(Debug, Clone)]
struct ResolvedImport {
    owner_file: Option<String>,
    local_name: String,
    imported_name: String,
    line: Option<usize>,
}

#[derive(Default)]
struct DefIndex {
    by_name: HashMap<String, Vec<DefEntry>>,
    by_file_and_name: HashMap<String, HashMap<String, Vec<DefEntry>>>,
}

/// Builds the dependency graph from the authoritative record set.
#[must_use]
pub fn build(records: &BTreeMap<String, FileRecord>, resolver: Option<&PathResolver>) -> DepGraph {
    let mut graph = DepGraph::default();
    let defs = add_definitions(&mut graph, records);

    for (path, record) in records {
        let resolved = resolve_imports(path, record, records, resolver);
        emit_file_edges(&mut graph, path, record, &resolved, &defs);
    }

    graph
}

/// Phase A: file nodes, symbol nodes, `defines` edges, definition indices.
fn add_definitions(graph: &mut DepGraph, records: &BTreeMap<String, FileRecord>) -> DefIndex {
    let mut defs = DefIndex::default();

    for (path, record) in records {
        graph.add_node(
            file_id(path),
            NodeAttrs::File {
                path: path.clone(),
                language: record.language,
                is_test: is_test_path(path),
            },
        );

        let mut seen = HashSet::new();
        for tag in record.tags.iter().filter(|t| t.kind == TagKind::Def) {
            let node_id = symbol_id(path, &tag.name, tag.line);
            if !seen.insert(node_id.clone()) {
                continue;
            }

            graph.add_node(
                node_id.clone(),
                NodeAttrs::Symbol {
                    name: tag.name.clone(),
                    owner_file: path.clone(),
                    line: tag.line,
                    symbol_type: tag.tag_type.clone(),
                },
            );
            graph.add_edge(Edge {
                relation: Relation::Defines,
                source: file_id(path),
                target: node_id.clone(),
                attrs: EdgeAttrs {
                    symbol: tag.name.clone(),
                    local_symbol: None,
                    line: Some(tag.line),
                    owner_file: path.clone(),
                    confidence: Confidence::High,
                    resolution: Resolution::Definition,
                },
            });

            let entry = DefEntry {
                file: path.clone(),
                node_id,
            };
            defs.by_name
                .entry(tag.name.clone())
                .or_default()
                .push(entry.clone());
            defs.by_file_and_name
                .entry(path.clone())
                .or_default()
                .entry(tag.name.clone())
                .or_default()
                .push(entry);
        }
    }

    defs
}

/// Phase B: translate one file's import bindings into resolved bindings.
fn resolve_imports(
    path: &str,
    record: &FileRecord,
    records: &BTreeMap<String, FileRecord>,
    resolver: Option<&PathResolver>,
) -> Vec<ResolvedImport> {
    let mut resolved = Vec::new();

    for binding in &record.imports {
        let spec = binding.module_specifier.as_str();
        let candidates = if spec.starts_with('.') {
            vec![join_relative(path, spec)]
        } else {
            let mut list = resolver.map_or_else(Vec::new, |r| r.resolve(spec));
            let bare = normalize_posix(spec);
            if !list.contains(&bare) {
                list.push(bare);
            }
            list
        };

        let mut hits = Vec::new();
        for candidate in &candidates {
            hits.extend(probe(records, candidate));
        }

        if hits.is_empty() {
            resolved.push(ResolvedImport {
                owner_file: None,
                local_name: binding.local_name.clone(),
                imported_name: binding.imported_name.clone(),
                line: binding.line,
            });
        } else {
            for owner in hits {
                resolved.push(ResolvedImport {
                    owner_file: Some(owner),
                    local_name: binding.local_name.clone(),
                    imported_name: binding.imported_name.clone(),
                    line: binding.line,
                });
            }
        }
    }

    resolved
}

/// Tries a candidate path against the index: as-is when it carries an
/// extension, else every known extension, then `index.<ext>` underneath.
fn probe(records: &BTreeMap<String, FileRecord>, candidate: &str) -> Vec<String> {
    if Path::new(candidate).extension().is_some() && records.contains_key(candidate) {
        return vec![candidate.to_string()];
    }

    let mut hits = Vec::new();
    for ext in RESOLUTION_EXTENSIONS {
        let with_ext = format!("{candidate}{ext}");
        if records.contains_key(&with_ext) {
            hits.push(with_ext);
        }
    }
    for ext in RESOLUTION_EXTENSIONS {
        let index_file = format!("{candidate}/index{ext}");
        if records.contains_key(&index_file) {
            hits.push(index_file);
        }
    }
    hits
}

/// Phase C: file-level `depends_on` from import declarations, then
/// per-reference edges with import-suppresses-fallback semantics.
fn emit_file_edges(
    graph: &mut DepGraph,
    path: &str,
    record: &FileRecord,
    resolved: &[ResolvedImport],
    defs: &DefIndex,
) {
    let source_id = file_id(path);
    let is_test = is_test_path(path);

    for import in resolved {
        let Some(owner) = &import.owner_file else {
            continue;
        };
        if owner == path {
            continue;
        }
        graph.add_edge(Edge {
            relation: Relation::DependsOn,
            source: source_id.clone(),
            target: file_id(owner),
            attrs: EdgeAttrs {
                symbol: import.imported_name.clone(),
                local_symbol: Some(import.local_name.clone()),
                line: import.line,
                owner_file: owner.clone(),
                confidence: Confidence::ImportOnly,
                resolution: Resolution::ImportDeclaration,
            },
        });
    }

    let mut by_local: HashMap<&str, Vec<&ResolvedImport>> = HashMap::new();
    for import in resolved {
        by_local.entry(&import.local_name).or_default().push(import);
    }

    for tag in record.tags.iter().filter(|t| t.kind == TagKind::Ref) {
        match by_local.get(tag.name.as_str()) {
            Some(bindings) => {
                for import in bindings {
                    emit_bound_ref(graph, path, &source_id, is_test, tag, import, defs);
                }
            }
            None => emit_fallback_ref(graph, path, &source_id, is_test, tag, defs),
        }
    }
}

fn emit_bound_ref(
    graph: &mut DepGraph,
    path: &str,
    source_id: &str,
    is_test: bool,
    tag: &crate::types::Tag,
    import: &ResolvedImport,
    defs: &DefIndex,
) {
    let Some(owner) = &import.owner_file else {
        // Unresolved binding: fallback stays suppressed, nothing to emit.
        return;
    };

    let expected = if import.imported_name == "default" {
        tag.name.as_str()
    } else {
        import.imported_name.as_str()
    };

    // Namespace imports never match individual definitions.
    let matching = if import.imported_name == "*" {
        None
    } else {
        defs.by_file_and_name
            .get(owner)
            .and_then(|names| names.get(expected))
            .filter(|entries| !entries.is_empty())
    };

    let Some(entries) = matching else {
        if owner != path {
            graph.add_edge(Edge {
                relation: Relation::DependsOn,
                source: source_id.to_string(),
                target: file_id(owner),
                attrs: EdgeAttrs {
                    symbol: expected.to_string(),
                    local_symbol: Some(tag.name.clone()),
                    line: Some(tag.line),
                    owner_file: owner.clone(),
                    confidence: Confidence::ImportOnly,
                    resolution: Resolution::Import,
                },
            });
        }
        return;
    };

    for def in entries {
        let attrs = EdgeAttrs {
            symbol: expected.to_string(),
            local_symbol: Some(tag.name.clone()),
            line: Some(tag.line),
            owner_file: owner.clone(),
            confidence: Confidence::High,
            resolution: Resolution::Import,
        };
        graph.add_edge(Edge {
            relation: Relation::References,
            source: source_id.to_string(),
            target: def.node_id.clone(),
            attrs: attrs.clone(),
        });
        if owner != path {
            graph.add_edge(Edge {
                relation: Relation::DependsOn,
                source: source_id.to_string(),
                target: file_id(owner),
                attrs: attrs.clone(),
            });
            if is_test {
                graph.add_edge(Edge {
                    relation: Relation::TestCovers,
                    source: source_id.to_string(),
                    target: file_id(owner),
                    attrs,
                });
            }
        }
    }
}

fn emit_fallback_ref(
    graph: &mut DepGraph,
    path: &str,
    source_id: &str,
    is_test: bool,
    tag: &crate::types::Tag,
    defs: &DefIndex,
) {
    let Some(entries) = defs.by_name.get(&tag.name) else {
        return;
    };

    for def in entries {
        let attrs = EdgeAttrs {
            symbol: tag.name.clone(),
            local_symbol: None,
            line: Some(tag.line),
            owner_file: def.file.clone(),
            confidence: Confidence::Fallback,
            resolution: Resolution::NameMatch,
        };
        graph.add_edge(Edge {
            relation: Relation::References,
            source: source_id.to_string(),
            target: def.node_id.clone(),
            attrs: attrs.clone(),
        });
        if def.file != path {
            graph.add_edge(Edge {
                relation: Relation::DependsOn,
                source: source_id.to_string(),
                target: file_id(&def.file),
                attrs: attrs.clone(),
            });
            if is_test {
                graph.add_edge(Edge {
                    relation: Relation::TestCovers,
                    source: source_id.to_string(),
                    target: file_id(&def.file),
                    attrs,
                });
            }
        }
    }
}

/// Test-file heuristic: a `test`/`tests`/`__tests__` path segment, or a
/// `.test.` / `.spec.` filename infix.
#[must_use]
pub fn is_test_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    if segments
        .iter()
        .any(|s| matches!(*s, "test" | "tests" | "__tests__"))
    {
        return true;
    }
    segments
        .last()
        .is_some_and(|name| name.contains(".test.") || name.contains(".spec."))
}
