// src/graph/mod.rs
//! The labeled multi-edge dependency graph: file and symbol nodes in a
//! flat store keyed by stable string ids, edges keyed for deduplication.

pub mod builder;
pub mod resolver;
pub mod tsconfig;

use crate::lang::Lang;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Defines,
    References,
    DependsOn,
    TestCovers,
}

impl Relation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Defines => "defines",
            Self::References => "references",
            Self::DependsOn => "depends_on",
            Self::TestCovers => "test_covers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    ImportOnly,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Definition,
    Import,
    ImportDeclaration,
    NameMatch,
}

impl Resolution {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Definition => "definition",
            Self::Import => "import",
            Self::ImportDeclaration => "import_declaration",
            Self::NameMatch => "name_match",
        }
    }
}

/// Node attributes; the `kind` tag distinguishes files from symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeAttrs {
    #[serde(rename_all = "camelCase")]
    File {
        path: String,
        language: Lang,
        is_test: bool,
    },
    #[serde(rename_all = "camelCase")]
    Symbol {
        name: String,
        owner_file: String,
        line: usize,
        symbol_type: String,
    },
}

impl NodeAttrs {
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

/// The closed edge attribute bag shared by all relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAttrs {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub owner_file: String,
    pub confidence: Confidence,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub relation: Relation,
    pub source: String,
    pub target: String,
    pub attrs: EdgeAttrs,
}

impl Edge {
    /// Deterministic key preserving multiplicity: relation, endpoints and
    /// the attribute salts. Two edges with equal keys are one edge.
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.relation.as_str(),
            self.source,
            self.target,
            self.attrs.symbol,
            self.attrs.local_symbol.as_deref().unwrap_or(""),
            self.attrs.line.map(|l| l.to_string()).unwrap_or_default(),
            self.attrs.owner_file,
            self.attrs.resolution.as_str(),
        )
    }
}

/// Node id for a file: `file:<relPath>`.
#[must_use]
pub fn file_id(path: &str) -> String {
    format!("file:{path}")
}

/// Node id for a symbol: `sym:<enc(path)>:<enc(name)>:<line>`.
/// Path and name are url-encoded so the id stays splittable.
#[must_use]
pub fn symbol_id(path: &str, name: &str, line: usize) -> String {
    format!(
        "sym:{}:{}:{line}",
        urlencoding::encode(path),
        urlencoding::encode(name)
    )
}

/// Directed multigraph over stable string keys. BTree storage keeps
/// iteration (and therefore serialization) deterministic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DepGraph {
    nodes: BTreeMap<String, NodeAttrs>,
    edges: BTreeMap<String, Edge>,
}

impl DepGraph {
    pub fn add_node(&mut self, id: String, attrs: NodeAttrs) {
        self.nodes.entry(id).or_insert(attrs);
    }

    /// Inserts an edge unless an equal key already exists. Duplicate keys
    /// are dropped silently; that is the dedup contract.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        let key = edge.key();
        if self.edges.contains_key(&key) {
            return false;
        }
        self.edges.insert(key, edge);
        true
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeAttrs> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&String, &NodeAttrs)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&String, &Edge)> {
        self.edges.iter()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// File paths of all file nodes, in key order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().filter_map(|attrs| match attrs {
            NodeAttrs::File { path, .. } => Some(path.as_str()),
            NodeAttrs::Symbol { .. } => None,
        })
    }

    /// Serializable document form: `{nodes: [...], edges: [...]}`.
    #[must_use]
    pub fn to_doc(&self) -> GraphDoc {
        GraphDoc {
            nodes: self
                .nodes
                .iter()
                .map(|(key, attributes)| NodeEntry {
                    key: key.clone(),
                    attributes: attributes.clone(),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|(key, edge)| EdgeEntry {
                    key: key.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    attributes: EdgeDocAttrs {
                        relation: edge.relation,
                        attrs: edge.attrs.clone(),
                    },
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn from_doc(doc: GraphDoc) -> Self {
        let mut graph = Self::default();
        for node in doc.nodes {
            graph.nodes.insert(node.key, node.attributes);
        }
        for edge in doc.edges {
            graph.edges.insert(
                edge.key,
                Edge {
                    relation: edge.attributes.relation,
                    source: edge.source,
                    target: edge.target,
                    attrs: edge.attributes.attrs,
                },
            );
        }
        graph
    }
}

/// On-disk shape of `graph.json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDoc {
    pub nodes: Vec<NodeEntry>,
    pub edges: Vec<EdgeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeEntry {
    pub key: String,
    pub attributes: NodeAttrs,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeEntry {
    pub key: String,
    pub source: String,
    pub target: String,
    pub attributes: EdgeDocAttrs,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeDocAttrs {
    pub relation: Relation,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(relation: Relation, source: &str, target: &str) -> Edge {
        Edge {
            relation,
            source: source.to_string(),
            target: target.to_string(),
            attrs: EdgeAttrs {
                symbol: "S".into(),
                local_symbol: None,
                line: Some(1),
                owner_file: "b.ts".into(),
                confidence: Confidence::High,
                resolution: Resolution::Import,
            },
        }
    }

    #[test]
    fn test_symbol_id_encoding() {
        let id = symbol_id("src/a b.ts", "Config", 3);
        assert_eq!(id, "sym:src%2Fa%20b.ts:Config:3");
    }

    #[test]
    fn test_duplicate_edge_keys_are_dropped() {
        let mut graph = DepGraph::default();
        assert!(graph.add_edge(edge(Relation::DependsOn, "file:a.ts", "file:b.ts")));
        assert!(!graph.add_edge(edge(Relation::DependsOn, "file:a.ts", "file:b.ts")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_doc_round_trip() {
        let mut graph = DepGraph::default();
        graph.add_node(
            file_id("a.ts"),
            NodeAttrs::File {
                path: "a.ts".into(),
                language: Lang::TypeScript,
                is_test: false,
            },
        );
        graph.add_node(
            file_id("b.ts"),
            NodeAttrs::File {
                path: "b.ts".into(),
                language: Lang::TypeScript,
                is_test: false,
            },
        );
        graph.add_edge(edge(Relation::DependsOn, "file:a.ts", "file:b.ts"));

        let json = serde_json::to_string(&graph.to_doc()).unwrap();
        let back = DepGraph::from_doc(serde_json::from_str(&json).unwrap());
        assert_eq!(back, graph);
    }

    #[test]
    fn test_edge_attr_json_names() {
        let e = edge(Relation::TestCovers, "file:t.ts", "file:b.ts");
        let doc = serde_json::to_value(EdgeDocAttrs {
            relation: e.relation,
            attrs: e.attrs,
        })
        .unwrap();
        assert_eq!(doc["relation"], "test_covers");
        assert_eq!(doc["ownerFile"], "b.ts");
        assert_eq!(doc["confidence"], "high");
        assert!(doc.get("localSymbol").is_none());
    }
}
