// src/rank/mod.rs
//! File ranking: personalized PageRank plus path-risk, boundary-impact,
//! test-gap and freshness heuristics, folded into one weighted score.

pub mod pagerank;

use crate::graph::{DepGraph, NodeAttrs, Relation};
use crate::types::FileRecord;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

const W_PPR: f64 = 0.45;
const W_RISK: f64 = 0.25;
const W_BOUNDARY: f64 = 0.15;
const W_TEST_GAP: f64 = 0.10;
const W_FRESHNESS: f64 = 0.05;

/// Neighbor count that saturates the boundary-impact feature.
const BOUNDARY_SATURATION: f64 = 12.0;

const ONE_WEEK_MS: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Teleport weight for non-seed nodes when seeds are present.
const BACKGROUND_TELEPORT: f64 = 0.01;

/// Test paths match on a `test`/`tests`/`__tests__` segment or a
/// `.test.` / `.spec.` filename infix, the same heuristic the graph
/// builder uses; a bare substring would misread paths like `contest.ts`.
const TEST_PATH_PATTERN: &str = r"(^|/)(test|tests|__tests__)(/|$)|\.(test|spec)\.";

static RISK_RULES: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    [
        (r"auth|permission|acl|policy|security", 1.0),
        (r"payment|billing|invoice|money|wallet", 0.95),
        (r"migration|schema|db|database|sql|model", 0.85),
        (r"api|route|controller|handler", 0.7),
        (TEST_PATH_PATTERN, 0.25),
    ]
    .into_iter()
    .map(|(pattern, score)| (Regex::new(pattern).expect("static regex"), score))
    .collect()
});

static TEST_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TEST_PATH_PATTERN).expect("static regex"));

static CONTRACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(api|route|router|controller|handler|schema|contract|dto|migration|openapi|proto)")
        .expect("static regex")
});

static GUARDRAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)((?:{TEST_PATH_PATTERN})|auth|permission|security|policy|payment|billing|migration)"
    ))
    .expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub ppr: f64,
    pub risk: f64,
    pub boundary_impact: f64,
    pub test_gap: f64,
    pub freshness: f64,
}

impl Features {
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            ppr: 0.0,
            risk: 0.0,
            boundary_impact: 0.0,
            test_gap: 0.0,
            freshness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFile {
    pub path: String,
    pub score: f64,
    pub features: Features,
    pub reasons: Vec<String>,
}

/// The buckets handed to context assembly.
#[derive(Debug, Default, Serialize)]
pub struct ContextBuckets {
    pub primary: Vec<RankedFile>,
    pub causal: Vec<RankedFile>,
    pub contract: Vec<RankedFile>,
    pub guardrail: Vec<RankedFile>,
}

/// Scores every file node and returns the top `top_k` by descending score.
#[must_use]
pub fn rank_files(
    graph: &DepGraph,
    records: &BTreeMap<String, FileRecord>,
    seeds: &[String],
    top_k: usize,
) -> Vec<RankedFile> {
    let mut ranked = score_all(graph, records, seeds);
    ranked.truncate(top_k);
    ranked
}

/// Buckets the ranking around the seed files: `primary` holds the seeds
/// themselves, `causal` the highest-ranked non-seed files, `contract` and
/// `guardrail` quota-limited pattern slices over the same tail.
#[must_use]
pub fn select_buckets(
    graph: &DepGraph,
    records: &BTreeMap<String, FileRecord>,
    seeds: &[String],
    top_k: usize,
) -> ContextBuckets {
    let scored = score_all(graph, records, seeds);
    let seed_set: HashSet<&str> = seeds.iter().map(String::as_str).collect();

    let mut buckets = ContextBuckets::default();

    for seed in seeds {
        match scored.iter().find(|r| &r.path == seed) {
            Some(entry) => buckets.primary.push(entry.clone()),
            None => buckets.primary.push(RankedFile {
                path: seed.clone(),
                score: 0.0,
                features: Features::zeroed(),
                reasons: vec!["seed-file".to_string()],
            }),
        }
    }

    let tail: Vec<&RankedFile> = scored
        .iter()
        .filter(|r| !seed_set.contains(r.path.as_str()))
        .take(top_k)
        .collect();

    let quota = 5usize.max(top_k.div_ceil(2));
    buckets.causal = tail.iter().map(|r| (*r).clone()).collect();
    buckets.contract = tail
        .iter()
        .filter(|r| CONTRACT_RE.is_match(&r.path))
        .take(quota)
        .map(|r| (*r).clone())
        .collect();
    buckets.guardrail = tail
        .iter()
        .filter(|r| GUARDRAIL_RE.is_match(&r.path))
        .take(quota)
        .map(|r| (*r).clone())
        .collect();

    buckets
}

/// Scores all file nodes, sorted by score descending (path ascending on
/// ties, keeping the ordering total and repeat runs identical).
fn score_all(
    graph: &DepGraph,
    records: &BTreeMap<String, FileRecord>,
    seeds: &[String],
) -> Vec<RankedFile> {
    let nodes: Vec<String> = graph.nodes().map(|(id, _)| id.clone()).collect();
    let edges = adjacency(graph);
    let personalization = build_personalization(graph, seeds);
    let scores = pagerank::compute(&nodes, &edges, personalization.as_ref());

    let ppr_by_path = normalized_file_ppr(graph, &scores);
    let neighbor_counts = file_neighbor_counts(graph);
    let covered = test_covered_files(graph);
    let now = chrono::Utc::now();

    let mut ranked: Vec<RankedFile> = graph
        .file_paths()
        .map(|path| {
            let features = Features {
                ppr: ppr_by_path.get(path).copied().unwrap_or(0.0),
                risk: risk_score(path),
                boundary_impact: boundary_impact(neighbor_counts.get(path).copied().unwrap_or(0)),
                test_gap: test_gap(path, &covered),
                freshness: freshness(records.get(path), now),
            };
            let score = W_PPR * features.ppr
                + W_RISK * features.risk
                + W_BOUNDARY * features.boundary_impact
                + W_TEST_GAP * features.test_gap
                + W_FRESHNESS * features.freshness;
            RankedFile {
                path: path.to_string(),
                score,
                reasons: reasons_for(&features),
                features,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    ranked
}

/// Multi-edges accumulate weight; PageRank sees the full multiplicity.
fn adjacency(graph: &DepGraph) -> HashMap<String, HashMap<String, f64>> {
    let mut edges: HashMap<String, HashMap<String, f64>> = HashMap::new();
    for (_, edge) in graph.edges() {
        *edges
            .entry(edge.source.clone())
            .or_default()
            .entry(edge.target.clone())
            .or_default() += 1.0;
    }
    edges
}

fn build_personalization(graph: &DepGraph, seeds: &[String]) -> Option<HashMap<String, f64>> {
    if seeds.is_empty() {
        return None;
    }
    let seed_set: HashSet<&str> = seeds.iter().map(String::as_str).collect();

    let weights = graph
        .nodes()
        .map(|(id, attrs)| {
            let weight = match attrs {
                NodeAttrs::File { path, .. } if seed_set.contains(path.as_str()) => 1.0,
                _ => BACKGROUND_TELEPORT,
            };
            (id.clone(), weight)
        })
        .collect();
    Some(weights)
}

/// Min-max normalization of raw PageRank over file nodes only. A flat
/// distribution collapses to 0.5 everywhere.
fn normalized_file_ppr(graph: &DepGraph, scores: &HashMap<String, f64>) -> HashMap<String, f64> {
    let raw: Vec<(String, f64)> = graph
        .nodes()
        .filter_map(|(id, attrs)| match attrs {
            NodeAttrs::File { path, .. } => {
                Some((path.clone(), scores.get(id).copied().unwrap_or(0.0)))
            }
            NodeAttrs::Symbol { .. } => None,
        })
        .collect();

    let min = raw.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
    let max = raw.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);

    raw.into_iter()
        .map(|(path, score)| {
            let normalized = if (max - min).abs() < f64::EPSILON {
                0.5
            } else {
                (score - min) / (max - min)
            };
            (path, normalized)
        })
        .collect()
}

/// Unique file-node neighbors per file, over edges in either direction.
fn file_neighbor_counts(graph: &DepGraph) -> HashMap<String, usize> {
    let file_paths: HashMap<String, String> = graph
        .nodes()
        .filter_map(|(id, attrs)| match attrs {
            NodeAttrs::File { path, .. } => Some((id.clone(), path.clone())),
            NodeAttrs::Symbol { .. } => None,
        })
        .collect();

    let mut neighbors: HashMap<String, HashSet<String>> = HashMap::new();
    for (_, edge) in graph.edges() {
        let (Some(source_path), Some(target_path)) =
            (file_paths.get(&edge.source), file_paths.get(&edge.target))
        else {
            continue;
        };
        neighbors
            .entry(source_path.clone())
            .or_default()
            .insert(target_path.clone());
        neighbors
            .entry(target_path.clone())
            .or_default()
            .insert(source_path.clone());
    }

    neighbors
        .into_iter()
        .map(|(path, set)| (path, set.len()))
        .collect()
}

fn test_covered_files(graph: &DepGraph) -> HashSet<String> {
    graph
        .edges()
        .filter(|(_, edge)| edge.relation == Relation::TestCovers)
        .filter_map(|(_, edge)| edge.target.strip_prefix("file:").map(str::to_string))
        .collect()
}

fn risk_score(path: &str) -> f64 {
    let lowered = path.to_lowercase();
    for (pattern, score) in RISK_RULES.iter() {
        if pattern.is_match(&lowered) {
            return *score;
        }
    }
    0.45
}

#[allow(clippy::cast_precision_loss)]
fn boundary_impact(neighbor_count: usize) -> f64 {
    (neighbor_count as f64 / BOUNDARY_SATURATION).clamp(0.0, 1.0)
}

fn test_gap(path: &str, covered: &HashSet<String>) -> f64 {
    if TEST_PATH_RE.is_match(&path.to_lowercase()) {
        0.2
    } else if covered.contains(path) {
        0.1
    } else {
        0.9
    }
}

#[allow(clippy::cast_precision_loss)]
fn freshness(record: Option<&FileRecord>, now: chrono::DateTime<chrono::Utc>) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };
    if record.last_parsed_at.is_empty() {
        return 0.0;
    }
    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(&record.last_parsed_at) else {
        return 0.4;
    };
    let age_ms = now
        .signed_duration_since(parsed.with_timezone(&chrono::Utc))
        .num_milliseconds() as f64;
    (1.0 - age_ms / ONE_WEEK_MS).clamp(0.0, 1.0)
}

fn reasons_for(features: &Features) -> Vec<String> {
    let mut reasons = Vec::new();
    if features.ppr >= 0.7 {
        reasons.push("high-graph-relevance".to_string());
    }
    if features.risk >= 0.8 {
        reasons.push("high-risk-path".to_string());
    }
    if features.boundary_impact >= 0.6 {
        reasons.push("cross-module-impact".to_string());
    }
    if features.test_gap >= 0.7 {
        reasons.push("test-gap-suspected".to_string());
    }
    if features.freshness <= 0.3 {
        reasons.push("stale-index-signal".to_string());
    }
    if reasons.is_empty() {
        reasons.push("baseline-score".to_string());
    }
    reasons
}
