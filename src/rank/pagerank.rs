// src/rank/pagerank.rs
//! Personalized PageRank over the dependency graph's node set.

use std::collections::HashMap;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

/// Computes PageRank scores for every node. `edges` maps source to
/// `{target -> weight}`; `personalization` biases the teleport
/// distribution (weights need not sum to one) and falls back to uniform.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::implicit_hasher)]
pub fn compute(
    nodes: &[String],
    edges: &HashMap<String, HashMap<String, f64>>,
    personalization: Option<&HashMap<String, f64>>,
) -> HashMap<String, f64> {
    if nodes.is_empty() {
        return HashMap::new();
    }

    let n = nodes.len() as f64;
    let teleport = build_teleport(nodes, personalization, n);
    let out_weights = total_out_weights(edges);

    let mut ranks: HashMap<String, f64> = teleport.clone();

    for _ in 0..MAX_ITERATIONS {
        let next = iterate_once(nodes, &ranks, edges, &out_weights, &teleport);
        let delta: f64 = nodes
            .iter()
            .map(|id| (next.get(id).unwrap_or(&0.0) - ranks.get(id).unwrap_or(&0.0)).abs())
            .sum();
        ranks = next;
        if delta < TOLERANCE {
            break;
        }
    }

    ranks
}

/// Normalized teleport distribution: the personalization vector when one
/// is given, uniform otherwise.
fn build_teleport(
    nodes: &[String],
    personalization: Option<&HashMap<String, f64>>,
    n: f64,
) -> HashMap<String, f64> {
    match personalization {
        Some(weights) => {
            let total: f64 = nodes.iter().filter_map(|id| weights.get(id)).sum();
            if total <= 0.0 {
                return uniform(nodes, n);
            }
            nodes
                .iter()
                .map(|id| (id.clone(), weights.get(id).copied().unwrap_or(0.0) / total))
                .collect()
        }
        None => uniform(nodes, n),
    }
}

fn uniform(nodes: &[String], n: f64) -> HashMap<String, f64> {
    nodes.iter().map(|id| (id.clone(), 1.0 / n)).collect()
}

fn total_out_weights(edges: &HashMap<String, HashMap<String, f64>>) -> HashMap<String, f64> {
    edges
        .iter()
        .map(|(source, targets)| (source.clone(), targets.values().sum()))
        .collect()
}

fn iterate_once(
    nodes: &[String],
    ranks: &HashMap<String, f64>,
    edges: &HashMap<String, HashMap<String, f64>>,
    out_weights: &HashMap<String, f64>,
    teleport: &HashMap<String, f64>,
) -> HashMap<String, f64> {
    // Rank held by nodes without outgoing edges is redistributed through
    // the teleport vector, keeping the total mass at one.
    let dangling: f64 = nodes
        .iter()
        .filter(|id| out_weights.get(*id).copied().unwrap_or(0.0) <= 0.0)
        .map(|id| ranks.get(id).copied().unwrap_or(0.0))
        .sum();

    let mut next: HashMap<String, f64> = nodes
        .iter()
        .map(|id| {
            let t = teleport.get(id).copied().unwrap_or(0.0);
            (id.clone(), (1.0 - DAMPING) * t + DAMPING * dangling * t)
        })
        .collect();

    for (source, targets) in edges {
        let out = out_weights.get(source).copied().unwrap_or(0.0);
        if out <= 0.0 {
            continue;
        }
        let source_rank = ranks.get(source).copied().unwrap_or(0.0);
        for (target, weight) in targets {
            if let Some(entry) = next.get_mut(target) {
                *entry += DAMPING * source_rank * weight / out;
            }
        }
    }

    next
}
