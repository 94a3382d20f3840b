// tests/integration_core.rs
//! Full pipeline over a real tree: discover, parse, resolve, build,
//! persist, rank.

use repomap::engine::Engine;
use repomap::graph::{Confidence, Relation, Resolution};
use repomap::store;
use std::fs;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_build_rank_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "tsconfig.json",
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@core/*": ["src/core/*"] } } }"#,
    );
    write(
        root,
        "src/core/config.ts",
        "export interface Config { name: string }\nexport function loadConfig(): Config { return { name: 'x' }; }\n",
    );
    write(
        root,
        "src/feature/use.ts",
        "import { loadConfig } from '@core/config';\nexport function feature() { return loadConfig(); }\n",
    );
    write(
        root,
        "src/__tests__/use.test.ts",
        "import { feature } from '../feature/use';\nfeature();\n",
    );
    write(root, "node_modules/pkg/index.ts", "export const ignored = 1;\n");

    let engine = Engine::new(root);
    let report = engine.build().unwrap();

    assert!(
        !report.state.files.contains_key("node_modules/pkg/index.ts"),
        "pruned directories stay out of the index"
    );
    assert!(report.state.files.contains_key("src/core/config.ts"));

    let has_edge = |relation: Relation, source: &str, target: &str| {
        let source_id = format!("file:{source}");
        let target_id = format!("file:{target}");
        report.graph.edges().any(|(_, e)| {
            e.relation == relation && e.source == source_id && e.target == target_id
        })
    };

    assert!(
        has_edge(Relation::DependsOn, "src/feature/use.ts", "src/core/config.ts"),
        "alias import resolves through tsconfig"
    );
    assert!(has_edge(
        Relation::TestCovers,
        "src/__tests__/use.test.ts",
        "src/feature/use.ts"
    ));

    let alias_edge = report
        .graph
        .edges()
        .map(|(_, e)| e)
        .find(|e| {
            e.relation == Relation::DependsOn
                && e.source == "file:src/feature/use.ts"
                && e.attrs.resolution == Resolution::Import
        })
        .expect("high-confidence alias edge");
    assert_eq!(alias_edge.attrs.confidence, Confidence::High);
    assert_eq!(alias_edge.attrs.symbol, "loadConfig");

    // Persisted artifacts read back structurally identical.
    let loaded_state = store::load_state(root).unwrap().unwrap();
    assert_eq!(loaded_state, report.state);
    let loaded_graph = store::load_graph(root).unwrap().unwrap();
    assert_eq!(loaded_graph, report.graph);

    // Ranking over the persisted index, seeded with the feature file.
    let seeds = vec!["src/feature/use.ts".to_string()];
    let ranked = engine.rank(&seeds, 10).unwrap();
    assert!(!ranked.is_empty());
    assert!(ranked.iter().any(|r| r.path == "src/core/config.ts"));

    let buckets = engine.buckets(&seeds, 10).unwrap();
    assert_eq!(buckets.primary.len(), 1);
    assert_eq!(buckets.primary[0].path, "src/feature/use.ts");
    assert!(
        buckets.primary[0].score > 0.0,
        "a seed present in the graph keeps its computed score"
    );
}

#[test]
fn test_second_build_reuses_everything() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "a.py", "def f():\n    pass\n");
    write(root, "b.py", "def g():\n    f()\n");

    let engine = Engine::new(root);
    let first = engine.build().unwrap();
    assert_eq!(first.parsed, 2);
    assert_eq!(first.reused, 0);

    let second = engine.build().unwrap();
    assert_eq!(second.parsed, 0);
    assert_eq!(second.reused, 2);
    assert_eq!(
        serde_json::to_string(&second.graph.to_doc()).unwrap(),
        serde_json::to_string(&first.graph.to_doc()).unwrap()
    );
}
