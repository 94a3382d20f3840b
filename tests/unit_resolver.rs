// tests/unit_resolver.rs
//! Alias and baseUrl resolution end to end: config file on disk,
//! records in memory, edges out.

use repomap::graph::resolver::PathResolver;
use repomap::graph::{builder, Confidence, DepGraph, Relation, Resolution};
use repomap::lang::Lang;
use repomap::types::{FileRecord, ImportBinding, SourceKind, Tag, TagKind};
use std::collections::BTreeMap;
use std::fs;

fn record(tags: Vec<(&str, TagKind, usize)>, imports: Vec<ImportBinding>) -> FileRecord {
    FileRecord {
        hash: "h".to_string(),
        language: Lang::TypeScript,
        tags: tags
            .into_iter()
            .map(|(name, kind, line)| Tag {
                name: name.to_string(),
                kind,
                tag_type: "function".to_string(),
                line,
            })
            .collect(),
        imports,
        last_parsed_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

fn import(local: &str, specifier: &str) -> ImportBinding {
    ImportBinding {
        local_name: local.to_string(),
        imported_name: local.to_string(),
        module_specifier: specifier.to_string(),
        is_type_only: false,
        source_kind: SourceKind::Import,
        line: Some(1),
    }
}

fn has_high_import_edge(graph: &DepGraph, source: &str, target: &str) -> bool {
    let source_id = format!("file:{source}");
    let target_id = format!("file:{target}");
    graph.edges().any(|(_, e)| {
        e.relation == Relation::DependsOn
            && e.source == source_id
            && e.target == target_id
            && e.attrs.resolution == Resolution::Import
            && e.attrs.confidence == Confidence::High
    })
}

#[test]
fn test_path_alias_resolution() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tsconfig.json"),
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@core/*": ["src/core/*"] } } }"#,
    )
    .unwrap();
    let resolver = PathResolver::from_root(dir.path()).expect("config loads");

    let mut records = BTreeMap::new();
    records.insert(
        "src/core/config.ts".to_string(),
        record(vec![("loadConfig", TagKind::Def, 1)], vec![]),
    );
    records.insert(
        "src/feature/use.ts".to_string(),
        record(
            vec![("loadConfig", TagKind::Ref, 2)],
            vec![import("loadConfig", "@core/config")],
        ),
    );

    let graph = builder::build(&records, Some(&resolver));
    assert!(has_high_import_edge(
        &graph,
        "src/feature/use.ts",
        "src/core/config.ts"
    ));
}

#[test]
fn test_base_url_only_resolution() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tsconfig.json"),
        r#"{ "compilerOptions": { "baseUrl": "." } }"#,
    )
    .unwrap();
    let resolver = PathResolver::from_root(dir.path()).expect("config loads");

    let mut records = BTreeMap::new();
    records.insert(
        "src/lib/types.ts".to_string(),
        record(vec![("Kind", TagKind::Def, 1)], vec![]),
    );
    records.insert(
        "src/app/main.ts".to_string(),
        record(
            vec![("Kind", TagKind::Ref, 2)],
            vec![import("Kind", "src/lib/types")],
        ),
    );

    let graph = builder::build(&records, Some(&resolver));
    assert!(has_high_import_edge(
        &graph,
        "src/app/main.ts",
        "src/lib/types.ts"
    ));
}

#[test]
fn test_extends_chain_alias() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tsconfig.base.json"),
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@pkg/*": ["packages/*/src"] } } }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("tsconfig.json"),
        r#"{ "extends": "./tsconfig.base.json" }"#,
    )
    .unwrap();
    let resolver = PathResolver::from_root(dir.path()).expect("config loads");

    let mut records = BTreeMap::new();
    records.insert(
        "packages/core/src/index.ts".to_string(),
        record(vec![("core", TagKind::Def, 1)], vec![]),
    );
    records.insert(
        "app.ts".to_string(),
        record(vec![("core", TagKind::Ref, 2)], vec![import("core", "@pkg/core")]),
    );

    let graph = builder::build(&records, Some(&resolver));
    assert!(has_high_import_edge(
        &graph,
        "app.ts",
        "packages/core/src/index.ts"
    ));
}

#[test]
fn test_missing_config_leaves_relative_imports_working() {
    let mut records = BTreeMap::new();
    records.insert(
        "src/util.ts".to_string(),
        record(vec![("helper", TagKind::Def, 1)], vec![]),
    );
    records.insert(
        "src/main.ts".to_string(),
        record(
            vec![("helper", TagKind::Ref, 2)],
            vec![import("helper", "./util")],
        ),
    );

    // No resolver at all: relative resolution is the builder's own job.
    let graph = builder::build(&records, None);
    assert!(has_high_import_edge(&graph, "src/main.ts", "src/util.ts"));
}
