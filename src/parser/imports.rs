// src/parser/imports.rs
//! Import binding extraction for the ECMAScript family.
//!
//! Walks top-level `import_statement` nodes rather than using a query;
//! the clause shapes (default, namespace, named, side-effect) map directly
//! onto [`ImportBinding`] records.

use crate::types::ImportBinding;
use regex::Regex;
use std::sync::LazyLock;
use tree_sitter::Node;

static TYPE_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+type\b").expect("static regex"));

// TODO: handle re-export declarations (`export { X } from './y'`) and
// CommonJS `require()` calls; neither produces bindings today.

/// Extracts import bindings from every top-level `import_statement`.
#[must_use]
pub fn extract(root: Node, source: &str) -> Vec<ImportBinding> {
    let mut bindings = Vec::new();
    let mut cursor = root.walk();

    for stmt in root.named_children(&mut cursor) {
        if stmt.kind() == "import_statement" {
            extract_statement(stmt, source, &mut bindings);
        }
    }

    bindings
}

fn extract_statement(stmt: Node, source: &str, out: &mut Vec<ImportBinding>) {
    let Some(specifier) = module_specifier(stmt, source) else {
        return;
    };
    let line = stmt.start_position().row + 1;
    let stmt_type_only = node_text(stmt, source).is_some_and(|t| TYPE_ONLY_RE.is_match(t));

    let Some(clause) = find_child(stmt, "import_clause") else {
        out.push(ImportBinding::side_effect(&specifier, line));
        return;
    };

    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" => {
                if let Some(local) = node_text(part, source) {
                    out.push(binding(local, "default", &specifier, stmt_type_only, line));
                }
            }
            "namespace_import" => {
                if let Some(local) = find_child(part, "identifier").and_then(|n| node_text(n, source)) {
                    out.push(binding(local, "*", &specifier, stmt_type_only, line));
                }
            }
            "named_imports" => {
                extract_named(part, source, &specifier, stmt_type_only, line, out);
            }
            _ => {}
        }
    }
}

fn extract_named(
    named: Node,
    source: &str,
    specifier: &str,
    stmt_type_only: bool,
    line: usize,
    out: &mut Vec<ImportBinding>,
) {
    let mut cursor = named.walk();
    for spec in named.named_children(&mut cursor) {
        if spec.kind() != "import_specifier" {
            continue;
        }

        let Some(imported) = spec
            .child_by_field_name("name")
            .and_then(|n| node_text(n, source))
        else {
            continue;
        };
        let local = spec
            .child_by_field_name("alias")
            .and_then(|n| node_text(n, source))
            .unwrap_or(imported);

        let spec_type_only = node_text(spec, source).is_some_and(|t| t.starts_with("type "));
        let mut b = binding(local, imported, specifier, stmt_type_only, line);
        b.is_type_only = stmt_type_only || spec_type_only;
        out.push(b);
    }
}

fn binding(
    local: &str,
    imported: &str,
    specifier: &str,
    is_type_only: bool,
    line: usize,
) -> ImportBinding {
    ImportBinding {
        local_name: local.to_string(),
        imported_name: imported.to_string(),
        module_specifier: specifier.to_string(),
        is_type_only,
        source_kind: crate::types::SourceKind::Import,
        line: Some(line),
    }
}

fn module_specifier(stmt: Node, source: &str) -> Option<String> {
    let node = stmt.child_by_field_name("source")?;
    let text = node_text(node, source)?;
    Some(text.trim_matches(|c| c == '"' || c == '\'').to_string())
}

fn find_child<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let result = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    result
}

fn node_text<'a>(node: Node, source: &'a str) -> Option<&'a str> {
    node.utf8_text(source.as_bytes()).ok()
}
