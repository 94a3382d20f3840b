// src/parser/mod.rs
//! The language parser pool: one grammar + one compiled tag query per
//! language, shared across workers. `tree_sitter::Parser` itself is not
//! shareable, so each parse call builds its own.

mod imports;

use crate::error::{bail, Context, Result};
use crate::lang::Lang;
use crate::types::{SourceFile, Tag, TagKind};
use std::collections::HashMap;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor};

const DEF_PREFIX: &str = "name.definition.";
const REF_PREFIX: &str = "name.reference.";

/// Tags and import bindings extracted from a single file.
#[derive(Debug, Default)]
pub struct ParseOutput {
    pub tags: Vec<Tag>,
    pub imports: Vec<crate::types::ImportBinding>,
}

struct LangConfig {
    language: Language,
    query: Query,
}

/// Process-wide pool of per-language grammar handles and compiled queries.
pub struct ParserPool {
    configs: HashMap<Lang, LangConfig>,
}

impl ParserPool {
    /// Compiles the tag query for every supported language. A query the
    /// grammar rejects triggers the built-in minimal fallback with a single
    /// warning for that language.
    ///
    /// # Errors
    /// Returns error only if a fallback query fails to compile.
    pub fn new() -> Result<Self> {
        let mut configs = HashMap::new();

        for lang in Lang::all() {
            let language = lang.grammar();
            let query = match Query::new(&language, lang.q_tags()) {
                Ok(q) => q,
                Err(err) => {
                    eprintln!(
                        "WARN: tag query rejected for {}, using fallback: {err}",
                        lang.name()
                    );
                    Query::new(&language, lang.q_fallback())
                        .with_context(|| format!("Fallback query invalid for {}", lang.name()))?
                }
            };
            configs.insert(lang, LangConfig { language, query });
        }

        Ok(Self { configs })
    }

    /// Parses one file into tags and import bindings.
    ///
    /// # Errors
    /// Returns error if the grammar cannot load or the parse yields no tree;
    /// callers treat this as a skip, not an abort.
    pub fn parse(&self, file: &SourceFile, content: &str) -> Result<ParseOutput> {
        let Some(config) = self.configs.get(&file.language) else {
            bail!("No parser configured for {}", file.language.name());
        };

        let mut parser = Parser::new();
        parser
            .set_language(&config.language)
            .with_context(|| format!("Grammar rejected for {}", file.language.name()))?;

        let Some(tree) = parser.parse(content, None) else {
            bail!("Parser produced no tree for {}", file.rel_path);
        };

        let tags = collect_tags(&config.query, tree.root_node(), content);
        let imports = if file.language.has_import_bindings() {
            imports::extract(tree.root_node(), content)
        } else {
            Vec::new()
        };

        Ok(ParseOutput { tags, imports })
    }
}

fn collect_tags(query: &Query, root: tree_sitter::Node, source: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source.as_bytes());

    while let Some(m) = matches.next() {
        for capture in m.captures {
            let capture_name = query.capture_names()[capture.index as usize];
            let Some((kind, tag_type)) = split_capture(capture_name) else {
                continue;
            };
            let Ok(text) = capture.node.utf8_text(source.as_bytes()) else {
                continue;
            };

            tags.push(Tag {
                name: text.to_string(),
                kind,
                tag_type: tag_type.to_string(),
                line: capture.node.start_position().row + 1,
            });
        }
    }

    tags
}

fn split_capture(name: &str) -> Option<(TagKind, &str)> {
    if let Some(rest) = name.strip_prefix(DEF_PREFIX) {
        return Some((TagKind::Def, rest));
    }
    if let Some(rest) = name.strip_prefix(REF_PREFIX) {
        return Some((TagKind::Ref, rest));
    }
    None
}
