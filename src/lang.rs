// src/lang.rs
use serde::{Deserialize, Serialize};
use tree_sitter::Language;

#[path = "lang_queries.rs"]
mod lang_queries;
use lang_queries::QUERIES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
}

#[derive(Debug, Clone, Copy)]
pub enum QueryKind {
    Tags,
    Fallback,
}

impl Lang {
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Self::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    #[must_use]
    pub fn all() -> [Self; 4] {
        [Self::Python, Self::JavaScript, Self::TypeScript, Self::Tsx]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    #[must_use]
    pub fn grammar(self) -> Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Import bindings are extracted for the ECMAScript family only;
    /// Python references resolve through name matching.
    #[must_use]
    pub fn has_import_bindings(self) -> bool {
        self != Self::Python
    }

    #[must_use]
    #[allow(clippy::indexing_slicing)]
    pub fn query(self, kind: QueryKind) -> &'static str {
        QUERIES[self as usize][kind as usize]
    }

    #[must_use]
    pub fn q_tags(self) -> &'static str {
        self.query(QueryKind::Tags)
    }

    #[must_use]
    pub fn q_fallback(self) -> &'static str {
        self.query(QueryKind::Fallback)
    }
}
