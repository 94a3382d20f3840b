// src/graph/tsconfig.rs
//! Root tsconfig.json / jsconfig.json loader: JSONC comment stripping,
//! recursive `extends` merging, `baseUrl` + `paths` extraction.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Merged compiler options relevant to module resolution. Only the single
/// root-level configuration is consulted; nested per-package configs are
/// out of scope.
#[derive(Debug, Default, Clone)]
pub struct RootConfig {
    /// Directory the config file lives in.
    pub config_dir: PathBuf,
    /// Explicit `compilerOptions.baseUrl`, joined onto `config_dir`.
    pub base_url: Option<PathBuf>,
    /// Raw `compilerOptions.paths` mapping, pattern -> targets.
    pub paths: HashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct RawConfig {
    extends: Option<String>,
    #[serde(rename = "compilerOptions")]
    compiler_options: Option<CompilerOptions>,
}

#[derive(Deserialize)]
struct CompilerOptions {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    paths: Option<HashMap<String, Vec<String>>>,
}

const MAX_EXTENDS_DEPTH: usize = 16;

impl RootConfig {
    /// Attempts to load tsconfig.json or jsconfig.json from the repository
    /// root. Any failure (missing file, bad JSON, unreadable extends target)
    /// yields `None`: alias resolution is then simply disabled.
    #[must_use]
    pub fn load(root: &Path) -> Option<Self> {
        ["tsconfig.json", "jsconfig.json"]
            .iter()
            .find_map(|name| Self::load_file(&root.join(name)))
    }

    fn load_file(path: &Path) -> Option<Self> {
        let raw = read_chain(path, 0)?;
        let config_dir = path.parent()?.to_path_buf();

        let base_url = raw.base_url.as_ref().map(|b| config_dir.join(b));
        Some(Self {
            config_dir,
            base_url,
            paths: raw.paths,
        })
    }

    /// The directory path-rule targets resolve against: the explicit
    /// `baseUrl` when present, else the config file's directory.
    #[must_use]
    pub fn effective_base_dir(&self) -> &Path {
        self.base_url.as_deref().unwrap_or(&self.config_dir)
    }
}

/// Options accumulated across an `extends` chain, child values winning.
struct MergedOptions {
    base_url: Option<String>,
    paths: HashMap<String, Vec<String>>,
}

fn read_chain(path: &Path, depth: usize) -> Option<MergedOptions> {
    if depth >= MAX_EXTENDS_DEPTH {
        return None;
    }

    let content = std::fs::read_to_string(path).ok()?;
    let clean = strip_json_comments(&content);
    let raw: RawConfig = serde_json::from_str(&clean).ok()?;

    let mut merged = match &raw.extends {
        Some(parent_ref) => {
            let parent_path = resolve_extends(path, parent_ref)?;
            read_chain(&parent_path, depth + 1)?
        }
        None => MergedOptions {
            base_url: None,
            paths: HashMap::new(),
        },
    };

    if let Some(opts) = raw.compiler_options {
        if opts.base_url.is_some() {
            merged.base_url = opts.base_url;
        }
        if let Some(paths) = opts.paths {
            for (pattern, targets) in paths {
                merged.paths.insert(pattern, targets);
            }
        }
    }

    Some(merged)
}

fn resolve_extends(child: &Path, parent_ref: &str) -> Option<PathBuf> {
    let dir = child.parent()?;
    let mut candidate = dir.join(parent_ref);
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    candidate.is_file().then_some(candidate)
}

/// Strips `//` and `/* */` comments so lenient tsconfig files parse as JSON.
fn strip_json_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' => match chars.peek() {
                Some('/') => {
                    for ch in chars.by_ref() {
                        if ch == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut star = false;
                    for ch in chars.by_ref() {
                        if star && ch == '/' {
                            break;
                        }
                        star = ch == '*';
                    }
                }
                _ => out.push('/'),
            },
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_strip_comments() {
        let input = "{ // trailing\n  \"baseUrl\": \".\" /* inline */ }";
        let clean = strip_json_comments(input);
        assert!(clean.contains("baseUrl"));
        assert!(!clean.contains("trailing"));
        assert!(!clean.contains("inline"));
        let parsed: serde_json::Value = serde_json::from_str(&clean).unwrap();
        assert_eq!(parsed["baseUrl"], ".");
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let input = r#"{ "a": "http://x/*y" }"#;
        let clean = strip_json_comments(input);
        let parsed: serde_json::Value = serde_json::from_str(&clean).unwrap();
        assert_eq!(parsed["a"], "http://x/*y");
    }

    #[test]
    fn test_load_basic() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@core/*": ["src/core/*"] } } }"#,
        )
        .unwrap();

        let config = RootConfig::load(dir.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some(dir.path()));
        assert_eq!(config.paths["@core/*"], vec!["src/core/*".to_string()]);
    }

    #[test]
    fn test_extends_chain_merges_child_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tsconfig.base.json"),
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@pkg/*": ["packages/*/src"], "@old/*": ["old/*"] } } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("tsconfig.json"),
            r#"{ "extends": "./tsconfig.base", "compilerOptions": { "paths": { "@old/*": ["newer/*"] } } }"#,
        )
        .unwrap();

        let config = RootConfig::load(dir.path()).unwrap();
        assert_eq!(config.paths["@pkg/*"], vec!["packages/*/src".to_string()]);
        assert_eq!(config.paths["@old/*"], vec!["newer/*".to_string()]);
        assert!(config.base_url.is_some(), "baseUrl inherited from base");
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RootConfig::load(dir.path()).is_none());
    }

    #[test]
    fn test_malformed_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tsconfig.json"), "{ nonsense").unwrap();
        assert!(RootConfig::load(dir.path()).is_none());
    }
}
