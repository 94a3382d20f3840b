// src/graph/resolver.rs
//! Module path resolution for bare (non-relative) specifiers: tsconfig
//! alias wildcards and baseUrl lookup. Produces candidate repo-relative
//! paths only; whether a candidate is real is decided against the index.

use super::tsconfig::RootConfig;
use crate::utils::{normalize_posix, to_posix};
use std::path::Path;

/// A compiled `paths` rule. The pattern holds at most one `*`, split into
/// prefix and suffix for matching.
#[derive(Debug, Clone)]
struct AliasRule {
    pattern: String,
    prefix: String,
    suffix: String,
    has_wildcard: bool,
    targets: Vec<String>,
}

impl AliasRule {
    fn compile(pattern: &str, targets: &[String]) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Self {
                pattern: pattern.to_string(),
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
                has_wildcard: true,
                targets: targets.to_vec(),
            },
            None => Self {
                pattern: pattern.to_string(),
                prefix: String::new(),
                suffix: String::new(),
                has_wildcard: false,
                targets: targets.to_vec(),
            },
        }
    }

    fn specificity(&self) -> usize {
        if self.has_wildcard {
            self.prefix.len() + self.suffix.len()
        } else {
            self.pattern.len()
        }
    }

    /// Returns the wildcard value on a match; `""` for exact patterns.
    fn matched<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        if !self.has_wildcard {
            return (specifier == self.pattern).then_some("");
        }
        if specifier.len() < self.prefix.len() + self.suffix.len() {
            return None;
        }
        specifier
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_suffix(&self.suffix))
    }
}

/// Translates bare module specifiers to candidate repository-relative
/// POSIX paths, honoring the single root-level configuration.
#[derive(Debug, Default, Clone)]
pub struct PathResolver {
    /// Effective base directory, repo-relative POSIX; empty means root.
    base_rel: String,
    has_base_url: bool,
    rules: Vec<AliasRule>,
}

impl PathResolver {
    /// Loads the root configuration if one exists. Load errors are
    /// non-fatal: the result is simply `None` and relative imports keep
    /// working without alias resolution.
    #[must_use]
    pub fn from_root(root: &Path) -> Option<Self> {
        RootConfig::load(root).map(|config| Self::new(root, &config))
    }

    #[must_use]
    pub fn new(root: &Path, config: &RootConfig) -> Self {
        let base_rel = relativize(root, config.effective_base_dir());

        let mut rules: Vec<AliasRule> = config
            .paths
            .iter()
            .map(|(pattern, targets)| AliasRule::compile(pattern, targets))
            .collect();
        rules.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });

        Self {
            base_rel,
            has_base_url: config.base_url.is_some(),
            rules,
        }
    }

    /// Resolves a bare specifier to zero or more candidate paths.
    /// Relative specifiers are the caller's job and return nothing here.
    #[must_use]
    pub fn resolve(&self, specifier: &str) -> Vec<String> {
        if specifier.starts_with('.') {
            return Vec::new();
        }

        let mut candidates = Vec::new();

        for rule in &self.rules {
            let Some(wildcard) = rule.matched(specifier) else {
                continue;
            };
            for target in &rule.targets {
                let expanded = if target.contains('*') {
                    target.replace('*', wildcard)
                } else {
                    target.clone()
                };
                push_unique(&mut candidates, self.against_base(&expanded));
            }
        }

        if self.has_base_url {
            push_unique(&mut candidates, self.against_base(specifier));
        }

        candidates
    }

    fn against_base(&self, path: &str) -> String {
        if self.base_rel.is_empty() {
            normalize_posix(path)
        } else {
            normalize_posix(&format!("{}/{}", self.base_rel, path))
        }
    }
}

fn push_unique(candidates: &mut Vec<String>, candidate: String) {
    if !candidates.contains(&candidate) {
        candidates.push(candidate);
    }
}

fn relativize(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    normalize_posix(&to_posix(&rel.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolver(base_url: bool, paths: &[(&str, &[&str])]) -> PathResolver {
        let root = PathBuf::from("/repo");
        let config = RootConfig {
            config_dir: root.clone(),
            base_url: base_url.then(|| root.clone()),
            paths: paths
                .iter()
                .map(|(p, t)| (p.to_string(), t.iter().map(|s| s.to_string()).collect()))
                .collect::<HashMap<_, _>>(),
        };
        PathResolver::new(&root, &config)
    }

    #[test]
    fn test_relative_specifier_is_not_ours() {
        let r = resolver(true, &[]);
        assert!(r.resolve("./local").is_empty());
    }

    #[test]
    fn test_wildcard_alias() {
        let r = resolver(true, &[("@core/*", &["src/core/*"])]);
        let candidates = r.resolve("@core/config");
        assert_eq!(candidates[0], "src/core/config");
    }

    #[test]
    fn test_exact_alias() {
        let r = resolver(false, &[("utils", &["src/shared/utils"])]);
        assert_eq!(r.resolve("utils"), vec!["src/shared/utils".to_string()]);
        assert!(r.resolve("utils/extra").is_empty());
    }

    #[test]
    fn test_base_url_candidate() {
        let r = resolver(true, &[]);
        assert_eq!(r.resolve("src/lib/types"), vec!["src/lib/types".to_string()]);
    }

    #[test]
    fn test_specificity_ordering() {
        let r = resolver(false, &[("@/*", &["src/*"]), ("@/deep/*", &["src/nested/*"])]);
        let candidates = r.resolve("@/deep/thing");
        // The longer prefix wins the first slot; the generic rule still
        // contributes its own expansion afterwards.
        assert_eq!(candidates[0], "src/nested/thing");
        assert_eq!(candidates[1], "src/deep/thing");
    }

    #[test]
    fn test_no_match_yields_base_url_only() {
        let r = resolver(true, &[("@core/*", &["src/core/*"])]);
        assert_eq!(r.resolve("lodash"), vec!["lodash".to_string()]);
    }
}
