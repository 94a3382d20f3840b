// src/utils.rs
use sha2::{Digest, Sha256};

/// Computes SHA256 hash of content with normalized line endings.
/// CRLF/CR are folded to LF before hashing so the same file produces the
/// same fingerprint across Windows/Unix checkouts.
#[must_use]
pub fn compute_sha256(content: &str) -> String {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Joins `segment` onto the directory of `base` and normalizes the result.
/// Both inputs and the output are repository-relative POSIX paths.
#[must_use]
pub fn join_relative(base: &str, segment: &str) -> String {
    let dir = match base.rfind('/') {
        Some(idx) => &base[..idx],
        None => "",
    };
    if dir.is_empty() {
        normalize_posix(segment)
    } else {
        normalize_posix(&format!("{dir}/{segment}"))
    }
}

/// Collapses `.` and `..` components of a POSIX path.
/// Leading `..` that would escape the root are dropped; candidates outside
/// the repository can never match the index anyway.
#[must_use]
pub fn normalize_posix(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for comp in path.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Converts an OS path string to POSIX separators.
#[must_use]
pub fn to_posix(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_normalizes_line_endings() {
        assert_eq!(compute_sha256("a\r\nb"), compute_sha256("a\nb"));
        assert_eq!(compute_sha256("a\rb"), compute_sha256("a\nb"));
        assert_ne!(compute_sha256("a"), compute_sha256("b"));
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("src/app/main.ts", "./util"), "src/app/util");
        assert_eq!(join_relative("src/app/main.ts", "../lib/types"), "src/lib/types");
        assert_eq!(join_relative("main.ts", "./setup"), "setup");
    }

    #[test]
    fn test_normalize_posix() {
        assert_eq!(normalize_posix("a/./b/../c"), "a/c");
        assert_eq!(normalize_posix("./x"), "x");
        assert_eq!(normalize_posix("../x"), "x");
    }
}
