//! Utility functions for string handling, hashing and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logs and for length-bounded page text
//! - JSON error detection for handling truncated LLM replies
//! - Stable short hashes for image file names
//! - File system validation for the output directory

use sha2::{Digest, Sha256};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let cut = floor_char_boundary(s, max);
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Bound `s` to `max` characters, replacing the tail with `"..."`.
///
/// A string longer than `max` keeps its first `max - 3` characters.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Take the first `n` characters of `s` as a borrowed slice.
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When the LLM reply is cut off by its token limit, parsing fails with an
/// EOF error; such replies are worth asking for again.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// First `len` hex characters of the SHA-256 of `input`.
pub fn short_hash(input: &str, len: usize) -> String {
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest[..len.min(digest.len())].to_string()
}

/// Create `path` if needed and prove it accepts writes with a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let scratch = Path::new(path).join(".frontpage-write-check");
    fs::write(&scratch, b"ok").await?;
    if let Err(e) = fs::remove_file(&scratch).await {
        debug!(file = %scratch.display(), error = %e, "Could not remove write check file");
    }
    info!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 5);
        assert!(result.starts_with("éé…"));
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        let s = "x".repeat(600);
        let out = truncate_with_ellipsis(&s, 500);
        assert_eq!(out.chars().count(), 500);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_with_ellipsis("short", 500), "short");
    }

    #[test]
    fn test_prefix_chars() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("hi", 10), "hi");
    }

    #[test]
    fn test_short_hash_is_stable() {
        let a = short_hash("https://example.com/a.jpg", 16);
        assert_eq!(a.len(), 16);
        assert_eq!(a, short_hash("https://example.com/a.jpg", 16));
        assert_ne!(a, short_hash("https://example.com/b.jpg", 16));
    }

    #[test]
    fn test_looks_truncated() {
        let json_eof = r#"{"field": "value"#;
        let result: Result<serde_json::Value, _> = serde_json::from_str(json_eof);
        let e = result.unwrap_err();
        assert!(looks_truncated(&e));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 0);
    }
}
