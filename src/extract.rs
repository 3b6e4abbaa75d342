//! Token extraction from the serialized `segmented_words` field.
//!
//! Upstream tokenizers serialize their output inconsistently: a Python-style
//! bracketed list with single or double quotes, a quoted
//! whitespace-separated string, or a plain whitespace-separated string. The
//! extractor sniffs the shape structurally instead of requiring a declared
//! format, and any malformed input degrades to an empty token list — it
//! never errors.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Literal artifacts that upstream serializers leak into token lists.
static NOISE_MARKERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["", "\\n", "\\t", "\\r"].into_iter().collect());

/// Minimum-length policy for kept tokens. Some upstream variants keep
/// single-character words, others drop them; both are one-char-count apart,
/// so the policy is explicit rather than a global flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Tokens shorter than this (in chars, not bytes) are dropped.
    pub min_chars: usize,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        TokenPolicy { min_chars: 1 }
    }
}

impl TokenPolicy {
    /// Variant that drops single-character tokens.
    pub const fn strict() -> Self {
        TokenPolicy { min_chars: 2 }
    }
}

/// Extract clean tokens from one raw serialized token-list field.
///
/// Pure and infallible: `None`, empty, and malformed inputs all yield an
/// empty vec. Order of surviving tokens is preserved.
pub fn extract_tokens(raw: Option<&str>, policy: TokenPolicy) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let s = raw.trim();
    if s.is_empty() {
        return Vec::new();
    }

    // Structural sniff: a bracketed pseudo-list splits on commas, anything
    // else splits on whitespace. Both '[' and ']' are single bytes, so the
    // inner slice is char-boundary safe.
    let candidates: Vec<&str> = if s.starts_with('[') && s.ends_with(']') && s.len() >= 2 {
        s[1..s.len() - 1].split(',').collect()
    } else {
        s.split_whitespace().collect()
    };

    candidates
        .into_iter()
        .filter_map(|c| clean_candidate(c, policy))
        .collect()
}

/// Strip edge quotes/whitespace and apply the drop rules. Interior
/// punctuation is left intact; tokens are assumed comma/bracket-free.
fn clean_candidate(candidate: &str, policy: TokenPolicy) -> Option<String> {
    let token = candidate
        .trim()
        .trim_matches(|ch| ch == '\'' || ch == '"')
        .trim();

    if NOISE_MARKERS.contains(token) {
        return None;
    }
    if token.chars().count() < policy.min_chars.max(1) {
        return None;
    }
    Some(token.to_string())
}
