//! Frequency aggregation over extracted token sequences.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::extract::{extract_tokens, TokenPolicy};
use crate::models::{CategoryFilter, Comment};

/// One ranked row of the frequency summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCount {
    pub token: String,
    pub count: u32,
}

/// Token → count multiset. Entries remember their first-seen position so
/// top-N ranking is stable and reproducible across runs.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<TokenCount>,
    index: HashMap<String, usize>,
    total: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable::default()
    }

    pub fn add(&mut self, token: String) {
        match self.index.get(&token) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(token.clone(), self.entries.len());
                self.entries.push(TokenCount { token, count: 1 });
            }
        }
        self.total += 1;
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, tokens: I) {
        for t in tokens {
            self.add(t);
        }
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of token occurrences; equals the sum of all counts.
    pub fn total_tokens(&self) -> u64 {
        self.total
    }

    pub fn count(&self, token: &str) -> u32 {
        self.index
            .get(token)
            .map(|&i| self.entries[i].count)
            .unwrap_or(0)
    }

    /// Top `n` tokens, descending by count, ties broken by first-seen order.
    pub fn top_n(&self, n: usize) -> Vec<TokenCount> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .count
                .cmp(&self.entries[a].count)
                .then(a.cmp(&b))
        });
        order
            .into_iter()
            .take(n)
            .map(|i| self.entries[i].clone())
            .collect()
    }
}

/// Aggregate token frequencies over every record passing the category
/// filter. Zero matching records or zero extracted tokens is a valid
/// terminal state, not an error — the table simply stays empty.
pub fn aggregate<'a, I>(records: I, filter: &CategoryFilter, policy: TokenPolicy) -> FrequencyTable
where
    I: IntoIterator<Item = &'a Comment>,
{
    let mut table = FrequencyTable::new();
    let mut selected = 0usize;
    for rec in records {
        if !filter.accepts(rec.sentiment_label) {
            continue;
        }
        selected += 1;
        table.extend(extract_tokens(rec.segmented_words.as_deref(), policy));
    }
    debug!(
        "aggregation done - records={}, tokens={}, distinct={}",
        selected,
        table.total_tokens(),
        table.len()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    fn comment(tokens: &str, label: Sentiment) -> Comment {
        Comment {
            segmented_words: Some(tokens.to_string()),
            sentiment_label: label,
            sentiment_score: None,
            post_time: None,
            like_count: None,
            user_name: None,
            content: None,
        }
    }

    #[test]
    fn counts_and_total_match() {
        let mut t = FrequencyTable::new();
        t.extend(["a", "a", "b"].map(String::from));
        assert_eq!(t.count("a"), 2);
        assert_eq!(t.count("b"), 1);
        assert_eq!(t.total_tokens(), 3);
        assert_eq!(t.top_n(1), vec![TokenCount { token: "a".into(), count: 2 }]);
    }

    #[test]
    fn ties_resolve_to_first_seen_order() {
        let mut t = FrequencyTable::new();
        t.extend(["x", "y"].map(String::from));
        let top = t.top_n(2);
        assert_eq!(top[0].token, "x");
        assert_eq!(top[1].token, "y");
        // reproducible across repeated queries
        assert_eq!(t.top_n(2), top);
    }

    #[test]
    fn ranking_is_descending_then_stable() {
        let mut t = FrequencyTable::new();
        t.extend(["b", "a", "a", "c", "c"].map(String::from));
        let top = t.top_n(3);
        let names: Vec<&str> = top.iter().map(|e| e.token.as_str()).collect();
        // a and c tie at 2; a was seen later than b but earlier than c
        assert_eq!(names, vec!["a", "c", "b"]);
    }

    #[test]
    fn empty_table_is_a_valid_state() {
        let t = FrequencyTable::new();
        assert!(t.is_empty());
        assert!(t.top_n(10).is_empty());
        assert_eq!(t.total_tokens(), 0);
    }

    #[test]
    fn aggregate_applies_category_filter() {
        let records = vec![
            comment("[好,好,棒]", Sentiment::Positive),
            comment("[差,差]", Sentiment::Negative),
        ];
        let table = aggregate(
            &records,
            &CategoryFilter::only([Sentiment::Positive]),
            TokenPolicy::default(),
        );
        assert_eq!(table.count("好"), 2);
        assert_eq!(table.count("棒"), 1);
        assert_eq!(table.count("差"), 0);
        assert_eq!(table.top_n(1)[0].token, "好");
    }

    #[test]
    fn aggregate_tolerates_absent_and_blank_fields() {
        let records = vec![
            Comment {
                segmented_words: None,
                ..comment("", Sentiment::Positive)
            },
            comment("   ", Sentiment::Positive),
            comment("[好]", Sentiment::Positive),
        ];
        let table = aggregate(&records, &CategoryFilter::All, TokenPolicy::default());
        assert_eq!(table.total_tokens(), 1);
        assert_eq!(table.count("好"), 1);
    }
}
