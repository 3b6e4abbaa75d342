//! Descriptive overview datasets derived from the same record set: the
//! sentiment breakdown, the score histogram, and the daily trend. These
//! sit outside the fallback machine — they cannot fail, only come back
//! empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Comment, Sentiment};

/// Neutral/positive decision threshold used by the upstream classifier.
pub const SCORE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/* -------------------------------------------------------------------------- */
/* Sentiment breakdown                                                        */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSlice {
    pub label: String,
    pub count: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub total: usize,
    pub slices: Vec<SentimentSlice>,
}

pub fn sentiment_breakdown(comments: &[Comment]) -> SentimentBreakdown {
    let order = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Unknown,
    ];
    let mut counts = [0u32; 4];
    for c in comments {
        let i = order
            .iter()
            .position(|&s| s == c.sentiment_label)
            .unwrap_or(3);
        counts[i] += 1;
    }

    let slices = order
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(s, count)| SentimentSlice {
            label: s.to_string(),
            count,
            color: s.color().to_string(),
        })
        .collect();

    SentimentBreakdown {
        total: comments.len(),
        slices,
    }
}

/* -------------------------------------------------------------------------- */
/* Score histogram                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreHistogram {
    /// `bins + 1` edges; bin `i` spans `edges[i]..edges[i + 1]`.
    pub bin_edges: Vec<f32>,
    pub counts: Vec<u32>,
    pub threshold: f32,
}

/// Fixed-bin histogram over `sentiment_score`. Records without a score are
/// skipped; a single-valued score set collapses to one unit-wide bin.
pub fn score_histogram(comments: &[Comment], bins: usize) -> ScoreHistogram {
    let bins = bins.max(1);
    let scores: Vec<f32> = comments
        .iter()
        .filter_map(|c| c.sentiment_score)
        .filter(|s| s.is_finite())
        .collect();

    if scores.is_empty() {
        return ScoreHistogram {
            bin_edges: Vec::new(),
            counts: Vec::new(),
            threshold: SCORE_THRESHOLD,
        };
    }

    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if max <= min {
        return ScoreHistogram {
            bin_edges: vec![min, min + 1.0],
            counts: vec![scores.len() as u32],
            threshold: SCORE_THRESHOLD,
        };
    }

    let width = (max - min) / bins as f32;
    let bin_edges: Vec<f32> = (0..=bins).map(|i| min + width * i as f32).collect();
    let mut counts = vec![0u32; bins];
    for s in scores {
        let mut i = ((s - min) / width) as usize;
        if i >= bins {
            i = bins - 1; // max lands in the last bin
        }
        counts[i] += 1;
    }

    ScoreHistogram {
        bin_edges,
        counts,
        threshold: SCORE_THRESHOLD,
    }
}

/* -------------------------------------------------------------------------- */
/* Daily trend                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String, // YYYY-MM-DD
    pub mean_score: f32,
    pub comments: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrend {
    pub days: Vec<DailyPoint>,
}

/// Extract "YYYY-MM-DD" from free-form timestamps like
/// "2024-03-01 12:30:55" or "2024/03/01".
fn extract_date(s: &str) -> Option<String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?P<y>20\d{2})[/-](?P<m>\d{2})[/-](?P<d>\d{2})").expect("date regex")
    });
    let c = RE.captures(s)?;
    Some(format!(
        "{}-{}-{}",
        c.name("y")?.as_str(),
        c.name("m")?.as_str(),
        c.name("d")?.as_str()
    ))
}

/// Per-day mean score and comment volume, ascending by date. Records
/// without a usable timestamp are skipped; days without scores report a
/// zero mean but still count comments.
pub fn daily_trend(comments: &[Comment]) -> DailyTrend {
    let mut buckets: BTreeMap<String, (f64, u32, u32)> = BTreeMap::new(); // sum, scored, total
    for c in comments {
        let Some(date) = c.post_time.as_deref().and_then(extract_date) else {
            continue;
        };
        let bucket = buckets.entry(date).or_insert((0.0, 0, 0));
        bucket.2 += 1;
        if let Some(score) = c.sentiment_score.filter(|s| s.is_finite()) {
            bucket.0 += score as f64;
            bucket.1 += 1;
        }
    }

    let days = buckets
        .into_iter()
        .map(|(date, (sum, scored, total))| DailyPoint {
            date,
            mean_score: if scored > 0 { (sum / scored as f64) as f32 } else { 0.0 },
            comments: total,
        })
        .collect();

    DailyTrend { days }
}
