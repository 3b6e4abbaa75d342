use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Requested token counts are clamped into this window before ranking.
pub const MIN_RENDER_TOKENS: usize = 10;
pub const MAX_RENDER_TOKENS: usize = 200;

/// One annotated comment row. Sentiment is precomputed upstream; everything
/// except `segmented_words` and `sentiment_label` is passthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub segmented_words: Option<String>, // serialized token list, may be malformed
    #[serde(default)]
    pub sentiment_label: Sentiment,
    #[serde(default)]
    pub sentiment_score: Option<f32>, // [0.0, 1.0], 0.5 = neutral threshold
    #[serde(default)]
    pub post_time: Option<String>, // free-form, date extracted structurally
    #[serde(default)]
    pub like_count: Option<u32>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default, rename = "content_cleaned")]
    pub content: Option<String>,
}

/// Closed sentiment set as labeled by the upstream classifier. CSV files
/// carry the Chinese labels; English aliases are accepted for convenience.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Sentiment {
    #[serde(rename = "积极", alias = "positive")]
    Positive,
    #[serde(rename = "消极", alias = "negative")]
    Negative,
    #[serde(rename = "中性", alias = "neutral")]
    Neutral,
    #[serde(other)]
    Unknown,
}

impl Default for Sentiment {
    fn default() -> Self {
        Sentiment::Unknown
    }
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Unknown => "unknown",
        }
    }

    /// Display color carried over from the upstream dashboard palette.
    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Positive => "#2E8B57",
            Sentiment::Negative => "#DC143C",
            Sentiment::Neutral => "#1E90FF",
            Sentiment::Unknown => "#808080",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which sentiment classes participate in aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(BTreeSet<Sentiment>),
}

impl CategoryFilter {
    pub fn only<I: IntoIterator<Item = Sentiment>>(labels: I) -> Self {
        CategoryFilter::Only(labels.into_iter().collect())
    }

    pub fn accepts(&self, label: Sentiment) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(set) => set.contains(&label),
        }
    }
}

/// The externally selectable visual styles. Each maps to a strategy chain
/// in `strategy::chain_for`; only `SpatialCloud` has a multi-step chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum VisualStyle {
    RankedBar,
    ScatterImportance,
    HeatBar,
    PolarNetwork,
    SpatialCloud,
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VisualStyle::RankedBar => "ranked-bar",
            VisualStyle::ScatterImportance => "scatter-importance",
            VisualStyle::HeatBar => "heat-bar",
            VisualStyle::PolarNetwork => "polar-network",
            VisualStyle::SpatialCloud => "spatial-cloud",
        };
        f.write_str(s)
    }
}

/// One user-triggered render action. Cosmetic fields (background, palette)
/// are opaque passthrough; glyph resources travel separately in
/// `fonts::ResourceSet` so that selection stays deterministic.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub style: VisualStyle,
    pub filter: CategoryFilter,
    pub max_tokens: usize,
    pub background: String,
    pub palette: String,
    pub seed: u64,
}

impl Default for RenderRequest {
    fn default() -> Self {
        RenderRequest {
            style: VisualStyle::RankedBar,
            filter: CategoryFilter::All,
            max_tokens: 30,
            background: "white".to_string(),
            palette: "Viridis".to_string(),
            seed: 42,
        }
    }
}

impl RenderRequest {
    pub fn new(style: VisualStyle) -> Self {
        RenderRequest {
            style,
            ..RenderRequest::default()
        }
    }

    /// The token bound actually applied when ranking.
    pub fn bounded_max_tokens(&self) -> usize {
        self.max_tokens.clamp(MIN_RENDER_TOKENS, MAX_RENDER_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_to_all() {
        let f = CategoryFilter::default();
        assert!(f.accepts(Sentiment::Positive));
        assert!(f.accepts(Sentiment::Unknown));
    }

    #[test]
    fn filter_only_rejects_others() {
        let f = CategoryFilter::only([Sentiment::Positive]);
        assert!(f.accepts(Sentiment::Positive));
        assert!(!f.accepts(Sentiment::Negative));
    }

    #[test]
    fn sentiment_parses_chinese_and_english_labels() {
        let s: Sentiment = serde_json::from_str("\"积极\"").unwrap();
        assert_eq!(s, Sentiment::Positive);
        let s: Sentiment = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(s, Sentiment::Negative);
        let s: Sentiment = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(s, Sentiment::Unknown);
    }

    #[test]
    fn request_clamps_token_bound() {
        let mut req = RenderRequest::default();
        req.max_tokens = 5;
        assert_eq!(req.bounded_max_tokens(), MIN_RENDER_TOKENS);
        req.max_tokens = 100_000;
        assert_eq!(req.bounded_max_tokens(), MAX_RENDER_TOKENS);
        req.max_tokens = 30;
        assert_eq!(req.bounded_max_tokens(), 30);
    }
}
