//! comment_vibes - word-frequency visualization core for
//! sentiment-annotated comment datasets.
//!
//! The pipeline: each record's serialized token field goes through the
//! [`extract`] module, [`freq`] aggregates the surviving tokens into a
//! ranked frequency table, and [`strategy`] walks an ordered chain of
//! renderers ([`charts`], [`cloud`]) until one produces an artifact —
//! degrading deterministically when the glyph resources in [`fonts`] are
//! missing or incapable of the dataset's character set.

pub mod charts;
pub mod cloud;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod freq;
pub mod models;
pub mod overview;
pub mod strategy;

pub use error::{FontError, RenderError};
pub use extract::{extract_tokens, TokenPolicy};
pub use fonts::{FontCatalog, FontResource, ResourceSet};
pub use freq::{aggregate, FrequencyTable, TokenCount};
pub use models::{CategoryFilter, Comment, RenderRequest, Sentiment, VisualStyle};
pub use strategy::{render, Artifact, RenderOutcome, RenderReport, StrategyKind};
