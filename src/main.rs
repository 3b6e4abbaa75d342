use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use comment_vibes::fonts::FONT_FETCH_TIMEOUT;
use comment_vibes::strategy::RenderOutcome;
use comment_vibes::{
    aggregate, dataset, overview, render, CategoryFilter, FontCatalog, RenderRequest, Sentiment,
    TokenPolicy, VisualStyle,
};

/// Word-frequency visualization for sentiment-annotated comment CSVs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file with segmented_words and sentiment_label columns
    input: PathBuf,

    /// Output directory for generated artifacts (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Visual style to render
    #[arg(short, long, value_enum, default_value_t = VisualStyle::RankedBar)]
    style: VisualStyle,

    /// Restrict aggregation to these sentiment classes (default: all)
    #[arg(long = "sentiment", value_enum)]
    sentiments: Vec<Sentiment>,

    /// Number of top tokens to render (clamped to 10..=200)
    #[arg(long, default_value_t = 30)]
    max_words: usize,

    /// Drop tokens shorter than this many characters
    #[arg(long, default_value_t = 1)]
    min_token_chars: usize,

    /// Background color passed through to the artifact
    #[arg(long, default_value = "white")]
    background: String,

    /// Color scale passed through to the artifact
    #[arg(long, default_value = "Viridis")]
    palette: String,

    /// Layout seed for the spatial cloud
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TTF/OTF font file for CJK-capable cloud rendering
    #[arg(long)]
    font: Option<PathBuf>,

    /// Fetch a font over HTTP when no local font is available
    #[arg(long)]
    font_url: Option<Url>,
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.as_ref().display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    info!("starting comment_vibes - input={}", args.input.display());

    let comments = dataset::load_comments(&args.input)?;

    // Resolve glyph resources up front; failures here degrade, never abort.
    let mut catalog = FontCatalog::new();
    if let Some(path) = &args.font {
        catalog
            .upload_file(path)
            .with_context(|| format!("loading font {}", path.display()))?;
    } else if let Some(url) = &args.font_url {
        match catalog.fetch_remote(url, FONT_FETCH_TIMEOUT) {
            Ok(font) => catalog.set_uploaded(font),
            Err(e) => warn!("remote font unavailable, continuing without - err={}", e),
        }
    }
    let resources = catalog.resources();

    let filter = if args.sentiments.is_empty() {
        CategoryFilter::All
    } else {
        CategoryFilter::only(args.sentiments.iter().copied())
    };
    let policy = TokenPolicy {
        min_chars: args.min_token_chars,
    };

    let table = aggregate(&comments, &filter, policy);
    info!(
        "frequency table built - tokens={}, distinct={}",
        table.total_tokens(),
        table.len()
    );

    let request = RenderRequest {
        style: args.style,
        filter,
        max_tokens: args.max_words,
        background: args.background.clone(),
        palette: args.palette.clone(),
        seed: args.seed,
    };
    let report = render(&table, &request, &resources);

    let day = Local::now().format("%Y-%m-%d").to_string();
    let out_dir = Path::new(&args.output_dir).join(&day);
    std::fs::create_dir_all(&out_dir).with_context(|| format!("create {:?}", out_dir))?;

    // The frequency summary and overview datasets are written regardless of
    // renderer success.
    write_json(out_dir.join("summary.json"), &report.summary)?;
    write_json(
        out_dir.join("sentiment.json"),
        &overview::sentiment_breakdown(&comments),
    )?;
    write_json(
        out_dir.join("score_histogram.json"),
        &overview::score_histogram(&comments, overview::DEFAULT_HISTOGRAM_BINS),
    )?;
    write_json(out_dir.join("daily_trend.json"), &overview::daily_trend(&comments))?;

    match &report.outcome {
        RenderOutcome::Rendered {
            artifact,
            strategy,
            strategy_index,
        } => {
            write_json(out_dir.join("artifact.json"), artifact)?;
            info!(
                "artifact written - style={}, strategy={}, index={}, dir={}",
                args.style,
                strategy,
                strategy_index,
                out_dir.display()
            );
        }
        RenderOutcome::NoData => {
            info!("no tokens matched the current filter; only the summary was written");
        }
        RenderOutcome::AllFailed => {
            for a in &report.attempts {
                warn!("attempt failed - strategy={}, reason={}", a.strategy, a.error);
            }
            warn!(
                "could not render {}; try a different style or provide a font. \
                 The frequency summary is still available at {}",
                args.style,
                out_dir.join("summary.json").display()
            );
        }
    }

    Ok(())
}
