//! CSV ingestion for annotated comment datasets.
//!
//! This is the external-collaborator seam: the core operates on an
//! in-memory record set owned by the caller, and this module is the only
//! place that knows the tabular wire format. Malformed rows are skipped
//! with a diagnostic rather than failing the whole load.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::models::Comment;

pub fn load_comments(path: &Path) -> Result<Vec<Comment>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut comments = Vec::new();
    let mut skipped = 0usize;
    for (i, row) in reader.deserialize::<Comment>().enumerate() {
        match row {
            Ok(c) => comments.push(c),
            Err(e) => {
                skipped += 1;
                // header is line 1
                warn!("skipping malformed row - line={}, err={}", i + 2, e);
            }
        }
    }

    info!(
        "dataset loaded - path={}, rows={}, skipped={}",
        path.display(),
        comments.len(),
        skipped
    );
    Ok(comments)
}
