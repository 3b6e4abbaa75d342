//! Flat chart renderers: ranked bar, scatter-importance, heat-bar and
//! polar-network specs built from a ranked top-N slice.
//!
//! Artifacts are serializable chart specifications, not pixels — the
//! display surface owns rasterization. Every renderer shares one numeric
//! policy via `scale_counts`: a zero-variance top-N maps to a fixed
//! mid-range value instead of dividing by a zero range.

use serde::Serialize;

use crate::error::RenderError;
use crate::freq::TokenCount;
use crate::models::RenderRequest;

/// Subset limits fixed by the visual semantics of each style.
pub const HEAT_BAR_LIMIT: usize = 20;
pub const POLAR_LIMIT: usize = 15;

/// Marker-size window for scatter-importance.
const SCATTER_MIN_SIZE: f32 = 10.0;
const SCATTER_MAX_SIZE: f32 = 40.0;
/// Color-intensity window for heat bars.
const HEAT_MIN_INTENSITY: f32 = 0.15;
const HEAT_MAX_INTENSITY: f32 = 1.0;
/// Marker-size window for polar slices.
const POLAR_MIN_SIZE: f32 = 6.0;
const POLAR_MAX_SIZE: f32 = 24.0;

/// Map counts linearly into `[lo, hi]`. A degenerate range (all counts
/// equal) yields the fixed mid-range value for every token.
pub fn scale_counts(counts: &[u32], lo: f32, hi: f32) -> Vec<f32> {
    let Some(&max) = counts.iter().max() else {
        return Vec::new();
    };
    let min = counts.iter().copied().min().unwrap_or(max);
    if max == min {
        return vec![(lo + hi) / 2.0; counts.len()];
    }
    let span = (max - min) as f32;
    counts
        .iter()
        .map(|&c| lo + (c - min) as f32 / span * (hi - lo))
        .collect()
}

fn counts_of(top: &[TokenCount]) -> Vec<u32> {
    top.iter().map(|t| t.count).collect()
}

fn ensure_nonempty(top: &[TokenCount]) -> Result<(), RenderError> {
    if top.is_empty() {
        Err(RenderError::EmptySelection)
    } else {
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/* Ranked bar                                                                 */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBarChart {
    pub orientation: String, // "h"
    pub background: String,
    pub palette: String,
    /// Ascending by count; the heaviest token sits at the reading edge.
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub token: String,
    pub count: u32,
}

pub fn ranked_bar(top: &[TokenCount], req: &RenderRequest) -> Result<RankedBarChart, RenderError> {
    ensure_nonempty(top)?;
    let mut bars: Vec<Bar> = top
        .iter()
        .map(|t| Bar {
            token: t.token.clone(),
            count: t.count,
        })
        .collect();
    bars.reverse();
    Ok(RankedBarChart {
        orientation: "h".to_string(),
        background: req.background.clone(),
        palette: req.palette.clone(),
        bars,
    })
}

/* -------------------------------------------------------------------------- */
/* Scatter-importance                                                         */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub background: String,
    pub palette: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: u32, // sequential position
    pub y: u32, // count
    pub size: f32,
}

pub fn scatter_importance(
    top: &[TokenCount],
    req: &RenderRequest,
) -> Result<ScatterChart, RenderError> {
    ensure_nonempty(top)?;
    let sizes = scale_counts(&counts_of(top), SCATTER_MIN_SIZE, SCATTER_MAX_SIZE);
    let points = top
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (t, size))| ScatterPoint {
            label: t.token.clone(),
            x: i as u32,
            y: t.count,
            size,
        })
        .collect();
    Ok(ScatterChart {
        background: req.background.clone(),
        palette: req.palette.clone(),
        points,
    })
}

/* -------------------------------------------------------------------------- */
/* Heat-bar                                                                   */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatBarChart {
    pub background: String,
    pub palette: String,
    pub bars: Vec<HeatBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatBar {
    pub token: String,
    pub count: u32,
    /// Color intensity in [0, 1], scaled by count.
    pub intensity: f32,
}

pub fn heat_bar(top: &[TokenCount], req: &RenderRequest) -> Result<HeatBarChart, RenderError> {
    ensure_nonempty(top)?;
    let subset = &top[..top.len().min(HEAT_BAR_LIMIT)];
    let intensities = scale_counts(&counts_of(subset), HEAT_MIN_INTENSITY, HEAT_MAX_INTENSITY);
    let bars = subset
        .iter()
        .zip(intensities)
        .map(|(t, intensity)| HeatBar {
            token: t.token.clone(),
            count: t.count,
            intensity,
        })
        .collect();
    Ok(HeatBarChart {
        background: req.background.clone(),
        palette: req.palette.clone(),
        bars,
    })
}

/* -------------------------------------------------------------------------- */
/* Polar/network                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarChart {
    pub background: String,
    pub palette: String,
    /// Closed polygon fill over the slice radii.
    pub closed: bool,
    pub slices: Vec<PolarSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarSlice {
    pub token: String,
    pub radius: u32, // count
    pub angle_deg: f32,
    pub size: f32,
}

pub fn polar_network(top: &[TokenCount], req: &RenderRequest) -> Result<PolarChart, RenderError> {
    ensure_nonempty(top)?;
    let subset = &top[..top.len().min(POLAR_LIMIT)];
    let sizes = scale_counts(&counts_of(subset), POLAR_MIN_SIZE, POLAR_MAX_SIZE);
    let step = 360.0 / subset.len() as f32;
    let slices = subset
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (t, size))| PolarSlice {
            token: t.token.clone(),
            radius: t.count,
            angle_deg: i as f32 * step,
            size,
        })
        .collect();
    Ok(PolarChart {
        background: req.background.clone(),
        palette: req.palette.clone(),
        closed: true,
        slices,
    })
}
