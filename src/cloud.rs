//! Spatial word-cloud packing and the manual grid-text fallback.
//!
//! The cloud packs token boxes onto a fixed canvas along an archimedean
//! spiral, seeded from the request so the layout is reproducible. The grid
//! fallback exists because cloud packing depends on a glyph resource that
//! may be absent or incapable of CJK; the grid needs nothing and places
//! every requested token.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::charts::scale_counts;
use crate::error::RenderError;
use crate::fonts::FontResource;
use crate::freq::TokenCount;
use crate::models::RenderRequest;

pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 500.0;

/// Font-size window for cloud words.
pub const CLOUD_MIN_SIZE: f32 = 16.0;
pub const CLOUD_MAX_SIZE: f32 = 72.0;
/// Font-size window for grid cells.
pub const GRID_MIN_SIZE: f32 = 14.0;
pub const GRID_MAX_SIZE: f32 = 46.0;

const SPIRAL_STEP: f32 = 1.8;
const SPIRAL_DT: f32 = 0.35;
const SPIRAL_MAX_T: f32 = 220.0;

/* -------------------------------------------------------------------------- */
/* Spatial cloud                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudLayout {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub palette: String,
    /// Name of the glyph resource the layout was measured against, if any.
    pub font: Option<String>,
    pub seed: u64,
    pub words: Vec<PlacedWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedWord {
    pub token: String,
    pub count: u32,
    pub size: f32,
    /// Center of the word box.
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    cx: f32,
    cy: f32,
    w: f32,
    h: f32,
}

impl Rect {
    fn overlaps(&self, other: &Rect) -> bool {
        (self.cx - other.cx).abs() * 2.0 < self.w + other.w
            && (self.cy - other.cy).abs() * 2.0 < self.h + other.h
    }

    fn inside_canvas(&self) -> bool {
        self.cx - self.w / 2.0 >= 0.0
            && self.cx + self.w / 2.0 <= CANVAS_WIDTH
            && self.cy - self.h / 2.0 >= 0.0
            && self.cy + self.h / 2.0 <= CANVAS_HEIGHT
    }
}

/// Approximate box width: CJK and other wide glyphs advance a full em,
/// Latin roughly half. Exact metrics belong to the display surface.
fn approx_width(token: &str, size: f32) -> f32 {
    token
        .chars()
        .map(|c| if (c as u32) > 0x2E7F { size } else { size * 0.56 })
        .sum()
}

/// Pack tokens along a seeded spiral. Tokens that cannot be placed on the
/// finite canvas are skipped; failing to place even the heaviest token is
/// a `LayoutOverflow`.
pub fn cloud_layout(
    top: &[TokenCount],
    req: &RenderRequest,
    font: Option<&FontResource>,
) -> Result<CloudLayout, RenderError> {
    if top.is_empty() {
        return Err(RenderError::EmptySelection);
    }

    let counts: Vec<u32> = top.iter().map(|t| t.count).collect();
    let sizes = scale_counts(&counts, CLOUD_MIN_SIZE, CLOUD_MAX_SIZE);
    let mut rng = StdRng::seed_from_u64(req.seed);

    let mut placed: Vec<Rect> = Vec::with_capacity(top.len());
    let mut words: Vec<PlacedWord> = Vec::with_capacity(top.len());

    for (entry, size) in top.iter().zip(sizes) {
        let w = approx_width(&entry.token, size).max(size * 0.56);
        let h = size * 1.2;
        let theta0: f32 = rng.gen_range(0.0..std::f32::consts::TAU);

        let mut t = 0.0f32;
        let slot = loop {
            if t > SPIRAL_MAX_T {
                break None;
            }
            let r = SPIRAL_STEP * t;
            let angle = theta0 + t;
            let rect = Rect {
                cx: CANVAS_WIDTH / 2.0 + r * angle.cos(),
                cy: CANVAS_HEIGHT / 2.0 + r * angle.sin() * 0.6, // flatter canvas
                w,
                h,
            };
            if rect.inside_canvas() && !placed.iter().any(|p| rect.overlaps(p)) {
                break Some(rect);
            }
            t += SPIRAL_DT;
        };

        if let Some(rect) = slot {
            placed.push(rect);
            words.push(PlacedWord {
                token: entry.token.clone(),
                count: entry.count,
                size,
                x: rect.cx,
                y: rect.cy,
            });
        }
    }

    if words.is_empty() {
        return Err(RenderError::LayoutOverflow);
    }

    Ok(CloudLayout {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        background: req.background.clone(),
        palette: req.palette.clone(),
        font: font.map(|f| f.name.clone()),
        seed: req.seed,
        words,
    })
}

/* -------------------------------------------------------------------------- */
/* Manual grid layout                                                         */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLayout {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub palette: String,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub token: String,
    pub count: u32,
    pub size: f32,
    pub row: usize,
    pub col: usize,
    /// Cell center.
    pub x: f32,
    pub y: f32,
}

/// Evenly spaced grid with size scaled by count. Places every token and
/// needs zero external resources.
pub fn grid_layout(top: &[TokenCount], req: &RenderRequest) -> Result<GridLayout, RenderError> {
    if top.is_empty() {
        return Err(RenderError::EmptySelection);
    }

    let n = top.len();
    let cols = (n as f32).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);

    let counts: Vec<u32> = top.iter().map(|t| t.count).collect();
    let sizes = scale_counts(&counts, GRID_MIN_SIZE, GRID_MAX_SIZE);

    let cell_w = CANVAS_WIDTH / cols as f32;
    let cell_h = CANVAS_HEIGHT / rows as f32;

    let cells = top
        .iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (entry, size))| {
            let row = i / cols;
            let col = i % cols;
            GridCell {
                token: entry.token.clone(),
                count: entry.count,
                size,
                row,
                col,
                x: (col as f32 + 0.5) * cell_w,
                y: (row as f32 + 0.5) * cell_h,
            }
        })
        .collect();

    Ok(GridLayout {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        background: req.background.clone(),
        palette: req.palette.clone(),
        rows,
        cols,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(pairs: &[(&str, u32)]) -> Vec<TokenCount> {
        pairs
            .iter()
            .map(|(t, c)| TokenCount {
                token: t.to_string(),
                count: *c,
            })
            .collect()
    }

    #[test]
    fn cloud_is_deterministic_for_a_fixed_seed() {
        let tokens = top(&[("哈哈", 10), ("视频", 6), ("up主", 4), ("好", 2)]);
        let req = RenderRequest::default();
        let a = cloud_layout(&tokens, &req, None).unwrap();
        let b = cloud_layout(&tokens, &req, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_move_words() {
        let tokens = top(&[("alpha", 10), ("beta", 6), ("gamma", 4)]);
        let mut req = RenderRequest::default();
        let a = cloud_layout(&tokens, &req, None).unwrap();
        req.seed = 7;
        let b = cloud_layout(&tokens, &req, None).unwrap();
        assert_ne!(a.words, b.words);
    }

    #[test]
    fn placed_words_never_overlap() {
        let tokens: Vec<TokenCount> = (0..40)
            .map(|i| TokenCount {
                token: format!("词{i}"),
                count: 40 - i,
            })
            .collect();
        let layout = cloud_layout(&tokens, &RenderRequest::default(), None).unwrap();
        for (i, a) in layout.words.iter().enumerate() {
            for b in &layout.words[i + 1..] {
                let ra = Rect {
                    cx: a.x,
                    cy: a.y,
                    w: approx_width(&a.token, a.size),
                    h: a.size * 1.2,
                };
                let rb = Rect {
                    cx: b.x,
                    cy: b.y,
                    w: approx_width(&b.token, b.size),
                    h: b.size * 1.2,
                };
                assert!(!ra.overlaps(&rb), "{} overlaps {}", a.token, b.token);
            }
        }
    }

    #[test]
    fn cloud_sizes_are_monotonic_in_count() {
        let tokens = top(&[("big", 20), ("mid", 10), ("small", 1)]);
        let layout = cloud_layout(&tokens, &RenderRequest::default(), None).unwrap();
        let by_token = |t: &str| layout.words.iter().find(|w| w.token == t).unwrap().size;
        assert!(by_token("big") > by_token("mid"));
        assert!(by_token("mid") > by_token("small"));
    }

    #[test]
    fn grid_places_every_token() {
        let tokens: Vec<TokenCount> = (0..23)
            .map(|i| TokenCount {
                token: format!("t{i}"),
                count: i + 1,
            })
            .collect();
        let grid = grid_layout(&tokens, &RenderRequest::default()).unwrap();
        assert_eq!(grid.cells.len(), 23);
        assert_eq!(grid.cols, 5);
        assert_eq!(grid.rows, 5);
        assert!(grid
            .cells
            .iter()
            .all(|c| c.x > 0.0 && c.x < CANVAS_WIDTH && c.y > 0.0 && c.y < CANVAS_HEIGHT));
    }

    #[test]
    fn grid_sizes_use_fixed_mid_value_when_counts_tie() {
        let tokens = top(&[("a", 3), ("b", 3), ("c", 3)]);
        let grid = grid_layout(&tokens, &RenderRequest::default()).unwrap();
        let mid = (GRID_MIN_SIZE + GRID_MAX_SIZE) / 2.0;
        assert!(grid.cells.iter().all(|c| (c.size - mid).abs() < 1e-6));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            cloud_layout(&[], &RenderRequest::default(), None),
            Err(RenderError::EmptySelection)
        ));
        assert!(matches!(
            grid_layout(&[], &RenderRequest::default()),
            Err(RenderError::EmptySelection)
        ));
    }
}
