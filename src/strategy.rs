//! Rendering strategy selection.
//!
//! Every visual style maps to an ordered chain of candidate strategies.
//! The selector walks the chain: a failing strategy advances to the next,
//! the first success halts the chain, and an exhausted chain is the
//! reportable (never fatal) `AllFailed` state. The frequency summary is
//! part of the report in every outcome so callers can always show a table.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::charts;
use crate::charts::{HeatBarChart, PolarChart, RankedBarChart, ScatterChart};
use crate::cloud;
use crate::cloud::{CloudLayout, GridLayout};
use crate::error::RenderError;
use crate::fonts::ResourceSet;
use crate::freq::{FrequencyTable, TokenCount};
use crate::models::{RenderRequest, VisualStyle};

/// A rendered visual, tagged by renderer family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    RankedBar(RankedBarChart),
    ScatterImportance(ScatterChart),
    HeatBar(HeatBarChart),
    PolarNetwork(PolarChart),
    SpatialCloud(CloudLayout),
    GridText(GridLayout),
}

/// The built-in strategy variants, in the vocabulary of the fallback
/// ladder: cloud stages degrade from full glyph coverage down to the
/// resource-free grid, then to a plain ranked bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RankedBar,
    ScatterImportance,
    HeatBar,
    PolarNetwork,
    /// Cloud measured against a font covering every top-N token.
    CloudFullCoverage,
    /// Cloud restricted to the tokens the session font can draw.
    CloudCoveredSubset,
    /// Cloud restricted to ASCII tokens; needs no font.
    CloudAsciiOnly,
    /// Cloud with approximate metrics and no coverage checks.
    CloudApproximate,
    /// Evenly spaced grid; always drawable.
    GridText,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::RankedBar => "ranked_bar",
            StrategyKind::ScatterImportance => "scatter_importance",
            StrategyKind::HeatBar => "heat_bar",
            StrategyKind::PolarNetwork => "polar_network",
            StrategyKind::CloudFullCoverage => "cloud_full_coverage",
            StrategyKind::CloudCoveredSubset => "cloud_covered_subset",
            StrategyKind::CloudAsciiOnly => "cloud_ascii_only",
            StrategyKind::CloudApproximate => "cloud_approximate",
            StrategyKind::GridText => "grid_text",
        };
        f.write_str(s)
    }
}

/// One candidate renderer. Failure is a value, not a panic; the selector
/// owns the decision to advance.
pub trait RenderStrategy {
    fn kind(&self) -> StrategyKind;

    fn attempt(
        &self,
        top: &[TokenCount],
        req: &RenderRequest,
        res: &ResourceSet,
    ) -> Result<Artifact, RenderError>;
}

/// Built-in dispatch over `StrategyKind`.
struct Builtin(StrategyKind);

impl RenderStrategy for Builtin {
    fn kind(&self) -> StrategyKind {
        self.0
    }

    fn attempt(
        &self,
        top: &[TokenCount],
        req: &RenderRequest,
        res: &ResourceSet,
    ) -> Result<Artifact, RenderError> {
        match self.0 {
            StrategyKind::RankedBar => charts::ranked_bar(top, req).map(Artifact::RankedBar),
            StrategyKind::ScatterImportance => {
                charts::scatter_importance(top, req).map(Artifact::ScatterImportance)
            }
            StrategyKind::HeatBar => charts::heat_bar(top, req).map(Artifact::HeatBar),
            StrategyKind::PolarNetwork => {
                charts::polar_network(top, req).map(Artifact::PolarNetwork)
            }
            StrategyKind::CloudFullCoverage => {
                let font = res.font.as_ref().ok_or(RenderError::MissingFont)?;
                if let Some(missing) = top.iter().find(|t| !font.covers(&t.token)) {
                    return Err(RenderError::GlyphCoverage {
                        font: font.name.clone(),
                        token: missing.token.clone(),
                    });
                }
                cloud::cloud_layout(top, req, Some(font)).map(Artifact::SpatialCloud)
            }
            StrategyKind::CloudCoveredSubset => {
                let font = res.font.as_ref().ok_or(RenderError::MissingFont)?;
                let covered: Vec<TokenCount> = top
                    .iter()
                    .filter(|t| font.covers(&t.token))
                    .cloned()
                    .collect();
                if covered.is_empty() {
                    return Err(RenderError::EmptySelection);
                }
                cloud::cloud_layout(&covered, req, Some(font)).map(Artifact::SpatialCloud)
            }
            StrategyKind::CloudAsciiOnly => {
                let ascii: Vec<TokenCount> = top
                    .iter()
                    .filter(|t| t.token.is_ascii())
                    .cloned()
                    .collect();
                if ascii.is_empty() {
                    return Err(RenderError::EmptySelection);
                }
                cloud::cloud_layout(&ascii, req, None).map(Artifact::SpatialCloud)
            }
            StrategyKind::CloudApproximate => {
                // still needs *some* glyph source; metrics stay approximate
                let font = res.font.as_ref().ok_or(RenderError::MissingFont)?;
                cloud::cloud_layout(top, req, Some(font)).map(Artifact::SpatialCloud)
            }
            StrategyKind::GridText => cloud::grid_layout(top, req).map(Artifact::GridText),
        }
    }
}

/// The priority chain for a requested style. Flat charts are a single
/// strategy; the spatial cloud carries the full degradation ladder ending
/// in the grid and bar fallbacks.
pub fn chain_for(style: VisualStyle) -> Vec<Box<dyn RenderStrategy>> {
    let kinds: &[StrategyKind] = match style {
        VisualStyle::RankedBar => &[StrategyKind::RankedBar],
        VisualStyle::ScatterImportance => &[StrategyKind::ScatterImportance],
        VisualStyle::HeatBar => &[StrategyKind::HeatBar],
        VisualStyle::PolarNetwork => &[StrategyKind::PolarNetwork],
        VisualStyle::SpatialCloud => &[
            StrategyKind::CloudFullCoverage,
            StrategyKind::CloudCoveredSubset,
            StrategyKind::CloudAsciiOnly,
            StrategyKind::CloudApproximate,
            StrategyKind::GridText,
            StrategyKind::RankedBar,
        ],
    };
    kinds
        .iter()
        .map(|&k| Box::new(Builtin(k)) as Box<dyn RenderStrategy>)
        .collect()
}

/// One failed attempt, kept for reporting.
#[derive(Debug)]
pub struct Attempt {
    pub strategy: StrategyKind,
    pub error: RenderError,
}

/// Terminal state of one render action.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered {
        artifact: Artifact,
        strategy: StrategyKind,
        /// 1-based position of the succeeding strategy in its chain.
        strategy_index: usize,
    },
    /// Every strategy in the chain declined. Reportable, not fatal.
    AllFailed,
    /// Nothing to render: the filtered selection produced no tokens.
    NoData,
}

/// Result of one user-triggered render action. `summary` is the top-N
/// table and is present in every outcome.
#[derive(Debug)]
pub struct RenderReport {
    pub outcome: RenderOutcome,
    pub summary: Vec<TokenCount>,
    pub attempts: Vec<Attempt>,
}

impl RenderReport {
    pub fn rendered(&self) -> Option<&Artifact> {
        match &self.outcome {
            RenderOutcome::Rendered { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

/// Render with the built-in chain for the request's style.
pub fn render(table: &FrequencyTable, req: &RenderRequest, res: &ResourceSet) -> RenderReport {
    render_with(&chain_for(req.style), table, req, res)
}

/// Walk an explicit strategy chain. Split out so callers (and tests) can
/// inject their own strategies without touching the selection loop.
pub fn render_with(
    chain: &[Box<dyn RenderStrategy>],
    table: &FrequencyTable,
    req: &RenderRequest,
    res: &ResourceSet,
) -> RenderReport {
    let summary = table.top_n(req.bounded_max_tokens());
    if summary.is_empty() {
        info!("nothing to render - style={}, reason=empty selection", req.style);
        return RenderReport {
            outcome: RenderOutcome::NoData,
            summary,
            attempts: Vec::new(),
        };
    }

    let mut attempts = Vec::new();
    for (i, strategy) in chain.iter().enumerate() {
        match strategy.attempt(&summary, req, res) {
            Ok(artifact) => {
                info!(
                    "render succeeded - style={}, strategy={}, index={}",
                    req.style,
                    strategy.kind(),
                    i + 1
                );
                return RenderReport {
                    outcome: RenderOutcome::Rendered {
                        artifact,
                        strategy: strategy.kind(),
                        strategy_index: i + 1,
                    },
                    summary,
                    attempts,
                };
            }
            Err(error) => {
                warn!(
                    "render strategy declined - style={}, strategy={}, index={}, reason={}",
                    req.style,
                    strategy.kind(),
                    i + 1,
                    error
                );
                attempts.push(Attempt {
                    strategy: strategy.kind(),
                    error,
                });
            }
        }
    }

    warn!(
        "all render strategies failed - style={}, attempts={}",
        req.style,
        attempts.len()
    );
    RenderReport {
        outcome: RenderOutcome::AllFailed,
        summary,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisualStyle;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Stub {
        kind: StrategyKind,
        succeed: bool,
        calls: Rc<Cell<u32>>,
    }

    impl Stub {
        fn boxed(succeed: bool) -> (Box<dyn RenderStrategy>, Rc<Cell<u32>>) {
            let calls = Rc::new(Cell::new(0));
            (
                Box::new(Stub {
                    kind: StrategyKind::GridText,
                    succeed,
                    calls: calls.clone(),
                }),
                calls,
            )
        }
    }

    impl RenderStrategy for Stub {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn attempt(
            &self,
            top: &[TokenCount],
            req: &RenderRequest,
            _res: &ResourceSet,
        ) -> Result<Artifact, RenderError> {
            self.calls.set(self.calls.get() + 1);
            if self.succeed {
                crate::cloud::grid_layout(top, req).map(Artifact::GridText)
            } else {
                Err(RenderError::EmptySelection)
            }
        }
    }

    fn table(pairs: &[(&str, u32)]) -> FrequencyTable {
        let mut t = FrequencyTable::new();
        for (tok, n) in pairs {
            for _ in 0..*n {
                t.add(tok.to_string());
            }
        }
        t
    }

    #[test]
    fn chain_halts_at_first_success() {
        let (s1, c1) = Stub::boxed(false);
        let (s2, c2) = Stub::boxed(false);
        let (s3, c3) = Stub::boxed(true);
        let (s4, c4) = Stub::boxed(true);
        let chain = vec![s1, s2, s3, s4];

        let t = table(&[("a", 2), ("b", 1)]);
        let report = render_with(
            &chain,
            &t,
            &RenderRequest::default(),
            &ResourceSet::default(),
        );

        match report.outcome {
            RenderOutcome::Rendered { strategy_index, .. } => assert_eq!(strategy_index, 3),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(report.attempts.len(), 2);
        assert_eq!((c1.get(), c2.get(), c3.get(), c4.get()), (1, 1, 1, 0));
    }

    #[test]
    fn exhausted_chain_is_all_failed_with_table_intact() {
        let (s1, _) = Stub::boxed(false);
        let (s2, _) = Stub::boxed(false);
        let chain = vec![s1, s2];

        let t = table(&[("a", 2), ("b", 1)]);
        let report = render_with(
            &chain,
            &t,
            &RenderRequest::default(),
            &ResourceSet::default(),
        );

        assert!(matches!(report.outcome, RenderOutcome::AllFailed));
        assert_eq!(report.attempts.len(), 2);
        // the unrendered frequency table remains available to the caller
        assert_eq!(report.summary[0].token, "a");
        assert_eq!(report.summary[0].count, 2);
    }

    #[test]
    fn empty_table_short_circuits_to_no_data() {
        let (s1, c1) = Stub::boxed(true);
        let chain = vec![s1];
        let report = render_with(
            &chain,
            &FrequencyTable::new(),
            &RenderRequest::default(),
            &ResourceSet::default(),
        );
        assert!(matches!(report.outcome, RenderOutcome::NoData));
        assert_eq!(c1.get(), 0);
    }

    #[test]
    fn fontless_cjk_cloud_falls_back_to_grid_at_index_five() {
        let t = table(&[("好", 2), ("棒", 1)]);
        let req = RenderRequest::new(VisualStyle::SpatialCloud);
        let report = render(&t, &req, &ResourceSet::default());

        match &report.outcome {
            RenderOutcome::Rendered {
                strategy,
                strategy_index,
                artifact,
            } => {
                assert_eq!(*strategy, StrategyKind::GridText);
                assert_eq!(*strategy_index, 5);
                assert!(matches!(artifact, Artifact::GridText(_)));
            }
            other => panic!("expected grid fallback, got {:?}", other),
        }
        // the four cloud stages each declined for a recorded reason
        assert_eq!(report.attempts.len(), 4);
        assert!(matches!(report.attempts[0].error, RenderError::MissingFont));
        assert!(matches!(
            report.attempts[2].error,
            RenderError::EmptySelection
        ));
    }

    #[test]
    fn ascii_tokens_reach_the_ascii_cloud_stage_without_a_font() {
        let t = table(&[("alpha", 3), ("beta", 1)]);
        let req = RenderRequest::new(VisualStyle::SpatialCloud);
        let report = render(&t, &req, &ResourceSet::default());

        match &report.outcome {
            RenderOutcome::Rendered {
                strategy,
                strategy_index,
                ..
            } => {
                assert_eq!(*strategy, StrategyKind::CloudAsciiOnly);
                assert_eq!(*strategy_index, 3);
            }
            other => panic!("expected ascii cloud, got {:?}", other),
        }
    }

    #[test]
    fn single_strategy_styles_report_index_one() {
        let t = table(&[("a", 2), ("b", 1)]);
        for style in [
            VisualStyle::RankedBar,
            VisualStyle::ScatterImportance,
            VisualStyle::HeatBar,
            VisualStyle::PolarNetwork,
        ] {
            let report = render(&t, &RenderRequest::new(style), &ResourceSet::default());
            match report.outcome {
                RenderOutcome::Rendered { strategy_index, .. } => assert_eq!(strategy_index, 1),
                other => panic!("style {} failed: {:?}", style, other),
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_outcomes() {
        let t = table(&[("好", 2), ("棒", 1)]);
        let req = RenderRequest::new(VisualStyle::SpatialCloud);
        let a = render(&t, &req, &ResourceSet::default());
        let b = render(&t, &req, &ResourceSet::default());
        match (&a.outcome, &b.outcome) {
            (
                RenderOutcome::Rendered {
                    artifact: aa,
                    strategy_index: ia,
                    ..
                },
                RenderOutcome::Rendered {
                    artifact: ab,
                    strategy_index: ib,
                    ..
                },
            ) => {
                assert_eq!(ia, ib);
                assert_eq!(aa, ab);
            }
            other => panic!("expected two successes, got {:?}", other),
        }
    }
}
