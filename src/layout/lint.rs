//! Lint engine for detecting defects in a sheet.
//!
//! Checks the attachment invariants (symmetric edges, one connected
//! component per group, no singleton groups) and the geometric outcome of
//! stacking (overlapping items, off-grid positions).

use std::fmt;

use super::components::recompute_groups;
use super::config::StackConfig;
use super::graph::AttachmentGraph;
use super::oracle::{widget_bounds, SizeOracle};
use super::types::{BoundingBox, Widget};

/// A lint warning about a sheet defect
#[derive(Debug)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Symmetry,
    Cohesion,
    Overlap,
    Grid,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Symmetry => write!(f, "symmetry"),
            LintCategory::Cohesion => write!(f, "cohesion"),
            LintCategory::Overlap => write!(f, "overlap"),
            LintCategory::Grid => write!(f, "grid"),
        }
    }
}

/// Run all lint checks on a sheet.
pub fn check(
    graph: &AttachmentGraph,
    oracle: &impl SizeOracle,
    config: &StackConfig,
) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_edges(graph, &mut warnings);
    check_groups(graph, &mut warnings);
    check_overlaps(graph, oracle, config, &mut warnings);
    check_grid(graph, config, &mut warnings);
    warnings
}

// ── Edges ─────────────────────────────────────────────────────────

fn check_edges(graph: &AttachmentGraph, warnings: &mut Vec<LintWarning>) {
    for widget in graph.widgets() {
        for other_id in &widget.attached_to {
            let Some(other) = graph.get(other_id) else {
                warnings.push(LintWarning {
                    category: LintCategory::Cohesion,
                    message: format!(
                        "\"{}\" is attached to missing widget \"{}\"",
                        widget.id, other_id
                    ),
                });
                continue;
            };
            if *other_id == widget.id {
                warnings.push(LintWarning {
                    category: LintCategory::Symmetry,
                    message: format!("\"{}\" is attached to itself", widget.id),
                });
                continue;
            }
            if !other.is_attached_to(&widget.id) {
                warnings.push(LintWarning {
                    category: LintCategory::Symmetry,
                    message: format!(
                        "\"{}\" lists \"{}\" as attached but not the reverse",
                        widget.id, other.id
                    ),
                });
            }
            // report each cross-group edge once
            if widget.group_id != other.group_id && widget.id < other.id {
                warnings.push(LintWarning {
                    category: LintCategory::Cohesion,
                    message: format!(
                        "edge \"{}\"-\"{}\" joins different groups ({} / {})",
                        widget.id,
                        other.id,
                        group_label(widget),
                        group_label(other)
                    ),
                });
            }
        }
    }
}

fn group_label(widget: &Widget) -> String {
    widget
        .group_id
        .as_ref()
        .map_or_else(|| "ungrouped".to_string(), |g| g.to_string())
}

// ── Groups ────────────────────────────────────────────────────────

fn check_groups(graph: &AttachmentGraph, warnings: &mut Vec<LintWarning>) {
    for (group, members) in graph.groups() {
        if members.len() < 2 {
            warnings.push(LintWarning {
                category: LintCategory::Cohesion,
                message: format!("group {} has a single member", group),
            });
            continue;
        }
        let components =
            recompute_groups(&members, |id| graph.get(id).map(|w| &w.attached_to));
        if components.len() > 1 {
            warnings.push(LintWarning {
                category: LintCategory::Cohesion,
                message: format!(
                    "group {} is split into {} disconnected parts",
                    group,
                    components.len()
                ),
            });
        }
    }
}

// ── Overlap ───────────────────────────────────────────────────────

fn check_overlaps(
    graph: &AttachmentGraph,
    oracle: &impl SizeOracle,
    config: &StackConfig,
    warnings: &mut Vec<LintWarning>,
) {
    let placed: Vec<(&Widget, BoundingBox)> = graph
        .widgets()
        .map(|w| (w, widget_bounds(w, oracle, config)))
        .collect();

    for (i, (a, a_bounds)) in placed.iter().enumerate() {
        for (b, b_bounds) in &placed[i + 1..] {
            // members of one group are allowed to overlap each other
            if a.group_id.is_some() && a.group_id == b.group_id {
                continue;
            }
            if a_bounds.intersects(b_bounds) {
                let overlap_w = a_bounds.right().min(b_bounds.right()) - a_bounds.x.max(b_bounds.x);
                let overlap_h =
                    a_bounds.bottom().min(b_bounds.bottom()) - a_bounds.y.max(b_bounds.y);
                warnings.push(LintWarning {
                    category: LintCategory::Overlap,
                    message: format!(
                        "widgets \"{}\" and \"{}\" overlap by {:.0}x{:.0}",
                        a.id, b.id, overlap_w, overlap_h
                    ),
                });
            }
        }
    }
}

// ── Grid ──────────────────────────────────────────────────────────

fn check_grid(graph: &AttachmentGraph, config: &StackConfig, warnings: &mut Vec<LintWarning>) {
    let grid = config.grid_size;
    let on_grid = |v: f64| ((v / grid) - (v / grid).round()).abs() < 1e-9;
    for widget in graph.widgets() {
        if !on_grid(widget.x) || !on_grid(widget.y) {
            warnings.push(LintWarning {
                category: LintCategory::Grid,
                message: format!(
                    "\"{}\" at ({}, {}) is off the {} grid",
                    widget.id, widget.x, widget.y, grid
                ),
            });
        }
    }
}
