//! Progress engine.
//!
//! Precedence, highest first:
//!
//! | Field set                | Value                           | Source       |
//! |--------------------------|---------------------------------|--------------|
//! | `progressOverride`       | the override                    | `override`   |
//! | `progress`, leaf         | the value                       | `direct`     |
//! | `progress`, non-leaf     | the value                       | `manual`     |
//! | neither, leaf            | 100 if validated, else 0        | `calculated` |
//! | neither, non-leaf        | weighted mean of children       | `calculated` |

use serde::Serialize;

use crate::model::Node;

/// Which branch of the precedence table produced a node's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    Override,
    Manual,
    Direct,
    Calculated,
}

impl ProgressSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Manual => "manual",
            Self::Direct => "direct",
            Self::Calculated => "calculated",
        }
    }
}

/// Completion of `node` in 0..=100.
pub fn compute_progress(node: &Node) -> u8 {
    if let Some(value) = node.progress_override {
        return to_percent(f64::from(value));
    }
    if let Some(value) = node.progress {
        return to_percent(f64::from(value));
    }
    if node.children.is_empty() {
        return if node.validated { 100 } else { 0 };
    }

    // Weights are scaled by the largest so the sums stay finite.
    let max_weight = node.children.iter().map(effective_weight).fold(0.0, f64::max);
    let (weighted, total) = node.children.iter().fold((0.0, 0.0), |(sum, total), child| {
        let weight = effective_weight(child) / max_weight;
        (sum + f64::from(compute_progress(child)) * weight, total + weight)
    });
    to_percent((weighted / total).round())
}

/// Mirrors the branch structure of [`compute_progress`].
pub fn progress_source(node: &Node) -> ProgressSource {
    if node.progress_override.is_some() {
        ProgressSource::Override
    } else if node.progress.is_some() {
        if node.is_leaf() {
            ProgressSource::Direct
        } else {
            ProgressSource::Manual
        }
    } else {
        ProgressSource::Calculated
    }
}

/// Weight a parent applies to `node`; anything but a positive finite
/// number counts as 1.
pub fn effective_weight(node: &Node) -> f64 {
    match node.progress_weight {
        Some(w) if w.is_finite() && w > 0.0 => w,
        _ => 1.0,
    }
}

fn to_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub value: u8,
    pub source: ProgressSource,
}

impl ProgressReport {
    pub fn of(node: &Node) -> Self {
        Self {
            value: compute_progress(node),
            source: progress_source(node),
        }
    }
}
