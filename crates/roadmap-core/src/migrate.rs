//! Startup schema backfill.
//!
//! Older documents predate `status` and `progressWeight`. Every node missing
//! one of them gets it filled in; nodes that already carry a value are left
//! alone, so running the backfill again changes nothing.

use serde::Serialize;

use crate::model::Node;
use crate::progress::compute_progress;
use crate::status::Status;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub statuses_backfilled: usize,
    pub weights_backfilled: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.statuses_backfilled == 0 && self.weights_backfilled == 0
    }
}

/// Backfill `status` (from progress thresholds) and `progressWeight` (1)
/// on every node of the tree.
pub fn backfill(root: &mut Node) -> MigrationReport {
    let mut report = MigrationReport::default();
    backfill_node(root, &mut report);
    report
}

/// Report what [`backfill`] would change without touching the tree.
pub fn plan(root: &Node) -> MigrationReport {
    root.iter().fold(MigrationReport::default(), |mut report, node| {
        if node.status.is_none() {
            report.statuses_backfilled += 1;
        }
        if node.progress_weight.is_none() {
            report.weights_backfilled += 1;
        }
        report
    })
}

fn backfill_node(node: &mut Node, report: &mut MigrationReport) {
    if node.status.is_none() {
        node.status = Some(Status::from_progress(compute_progress(node)));
        report.statuses_backfilled += 1;
    }
    if node.progress_weight.is_none() {
        node.progress_weight = Some(1.0);
        report.weights_backfilled += 1;
    }
    for child in &mut node.children {
        backfill_node(child, report);
    }
}
