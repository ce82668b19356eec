//! Read-only projections of the tree feeding the board, grid, timeline and
//! navigation views.
//!
//! Every projection recomputes from the current tree; nothing is cached, so
//! a view rendered after a mutation always reflects it.

use chrono::{DateTime, Days, NaiveDate};
use serde::Serialize;

use crate::model::{Node, NodeKind};
use crate::progress::{ProgressSource, compute_progress, progress_source};
use crate::status::{Status, divergence, is_divergent, suggest_status};
use crate::tree::Roadmap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapSummary {
    pub title: String,
    pub progress: u8,
    pub total_items: usize,
    pub validated_items: usize,
    /// Axes with any progress at all.
    pub active_axes: usize,
    pub total_axes: usize,
    pub divergent_items: usize,
}

pub fn summary(roadmap: &Roadmap) -> RoadmapSummary {
    let root = roadmap.root();
    RoadmapSummary {
        title: root.title.clone(),
        progress: compute_progress(root),
        total_items: roadmap.count_all(),
        validated_items: roadmap.count_validated(),
        active_axes: root
            .children
            .iter()
            .filter(|axis| compute_progress(axis) > 0)
            .count(),
        total_axes: root.children.len(),
        divergent_items: root.iter().filter(|n| is_divergent(n)).count(),
    }
}

// ── Kanban ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanCard {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub axis_id: String,
    pub axis_title: String,
    pub progress: u8,
    pub divergent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub status: Status,
    pub label: &'static str,
    pub cards: Vec<KanbanCard>,
}

/// Second-level items grouped by status, one column per [`Status`] in
/// lifecycle order. Empty columns are kept so the board layout is stable.
pub fn kanban(roadmap: &Roadmap) -> Vec<KanbanColumn> {
    let mut columns: Vec<KanbanColumn> = Status::ALL
        .into_iter()
        .map(|status| KanbanColumn {
            status,
            label: status.label(),
            cards: Vec::new(),
        })
        .collect();

    for axis in &roadmap.root().children {
        for item in &axis.children {
            let status = item.effective_status();
            let card = KanbanCard {
                id: item.id.clone(),
                title: item.title.clone(),
                kind: item.kind,
                axis_id: axis.id.clone(),
                axis_title: axis.title.clone(),
                progress: compute_progress(item),
                divergent: is_divergent(item),
            };
            if let Some(column) = columns.iter_mut().find(|c| c.status == status) {
                column.cards.push(card);
            }
        }
    }
    columns
}

// ── Grid ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCard {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub progress: u8,
    pub source: ProgressSource,
    pub status: Status,
    /// Kind of the axis's direct children, when it has any.
    pub child_kind: Option<NodeKind>,
    pub child_count: usize,
    pub validated_children: usize,
}

pub fn grid(roadmap: &Roadmap) -> Vec<GridCard> {
    roadmap
        .root()
        .children
        .iter()
        .map(|axis| GridCard {
            id: axis.id.clone(),
            title: axis.title.clone(),
            description: axis.description.clone(),
            progress: compute_progress(axis),
            source: progress_source(axis),
            status: axis.effective_status(),
            child_kind: axis.children.first().map(|c| c.kind),
            child_count: axis.children.len(),
            validated_children: axis.children.iter().filter(|c| c.validated).count(),
        })
        .collect()
}

// ── Timeline ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub status: Status,
    pub progress: u8,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub estimated_weeks: Option<f64>,
    /// `end` was computed from `start` and `estimatedWeeks`.
    pub end_derived: bool,
}

impl TimelineItem {
    fn of(node: &Node) -> Self {
        let start = node.start_date.as_deref().and_then(parse_date);
        let stated_end = node.end_date.as_deref().and_then(parse_date);
        let derived_end = match (stated_end, start, node.estimated_weeks) {
            (None, Some(start), Some(weeks)) => end_from_weeks(start, weeks),
            _ => None,
        };
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            kind: node.kind,
            status: node.effective_status(),
            progress: compute_progress(node),
            start,
            end: stated_end.or(derived_end),
            estimated_weeks: node.estimated_weeks,
            end_derived: derived_end.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineLane {
    pub axis: TimelineItem,
    pub items: Vec<TimelineItem>,
}

pub fn timeline(roadmap: &Roadmap) -> Vec<TimelineLane> {
    roadmap
        .root()
        .children
        .iter()
        .map(|axis| TimelineLane {
            axis: TimelineItem::of(axis),
            items: axis.children.iter().map(TimelineItem::of).collect(),
        })
        .collect()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn end_from_weeks(start: NaiveDate, weeks: f64) -> Option<NaiveDate> {
    if !weeks.is_finite() || weeks <= 0.0 {
        return None;
    }
    let days = (weeks * 7.0).round() as u64;
    start.checked_add_days(Days::new(days))
}

// ── Navigation ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub progress: u8,
}

impl NavItem {
    fn of(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            kind: node.kind,
            progress: compute_progress(node),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    #[serde(flatten)]
    pub axis: NavItem,
    pub children: Vec<NavItem>,
}

pub fn navigation(roadmap: &Roadmap) -> Vec<NavEntry> {
    roadmap
        .root()
        .children
        .iter()
        .map(|axis| NavEntry {
            axis: NavItem::of(axis),
            children: axis.children.iter().map(NavItem::of).collect(),
        })
        .collect()
}

// ── Divergence report ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergentNode {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub status: Status,
    pub progress: u8,
    pub suggested: Status,
    pub message: String,
}

/// Every node whose status disagrees with its progress, in walk order.
pub fn divergent_nodes(roadmap: &Roadmap) -> Vec<DivergentNode> {
    roadmap
        .root()
        .iter()
        .filter_map(|node| {
            let d = divergence(node)?;
            Some(DivergentNode {
                id: node.id.clone(),
                title: node.title.clone(),
                kind: node.kind,
                status: d.status,
                progress: d.progress,
                suggested: suggest_status(node),
                message: d.message,
            })
        })
        .collect()
}
