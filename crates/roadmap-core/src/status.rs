//! Status engine.
//!
//! Status is an explicit lifecycle value set by the user. It is never
//! derived from progress and never changed by this module; the functions
//! here only evaluate a node and recommend.
//!
//! ```text
//! not_started ──> in_progress ──> review ──> completed
//!
//! blocked    <── not_started | in_progress | review
//! blocked    ──> not_started | in_progress
//! completed  ──> in_progress
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Node;
use crate::progress::{ProgressSource, compute_progress, progress_source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Review,
    Completed,
    Blocked,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Review,
        Self::Completed,
        Self::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    /// Human-readable column label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }

    /// Status assigned to legacy nodes during the schema backfill.
    pub fn from_progress(progress: u8) -> Self {
        match progress {
            0 => Self::NotStarted,
            1..=49 => Self::InProgress,
            50..=99 => Self::Review,
            _ => Self::Completed,
        }
    }

    /// Fixed adjacency table, before any progress-based amendment.
    fn table(&self) -> &'static [Status] {
        match self {
            Self::NotStarted => &[Self::InProgress, Self::Blocked],
            Self::InProgress => &[Self::Review, Self::Completed, Self::Blocked, Self::NotStarted],
            Self::Review => &[Self::Completed, Self::InProgress, Self::Blocked],
            Self::Completed => &[Self::InProgress],
            Self::Blocked => &[Self::NotStarted, Self::InProgress],
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "completed" => Ok(Self::Completed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// Whether `status` is implausible at `progress`.
pub fn is_divergent_at(status: Status, progress: u8) -> bool {
    match status {
        Status::NotStarted => progress > 15,
        Status::Review => progress < 10,
        Status::Completed => progress < 75,
        Status::InProgress | Status::Blocked => false,
    }
}

pub fn is_divergent(node: &Node) -> bool {
    is_divergent_at(node.effective_status(), compute_progress(node))
}

/// Description of a status/progress disagreement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Divergence {
    pub status: Status,
    pub progress: u8,
    pub message: String,
}

pub fn divergence(node: &Node) -> Option<Divergence> {
    let status = node.effective_status();
    let progress = compute_progress(node);
    if !is_divergent_at(status, progress) {
        return None;
    }
    let message = match status {
        Status::NotStarted => format!("marked not started but {}% done (limit 15%)", progress),
        Status::Review => format!("in review with only {}% done (needs 10%)", progress),
        Status::Completed => format!("marked completed at {}% (needs 75%)", progress),
        Status::InProgress | Status::Blocked => return None,
    };
    Some(Divergence {
        status,
        progress,
        message,
    })
}

/// Heuristic next status for `current` at `progress`. Never `blocked`.
pub fn suggest_status_at(current: Status, progress: u8) -> Status {
    if progress == 0 {
        return Status::NotStarted;
    }
    if progress >= 100 {
        return Status::Completed;
    }
    if progress >= 80 && current == Status::InProgress {
        return Status::Review;
    }
    if progress >= 90 {
        return Status::Review;
    }
    if current == Status::NotStarted {
        return Status::InProgress;
    }
    if progress < 25 && current == Status::Review {
        return Status::InProgress;
    }
    match current {
        Status::Blocked => Status::InProgress,
        other => other,
    }
}

pub fn suggest_status(node: &Node) -> Status {
    suggest_status_at(node.effective_status(), compute_progress(node))
}

/// Statuses reachable from `current`, after the progress amendments:
/// `completed` is offered at 100%, `review` is withheld at 0%.
pub fn allowed_transitions_at(current: Status, progress: u8) -> Vec<Status> {
    let mut allowed = current.table().to_vec();
    if progress == 100 && current != Status::Completed && !allowed.contains(&Status::Completed) {
        allowed.push(Status::Completed);
    }
    if progress == 0 && current != Status::NotStarted {
        allowed.retain(|s| *s != Status::Review);
    }
    allowed
}

pub fn allowed_transitions(node: &Node) -> Vec<Status> {
    allowed_transitions_at(node.effective_status(), compute_progress(node))
}

/// Everything the views show about a node's progress and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInsight {
    pub progress: u8,
    pub source: ProgressSource,
    pub status: Status,
    pub divergent: bool,
    pub suggested: Status,
    pub allowed: Vec<Status>,
}

impl StatusInsight {
    pub fn of(node: &Node) -> Self {
        let progress = compute_progress(node);
        let status = node.effective_status();
        Self {
            progress,
            source: progress_source(node),
            status,
            divergent: is_divergent_at(status, progress),
            suggested: suggest_status_at(status, progress),
            allowed: allowed_transitions_at(status, progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    fn task(status: Option<Status>, progress: i32) -> Node {
        Node::with_id("t", "Task", NodeKind::Task)
            .status(status)
            .progress(Some(progress))
    }

    #[test]
    fn missing_status_defaults_to_not_started() {
        let node = task(None, 0);
        assert_eq!(node.effective_status(), Status::NotStarted);
        assert!(!is_divergent(&node));
        assert!(is_divergent(&task(None, 16)));
    }

    #[test]
    fn divergence_flips_exactly_at_thresholds() {
        assert!(!is_divergent(&task(Some(Status::NotStarted), 15)));
        assert!(is_divergent(&task(Some(Status::NotStarted), 16)));

        assert!(is_divergent(&task(Some(Status::Review), 9)));
        assert!(!is_divergent(&task(Some(Status::Review), 10)));

        assert!(is_divergent(&task(Some(Status::Completed), 74)));
        assert!(!is_divergent(&task(Some(Status::Completed), 75)));
    }

    #[test]
    fn in_flux_states_never_diverge() {
        for status in [Status::InProgress, Status::Blocked] {
            for progress in [0, 50, 100] {
                assert!(!is_divergent(&task(Some(status), progress)));
            }
        }
    }

    #[test]
    fn completed_task_at_half_progress_is_divergent() {
        let node = task(Some(Status::Completed), 50);
        assert!(is_divergent(&node));
        let d = divergence(&node).unwrap();
        assert_eq!(d.status, Status::Completed);
        assert_eq!(d.progress, 50);
        assert!(d.message.contains("50%"));
    }

    #[test]
    fn divergence_is_none_when_consistent() {
        assert_eq!(divergence(&task(Some(Status::InProgress), 50)), None);
    }

    #[test]
    fn suggestions_follow_the_heuristic() {
        use Status::*;
        assert_eq!(suggest_status_at(Completed, 0), NotStarted);
        assert_eq!(suggest_status_at(NotStarted, 100), Completed);
        assert_eq!(suggest_status_at(InProgress, 80), Review);
        assert_eq!(suggest_status_at(InProgress, 79), InProgress);
        assert_eq!(suggest_status_at(NotStarted, 90), Review);
        assert_eq!(suggest_status_at(Completed, 95), Review);
        assert_eq!(suggest_status_at(NotStarted, 1), InProgress);
        assert_eq!(suggest_status_at(Review, 24), InProgress);
        assert_eq!(suggest_status_at(Review, 25), Review);
        assert_eq!(suggest_status_at(Completed, 50), Completed);
        assert_eq!(suggest_status_at(Blocked, 40), InProgress);
    }

    #[test]
    fn blocked_is_never_suggested() {
        for status in Status::ALL {
            for progress in 0..=100u8 {
                assert_ne!(suggest_status_at(status, progress), Status::Blocked);
            }
        }
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use Status::*;
        assert_eq!(allowed_transitions_at(NotStarted, 50), vec![InProgress, Blocked]);
        assert_eq!(
            allowed_transitions_at(InProgress, 50),
            vec![Review, Completed, Blocked, NotStarted]
        );
        assert_eq!(allowed_transitions_at(Review, 50), vec![Completed, InProgress, Blocked]);
        assert_eq!(allowed_transitions_at(Completed, 50), vec![InProgress]);
        assert_eq!(allowed_transitions_at(Blocked, 50), vec![NotStarted, InProgress]);
    }

    #[test]
    fn full_progress_offers_completed() {
        use Status::*;
        assert_eq!(allowed_transitions_at(NotStarted, 100), vec![InProgress, Blocked, Completed]);
        assert_eq!(allowed_transitions_at(Blocked, 100), vec![NotStarted, InProgress, Completed]);
        // already present, not duplicated
        assert_eq!(
            allowed_transitions_at(InProgress, 100),
            vec![Review, Completed, Blocked, NotStarted]
        );
        assert_eq!(allowed_transitions_at(Completed, 100), vec![InProgress]);
    }

    #[test]
    fn zero_progress_withholds_review() {
        use Status::*;
        assert_eq!(allowed_transitions_at(InProgress, 0), vec![Completed, Blocked, NotStarted]);
        assert_eq!(allowed_transitions_at(Review, 0), vec![Completed, InProgress, Blocked]);
        assert_eq!(allowed_transitions_at(NotStarted, 0), vec![InProgress, Blocked]);
    }

    #[test]
    fn from_progress_thresholds() {
        assert_eq!(Status::from_progress(0), Status::NotStarted);
        assert_eq!(Status::from_progress(1), Status::InProgress);
        assert_eq!(Status::from_progress(49), Status::InProgress);
        assert_eq!(Status::from_progress(50), Status::Review);
        assert_eq!(Status::from_progress(99), Status::Review);
        assert_eq!(Status::from_progress(100), Status::Completed);
    }

    #[test]
    fn insight_combines_engines() {
        let node = task(Some(Status::InProgress), 85);
        let insight = StatusInsight::of(&node);
        assert_eq!(insight.progress, 85);
        assert_eq!(insight.source, ProgressSource::Direct);
        assert!(!insight.divergent);
        assert_eq!(insight.suggested, Status::Review);
        assert!(insight.allowed.contains(&Status::Review));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("done".parse::<Status>().is_err());
    }
}
