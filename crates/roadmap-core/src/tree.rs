//! Tree index: lookup and mutation of nodes by id.
//!
//! [`Roadmap`] owns the root and is the only mutation surface. Lookups walk
//! depth-first in child order; ids are unique across the tree so the first
//! match is the only one.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

use crate::error::TreeError;
use crate::model::{self, Node, NodeKind};
use crate::status::{Status, allowed_transitions};

#[derive(Debug, Clone, PartialEq)]
pub struct Roadmap {
    root: Node,
}

impl Roadmap {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.root.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Node, TreeError> {
        find_in(&mut self.root, id).ok_or_else(|| TreeError::NodeNotFound { id: id.to_string() })
    }

    /// Append `node` to the children of `parent_id`. A parent with no
    /// collection yet receives a `pipelines` one.
    pub fn insert_child(&mut self, parent_id: &str, node: Node) -> Result<(), TreeError> {
        {
            let mut incoming = HashSet::new();
            for n in node.iter() {
                if !incoming.insert(n.id.as_str()) || self.contains(&n.id) {
                    return Err(TreeError::DuplicateId { id: n.id.clone() });
                }
            }
        }
        let parent = find_in(&mut self.root, parent_id).ok_or_else(|| TreeError::ParentNotFound {
            id: parent_id.to_string(),
        })?;
        parent.push_child(node);
        Ok(())
    }

    /// Excise the subtree rooted at `id`. Returns `None` and leaves the tree
    /// untouched when no node matches; the root itself is never matched.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Node> {
        remove_from(&mut self.root, id)
    }

    /// Like [`Roadmap::remove_by_id`] but reports why nothing was removed.
    pub fn delete_node(&mut self, id: &str) -> Result<Node, TreeError> {
        if self.root.id == id {
            return Err(TreeError::RootImmutable);
        }
        self.remove_by_id(id)
            .ok_or_else(|| TreeError::NodeNotFound { id: id.to_string() })
    }

    pub fn count_all(&self) -> usize {
        model::count_all(&self.root)
    }

    pub fn count_validated(&self) -> usize {
        model::count_validated(&self.root)
    }

    /// Ids that appear more than once, in walk order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for node in self.root.iter() {
            if !seen.insert(node.id.as_str()) && !duplicates.contains(&node.id) {
                duplicates.push(node.id.clone());
            }
        }
        duplicates
    }

    pub fn add_axis(&mut self, title: &str) -> Result<String, TreeError> {
        let root_id = self.root.id.clone();
        self.add_sub_item(&root_id, title, Some(NodeKind::Axis))
    }

    /// Create a node under `parent_id`; the kind defaults to the natural
    /// child kind of the parent.
    pub fn add_sub_item(
        &mut self,
        parent_id: &str,
        title: &str,
        kind: Option<NodeKind>,
    ) -> Result<String, TreeError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TreeError::EmptyTitle);
        }
        let parent_kind = self
            .find_by_id(parent_id)
            .map(|p| p.kind)
            .ok_or_else(|| TreeError::ParentNotFound {
                id: parent_id.to_string(),
            })?;
        let node = Node::new(title, kind.unwrap_or_else(|| parent_kind.child_kind()));
        let id = node.id.clone();
        self.insert_child(parent_id, node)?;
        Ok(id)
    }

    /// Apply an edit-form update. Values are validated before anything is
    /// written; with `strict` a status change must also be an allowed
    /// transition from the node's current state.
    pub fn update_node(
        &mut self,
        id: &str,
        update: NodeUpdate,
        strict: bool,
    ) -> Result<&Node, TreeError> {
        update.validate()?;
        if let (true, Some(status)) = (strict, update.status) {
            self.check_transition(id, status)?;
        }
        let node = self.find_mut(id)?;
        if let Some(title) = update.title {
            node.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            node.description = description;
        }
        if let Some(progress) = update.progress {
            node.progress = progress;
        }
        if let Some(value) = update.progress_override {
            node.progress_override = value;
        }
        if let Some(weight) = update.progress_weight {
            node.progress_weight = weight;
        }
        if let Some(validated) = update.validated {
            node.validated = validated;
        }
        if let Some(status) = update.status {
            node.status = Some(status);
        }
        if let Some(date) = update.start_date {
            node.start_date = date;
        }
        if let Some(date) = update.end_date {
            node.end_date = date;
        }
        if let Some(weeks) = update.estimated_weeks {
            node.estimated_weeks = weeks;
        }
        Ok(&*node)
    }

    /// Inline progress edit. Non-numeric input is rejected; numbers are
    /// rounded and clamped into 0..=100 before being written.
    pub fn set_progress(&mut self, id: &str, raw: &str) -> Result<u8, TreeError> {
        let value = parse_progress_input(raw)?;
        let node = self.find_mut(id)?;
        node.progress = Some(i32::from(value));
        Ok(value)
    }

    /// Flip `validated`. Leaves also get their progress pinned to 100 or 0.
    pub fn toggle_validation(&mut self, id: &str) -> Result<bool, TreeError> {
        let node = self.find_mut(id)?;
        node.validated = !node.validated;
        if node.is_leaf() {
            node.progress = Some(if node.validated { 100 } else { 0 });
        }
        Ok(node.validated)
    }

    /// Unconditional status write; the allowed set is advisory.
    pub fn apply_status(&mut self, id: &str, status: Status) -> Result<(), TreeError> {
        self.find_mut(id)?.status = Some(status);
        Ok(())
    }

    /// Status write that refuses targets outside the allowed set.
    pub fn transition_status(&mut self, id: &str, status: Status) -> Result<(), TreeError> {
        self.check_transition(id, status)?;
        self.apply_status(id, status)
    }

    fn check_transition(&self, id: &str, status: Status) -> Result<(), TreeError> {
        let node = self
            .find_by_id(id)
            .ok_or_else(|| TreeError::NodeNotFound { id: id.to_string() })?;
        let current = node.effective_status();
        if current != status && !allowed_transitions(node).contains(&status) {
            return Err(TreeError::TransitionNotAllowed {
                from: current,
                to: status,
            });
        }
        Ok(())
    }
}

fn find_in<'a>(node: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if node.id == id {
        return Some(node);
    }
    node.children.iter_mut().find_map(|child| find_in(child, id))
}

fn remove_from(node: &mut Node, id: &str) -> Option<Node> {
    if let Some(pos) = node.children.iter().position(|c| c.id == id) {
        return Some(node.children.remove(pos));
    }
    node.children.iter_mut().find_map(|child| remove_from(child, id))
}

fn parse_progress_input(raw: &str) -> Result<u8, TreeError> {
    let trimmed = raw.trim().trim_end_matches('%').trim_end();
    let value: f64 = trimmed
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| TreeError::NonNumericProgress(raw.to_string()))?;
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

/// Fields an edit may change. Outer `None` leaves a field alone; for the
/// clearable fields `Some(None)` removes the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub progress: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub progress_override: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub progress_weight: Option<Option<f64>>,
    #[serde(default)]
    pub validated: Option<bool>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "present")]
    pub start_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub estimated_weeks: Option<Option<f64>>,
}

impl NodeUpdate {
    fn validate(&self) -> Result<(), TreeError> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TreeError::EmptyTitle);
        }
        for value in [self.progress, self.progress_override].into_iter().flatten().flatten() {
            if !(0..=100).contains(&value) {
                return Err(TreeError::ProgressOutOfRange(value));
            }
        }
        if let Some(Some(weight)) = self.progress_weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(TreeError::InvalidWeight(weight));
            }
        }
        Ok(())
    }
}

/// Distinguishes an explicit `null` (clear) from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
