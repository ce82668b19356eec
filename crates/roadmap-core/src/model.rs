//! Roadmap node model.
//!
//! Every element of the roadmap (root, axis, pipeline, component, phase,
//! task) is a [`Node`]. In memory a node carries a single ordered child
//! list and an explicit [`NodeKind`]. On the wire the children live under
//! one of five collection keys (`axes`, `pipelines`, `components`,
//! `phases`, `tasks`), which is the document format the browser front-end
//! reads and writes.
//!
//! ```text
//! root ── axes ──> axis ── pipelines|components|phases ──> pipeline ── phases|tasks ──> phase ── tasks ──> task
//! ```

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Axis,
    Pipeline,
    Component,
    Phase,
    Task,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Axis => "axis",
            Self::Pipeline => "pipeline",
            Self::Component => "component",
            Self::Phase => "phase",
            Self::Task => "task",
        }
    }

    /// Collection a freshly created node of this kind starts with.
    pub fn default_collection(&self) -> Option<ChildCollection> {
        match self {
            Self::Root => Some(ChildCollection::Axes),
            Self::Axis => Some(ChildCollection::Pipelines),
            Self::Pipeline => Some(ChildCollection::Phases),
            Self::Component | Self::Phase => Some(ChildCollection::Tasks),
            Self::Task => None,
        }
    }

    /// Kind given to an item added underneath a node of this kind.
    pub fn child_kind(&self) -> NodeKind {
        match self {
            Self::Root => Self::Axis,
            Self::Axis => Self::Pipeline,
            Self::Pipeline => Self::Phase,
            Self::Component | Self::Phase | Self::Task => Self::Task,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Self::Root),
            "axis" => Ok(Self::Axis),
            "pipeline" => Ok(Self::Pipeline),
            "component" => Ok(Self::Component),
            "phase" => Ok(Self::Phase),
            "task" => Ok(Self::Task),
            _ => Err(format!("Invalid node type: {}", s)),
        }
    }
}

/// Wire name of a child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildCollection {
    Axes,
    Pipelines,
    Components,
    Phases,
    Tasks,
}

impl ChildCollection {
    /// Lookup priority used when a document populates several collections.
    pub const ALL: [ChildCollection; 5] = [
        Self::Axes,
        Self::Pipelines,
        Self::Components,
        Self::Phases,
        Self::Tasks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Axes => "axes",
            Self::Pipelines => "pipelines",
            Self::Components => "components",
            Self::Phases => "phases",
            Self::Tasks => "tasks",
        }
    }

    /// Kind implied for an untyped child listed in this collection.
    pub fn child_kind(&self) -> NodeKind {
        match self {
            Self::Axes => NodeKind::Axis,
            Self::Pipelines => NodeKind::Pipeline,
            Self::Components => NodeKind::Component,
            Self::Phases => NodeKind::Phase,
            Self::Tasks => NodeKind::Task,
        }
    }
}

impl FromStr for ChildCollection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Invalid child collection: {}", s))
    }
}

/// One entity of the roadmap tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub description: Option<String>,
    /// Direct value on a leaf, manually pinned aggregate on a non-leaf.
    pub progress: Option<i32>,
    /// Wins over everything else, children included.
    pub progress_override: Option<i32>,
    /// Weight used by the parent when averaging; absent means 1.
    pub progress_weight: Option<f64>,
    pub validated: bool,
    pub status: Option<Status>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub estimated_weeks: Option<f64>,
    pub children: Vec<Node>,
    /// Key the children are written under. `None` with no children means the
    /// node carries no collection at all.
    pub collection: Option<ChildCollection>,
    /// Fields this model does not know about, written back untouched.
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a node with a fresh id, zero progress and the default
    /// (empty) child collection for its kind.
    pub fn new(title: impl Into<String>, kind: NodeKind) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), title, kind)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            description: None,
            progress: Some(0),
            progress_override: None,
            progress_weight: None,
            validated: false,
            status: Some(Status::NotStarted),
            start_date: None,
            end_date: None,
            estimated_weeks: None,
            children: Vec::new(),
            collection: kind.default_collection(),
            extra: Map::new(),
        }
    }

    pub fn progress(mut self, value: Option<i32>) -> Self {
        self.progress = value;
        self
    }

    pub fn progress_override(mut self, value: i32) -> Self {
        self.progress_override = Some(value);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.progress_weight = Some(weight);
        self
    }

    pub fn status(mut self, status: Option<Status>) -> Self {
        self.status = status;
        self
    }

    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Status with the `not_started` default applied.
    pub fn effective_status(&self) -> Status {
        self.status.unwrap_or_default()
    }

    /// Append a child, opening a `pipelines` collection when the node had
    /// none.
    pub fn push_child(&mut self, child: Node) {
        if self.collection.is_none() {
            self.collection = Some(ChildCollection::Pipelines);
        }
        self.children.push(child);
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn iter(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    fn wire_collection(&self) -> Option<ChildCollection> {
        match self.collection {
            Some(collection) => Some(collection),
            None if self.children.is_empty() => None,
            None => Some(
                self.kind
                    .default_collection()
                    .unwrap_or(ChildCollection::Tasks),
            ),
        }
    }
}

/// Depth-first, pre-order iterator returned by [`Node::iter`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Number of nodes in the subtree, `node` included.
pub fn count_all(node: &Node) -> usize {
    node.iter().count()
}

/// Number of validated nodes in the subtree, `node` included.
pub fn count_validated(node: &Node) -> usize {
    node.iter().filter(|n| n.validated).count()
}

// ── Wire format ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    kind: Option<NodeKind>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    progress: Option<i32>,
    #[serde(default)]
    progress_override: Option<i32>,
    #[serde(default)]
    progress_weight: Option<f64>,
    #[serde(default)]
    validated: bool,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    estimated_weeks: Option<f64>,
    #[serde(default)]
    axes: Option<Vec<WireNode>>,
    #[serde(default)]
    pipelines: Option<Vec<WireNode>>,
    #[serde(default)]
    components: Option<Vec<WireNode>>,
    #[serde(default)]
    phases: Option<Vec<WireNode>>,
    #[serde(default)]
    tasks: Option<Vec<WireNode>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl WireNode {
    fn into_node(self, implied: NodeKind) -> Node {
        let lists = [
            (ChildCollection::Axes, self.axes),
            (ChildCollection::Pipelines, self.pipelines),
            (ChildCollection::Components, self.components),
            (ChildCollection::Phases, self.phases),
            (ChildCollection::Tasks, self.tasks),
        ];

        let mut present = None;
        let mut populated: Option<ChildCollection> = None;
        let mut children = Vec::new();
        for (collection, list) in lists {
            let Some(list) = list else { continue };
            present.get_or_insert(collection);
            if list.is_empty() {
                continue;
            }
            if let Some(first) = populated {
                tracing::warn!(
                    node_id = %self.id,
                    kept = first.as_str(),
                    merged = collection.as_str(),
                    "Node populates several child collections; merging them"
                );
            }
            populated.get_or_insert(collection);
            children.extend(
                list.into_iter()
                    .map(|child| child.into_node(collection.child_kind())),
            );
        }

        Node {
            id: self.id,
            title: self.title,
            kind: self.kind.unwrap_or(implied),
            description: self.description,
            progress: self.progress,
            progress_override: self.progress_override,
            progress_weight: self.progress_weight,
            validated: self.validated,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            estimated_weeks: self.estimated_weeks,
            children,
            collection: populated.or(present),
            extra: self.extra,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireNode::deserialize(deserializer).map(|wire| wire.into_node(NodeKind::Root))
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("type", &self.kind)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Some(progress) = self.progress {
            map.serialize_entry("progress", &progress)?;
        }
        if let Some(value) = self.progress_override {
            map.serialize_entry("progressOverride", &value)?;
        }
        if let Some(weight) = self.progress_weight {
            map.serialize_entry("progressWeight", &weight)?;
        }
        map.serialize_entry("validated", &self.validated)?;
        if let Some(status) = self.status {
            map.serialize_entry("status", &status)?;
        }
        if let Some(date) = &self.start_date {
            map.serialize_entry("startDate", date)?;
        }
        if let Some(date) = &self.end_date {
            map.serialize_entry("endDate", date)?;
        }
        if let Some(weeks) = self.estimated_weeks {
            map.serialize_entry("estimatedWeeks", &weeks)?;
        }
        if let Some(collection) = self.wire_collection() {
            map.serialize_entry(collection.as_str(), &self.children)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untyped_children_take_kind_from_collection() {
        let node: Node = serde_json::from_value(json!({
            "id": "root",
            "title": "Root",
            "axes": [{
                "id": "a",
                "title": "Axis",
                "components": [{
                    "id": "c",
                    "title": "Component",
                    "tasks": [{ "id": "t", "title": "Task", "validated": true }]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(node.kind, NodeKind::Root);
        let axis = &node.children[0];
        assert_eq!(axis.kind, NodeKind::Axis);
        assert_eq!(axis.collection, Some(ChildCollection::Components));
        assert_eq!(axis.children[0].kind, NodeKind::Component);
        let task = &axis.children[0].children[0];
        assert_eq!(task.kind, NodeKind::Task);
        assert!(task.validated);
        assert_eq!(task.collection, None);
    }

    #[test]
    fn explicit_type_wins_over_collection() {
        let node: Node = serde_json::from_value(json!({
            "id": "p",
            "title": "P",
            "type": "pipeline",
            "tasks": [{ "id": "x", "title": "X", "type": "pipeline" }]
        }))
        .unwrap();
        assert_eq!(node.kind, NodeKind::Pipeline);
        assert_eq!(node.children[0].kind, NodeKind::Pipeline);
    }

    #[test]
    fn empty_collection_round_trips() {
        let value = json!({
            "id": "a",
            "title": "Axis",
            "type": "axis",
            "progress": 0,
            "validated": false,
            "pipelines": []
        });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.collection, Some(ChildCollection::Pipelines));
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn several_populated_collections_are_merged_in_priority_order() {
        let node: Node = serde_json::from_value(json!({
            "id": "a",
            "title": "Axis",
            "type": "axis",
            "phases": [{ "id": "ph", "title": "Phase" }],
            "pipelines": [],
            "components": [{ "id": "c", "title": "Component" }]
        }))
        .unwrap();
        let ids: Vec<&str> = node.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c", "ph"]);
        assert_eq!(node.collection, Some(ChildCollection::Components));
        assert_eq!(node.children[1].kind, NodeKind::Phase);
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let value = json!({
            "id": "t",
            "title": "Task",
            "type": "task",
            "validated": false,
            "owner": "ops",
            "tags": ["a", "b"]
        });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(node.extra.get("owner"), Some(&json!("ops")));
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn camel_case_fields_are_read_and_written() {
        let value = json!({
            "id": "t",
            "title": "Task",
            "type": "task",
            "progress": 30,
            "progressOverride": 80,
            "progressWeight": 2.5,
            "validated": false,
            "status": "in_progress",
            "startDate": "2025-01-06",
            "endDate": "2025-02-03",
            "estimatedWeeks": 4.0
        });
        let node: Node = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(node.progress_override, Some(80));
        assert_eq!(node.progress_weight, Some(2.5));
        assert_eq!(node.status, Some(Status::InProgress));
        assert_eq!(node.start_date.as_deref(), Some("2025-01-06"));
        assert_eq!(serde_json::to_value(&node).unwrap(), value);
    }

    #[test]
    fn new_node_has_defaults_for_its_kind() {
        let axis = Node::new("Axis", NodeKind::Axis);
        assert!(!axis.id.is_empty());
        assert_eq!(axis.progress, Some(0));
        assert_eq!(axis.status, Some(Status::NotStarted));
        assert!(!axis.validated);
        assert_eq!(axis.collection, Some(ChildCollection::Pipelines));
        assert_ne!(axis.id, Node::new("Axis", NodeKind::Axis).id);
    }

    #[test]
    fn push_child_opens_pipelines_on_bare_node() {
        let mut task = Node::with_id("t", "Task", NodeKind::Task);
        assert_eq!(task.collection, None);
        task.push_child(Node::with_id("x", "X", NodeKind::Task));
        assert_eq!(task.collection, Some(ChildCollection::Pipelines));
    }

    #[test]
    fn walk_is_pre_order() {
        let root = Node::with_id("r", "R", NodeKind::Root)
            .child(
                Node::with_id("a", "A", NodeKind::Axis)
                    .child(Node::with_id("a1", "A1", NodeKind::Pipeline)),
            )
            .child(Node::with_id("b", "B", NodeKind::Axis));
        let ids: Vec<&str> = root.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["r", "a", "a1", "b"]);
        assert_eq!(count_all(&root), 4);
    }

    #[test]
    fn count_validated_includes_root() {
        let root = Node::with_id("r", "R", NodeKind::Root)
            .validated(true)
            .child(Node::with_id("a", "A", NodeKind::Axis).validated(true))
            .child(Node::with_id("b", "B", NodeKind::Axis));
        assert_eq!(count_validated(&root), 2);
    }

    #[test]
    fn node_kind_parses_wire_names() {
        assert_eq!("component".parse::<NodeKind>().unwrap(), NodeKind::Component);
        assert!("epic".parse::<NodeKind>().is_err());
        assert_eq!("phases".parse::<ChildCollection>().unwrap(), ChildCollection::Phases);
    }
}
