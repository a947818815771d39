//! Arena-backed event tree.
//!
//! Nodes are addressed by `NodeId` and link to each other through index
//! lists, so collapsing a subtree only moves ids between a node's
//! `children` and `collapsed_children` slots. Nothing is ever dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::event::EventRecord;
use super::node::{EventNode, Link, NodeId};
use super::tags::EventTags;
use crate::error::{GraphError, Result};

/// Raw input shape of one tree node: `{ "event": {...}, "children": [...] }`.
///
/// `_children` holds a subtree that starts out collapsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventNodeInput {
    pub event: serde_json::Value,
    #[serde(default)]
    pub children: Vec<EventNodeInput>,
    #[serde(default, rename = "_children", skip_serializing_if = "Vec::is_empty")]
    pub collapsed_children: Vec<EventNodeInput>,
}

/// The full tree of event nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTree {
    nodes: Vec<EventNode>,
    root: NodeId,
}

impl EventTree {
    /// Builds the tree from a single-element input sequence.
    ///
    /// # Errors
    ///
    /// * `GraphError::InvalidRoot` unless `input` holds exactly one node
    /// * `GraphError::MissingField` / `GraphError::InvalidEvent` for malformed events
    pub fn from_input(input: Vec<EventNodeInput>) -> Result<Self> {
        let count = input.len();
        let mut roots = input.into_iter();
        let root_input = match (roots.next(), roots.next()) {
            (Some(root), None) => root,
            _ => return Err(GraphError::InvalidRoot { count }),
        };

        let mut nodes = Vec::new();
        let root = ingest(root_input, None, 0, &mut nodes)?;
        debug!(nodes = nodes.len(), "ingested event tree");

        Ok(Self { nodes, root })
    }

    /// Parses JSON text shaped like `[{"event": {...}, "children": [...]}]`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::JsonParseFailed` for malformed JSON, otherwise the
    /// errors of [`EventTree::from_input`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let input: Vec<EventNodeInput> = serde_json::from_str(json)?;
        Self::from_input(input)
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&EventNode> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut EventNode> {
        self.nodes.get_mut(id.index())
    }

    /// Looks a node up or reports it as unknown.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `id` is not in the arena.
    pub fn get(&self, id: NodeId) -> Result<&EventNode> {
        self.node(id).ok_or(GraphError::UnknownNode(id))
    }

    /// Total number of nodes, visible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Finds a node by its event's `id` field.
    #[must_use]
    pub fn find_by_event_id(&self, event_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.event().id() == Some(event_id))
            .map(NodeId::new)
    }

    /// Swaps a node's visible and hidden children.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `id` is not in the arena.
    pub fn toggle(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.toggle();
        debug!(%id, collapsed = node.is_collapsed(), "toggled node");
        Ok(())
    }

    /// Visible nodes, depth-first pre-order from the root.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        order
    }

    /// Visible parent/child edges, in pre-order of their targets.
    #[must_use]
    pub fn visible_links(&self) -> Vec<Link> {
        self.visible_nodes()
            .into_iter()
            .filter_map(|target| {
                self.node(target)
                    .and_then(EventNode::parent)
                    .map(|source| Link { source, target })
            })
            .collect()
    }

    /// Deepest depth among visible nodes.
    #[must_use]
    pub fn max_visible_depth(&self) -> usize {
        self.visible_nodes()
            .into_iter()
            .filter_map(|id| self.node(id).map(EventNode::depth))
            .max()
            .unwrap_or(0)
    }
}

fn ingest(
    input: EventNodeInput,
    parent: Option<NodeId>,
    depth: usize,
    nodes: &mut Vec<EventNode>,
) -> Result<NodeId> {
    let event = EventRecord::from_json(input.event)?;
    if !input.children.is_empty() && !input.collapsed_children.is_empty() {
        return Err(GraphError::invalid_event(format!(
            "event '{}' has both visible and collapsed children",
            event.display_id()
        )));
    }
    let tags = EventTags::from_record(&event)?;

    let id = NodeId::new(nodes.len());
    nodes.push(EventNode::new(event, tags, parent, depth));

    let child_depth = depth.saturating_add(1);
    let children = input
        .children
        .into_iter()
        .map(|child| ingest(child, Some(id), child_depth, nodes))
        .collect::<Result<Vec<_>>>()?;
    let collapsed_children = input
        .collapsed_children
        .into_iter()
        .map(|child| ingest(child, Some(id), child_depth, nodes))
        .collect::<Result<Vec<_>>>()?;

    if let Some(node) = nodes.get_mut(id.index()) {
        node.children = children;
        node.collapsed_children = collapsed_children;
    }
    Ok(id)
}
