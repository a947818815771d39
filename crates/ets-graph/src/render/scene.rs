//! Declarative scene instructions and a reference retained-mode host.
//!
//! The controller emits a [`Frame`] of [`SceneOp`]s per update. A host
//! applies them to whatever it draws with. [`Scene`] is an in-memory host
//! that keeps one element per key and samples transitions on demand.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::diff::Diff;
use super::transition::{Easing, Interpolate, Transition};
use crate::layout::{ConnectorPath, ScreenPoint};
use crate::models::{EventNode, Link, NodeId, RenderId};

/// Vertical offset of the primary label, in `em`.
pub const PRIMARY_LABEL_DY_EM: f64 = 3.0;

/// Vertical offset of the secondary label, in `em`.
pub const SECONDARY_LABEL_DY_EM: f64 = 4.3;

/// Visual class of a node, recomputed on every pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Latest status is a failure.
    Failing,
    /// Hides a non-empty subtree.
    Collapsed,
    #[default]
    Plain,
}

impl NodeClass {
    /// Failure wins over collapse.
    #[must_use]
    pub fn classify(node: &EventNode) -> Self {
        if node.tags().is_failed() {
            Self::Failing
        } else if node.is_collapsed() {
            Self::Collapsed
        } else {
            Self::Plain
        }
    }

    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Failing => "fail-event",
            Self::Collapsed => "collapsed",
            Self::Plain => "",
        }
    }
}

/// A text label drawn under a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub dy_em: f64,
}

/// Static parts of a node's visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVisual {
    pub key: RenderId,
    pub node: NodeId,
    pub class: NodeClass,
    pub labels: Vec<Label>,
}

impl NodeVisual {
    /// Builds the visual for `node`: its source label, plus its type when the
    /// two differ.
    #[must_use]
    pub fn for_node(key: RenderId, id: NodeId, node: &EventNode) -> Self {
        let source = node.tags().primary_source();
        let event_type = node.tags().primary_type();

        let mut labels = vec![Label {
            text: source.to_string(),
            dy_em: PRIMARY_LABEL_DY_EM,
        }];
        if event_type != source {
            labels.push(Label {
                text: event_type.to_string(),
                dy_em: SECONDARY_LABEL_DY_EM,
            });
        }

        Self {
            key,
            node: id,
            class: NodeClass::classify(node),
            labels,
        }
    }
}

/// Animated properties of a node at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFrame {
    pub translate: ScreenPoint,
    pub radius: f64,
    pub label_opacity: f64,
}

impl NodeFrame {
    /// Fully drawn at `translate`.
    #[must_use]
    pub const fn shown(translate: ScreenPoint, radius: f64) -> Self {
        Self {
            translate,
            radius,
            label_opacity: 1.0,
        }
    }

    /// Shrunk to nothing at `translate`.
    #[must_use]
    pub const fn vanished(translate: ScreenPoint) -> Self {
        Self {
            translate,
            radius: 0.0,
            label_opacity: 0.0,
        }
    }
}

impl Interpolate for NodeFrame {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            translate: self.translate.lerp(to.translate, t),
            radius: self.radius.lerp(to.radius, t),
            label_opacity: self.label_opacity.lerp(to.label_opacity, t),
        }
    }
}

/// One draw/update/remove instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SceneOp {
    EnterNode {
        visual: NodeVisual,
        from: NodeFrame,
        to: NodeFrame,
    },
    MoveNode {
        key: RenderId,
        class: NodeClass,
        from: NodeFrame,
        to: NodeFrame,
    },
    /// Animate to `to`, then remove.
    ExitNode {
        key: RenderId,
        from: NodeFrame,
        to: NodeFrame,
    },
    EnterLink {
        key: RenderId,
        link: Link,
        from: ConnectorPath,
        to: ConnectorPath,
    },
    MoveLink {
        key: RenderId,
        from: ConnectorPath,
        to: ConnectorPath,
    },
    /// Animate to `to`, then remove.
    ExitLink {
        key: RenderId,
        from: ConnectorPath,
        to: ConnectorPath,
    },
}

impl SceneOp {
    #[must_use]
    pub const fn key(&self) -> RenderId {
        match self {
            Self::EnterNode { visual, .. } => visual.key,
            Self::MoveNode { key, .. }
            | Self::ExitNode { key, .. }
            | Self::EnterLink { key, .. }
            | Self::MoveLink { key, .. }
            | Self::ExitLink { key, .. } => *key,
        }
    }
}

/// Everything one update pass produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Node whose interaction triggered the pass.
    pub source: NodeId,
    pub ops: Vec<SceneOp>,
    pub nodes: Diff<RenderId>,
    pub links: Diff<RenderId>,
    /// Shared by every transition in the frame.
    pub duration: Duration,
    pub easing: Easing,
}

/// A node element held by [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub visual: NodeVisual,
    pub motion: Transition<NodeFrame>,
    pub exiting: bool,
}

/// A link element held by [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLink {
    pub link: Link,
    pub motion: Transition<ConnectorPath>,
    pub exiting: bool,
}

/// Sampled state of every element at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<(RenderId, NodeFrame)>,
    pub links: Vec<(RenderId, ConnectorPath)>,
}

/// In-memory retained-mode host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    nodes: IndexMap<RenderId, SceneNode>,
    links: IndexMap<RenderId, SceneLink>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every op of `frame`, starting its transitions at `now`.
    ///
    /// Elements that already exist move from wherever they currently are, so
    /// interrupting a running transition never makes anything jump. An
    /// element re-entering while it is still exiting is revived in place.
    pub fn apply(&mut self, frame: &Frame, now: Duration) {
        let duration = frame.duration;
        let easing = frame.easing;

        for op in &frame.ops {
            match op {
                SceneOp::EnterNode { visual, from, to } => match self.nodes.get_mut(&visual.key) {
                    Some(existing) => {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.visual = visual.clone();
                        existing.exiting = false;
                    }
                    None => {
                        self.nodes.insert(
                            visual.key,
                            SceneNode {
                                visual: visual.clone(),
                                motion: Transition::new(*from, *to, now, duration, easing),
                                exiting: false,
                            },
                        );
                    }
                },
                SceneOp::MoveNode { key, class, to, .. } => match self.nodes.get_mut(key) {
                    Some(existing) => {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.visual.class = *class;
                        existing.exiting = false;
                    }
                    None => warn!(%key, "move for unknown node element"),
                },
                SceneOp::ExitNode { key, to, .. } => {
                    if let Some(existing) = self.nodes.get_mut(key) {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.exiting = true;
                    }
                }
                SceneOp::EnterLink { key, link, from, to } => match self.links.get_mut(key) {
                    Some(existing) => {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.link = *link;
                        existing.exiting = false;
                    }
                    None => {
                        self.links.insert(
                            *key,
                            SceneLink {
                                link: *link,
                                motion: Transition::new(*from, *to, now, duration, easing),
                                exiting: false,
                            },
                        );
                    }
                },
                SceneOp::MoveLink { key, to, .. } => match self.links.get_mut(key) {
                    Some(existing) => {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.exiting = false;
                    }
                    None => warn!(%key, "move for unknown link element"),
                },
                SceneOp::ExitLink { key, to, .. } => {
                    if let Some(existing) = self.links.get_mut(key) {
                        existing.motion = existing.motion.retarget(*to, now, duration, easing);
                        existing.exiting = true;
                    }
                }
            }
        }

        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            "applied frame"
        );
    }

    /// Interpolated state of every element at `now`.
    #[must_use]
    pub fn sample(&self, now: Duration) -> Snapshot {
        Snapshot {
            nodes: self
                .nodes
                .iter()
                .map(|(key, node)| (*key, node.motion.sample(now)))
                .collect(),
            links: self
                .links
                .iter()
                .map(|(key, link)| (*key, link.motion.sample(now)))
                .collect(),
        }
    }

    /// Removes exiting elements whose transition has finished by `now`.
    /// Returns how many were removed.
    pub fn settle(&mut self, now: Duration) -> usize {
        let before = self.nodes.len() + self.links.len();
        self.nodes
            .retain(|_, node| !(node.exiting && node.motion.is_finished(now)));
        self.links
            .retain(|_, link| !(link.exiting && link.motion.is_finished(now)));
        before - (self.nodes.len() + self.links.len())
    }

    #[must_use]
    pub fn node(&self, key: RenderId) -> Option<&SceneNode> {
        self.nodes.get(&key)
    }

    #[must_use]
    pub fn link(&self, key: RenderId) -> Option<&SceneLink> {
        self.links.get(&key)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
