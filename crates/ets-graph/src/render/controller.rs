//! The renderer: owns the tree, reconciles it against what is on screen and
//! routes pointer events to the tooltip.

use std::time::Duration;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::diff::{diff_keys, ViewState};
use super::scene::{Frame, NodeClass, NodeFrame, NodeVisual, SceneOp};
use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::layout::{BoundingBox, ConnectorPath, ScreenPoint, TreeLayout};
use crate::models::{EventNodeInput, EventTree, Link, NodeId, Point, RenderId};
use crate::tooltip::{
    choose_direction, format_event, ContainerRect, Direction, TimerId, Tooltip, TooltipSize,
};

/// What the host should show in the tooltip overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipView {
    pub node: NodeId,
    pub html: String,
    pub direction: Direction,
}

/// Interactive renderer for one event tree inside one container.
#[derive(Debug, Clone)]
pub struct GraphRenderer {
    tree: EventTree,
    bounds: BoundingBox,
    layout: TreeLayout,
    config: GraphConfig,
    view: ViewState,
    next_render_id: u64,
    tooltip: Tooltip,
}

impl GraphRenderer {
    /// Creates a renderer. Nothing is drawn until [`GraphRenderer::render`].
    ///
    /// # Errors
    ///
    /// * `GraphError::ConfigInvalid` if `config` fails validation
    /// * `GraphError::LayoutPrecondition` if the container is too small
    pub fn new(tree: EventTree, bounds: BoundingBox, config: GraphConfig) -> Result<Self> {
        config.validate()?;
        let layout = TreeLayout::from_bounds(&bounds, config.min_dimension)?;
        let tooltip = Tooltip::new(config.hide_delay);

        Ok(Self {
            tree,
            bounds,
            layout,
            config,
            view: ViewState::new(),
            next_render_id: 1,
            tooltip,
        })
    }

    /// Creates a renderer from raw input nodes.
    ///
    /// # Errors
    ///
    /// Ingestion errors from [`EventTree::from_input`], then those of
    /// [`GraphRenderer::new`].
    pub fn from_input(
        input: Vec<EventNodeInput>,
        bounds: BoundingBox,
        config: GraphConfig,
    ) -> Result<Self> {
        Self::new(EventTree::from_input(input)?, bounds, config)
    }

    /// Creates a renderer from JSON text.
    ///
    /// # Errors
    ///
    /// Parse and ingestion errors from [`EventTree::from_json_str`], then
    /// those of [`GraphRenderer::new`].
    pub fn from_json(json: &str, bounds: BoundingBox, config: GraphConfig) -> Result<Self> {
        Self::new(EventTree::from_json_str(json)?, bounds, config)
    }

    #[must_use]
    pub const fn tree(&self) -> &EventTree {
        &self.tree
    }

    #[must_use]
    pub const fn view_state(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    #[must_use]
    pub const fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    #[must_use]
    pub const fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// First pass: everything enters from the root.
    ///
    /// # Errors
    ///
    /// See [`GraphRenderer::update`].
    pub fn render(&mut self) -> Result<Frame> {
        self.update(self.tree.root())
    }

    /// Toggles `node` between expanded and collapsed, then updates.
    ///
    /// # Errors
    ///
    /// * `GraphError::UnknownNode` if `node` is not in the tree
    /// * `GraphError::NotRendered` if `node` is not currently on screen
    pub fn click(&mut self, node: NodeId) -> Result<Frame> {
        self.tree.get(node)?;
        if !self.is_rendered(node) {
            warn!(%node, "click on a node that is not on screen");
            return Err(GraphError::NotRendered(node));
        }
        self.tree.toggle(node)?;
        self.update(node)
    }

    /// Lays the tree out again and diffs it against what is on screen.
    ///
    /// Entering elements grow out of `source`'s previous position and exiting
    /// ones shrink into its new position.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `source` is not in the tree.
    pub fn update(&mut self, source: NodeId) -> Result<Frame> {
        self.tree.get(source)?;

        let order = self.layout.apply(&mut self.tree);
        self.assign_render_ids(&order);

        let source_node = self.tree.get(source)?;
        let origin = source_node.previous();
        let destination = source_node.position();

        let current_nodes: IndexMap<RenderId, NodeId> = order
            .iter()
            .filter_map(|&id| self.render_id(id).map(|key| (key, id)))
            .collect();
        let current_links: IndexMap<RenderId, Link> = self
            .tree
            .visible_links()
            .into_iter()
            .filter_map(|link| self.render_id(link.target).map(|key| (key, link)))
            .collect();

        let node_diff = diff_keys(&self.view.nodes, &current_nodes);
        let link_diff = diff_keys(&self.view.links, &current_links);

        let mut ops = Vec::with_capacity(node_diff.len() + link_diff.len());
        let margin = self.config.margin_left;
        let radius = self.config.node_radius;
        let project = |point: Point| ScreenPoint::project(point, margin);

        for (key, &id) in node_diff
            .enter
            .iter()
            .filter_map(|key| current_nodes.get_key_value(key))
        {
            let node = self.tree.get(id)?;
            ops.push(SceneOp::EnterNode {
                visual: NodeVisual::for_node(*key, id, node),
                from: NodeFrame::vanished(project(origin)),
                to: NodeFrame::shown(project(node.position()), radius),
            });
        }
        for (key, &id) in node_diff
            .update
            .iter()
            .filter_map(|key| current_nodes.get_key_value(key))
        {
            let node = self.tree.get(id)?;
            ops.push(SceneOp::MoveNode {
                key: *key,
                class: NodeClass::classify(node),
                from: NodeFrame::shown(project(node.previous()), radius),
                to: NodeFrame::shown(project(node.position()), radius),
            });
        }
        for (key, &id) in node_diff
            .exit
            .iter()
            .filter_map(|key| self.view.nodes.get_key_value(key))
        {
            let node = self.tree.get(id)?;
            ops.push(SceneOp::ExitNode {
                key: *key,
                from: NodeFrame::shown(project(node.position()), radius),
                to: NodeFrame::vanished(project(destination)),
            });
        }

        for (key, &link) in link_diff
            .enter
            .iter()
            .filter_map(|key| current_links.get_key_value(key))
        {
            ops.push(SceneOp::EnterLink {
                key: *key,
                link,
                from: ConnectorPath::collapsed_at(origin, margin),
                to: self.connector(link, false)?,
            });
        }
        for (key, &link) in link_diff
            .update
            .iter()
            .filter_map(|key| current_links.get_key_value(key))
        {
            ops.push(SceneOp::MoveLink {
                key: *key,
                from: self.connector(link, true)?,
                to: self.connector(link, false)?,
            });
        }
        for (key, &link) in link_diff
            .exit
            .iter()
            .filter_map(|key| self.view.links.get_key_value(key))
        {
            ops.push(SceneOp::ExitLink {
                key: *key,
                from: self.last_drawn_connector(link)?,
                to: ConnectorPath::collapsed_at(destination, margin),
            });
        }

        debug!(
            %source,
            enter = node_diff.enter.len(),
            update = node_diff.update.len(),
            exit = node_diff.exit.len(),
            links = current_links.len(),
            "updated graph"
        );

        self.view = ViewState {
            nodes: current_nodes,
            links: current_links,
        };

        Ok(Frame {
            source,
            ops,
            nodes: node_diff,
            links: link_diff,
            duration: self.config.transition,
            easing: self.config.easing,
        })
    }

    /// Shows the tooltip for `node`, anchored so it stays inside the container.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `node` is not in the tree.
    pub fn hover_node(
        &mut self,
        node: NodeId,
        tooltip_size: TooltipSize,
        now: Duration,
    ) -> Result<TooltipView> {
        let record = self.tree.get(node)?;
        if !self.is_rendered(node) {
            warn!(%node, "hover on a node that is not on screen");
        }
        let html = format_event(record.event());
        let direction = choose_direction(
            record.position(),
            &ContainerRect::from(&self.bounds),
            tooltip_size,
        );

        self.tooltip.poll(now);
        self.tooltip.show(node);
        Ok(TooltipView {
            node,
            html,
            direction,
        })
    }

    /// Pointer left a node: start the hide grace period.
    pub fn leave_node(&mut self, now: Duration) -> Option<TimerId> {
        let scheduled = self.tooltip.schedule_hide(now);
        if scheduled.is_none() {
            warn!("leave ignored, tooltip is hidden");
        }
        scheduled
    }

    /// Pointer entered the tooltip: keep it up, unless the grace period
    /// already ran out by `now`.
    pub fn enter_tooltip(&mut self, now: Duration) -> bool {
        self.tooltip.cancel_hide(now)
    }

    /// Pointer left the tooltip: start the hide grace period.
    pub fn leave_tooltip(&mut self, now: Duration) -> Option<TimerId> {
        self.tooltip.schedule_hide(now)
    }

    /// Advances the tooltip clock. Returns true if the tooltip was hidden.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.tooltip.poll(now)
    }

    /// Fires a specific hide, for hosts that run their own timers.
    pub fn fire_hide(&mut self, id: TimerId) -> bool {
        self.tooltip.fire(id)
    }

    /// The on-screen connector into `target`, sampled into
    /// `curve_samples` points. `None` for the root and for hidden nodes.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `target` is not in the tree.
    pub fn connector_points(&self, target: NodeId) -> Result<Option<Vec<ScreenPoint>>> {
        let Some(source) = self.tree.get(target)?.parent() else {
            return Ok(None);
        };
        if !self.is_rendered(target) {
            return Ok(None);
        }
        let path = self.connector(Link { source, target }, false)?;
        Ok(Some(path.sample(self.config.curve_samples)))
    }

    /// First on-screen link whose curve passes within `tolerance` of `point`.
    ///
    /// Each connector is flattened into `curve_samples` points and tested
    /// segment by segment, using squared distances.
    #[must_use]
    pub fn link_at(&self, point: ScreenPoint, tolerance: f64) -> Option<Link> {
        let tolerance_squared = tolerance * tolerance;
        self.view.links.values().copied().find(|&link| {
            self.connector(link, false)
                .ok()
                .filter(|path| !path.is_degenerate())
                .is_some_and(|path| {
                    path.sample(self.config.curve_samples)
                        .into_iter()
                        .tuple_windows()
                        .any(|(a, b)| segment_distance_squared(point, a, b) <= tolerance_squared)
                })
        })
    }

    fn assign_render_ids(&mut self, order: &[NodeId]) {
        for &id in order {
            if let Some(node) = self.tree.node_mut(id) {
                if node.render_id.is_none() {
                    node.render_id = Some(RenderId::new(self.next_render_id));
                    self.next_render_id = self.next_render_id.saturating_add(1);
                }
            }
        }
    }

    fn render_id(&self, id: NodeId) -> Option<RenderId> {
        self.tree.node(id).and_then(|node| node.render_id())
    }

    fn is_rendered(&self, id: NodeId) -> bool {
        self.render_id(id)
            .is_some_and(|key| self.view.nodes.get(&key) == Some(&id))
    }

    /// Connector for `link` at the current (or previous) layout.
    fn connector(&self, link: Link, previous: bool) -> Result<ConnectorPath> {
        let parent = self.tree.get(link.source)?;
        let child = self.tree.get(link.target)?;
        let (from, to) = if previous {
            (parent.previous(), child.previous())
        } else {
            (parent.position(), child.position())
        };
        Ok(ConnectorPath::diagonal(from, to, self.config.margin_left))
    }

    /// Connector for an exiting link as it was last drawn. The parent has
    /// just been laid out again; the hidden child was not, so its position
    /// is still the one on screen.
    fn last_drawn_connector(&self, link: Link) -> Result<ConnectorPath> {
        let parent = self.tree.get(link.source)?;
        let child = self.tree.get(link.target)?;
        Ok(ConnectorPath::diagonal(
            parent.previous(),
            child.position(),
            self.config.margin_left,
        ))
    }
}

/// Squared distance from `point` to the segment `a`-`b`.
fn segment_distance_squared(point: ScreenPoint, a: ScreenPoint, b: ScreenPoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_squared = dx * dx + dy * dy;
    let t = if length_squared > 0.0 {
        (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_squared).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (px, py) = (a.x + t * dx - point.x, a.y + t * dy - point.y);
    px * px + py * py
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::tooltip::TooltipState;
    use serde_json::json;

    fn input(id: &str, status: &str, children: Vec<EventNodeInput>) -> EventNodeInput {
        EventNodeInput {
            event: json!({
                "id": id,
                "tags": {"source": [id], "type": ["deploy"], "status": [status]}
            }),
            children,
            collapsed_children: Vec::new(),
        }
    }

    fn renderer() -> GraphRenderer {
        GraphRenderer::from_input(
            vec![input(
                "root",
                "success",
                vec![
                    input("a", "success", vec![input("a1", "fail", vec![])]),
                    input("b", "success", vec![]),
                ],
            )],
            BoundingBox::new(960.0, 500.0),
            GraphConfig::default(),
        )
        .unwrap()
    }

    fn id(renderer: &GraphRenderer, event_id: &str) -> NodeId {
        renderer.tree().find_by_event_id(event_id).unwrap()
    }

    #[test]
    fn test_render_enters_everything_from_root() {
        let mut renderer = renderer();
        let frame = renderer.render().unwrap();

        assert_eq!(frame.nodes.enter.len(), 4);
        assert_eq!(frame.links.enter.len(), 3);
        assert!(frame.nodes.update.is_empty() && frame.nodes.exit.is_empty());
        assert_eq!(frame.duration, Duration::from_millis(200));

        let origin = ScreenPoint { x: 50.0, y: 250.0 };
        for op in &frame.ops {
            match op {
                SceneOp::EnterNode { from, .. } => assert_eq!(from.translate, origin),
                SceneOp::EnterLink { from, .. } => assert_eq!(from.start, origin),
                other => panic!("unexpected op {other:?}"),
            }
        }
    }

    #[test]
    fn test_render_ids_start_at_one() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let root = renderer.tree().root();
        assert_eq!(
            renderer.tree().get(root).unwrap().render_id(),
            Some(RenderId::new(1))
        );
    }

    #[test]
    fn test_click_collapses_and_exits_into_source() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let a = id(&renderer, "a");
        let a_position = renderer.tree().get(a).unwrap().position();

        let frame = renderer.click(a).unwrap();
        assert_eq!(frame.nodes.exit.len(), 1);
        assert_eq!(frame.links.exit.len(), 1);
        assert_eq!(frame.nodes.update.len(), 3);

        let destination = ScreenPoint::project(renderer.tree().get(a).unwrap().position(), 50.0);
        let exit = frame
            .ops
            .iter()
            .find_map(|op| match op {
                SceneOp::ExitNode { to, .. } => Some(*to),
                _ => None,
            })
            .unwrap();
        assert_eq!(exit.translate, destination);
        assert!(exit.radius.abs() < f64::EPSILON);

        let class = frame
            .ops
            .iter()
            .find_map(|op| match op {
                SceneOp::MoveNode { key, class, .. }
                    if Some(*key) == renderer.tree().get(a).unwrap().render_id() =>
                {
                    Some(*class)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(class, NodeClass::Collapsed);
        assert_eq!(renderer.tree().get(a).unwrap().previous(), a_position);
    }

    #[test]
    fn test_expand_reuses_render_ids() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let before = renderer.view_state().clone();
        let a = id(&renderer, "a");

        renderer.click(a).unwrap();
        let frame = renderer.click(a).unwrap();

        assert_eq!(frame.nodes.enter.len(), 1);
        assert_eq!(renderer.view_state().nodes, before.nodes);
        assert_eq!(renderer.view_state().links, before.links);
    }

    #[test]
    fn test_failing_node_classified() {
        let mut renderer = renderer();
        let frame = renderer.render().unwrap();
        let a1 = id(&renderer, "a1");
        let visual = frame
            .ops
            .iter()
            .find_map(|op| match op {
                SceneOp::EnterNode { visual, .. } if visual.node == a1 => Some(visual.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(visual.class, NodeClass::Failing);
        assert_eq!(visual.labels.len(), 2);
        assert_eq!(visual.labels[0].text, "a1");
        assert_eq!(visual.labels[1].text, "deploy");
    }

    #[test]
    fn test_click_unknown_node() {
        let mut renderer = renderer();
        assert_eq!(
            renderer.click(NodeId::new(42)).unwrap_err(),
            GraphError::UnknownNode(NodeId::new(42))
        );
    }

    #[test]
    fn test_rejects_small_container() {
        let tree = renderer().tree().clone();
        let result = GraphRenderer::new(tree, BoundingBox::new(0.0, 0.0), GraphConfig::default());
        assert!(matches!(result, Err(GraphError::LayoutPrecondition { .. })));
    }

    #[test]
    fn test_tooltip_grace_protocol() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let b = id(&renderer, "b");

        let view = renderer
            .hover_node(b, TooltipSize::new(100.0, 50.0), Duration::ZERO)
            .unwrap();
        assert_eq!(view.node, b);
        assert!(view.html.starts_with("<dl><dt>id:</dt><dd>b</dd>"));

        renderer.leave_node(Duration::from_millis(10));
        assert!(renderer.enter_tooltip(Duration::from_millis(60)));
        assert!(!renderer.tick(Duration::from_millis(500)));
        assert_eq!(renderer.tooltip().state(), TooltipState::Visible);

        renderer.leave_tooltip(Duration::from_millis(600));
        assert!(!renderer.tick(Duration::from_millis(700)));
        assert!(renderer.tick(Duration::from_millis(750)));
        assert_eq!(renderer.tooltip().state(), TooltipState::Hidden);
        assert_eq!(renderer.leave_node(Duration::from_millis(800)), None);
    }

    #[test]
    fn test_enter_tooltip_after_deadline_does_not_revive() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let b = id(&renderer, "b");

        renderer
            .hover_node(b, TooltipSize::new(100.0, 50.0), Duration::ZERO)
            .unwrap();
        renderer.leave_node(Duration::ZERO);

        assert!(!renderer.enter_tooltip(Duration::from_millis(1000)));
        assert_eq!(renderer.tooltip().state(), TooltipState::Hidden);
        assert!(!renderer.tick(Duration::from_millis(1000)));
    }

    #[test]
    fn test_exit_link_starts_from_last_drawn_geometry() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let a = id(&renderer, "a");
        let a1 = id(&renderer, "a1");
        let a_before = ScreenPoint::project(renderer.tree().get(a).unwrap().position(), 50.0);
        let a1_before = ScreenPoint::project(renderer.tree().get(a1).unwrap().position(), 50.0);

        let frame = renderer.click(a).unwrap();
        // Collapsing drops a depth band, so `a` itself moves right.
        let a_after = ScreenPoint::project(renderer.tree().get(a).unwrap().position(), 50.0);
        assert!(a_after.x > a_before.x);

        let (from, to) = frame
            .ops
            .iter()
            .find_map(|op| match op {
                SceneOp::ExitLink { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .unwrap();
        assert_eq!(from.start, a_before);
        assert_eq!(from.end, a1_before);
        assert_eq!(to.start, a_after);
    }

    #[test]
    fn test_click_hidden_node_rejected() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let a = id(&renderer, "a");
        let a1 = id(&renderer, "a1");
        renderer.click(a).unwrap();
        let view = renderer.view_state().clone();

        assert_eq!(renderer.click(a1).unwrap_err(), GraphError::NotRendered(a1));
        assert_eq!(renderer.view_state(), &view);
    }

    #[test]
    fn test_connector_points_use_configured_samples() {
        let mut renderer = GraphRenderer::new(
            renderer().tree().clone(),
            BoundingBox::new(960.0, 500.0),
            GraphConfig::default().curve_samples(8),
        )
        .unwrap();
        renderer.render().unwrap();
        let b = id(&renderer, "b");
        let root = renderer.tree().root();

        let points = renderer.connector_points(b).unwrap().unwrap();
        assert_eq!(points.len(), 8);
        assert_eq!(
            points[0],
            ScreenPoint::project(renderer.tree().get(root).unwrap().position(), 50.0)
        );
        assert_eq!(
            points[7],
            ScreenPoint::project(renderer.tree().get(b).unwrap().position(), 50.0)
        );
        assert_eq!(renderer.connector_points(root).unwrap(), None);

        renderer.click(id(&renderer, "a")).unwrap();
        assert_eq!(renderer.connector_points(id(&renderer, "a1")).unwrap(), None);
    }

    #[test]
    fn test_link_at_hits_sampled_curve() {
        let mut renderer = renderer();
        renderer.render().unwrap();
        let b = id(&renderer, "b");
        let root = renderer.tree().root();

        let points = renderer.connector_points(b).unwrap().unwrap();
        let middle = points[points.len() / 2];
        assert_eq!(
            renderer.link_at(middle, 1.0),
            Some(Link {
                source: root,
                target: b
            })
        );
        assert_eq!(
            renderer.link_at(ScreenPoint { x: -500.0, y: -500.0 }, 1.0),
            None
        );
    }
}
