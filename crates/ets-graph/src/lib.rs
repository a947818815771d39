//! Interactive event-tree graph core
//!
//! Lays out a tree of event records left to right, reconciles each new
//! layout against what is already on screen and emits declarative scene
//! instructions with transitions. Hover tooltips describe each event and
//! anchor themselves inside the container.
//!
//! ## Architecture
//! - Arena-backed tree: collapsing moves child ids, nothing is dropped
//! - Tidy tree layout on the breadth axis, equal bands on the depth axis
//! - Keyed enter/update/exit diffing by stable render ids
//! - Time is supplied by the host; no threads, no async runtime
//!
//! ## Module Structure
//! - `models`: event records, tags and the node arena
//! - `layout`: geometry engine and connector paths
//! - `render`: diffing, transitions, scene ops and the renderer
//! - `tooltip`: content formatting, placement and the hide grace period
//! - `config`: renderer configuration
//! - `error`: error types and handling
//!
//! ## Example
//! ```
//! use ets_graph::{BoundingBox, GraphConfig, GraphRenderer, Scene};
//! use std::time::Duration;
//!
//! let json = r#"[{"event": {"id": "e1", "tags": {"source": ["ci"], "type": ["build"]}},
//!                 "children": []}]"#;
//! let mut renderer =
//!     GraphRenderer::from_json(json, BoundingBox::new(960.0, 500.0), GraphConfig::default())?;
//! let frame = renderer.render()?;
//!
//! let mut scene = Scene::new();
//! scene.apply(&frame, Duration::ZERO);
//! assert_eq!(scene.node_count(), 1);
//! # Ok::<(), ets_graph::GraphError>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod render;
pub mod tooltip;

pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use layout::{layout, BoundingBox, ConnectorPath, ScreenPoint, TreeLayout};
pub use models::{EventNode, EventNodeInput, EventRecord, EventTags, EventTree, NodeId, Point};
pub use render::{Frame, GraphRenderer, Scene, SceneOp, TooltipView};
pub use tooltip::{choose_direction, format_event, Direction};
