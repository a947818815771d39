//! Data models for the event tree.

pub mod event;
pub mod node;
pub mod tags;
pub mod tree;

pub use event::{EventRecord, EventValue};
pub use node::{EventNode, Link, NodeId, Point, RenderId};
pub use tags::{EventTags, FAIL_STATUS};
pub use tree::{EventNodeInput, EventTree};
