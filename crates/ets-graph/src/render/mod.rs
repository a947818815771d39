//! Reconciliation of the laid-out tree against what is on screen.

pub mod controller;
pub mod diff;
pub mod scene;
pub mod transition;

pub use controller::{GraphRenderer, TooltipView};
pub use diff::{diff_keys, Diff, ViewState};
pub use scene::{Frame, Label, NodeClass, NodeFrame, NodeVisual, Scene, SceneOp, Snapshot};
pub use transition::{Easing, Interpolate, Transition};
