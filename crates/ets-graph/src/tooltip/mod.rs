//! Hover tooltip: content, placement and the hide grace period.

pub mod content;
pub mod placement;
pub mod timer;

pub use content::format_event;
pub use placement::{choose_direction, ContainerRect, Direction, TooltipSize};
pub use timer::{HideTimer, PendingHide, TimerId, Tooltip, TooltipState};
