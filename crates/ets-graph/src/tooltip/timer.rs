//! Hide grace period for the tooltip.
//!
//! Leaving a node or the tooltip does not hide it right away. A single hide
//! is scheduled instead, and hovering either one again cancels it, so the
//! pointer can travel from a node onto its tooltip without a flicker.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::NodeId;

/// Identifier of one scheduled hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hide-{}", self.0)
    }
}

/// The one outstanding hide, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingHide {
    pub id: TimerId,
    /// Host clock reading at which the hide is due.
    pub deadline: Duration,
}

/// Owns at most one pending hide. Scheduling replaces, never stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HideTimer {
    delay: Duration,
    next_id: u64,
    pending: Option<PendingHide>,
}

impl HideTimer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 1,
            pending: None,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub const fn pending(&self) -> Option<PendingHide> {
        self.pending
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedules a hide `delay` after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        if let Some(replaced) = self.pending.take() {
            trace!(timer = %replaced.id, "replaced pending hide");
        }
        self.pending = Some(PendingHide {
            id,
            deadline: now.saturating_add(self.delay),
        });
        id
    }

    /// Clears the pending hide. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Fires the pending hide if it is due at `now`.
    pub fn poll(&mut self, now: Duration) -> Option<TimerId> {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                Some(pending.id)
            }
            _ => None,
        }
    }

    /// Fires `id` if it is still the pending hide. Stale ids are ignored.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.pending.is_some_and(|pending| pending.id == id) {
            self.pending = None;
            true
        } else {
            trace!(timer = %id, "ignored stale hide");
            false
        }
    }
}

/// Visibility of the tooltip overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipState {
    #[default]
    Hidden,
    Visible,
    /// Still shown, with a hide scheduled.
    HidePending,
}

/// Tooltip visibility driven by pointer events and the hide timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    timer: HideTimer,
    state: TooltipState,
    target: Option<NodeId>,
}

impl Tooltip {
    #[must_use]
    pub const fn new(hide_delay: Duration) -> Self {
        Self {
            timer: HideTimer::new(hide_delay),
            state: TooltipState::Hidden,
            target: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TooltipState {
        self.state
    }

    /// Node the tooltip currently describes.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        self.target
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self.state, TooltipState::Visible | TooltipState::HidePending)
    }

    #[must_use]
    pub const fn timer(&self) -> &HideTimer {
        &self.timer
    }

    /// Shows the tooltip for `node`, cancelling any pending hide first.
    pub fn show(&mut self, node: NodeId) {
        self.timer.cancel();
        self.state = TooltipState::Visible;
        self.target = Some(node);
        debug!(%node, "tooltip shown");
    }

    /// Starts the grace period. Nothing is scheduled while hidden.
    pub fn schedule_hide(&mut self, now: Duration) -> Option<TimerId> {
        if self.state == TooltipState::Hidden {
            return None;
        }
        let id = self.timer.schedule(now);
        self.state = TooltipState::HidePending;
        Some(id)
    }

    /// Keeps the tooltip up. Returns true if a hide was pending and still
    /// inside its grace period at `now`. An overdue hide fires instead.
    pub fn cancel_hide(&mut self, now: Duration) -> bool {
        if self.poll(now) {
            return false;
        }
        let cancelled = self.timer.cancel();
        if self.state == TooltipState::HidePending {
            self.state = TooltipState::Visible;
        }
        cancelled
    }

    /// Hides the tooltip if its grace period ran out by `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.timer.poll(now) {
            Some(id) => {
                self.hide_now(id);
                true
            }
            None => false,
        }
    }

    /// Hides the tooltip if `id` is still the pending hide.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.timer.fire(id) {
            self.hide_now(id);
            true
        } else {
            false
        }
    }

    /// Hides immediately, dropping any pending hide.
    pub fn hide(&mut self) {
        self.timer.cancel();
        self.state = TooltipState::Hidden;
        self.target = None;
    }

    fn hide_now(&mut self, id: TimerId) {
        self.state = TooltipState::Hidden;
        self.target = None;
        debug!(timer = %id, "tooltip hidden");
    }
}
