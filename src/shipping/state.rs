//! Per-event lifecycle of a shipping change.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

/// Lifecycle states of one shipping-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingChangeState {
    Started,
    CallbackInvoked,
    PatchCollected,
    NoPatch,
    Submitting,
    SettledOk,
    SettledError,
}

impl ShippingChangeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::CallbackInvoked => "callback_invoked",
            Self::PatchCollected => "patch_collected",
            Self::NoPatch => "no_patch",
            Self::Submitting => "submitting",
            Self::SettledOk => "settled_ok",
            Self::SettledError => "settled_error",
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::SettledOk | Self::SettledError)
    }

    /// Returns `true` if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: ShippingChangeState) -> bool {
        use ShippingChangeState::*;

        matches!(
            (self, next),
            (Started, CallbackInvoked)
                | (Started, SettledError)
                | (CallbackInvoked, PatchCollected)
                | (CallbackInvoked, NoPatch)
                | (PatchCollected, Submitting)
                | (PatchCollected, SettledError)
                | (Submitting, SettledOk)
                | (Submitting, SettledError)
                | (NoPatch, SettledOk)
                | (NoPatch, SettledError)
        )
    }
}

impl fmt::Display for ShippingChangeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs the state of one event.
#[derive(Debug)]
pub(crate) struct EventTracker {
    state: Mutex<ShippingChangeState>,
}

impl EventTracker {
    pub(crate) fn new() -> Self {
        debug!(state = %ShippingChangeState::Started, "Shipping change started");
        Self {
            state: Mutex::new(ShippingChangeState::Started),
        }
    }

    pub(crate) fn current(&self) -> ShippingChangeState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves to `next` if the lifecycle allows it. Returns whether it moved.
    pub(crate) fn advance(&self, next: ShippingChangeState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.can_transition_to(next) {
            if *state != next {
                warn!(from = %*state, to = %next, "Ignored shipping change transition");
            }
            return false;
        }

        debug!(from = %*state, to = %next, "Shipping change transition");
        *state = next;
        true
    }

    /// Settles the event, passing through `NoPatch` if nothing was submitted.
    /// A patch collected but never submitted settles as an error.
    pub(crate) fn settle(&self, ok: bool) -> ShippingChangeState {
        let current = self.current();
        if current == ShippingChangeState::CallbackInvoked {
            self.advance(ShippingChangeState::NoPatch);
        }

        let next = if ok && current != ShippingChangeState::PatchCollected {
            ShippingChangeState::SettledOk
        } else {
            ShippingChangeState::SettledError
        };
        self.advance(next);
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ShippingChangeState::*;

    #[test]
    fn patch_path_settles_ok() {
        let tracker = EventTracker::new();
        assert!(tracker.advance(CallbackInvoked));
        assert!(tracker.advance(PatchCollected));
        assert!(tracker.advance(Submitting));
        assert_eq!(tracker.settle(true), SettledOk);
    }

    #[test]
    fn callback_without_patch_passes_through_no_patch() {
        let tracker = EventTracker::new();
        tracker.advance(CallbackInvoked);
        assert_eq!(tracker.settle(true), SettledOk);
    }

    #[test]
    fn skipped_states_are_rejected() {
        let tracker = EventTracker::new();
        assert!(!tracker.advance(Submitting));
        assert_eq!(tracker.current(), Started);
    }

    #[test]
    fn settled_state_is_final() {
        let tracker = EventTracker::new();
        tracker.advance(CallbackInvoked);
        assert_eq!(tracker.settle(false), SettledError);
        assert!(!tracker.advance(PatchCollected));
        assert!(tracker.current().is_settled());
    }

    #[test]
    fn collected_patch_that_never_submits_settles_as_error() {
        let tracker = EventTracker::new();
        tracker.advance(CallbackInvoked);
        tracker.advance(PatchCollected);
        assert_eq!(tracker.settle(true), SettledError);
    }

    #[test]
    fn settling_twice_keeps_first_outcome() {
        let tracker = EventTracker::new();
        tracker.advance(CallbackInvoked);
        assert_eq!(tracker.settle(true), SettledOk);
        assert_eq!(tracker.settle(false), SettledOk);
    }

    #[test]
    fn no_patch_cannot_collect_a_patch() {
        let tracker = EventTracker::new();
        tracker.advance(CallbackInvoked);
        assert!(tracker.advance(NoPatch));
        assert!(!tracker.advance(PatchCollected));
        assert_eq!(tracker.current(), NoPatch);
    }
}
