//! Control instance lifecycle state machine.

use tracing::warn;

/// The states a control instance moves through.
///
/// ```text
/// Constructed -> LaidOut -> Connected -> Active <-> Blocked
///       \__________\___________\___________\_________/
///                               v
///                           Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    LaidOut,
    Connected,
    Active,
    Blocked,
    Disposed,
}

/// Tracks an instance's lifecycle state and validates transitions.
/// Invalid transitions warn and are refused; they never panic.
#[derive(Debug, Clone)]
pub struct LifecycleTracker {
    state: LifecycleState,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Constructed,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == LifecycleState::Disposed
    }

    /// Attempt a transition. Returns whether it was taken.
    pub fn transition(&mut self, to: LifecycleState) -> bool {
        if Self::allowed(self.state, to) {
            self.state = to;
            true
        } else {
            warn!(from = ?self.state, ?to, "invalid lifecycle transition refused");
            false
        }
    }

    fn allowed(from: LifecycleState, to: LifecycleState) -> bool {
        use LifecycleState::*;
        match (from, to) {
            (Disposed, _) => false,
            (_, Disposed) => true,
            (Constructed, LaidOut | Connected) => true,
            (LaidOut, Connected) => true,
            (Connected, Active) => true,
            (Active, Blocked) => true,
            (Blocked, Active) => true,
            // Re-running data_init on an active instance is allowed.
            (Active, Active) => true,
            _ => false,
        }
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let mut t = LifecycleTracker::new();
        assert_eq!(t.state(), LifecycleState::Constructed);
        assert!(t.transition(LifecycleState::LaidOut));
        assert!(t.transition(LifecycleState::Connected));
        assert!(t.transition(LifecycleState::Active));
        assert!(t.transition(LifecycleState::Blocked));
        assert!(t.transition(LifecycleState::Active));
        assert!(t.transition(LifecycleState::Disposed));
        assert!(t.is_disposed());
    }

    #[test]
    fn connect_straight_from_constructed() {
        let mut t = LifecycleTracker::new();
        assert!(t.transition(LifecycleState::Connected));
    }

    #[test]
    fn invalid_transitions_refused() {
        let mut t = LifecycleTracker::new();
        assert!(!t.transition(LifecycleState::Active));
        assert_eq!(t.state(), LifecycleState::Constructed);
        assert!(!t.transition(LifecycleState::Blocked));
    }

    #[test]
    fn disposed_is_terminal() {
        let mut t = LifecycleTracker::new();
        assert!(t.transition(LifecycleState::Disposed));
        assert!(!t.transition(LifecycleState::Connected));
        assert!(!t.transition(LifecycleState::Disposed));
        assert!(t.is_disposed());
    }

    #[test]
    fn reinit_while_active() {
        let mut t = LifecycleTracker::new();
        t.transition(LifecycleState::Connected);
        t.transition(LifecycleState::Active);
        assert!(t.transition(LifecycleState::Active));
    }
}
