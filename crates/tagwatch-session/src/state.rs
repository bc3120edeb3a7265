//! Run flag and detection-loop states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared run flag for one watcher: Stopped or Running.
///
/// This is the only value mutated from both the consumer context and the
/// background poll worker, so every access goes through an atomic with
/// acquire/release ordering. Clones share the same flag.
///
/// # Examples
///
/// ```
/// use tagwatch_session::RunFlag;
///
/// let flag = RunFlag::new();
/// assert!(!flag.is_running());
///
/// assert!(flag.begin());
/// assert!(!flag.begin()); // already running
///
/// assert!(flag.halt());
/// assert!(!flag.halt()); // already stopped
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// Create a new flag in the Stopped state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt the Stopped → Running transition.
    ///
    /// Returns `true` if this call made the transition, `false` if the flag
    /// was already Running.
    pub fn begin(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Request the Running → Stopped transition.
    ///
    /// Returns `true` if the flag was Running.
    pub fn halt(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Current state of the flag.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// States of the detection loop within one run.
///
/// The loop alternates between searching for a target and confirming that a
/// present target has been removed; arrival and departure each emit one
/// event at the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionState {
    /// A passive-target selection is outstanding.
    Searching,

    /// A target was selected; presence is being confirmed until it departs.
    Monitoring,
}

impl DetectionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagwatch_session::DetectionState;
    ///
    /// assert!(DetectionState::Searching.can_transition_to(&DetectionState::Monitoring));
    /// assert!(DetectionState::Monitoring.can_transition_to(&DetectionState::Searching));
    /// assert!(!DetectionState::Searching.can_transition_to(&DetectionState::Searching));
    /// ```
    #[must_use]
    pub fn can_transition_to(&self, target: &DetectionState) -> bool {
        matches!(
            (self, target),
            (DetectionState::Searching, DetectionState::Monitoring)
                | (DetectionState::Monitoring, DetectionState::Searching)
        )
    }
}

impl fmt::Display for DetectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionState::Searching => write!(f, "Searching"),
            DetectionState::Monitoring => write!(f, "Monitoring"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_stopped() {
        let flag = RunFlag::new();
        assert!(!flag.is_running());
        assert!(!flag.halt());
    }

    #[test]
    fn test_begin_is_accepted_once() {
        let flag = RunFlag::new();
        assert!(flag.begin());
        assert!(flag.is_running());
        assert!(!flag.begin());
    }

    #[test]
    fn test_halt_returns_previous_state() {
        let flag = RunFlag::new();
        flag.begin();
        assert!(flag.halt());
        assert!(!flag.is_running());
        assert!(!flag.halt());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let flag = RunFlag::new();
        let clone = flag.clone();
        flag.begin();
        assert!(clone.is_running());
        clone.halt();
        assert!(!flag.is_running());
    }

    #[test]
    fn test_transition_matrix() {
        use DetectionState::*;
        assert!(Searching.can_transition_to(&Monitoring));
        assert!(Monitoring.can_transition_to(&Searching));
        assert!(!Searching.can_transition_to(&Searching));
        assert!(!Monitoring.can_transition_to(&Monitoring));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(DetectionState::Searching.to_string(), "Searching");
        assert_eq!(DetectionState::Monitoring.to_string(), "Monitoring");
    }

    #[test]
    fn test_state_serde_round_trip() {
        let json = serde_json::to_string(&DetectionState::Monitoring).unwrap();
        assert_eq!(json, "\"monitoring\"");
        let back: DetectionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DetectionState::Monitoring);
    }
}
