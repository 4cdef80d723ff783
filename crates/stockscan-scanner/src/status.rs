//! # Camera Status
//!
//! The closed lifecycle enumeration for a camera session.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Camera Session States                              │
//! │                                                                         │
//! │  ┌──────┐ start ┌────────────┐ granted ┌───────────┐ buffered ┌───────┐ │
//! │  │ Idle │──────►│ Requesting │────────►│ Attaching │─────────►│ Ready │ │
//! │  └──────┘       └─────┬──────┘         └─────┬─────┘          └───┬───┘ │
//! │                       │                      │                    │     │
//! │                       │                      │          play +    │     │
//! │                       │    any error         │          loop start│     │
//! │                       ▼                      ▼                    ▼     │
//! │                 ┌─────────────────────────────────┐         ┌────────┐ │
//! │                 │             Failed              │         │ Active │ │
//! │                 └───────────────┬─────────────────┘         └───┬────┘ │
//! │                                 │ stop                          │      │
//! │                                 ▼              stop / decoded   │      │
//! │                           ┌──────────┐ ◄────────────────────────┘      │
//! │                           │ Released │                                  │
//! │                           └──────────┘                                  │
//! │                                                                         │
//! │  Failed and Released are terminal for one attempt; start/retry         │
//! │  re-enters Requesting.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle state of a `CameraSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    /// No attempt has been made yet.
    #[default]
    Idle,
    /// Camera access requested, waiting for the grant.
    Requesting,
    /// Stream obtained and bound to the sink; waiting for buffered data.
    Attaching,
    /// Sink has enough data to begin playback.
    Ready,
    /// Playback running and the scan loop sampling frames.
    Active,
    /// Acquisition failed; see the session's last error.
    Failed,
    /// Resources released after stop, decode or owner teardown.
    Released,
}

impl CameraStatus {
    /// Terminal for a single attempt.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CameraStatus::Failed | CameraStatus::Released)
    }

    /// An attempt is underway or running; `start()` is refused in these states.
    #[inline]
    pub const fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CameraStatus::Requesting
                | CameraStatus::Attaching
                | CameraStatus::Ready
                | CameraStatus::Active
        )
    }

    /// Whether `self → next` is a legal transition.
    pub const fn can_transition_to(&self, next: CameraStatus) -> bool {
        use CameraStatus::*;

        match (*self, next) {
            (Idle | Failed | Released, Requesting) => true,
            (Requesting, Attaching) => true,
            (Attaching, Ready) => true,
            (Ready, Active) => true,
            (Requesting | Attaching | Ready | Active, Failed) => true,
            (Requesting | Attaching | Ready | Active | Failed, Released) => true,
            (Idle, _)
            | (Requesting, _)
            | (Attaching, _)
            | (Ready, _)
            | (Active, _)
            | (Failed, _)
            | (Released, _) => false,
        }
    }

    /// Short label for the status badge.
    pub const fn label(&self) -> &'static str {
        match self {
            CameraStatus::Idle => "idle",
            CameraStatus::Requesting => "requesting",
            CameraStatus::Attaching => "attaching",
            CameraStatus::Ready => "ready",
            CameraStatus::Active => "active",
            CameraStatus::Failed => "failed",
            CameraStatus::Released => "released",
        }
    }

    /// Hint shown under the viewfinder.
    pub const fn hint(&self) -> &'static str {
        match self {
            CameraStatus::Active => "Align the barcode inside the frame",
            CameraStatus::Requesting => "Check the camera permission prompt",
            CameraStatus::Attaching | CameraStatus::Ready => "Starting camera...",
            CameraStatus::Idle | CameraStatus::Failed | CameraStatus::Released => {
                "Use manual entry if the camera is unavailable"
            }
        }
    }
}

impl std::fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CameraStatus::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(Idle.can_transition_to(Requesting));
        assert!(Requesting.can_transition_to(Attaching));
        assert!(Attaching.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Active));
        assert!(Active.can_transition_to(Released));
    }

    #[test]
    fn test_failure_transitions() {
        for status in [Requesting, Attaching, Ready, Active] {
            assert!(status.can_transition_to(Failed), "{status} -> failed");
        }
        assert!(!Idle.can_transition_to(Failed));
        assert!(!Released.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Released));
        assert!(Failed.can_transition_to(Requesting));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!Idle.can_transition_to(Active));
        assert!(!Requesting.can_transition_to(Active));
        assert!(!Active.can_transition_to(Requesting));
        assert!(!Idle.can_transition_to(Released));
        assert!(!Released.can_transition_to(Released));
    }

    #[test]
    fn test_terminal_and_in_flight() {
        assert!(Failed.is_terminal());
        assert!(Released.is_terminal());
        assert!(!Active.is_terminal());
        assert!(Active.is_in_flight());
        assert!(!Idle.is_in_flight());
        assert!(!Failed.is_in_flight());
    }

    #[test]
    fn test_display() {
        assert_eq!(Active.to_string(), "active");
        assert_eq!(CameraStatus::default(), Idle);
    }
}
