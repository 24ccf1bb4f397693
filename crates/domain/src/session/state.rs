//! Session lifecycle states.

use serde::{Deserialize, Serialize};

/// The state of a shopping session.
///
/// State transitions:
/// ```text
/// Active ──┬──► Completed   (Confirm, terminal)
///          ├──► Cancelled   (Cancel, terminal)
///          └──► Expired ───► Cancelled
/// ```
///
/// Expiry is detected lazily: a session past its window is only marked
/// `Expired` the next time a detection is recorded against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is open and accepting detections.
    #[default]
    Active,

    /// Purchase confirmed after payment (terminal state).
    Completed,

    /// Session was cancelled (terminal state).
    Cancelled,

    /// The expiry window lapsed before confirmation.
    Expired,
}

impl SessionStatus {
    /// Returns true if no further forward transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Returns the persisted string form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_active() {
        assert_eq!(SessionStatus::default(), SessionStatus::Active);
    }

    #[test]
    fn terminal_states() {
        assert!(!SessionStatus::Active.is_terminal());
        assert!(!SessionStatus::Expired.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn serializes_as_lowercase_string() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Expired).unwrap(),
            "\"expired\""
        );
        let back: SessionStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(back, SessionStatus::Cancelled);
    }

    #[test]
    fn display_matches_persisted_form() {
        assert_eq!(SessionStatus::Active.to_string(), "active");
        assert_eq!(SessionStatus::Completed.to_string(), "completed");
    }
}
