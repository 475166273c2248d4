use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events that can trigger booking state transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BookingEvent {
    /// Payment settled
    Confirm,
    /// Admin- or guest-initiated cancellation with a mandatory reason
    Cancel(String),
    /// Another booking for the same dates was confirmed first
    Supersede(Uuid),
}

impl BookingEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel(_) => "cancel",
            Self::Supersede(_) => "supersede",
        }
    }

    /// Reason recorded on the booking when this event cancels it
    pub fn cancellation_reason(&self) -> Option<String> {
        match self {
            Self::Cancel(reason) => Some(reason.clone()),
            Self::Supersede(winner) => Some(format!(
                "{} (booking {winner})",
                crate::constants::policy::SUPERSEDED_REASON
            )),
            Self::Confirm => None,
        }
    }

    /// Check if this event represents a terminal transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancel(_) | Self::Supersede(_))
    }
}

/// Helper for creating common events
impl BookingEvent {
    pub fn cancel_with_reason(reason: impl Into<String>) -> Self {
        Self::Cancel(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supersede_reason_names_winner() {
        let winner = Uuid::new_v4();
        let reason = BookingEvent::Supersede(winner).cancellation_reason().unwrap();
        assert!(reason.starts_with("system:"));
        assert!(reason.contains(&winner.to_string()));
    }

    #[test]
    fn test_terminal_events() {
        assert!(BookingEvent::cancel_with_reason("guest request").is_terminal());
        assert!(!BookingEvent::Confirm.is_terminal());
    }
}
