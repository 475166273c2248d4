use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
    /// Awaiting an online gateway payment; the gateway session governs timeout
    Pending,
    /// Awaiting a deferred bank-style payment, held until `expires_at`
    PendingPayment,
    /// Payment settled
    Confirmed,
    /// Terminal
    Cancelled,
}

impl BookingState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the booking is still waiting on a payment
    pub fn is_awaiting_payment(&self) -> bool {
        matches!(self, Self::Pending | Self::PendingPayment)
    }

    /// Non-cancelled bookings occupy their dates
    pub fn occupies_calendar(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::PendingPayment => write!(f, "pending_payment"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for BookingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "pending_payment" => Ok(Self::PendingPayment),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid booking state: {s}")),
        }
    }
}

impl Default for BookingState {
    fn default() -> Self {
        Self::Pending
    }
}

/// Settlement status of the booking's payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    /// Refund issued out-of-band after a lost confirmation race or cancellation
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "unpaid"),
            Self::Paid => write!(f, "paid"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// How the guest pays; decides the initial booking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash or admin-recorded payment
    Manual,
    /// Deferred bank-style transfer
    BankTransfer,
    /// Hosted checkout at an online payment gateway
    OnlineGateway,
}

impl PaymentMethod {
    /// State a freshly created booking starts in
    pub fn initial_state(&self) -> BookingState {
        match self {
            Self::Manual => BookingState::Confirmed,
            Self::BankTransfer => BookingState::PendingPayment,
            Self::OnlineGateway => BookingState::Pending,
        }
    }

    /// Payment status a freshly created booking starts with
    pub fn initial_payment_status(&self) -> PaymentStatus {
        match self {
            Self::Manual => PaymentStatus::Paid,
            Self::BankTransfer | Self::OnlineGateway => PaymentStatus::Unpaid,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::BankTransfer => write!(f, "bank_transfer"),
            Self::OnlineGateway => write!(f, "online_gateway"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_state_terminal_check() {
        assert!(BookingState::Cancelled.is_terminal());
        assert!(!BookingState::Pending.is_terminal());
        assert!(!BookingState::PendingPayment.is_terminal());
        assert!(!BookingState::Confirmed.is_terminal());
    }

    #[test]
    fn test_initial_state_by_payment_method() {
        assert_eq!(PaymentMethod::Manual.initial_state(), BookingState::Confirmed);
        assert_eq!(
            PaymentMethod::BankTransfer.initial_state(),
            BookingState::PendingPayment
        );
        assert_eq!(
            PaymentMethod::OnlineGateway.initial_state(),
            BookingState::Pending
        );
        assert_eq!(
            PaymentMethod::Manual.initial_payment_status(),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(BookingState::PendingPayment.to_string(), "pending_payment");
        assert_eq!(
            "confirmed".parse::<BookingState>().unwrap(),
            BookingState::Confirmed
        );
        assert!("resolved".parse::<BookingState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&BookingState::PendingPayment).unwrap();
        assert_eq!(json, "\"pending_payment\"");

        let parsed: BookingState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BookingState::PendingPayment);
    }
}
