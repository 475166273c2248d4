use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry for an external payment event that has been applied.
/// Write-once; only ever pruned by age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedExternalEvent {
    /// The payment provider's event identifier
    pub event_id: String,
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
}
