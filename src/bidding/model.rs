use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states a bid can carry. Only `pending` is ever written; the
/// remaining states exist in the data model without any transition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "bid_status", rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

// Bid as persisted. `seq` is the per-listing ledger position backing the
// conditional append.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub message: Option<String>,
    pub status: BidStatus,
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

/// A bid that passed validation and is ready to append at `seq`.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub message: Option<String>,
    pub seq: i64,
}
