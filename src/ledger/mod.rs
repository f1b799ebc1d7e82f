// region:    --- Imports
use crate::bidding::model::{Bid, NewBid};
use crate::database::DatabaseManager;
use crate::error::MarketError;
use crate::listing::model::Listing;
use crate::query;
use async_trait::async_trait;
use std::sync::Arc;
// endregion: --- Imports

// region:    --- Ledger Head

/// Snapshot of a listing's bid ledger at read time.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct LedgerHead {
    pub highest_amount: Option<i64>,
    pub seq: i64,
}

// endregion: --- Ledger Head

// region:    --- Bid Ledger

/// Store seam for bid placement.
#[async_trait]
pub trait BidLedger {
    async fn load_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketError>;

    async fn head(&self, listing_id: i64) -> Result<LedgerHead, MarketError>;

    /// Conditionally append at `bid.seq`. `None` means another writer took
    /// that position first; the caller must re-read the head and revalidate.
    async fn append(&self, bid: NewBid) -> Result<Option<Bid>, MarketError>;
}

pub struct PostgresBidLedger {
    db: Arc<DatabaseManager>,
}

impl PostgresBidLedger {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

// Status is left to its `pending` default; no code path transitions it.
const APPEND_BID: &str = r#"
    INSERT INTO bids (listing_id, bidder_id, amount, message, seq)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (listing_id, seq) DO NOTHING
    RETURNING id, listing_id, bidder_id, amount, message, status, seq, created_at
"#;

#[async_trait]
impl BidLedger for PostgresBidLedger {
    async fn load_listing(&self, listing_id: i64) -> Result<Option<Listing>, MarketError> {
        query::handlers::find_listing(&self.db, listing_id).await
    }

    async fn head(&self, listing_id: i64) -> Result<LedgerHead, MarketError> {
        query::handlers::get_ledger_head(&self.db, listing_id).await
    }

    async fn append(&self, bid: NewBid) -> Result<Option<Bid>, MarketError> {
        let appended = sqlx::query_as::<_, Bid>(APPEND_BID)
            .bind(bid.listing_id)
            .bind(bid.bidder_id)
            .bind(bid.amount)
            .bind(&bid.message)
            .bind(bid.seq)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(appended)
    }
}

// endregion: --- Bid Ledger
