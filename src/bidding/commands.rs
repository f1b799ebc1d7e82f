/// Bid placement: eligibility checks, strict amount floor, optimistic append.
// region:    --- Imports
use crate::bidding::model::{Bid, NewBid};
use crate::error::MarketError;
use crate::ledger::BidLedger;
use crate::listing::model::{ListingStatus, PricingType};
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Commands

/// Bid submission on behalf of an already-resolved bidder.
#[derive(Debug, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub message: Option<String>,
}

// Bound on optimistic-append retries under contention.
const MAX_RETRIES: u32 = 100;

/// The amount a new bid must strictly exceed: the highest recorded bid or the
/// starting price, whichever is greater.
pub fn bid_floor(highest_bid: Option<i64>, starting_price: Option<i64>) -> i64 {
    highest_bid.unwrap_or(0).max(starting_price.unwrap_or(0))
}

/// Place a bid against an active auction listing.
///
/// The append is conditional on the ledger position observed at read time; a
/// lost race re-reads the head and revalidates the floor before trying again,
/// so two concurrent submissions can never both land below each other.
pub async fn place_bid(cmd: PlaceBidCommand, ledger: &impl BidLedger) -> Result<Bid, MarketError> {
    info!("{:<12} --> place bid: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let listing = ledger
            .load_listing(cmd.listing_id)
            .await?
            .ok_or(MarketError::NotFound("Listing"))?;

        if listing.status != ListingStatus::Active {
            return Err(MarketError::InvalidState("Listing is no longer active"));
        }
        if listing.pricing_type != PricingType::Auction {
            return Err(MarketError::InvalidState(
                "This listing does not accept bids",
            ));
        }

        let head = ledger.head(cmd.listing_id).await?;
        let floor = bid_floor(head.highest_amount, listing.price);
        if cmd.amount <= floor {
            return Err(MarketError::Validation(format!(
                "Bid must be higher than ${floor}"
            )));
        }

        let appended = ledger
            .append(NewBid {
                listing_id: cmd.listing_id,
                bidder_id: cmd.bidder_id,
                amount: cmd.amount,
                message: cmd.message.clone(),
                seq: head.seq + 1,
            })
            .await?;

        match appended {
            Some(bid) => return Ok(bid),
            None => {
                warn!(
                    "{:<12} --> ledger position {} taken for listing {}, retrying",
                    "Command",
                    head.seq + 1,
                    cmd.listing_id
                );
                retries += 1;
            }
        }
    }

    Err(MarketError::Contention)
}

// endregion: --- Commands

// endregion: --- Tests
