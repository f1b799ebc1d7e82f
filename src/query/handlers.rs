// region:    --- Imports
use super::queries;
use crate::bidding::model::Bid;
use crate::database::DatabaseManager;
use crate::error::MarketError;
use crate::ledger::LedgerHead;
use crate::listing::model::{CurrentPrice, Listing, PricingType};
use serde::Serialize;
use tracing::info;
// endregion: --- Imports

// region:    --- Read Models

/// Optional filters for the listing index. All default to "no constraint".
#[derive(Debug, Default, Clone)]
pub struct ListingFilter {
    pub species: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub pricing_type: Option<PricingType>,
}

/// Listing row annotated with its seller summary.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub listing: Listing,
    pub seller_name: Option<String>,
    pub seller_business_name: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub email: String,
}

/// Bid annotated with the bidder's display name.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bid: Bid,
    pub bidder_name: Option<String>,
}

/// Full listing page payload: listing, seller, derived price, top bids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Listing,
    pub seller: SellerProfile,
    pub current_price: CurrentPrice,
    pub bids: Vec<BidView>,
}

// endregion: --- Read Models

// region:    --- Query Handlers

/// Active listings matching `filter`, newest first.
pub async fn list_listings(
    db: &DatabaseManager,
    filter: ListingFilter,
) -> Result<Vec<ListingSummary>, MarketError> {
    info!("{:<12} --> list listings {:?}", "Query", filter);
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, ListingSummary>(queries::LIST_ACTIVE_LISTINGS)
                .bind(filter.species)
                .bind(filter.suburb)
                .bind(filter.state)
                .bind(filter.pricing_type)
                .fetch_all(&mut **tx)
                .await
                .map_err(MarketError::from)
        })
    })
    .await
}

/// One listing, if it exists.
pub async fn find_listing(
    db: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Listing>, MarketError> {
    info!("{:<12} --> find listing id: {}", "Query", listing_id);
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                .bind(listing_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(MarketError::from)
        })
    })
    .await
}

/// Listing with seller profile and the top `bid_limit` bids, all read from
/// one snapshot.
pub async fn get_listing_detail(
    db: &DatabaseManager,
    listing_id: i64,
    bid_limit: i64,
) -> Result<ListingDetail, MarketError> {
    info!("{:<12} --> listing detail id: {}", "Query", listing_id);
    db.transaction(|tx| {
        Box::pin(async move {
            let listing = sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                .bind(listing_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(MarketError::NotFound("Listing"))?;

            let seller = sqlx::query_as::<_, SellerProfile>(queries::GET_SELLER_PROFILE)
                .bind(listing.seller_id)
                .fetch_one(&mut **tx)
                .await?;

            let bids = sqlx::query_as::<_, BidView>(queries::GET_TOP_BIDS)
                .bind(listing_id)
                .bind(bid_limit)
                .fetch_all(&mut **tx)
                .await?;

            // Amount-descending order puts the highest bid first.
            let highest = bids.first().map(|b| b.bid.amount);
            Ok(ListingDetail {
                current_price: listing.current_price(highest),
                listing,
                seller,
                bids,
            })
        })
    })
    .await
}

/// Current ledger head for a listing's bids.
pub async fn get_ledger_head(
    db: &DatabaseManager,
    listing_id: i64,
) -> Result<LedgerHead, MarketError> {
    db.transaction(|tx| {
        Box::pin(async move {
            sqlx::query_as::<_, LedgerHead>(queries::GET_LEDGER_HEAD)
                .bind(listing_id)
                .fetch_one(&mut **tx)
                .await
                .map_err(MarketError::from)
        })
    })
    .await
}

// endregion: --- Query Handlers
