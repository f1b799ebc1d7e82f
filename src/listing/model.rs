// region:    --- Imports
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
// endregion: --- Imports

// region:    --- Enums

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "pricing_type", rename_all = "lowercase")]
pub enum PricingType {
    Fixed,
    Auction,
}

impl std::str::FromStr for PricingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(PricingType::Fixed),
            "auction" => Ok(PricingType::Auction),
            other => Err(format!("unknown pricing type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "listing_status", rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Sold,
    Expired,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "health_status", rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

// endregion: --- Enums

// region:    --- Pickup Window

/// Seller-declared collection availability. Exactly one shape per window,
/// selected by the `type` tag on the wire and in the jsonb column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PickupWindow {
    #[serde(rename_all = "camelCase")]
    Specific {
        date: NaiveDate,
        start_time: Option<String>,
        end_time: Option<String>,
        notes: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Range {
        start_date: NaiveDate,
        end_date: NaiveDate,
        notes: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Flexible {
        days_of_week: Vec<DayOfWeek>,
        notes: Option<String>,
    },
}

// endregion: --- Pickup Window

// region:    --- Listing

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub species: String,
    pub height: Option<f64>,
    pub trunk_diameter: Option<f64>,
    pub canopy_width: Option<f64>,
    pub age: Option<i32>,
    pub health_status: Option<HealthStatus>,
    pub address: String,
    pub suburb: String,
    pub state: String,
    pub postcode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pricing_type: PricingType,
    pub price: Option<i64>,
    pub status: ListingStatus,
    pub images: Vec<String>,
    pub pickup_windows: Json<Vec<PickupWindow>>,
    pub seller_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Derived asking price; never stored. For auctions the highest bid wins
    /// over the starting price.
    pub fn current_price(&self, highest_bid: Option<i64>) -> CurrentPrice {
        match self.pricing_type {
            PricingType::Fixed => match self.price {
                Some(amount) => CurrentPrice::Fixed { amount },
                None => CurrentPrice::ContactForPrice,
            },
            PricingType::Auction => match (highest_bid, self.price) {
                (Some(amount), _) => CurrentPrice::HighestBid { amount },
                (None, Some(amount)) => CurrentPrice::StartingPrice { amount },
                (None, None) => CurrentPrice::NoBids,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurrentPrice {
    Fixed { amount: i64 },
    ContactForPrice,
    HighestBid { amount: i64 },
    StartingPrice { amount: i64 },
    NoBids,
}

// endregion: --- Listing

// endregion: --- Tests
