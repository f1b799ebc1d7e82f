/// Listing creation: required-field validation, then a single insert.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::MarketError;
use crate::listing::model::{HealthStatus, Listing, PickupWindow, PricingType};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::types::Json;
use tracing::info;
// endregion: --- Imports

// region:    --- Create Listing

/// Listing fields as submitted. Everything is optional until validated.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub species: Option<String>,
    pub height: Option<f64>,
    pub trunk_diameter: Option<f64>,
    pub canopy_width: Option<f64>,
    pub age: Option<i32>,
    pub health_status: Option<HealthStatus>,
    pub address: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pricing_type: Option<PricingType>,
    pub price: Option<i64>,
    pub images: Vec<String>,
    pub pickup_windows: Vec<PickupWindow>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A draft that passed required-field validation.
#[derive(Debug, Clone)]
pub struct CreateListingCommand {
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
    pub images: Vec<String>,
    pub pickup_windows: Vec<PickupWindow>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ListingDraft {
    /// Enforce the required set {title, species, address, suburb, state,
    /// postcode, pricingType}. Blank strings count as missing. Runs before
    /// any write happens for the request.
    pub fn validate(self) -> Result<CreateListingCommand, MarketError> {
        fn required(value: Option<String>) -> Result<String, MarketError> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MarketError::Validation("Missing required fields".to_string()))
        }

        Ok(CreateListingCommand {
            title: required(self.title)?,
            description: self.description,
            species: required(self.species)?,
            height: self.height,
            trunk_diameter: self.trunk_diameter,
            canopy_width: self.canopy_width,
            age: self.age,
            health_status: self.health_status,
            address: required(self.address)?,
            suburb: required(self.suburb)?,
            state: required(self.state)?,
            postcode: required(self.postcode)?,
            latitude: self.latitude,
            longitude: self.longitude,
            pricing_type: self.pricing_type.ok_or_else(|| {
                MarketError::Validation("Missing required fields".to_string())
            })?,
            price: self.price,
            images: self.images,
            pickup_windows: self.pickup_windows,
            expires_at: self.expires_at,
        })
    }
}

const INSERT_LISTING: &str = r#"
    INSERT INTO listings (
        title, description, species, height, trunk_diameter, canopy_width,
        age, health_status, address, suburb, state, postcode, latitude,
        longitude, pricing_type, price, images, pickup_windows, seller_id,
        expires_at
    )
    VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
        $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
    )
    RETURNING id, title, description, species, height, trunk_diameter,
        canopy_width, age, health_status, address, suburb, state, postcode,
        latitude, longitude, pricing_type, price, status, images,
        pickup_windows, seller_id, created_at, updated_at, expires_at
"#;

/// Insert a new listing for `seller_id`; status starts `active`.
pub async fn create_listing(
    cmd: CreateListingCommand,
    seller_id: i64,
    db: &DatabaseManager,
) -> Result<Listing, MarketError> {
    info!(
        "{:<12} --> create listing '{}' for seller {}",
        "Command", cmd.title, seller_id
    );
    let listing = sqlx::query_as::<_, Listing>(INSERT_LISTING)
        .bind(&cmd.title)
        .bind(&cmd.description)
        .bind(&cmd.species)
        .bind(cmd.height)
        .bind(cmd.trunk_diameter)
        .bind(cmd.canopy_width)
        .bind(cmd.age)
        .bind(cmd.health_status)
        .bind(&cmd.address)
        .bind(&cmd.suburb)
        .bind(&cmd.state)
        .bind(&cmd.postcode)
        .bind(cmd.latitude)
        .bind(cmd.longitude)
        .bind(cmd.pricing_type)
        .bind(cmd.price)
        .bind(&cmd.images)
        .bind(Json(&cmd.pickup_windows))
        .bind(seller_id)
        .bind(cmd.expires_at)
        .fetch_one(db.pool())
        .await?;
    Ok(listing)
}

// endregion: --- Create Listing

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> ListingDraft {
        ListingDraft {
            title: Some("Advanced Port Jackson Fig".to_string()),
            species: Some("Ficus rubiginosa".to_string()),
            address: Some("3 Harbour St".to_string()),
            suburb: Some("Kirribilli".to_string()),
            state: Some("NSW".to_string()),
            postcode: Some("2061".to_string()),
            pricing_type: Some(PricingType::Auction),
            price: Some(500),
            ..Default::default()
        }
    }

    #[test]
    fn complete_draft_validates() {
        let cmd = full_draft().validate().unwrap();
        assert_eq!(cmd.title, "Advanced Port Jackson Fig");
        assert_eq!(cmd.pricing_type, PricingType::Auction);
        assert_eq!(cmd.price, Some(500));
    }

    #[test]
    fn missing_suburb_fails_validation() {
        let draft = ListingDraft {
            suburb: None,
            ..full_draft()
        };
        let err = draft.validate().unwrap_err();
        match err {
            MarketError::Validation(msg) => assert_eq!(msg, "Missing required fields"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let draft = ListingDraft {
            postcode: Some("   ".to_string()),
            ..full_draft()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn missing_pricing_type_fails_validation() {
        let draft = ListingDraft {
            pricing_type: None,
            ..full_draft()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn required_strings_are_trimmed() {
        let draft = ListingDraft {
            title: Some("  Lemon-scented gum  ".to_string()),
            ..full_draft()
        };
        let cmd = draft.validate().unwrap();
        assert_eq!(cmd.title, "Lemon-scented gum");
    }

    #[test]
    fn draft_accepts_camel_case_wire_fields() {
        let draft: ListingDraft = serde_json::from_value(serde_json::json!({
            "title": "Dragon tree",
            "species": "Dracaena draco",
            "address": "9 Dune Ct",
            "suburb": "Scarborough",
            "state": "WA",
            "postcode": "6019",
            "pricingType": "fixed",
            "trunkDiameter": 0.4,
            "pickupWindows": [
                {"type": "flexible", "daysOfWeek": ["saturday", "sunday"]}
            ]
        }))
        .unwrap();
        let cmd = draft.validate().unwrap();
        assert_eq!(cmd.pricing_type, PricingType::Fixed);
        assert_eq!(cmd.trunk_diameter, Some(0.4));
        assert_eq!(cmd.pickup_windows.len(), 1);
    }
}
// endregion: --- Tests
