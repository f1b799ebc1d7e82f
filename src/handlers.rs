// region:    --- Imports
use crate::bidding::commands::{place_bid, PlaceBidCommand};
use crate::database::DatabaseManager;
use crate::error::MarketError;
use crate::identity;
use crate::ledger::PostgresBidLedger;
use crate::listing::commands::{create_listing, ListingDraft};
use crate::listing::model::PricingType;
use crate::query;
use crate::query::handlers::ListingFilter;
use crate::settings::{self, SettingsUpdate};
use crate::species::{self, AlaClient, SpeciesSuggestion};
use crate::upload::{self, ImageStore};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

pub type AppState = (Arc<DatabaseManager>, Arc<AlaClient>, Arc<ImageStore>);

/// Bids returned to API consumers include this many entries.
const API_BID_LIMIT: i64 = 10;

// region:    --- Wire Types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidRequest {
    pub listing_id: Option<i64>,
    pub amount: Option<i64>,
    pub message: Option<String>,
    pub auth0_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub auth0_id: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    #[serde(flatten)]
    pub draft: ListingDraft,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    pub species: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub pricing_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeParams {
    pub auth0_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub is_admin: bool,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub auth0_id: Option<String>,
    #[serde(flatten)]
    pub update: SettingsUpdate,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesSearchParams {
    pub q: Option<String>,
}

// An empty auth0Id counts as no identity at all.
fn principal(auth0_id: Option<String>) -> Result<String, MarketError> {
    auth0_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(MarketError::Authentication)
}

// endregion: --- Wire Types

// region:    --- Command Handlers

/// Place a bid against an auction listing.
pub async fn handle_place_bid(
    State((db_manager, _, _)): State<AppState>,
    Json(req): Json<PlaceBidRequest>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> bid request", "Command");

    let auth0_id = principal(req.auth0_id)?;
    let (listing_id, amount) = match (req.listing_id, req.amount) {
        (Some(listing_id), Some(amount)) => (listing_id, amount),
        _ => {
            return Err(MarketError::Validation(
                "Listing ID and amount are required".to_string(),
            ))
        }
    };

    let bidder = identity::ensure_user(
        &db_manager,
        &auth0_id,
        req.user_email.as_deref(),
        req.user_name.as_deref(),
    )
    .await?;

    let ledger = PostgresBidLedger::new(Arc::clone(&db_manager));
    let bid = place_bid(
        PlaceBidCommand {
            listing_id,
            bidder_id: bidder.id,
            amount,
            message: req.message,
        },
        &ledger,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(bid)))
}

/// Create a listing for the authenticated seller.
pub async fn handle_create_listing(
    State((db_manager, _, _)): State<AppState>,
    Json(req): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> create listing request", "Command");

    let auth0_id = principal(req.auth0_id)?;
    // Required fields are checked before the seller record is touched.
    let cmd = req.draft.validate()?;

    let seller = identity::ensure_user(
        &db_manager,
        &auth0_id,
        req.user_email.as_deref(),
        req.user_name.as_deref(),
    )
    .await?;

    let listing = create_listing(cmd, seller.id, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Replace site settings; admins only.
pub async fn handle_update_settings(
    State((db_manager, _, _)): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> settings update request", "Command");

    let auth0_id = principal(req.auth0_id)?;
    let caller = identity::find_user(&db_manager, &auth0_id).await?;
    let updated = settings::update_settings(&db_manager, caller.as_ref(), req.update).await?;
    Ok(Json(updated))
}

/// Store up to five images and return their public URLs.
pub async fn handle_upload_images(
    State((_, _, image_store)): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> upload request", "Command");

    let mut files: Vec<(String, Option<String>, axum::body::Bytes)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MarketError::Validation(e.to_string()))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| MarketError::Validation(e.to_string()))?;
        files.push((file_name, content_type, bytes));
    }

    if files.is_empty() {
        return Err(MarketError::Validation("No files provided".to_string()));
    }
    if files.len() > upload::MAX_FILES {
        return Err(MarketError::Validation(
            "Maximum 5 images allowed".to_string(),
        ));
    }
    for (name, content_type, bytes) in &files {
        upload::validate_file(name, content_type.as_deref(), bytes.len())?;
    }

    let mut urls = Vec::with_capacity(files.len());
    for (name, _, bytes) in &files {
        urls.push(image_store.save(name, bytes).await?);
    }

    Ok(Json(serde_json::json!({ "urls": urls })))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// Active listings, optionally filtered.
pub async fn handle_list_listings(
    State((db_manager, _, _)): State<AppState>,
    Query(params): Query<ListingQueryParams>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> list listings", "HandlerQuery");

    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let pricing_type = match non_empty(params.pricing_type) {
        Some(raw) => Some(
            raw.parse::<PricingType>()
                .map_err(MarketError::Validation)?,
        ),
        None => None,
    };
    let filter = ListingFilter {
        species: non_empty(params.species),
        suburb: non_empty(params.suburb),
        state: non_empty(params.state),
        pricing_type,
    };

    let listings = query::handlers::list_listings(&db_manager, filter).await?;
    Ok(Json(listings))
}

/// One listing with seller profile and top bids.
pub async fn handle_get_listing(
    State((db_manager, _, _)): State<AppState>,
    Path(listing_id): Path<i64>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> get listing id: {}", "HandlerQuery", listing_id);
    let detail =
        query::handlers::get_listing_detail(&db_manager, listing_id, API_BID_LIMIT).await?;
    Ok(Json(detail))
}

/// Resolve (and on first contact create) the calling user.
pub async fn handle_get_me(
    State((db_manager, _, _)): State<AppState>,
    Query(params): Query<MeParams>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> who am i", "HandlerQuery");

    let auth0_id = params
        .auth0_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| MarketError::Validation("auth0Id required".to_string()))?;

    let user = identity::ensure_user(
        &db_manager,
        &auth0_id,
        params.email.as_deref(),
        params.name.as_deref(),
    )
    .await?;

    Ok(Json(MeResponse {
        is_admin: user.is_admin,
        name: user.name,
        email: user.email,
    }))
}

/// Current site settings.
pub async fn handle_get_settings(
    State((db_manager, _, _)): State<AppState>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> get settings", "HandlerQuery");
    let current = settings::get_settings(&db_manager).await?;
    Ok(Json(current))
}

/// Species autocomplete proxy.
pub async fn handle_search_species(
    State((_, species_client, _)): State<AppState>,
    Query(params): Query<SpeciesSearchParams>,
) -> Result<Json<Vec<SpeciesSuggestion>>, MarketError> {
    let q = params.q.unwrap_or_default();
    if q.trim().len() < species::MIN_QUERY_LEN {
        return Ok(Json(vec![]));
    }
    let suggestions = species_client.search(q.trim()).await?;
    Ok(Json(suggestions))
}

/// Species detail proxy.
pub async fn handle_get_species(
    State((_, species_client, _)): State<AppState>,
    Path(guid): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let detail = species_client
        .detail(&guid)
        .await?
        .ok_or(MarketError::NotFound("Species"))?;
    Ok(Json(detail))
}

// endregion: --- Query Handlers
