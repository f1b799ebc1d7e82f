// region:    --- Imports
use crate::database::DatabaseManager;
use crate::species::AlaClient;
use crate::upload::ImageStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod bidding;
mod database;
mod error;
mod handlers;
mod identity;
mod ledger;
mod listing;
mod query;
mod scheduler;
mod settings;
mod species;
mod upload;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let db_manager = Arc::new(DatabaseManager::new().await?);

    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> database ready", "Main");

    // Seed the settings singleton up front so reads never have to create it.
    settings::initialize_settings(&db_manager).await?;
    info!("{:<12} --> site settings ready", "Main");

    // Expiry sweeps run beside the request loop.
    let scheduler = scheduler::ExpiryScheduler::new(db_manager.get_pool());
    scheduler.start().await;

    let species_client = Arc::new(AlaClient::new());

    let upload_dir =
        std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads/listings".to_string());
    let image_store = Arc::new(ImageStore::new(upload_dir, "/uploads/listings"));

    // Browser clients live on another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes_all = Router::new()
        .route(
            "/listings",
            get(handlers::handle_list_listings).post(handlers::handle_create_listing),
        )
        .route("/listings/:id", get(handlers::handle_get_listing))
        .route("/bids", post(handlers::handle_place_bid))
        .route("/user/me", get(handlers::handle_get_me))
        .route(
            "/admin/settings",
            get(handlers::handle_get_settings).put(handlers::handle_update_settings),
        )
        .route("/upload", post(handlers::handle_upload_images))
        .route("/species/search", get(handlers::handle_search_species))
        .route("/species/:guid", get(handlers::handle_get_species))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 30)) // five 5MB images plus multipart framing
        .with_state((db_manager, species_client, image_store));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
