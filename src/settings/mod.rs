/// Site settings: one row of branding copy, seeded with defaults at process
/// start and mutable only by admins.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::MarketError;
use crate::identity::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- Defaults

pub const DEFAULT_HERO_TITLE: &str = "Find Your Perfect Tree";
pub const DEFAULT_HERO_DESCRIPTION: &str = "Connect with property owners, demolition sites, \
and tree sellers. Quality ex-ground stock for landscape architects, developers, and enthusiasts.";
pub const DEFAULT_CTA_TITLE: &str = "Ready to Get Started?";
pub const DEFAULT_CTA_DESCRIPTION: &str = "Whether you have trees to sell or are looking for \
the perfect specimen, Tree Market connects you with the right people.";

// endregion: --- Defaults

// region:    --- Settings Model

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub logo_url: Option<String>,
    pub hero_title: String,
    pub hero_description: String,
    pub cta_title: String,
    pub cta_description: String,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted on update. Absent fields leave the stored value alone;
/// `logoUrl` is an opaque string (callers send a size-capped data URI).
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub logo_url: Option<String>,
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub cta_title: Option<String>,
    pub cta_description: Option<String>,
}

// endregion: --- Settings Model

// region:    --- Settings Operations

const GET_SETTINGS: &str = r#"
    SELECT logo_url, hero_title, hero_description, cta_title, cta_description, updated_at
    FROM site_settings
    WHERE id = 1
"#;

const SEED_SETTINGS: &str = r#"
    INSERT INTO site_settings (id, hero_title, hero_description, cta_title, cta_description)
    VALUES (1, $1, $2, $3, $4)
    ON CONFLICT (id) DO NOTHING
"#;

const UPDATE_SETTINGS: &str = r#"
    UPDATE site_settings
    SET logo_url = COALESCE($1, logo_url),
        hero_title = COALESCE($2, hero_title),
        hero_description = COALESCE($3, hero_description),
        cta_title = COALESCE($4, cta_title),
        cta_description = COALESCE($5, cta_description),
        updated_at = now()
    WHERE id = 1
    RETURNING logo_url, hero_title, hero_description, cta_title, cta_description, updated_at
"#;

/// Write the default row if none exists. Runs once at startup so reads never
/// race to create the singleton.
pub async fn initialize_settings(db: &DatabaseManager) -> Result<(), MarketError> {
    sqlx::query(SEED_SETTINGS)
        .bind(DEFAULT_HERO_TITLE)
        .bind(DEFAULT_HERO_DESCRIPTION)
        .bind(DEFAULT_CTA_TITLE)
        .bind(DEFAULT_CTA_DESCRIPTION)
        .execute(db.pool())
        .await
        .map_err(MarketError::Storage)?;
    Ok(())
}

pub async fn get_settings(db: &DatabaseManager) -> Result<SiteSettings, MarketError> {
    let settings = sqlx::query_as::<_, SiteSettings>(GET_SETTINGS)
        .fetch_one(db.pool())
        .await?;
    Ok(settings)
}

/// Admins only. `caller` is the resolved user, if any.
pub fn ensure_admin(caller: Option<&User>) -> Result<(), MarketError> {
    match caller {
        Some(user) if user.is_admin => Ok(()),
        _ => Err(MarketError::Authorization),
    }
}

pub async fn update_settings(
    db: &DatabaseManager,
    caller: Option<&User>,
    update: SettingsUpdate,
) -> Result<SiteSettings, MarketError> {
    ensure_admin(caller)?;
    info!("{:<12} --> settings update", "Settings");
    let settings = sqlx::query_as::<_, SiteSettings>(UPDATE_SETTINGS)
        .bind(&update.logo_url)
        .bind(&update.hero_title)
        .bind(&update.hero_description)
        .bind(&update.cta_title)
        .bind(&update.cta_description)
        .fetch_one(db.pool())
        .await?;
    Ok(settings)
}

// endregion: --- Settings Operations

// endregion: --- Tests
