/// Identity boundary: every request that names an authenticated principal
/// resolves it here, before any domain work. Domain code never provisions
/// users.
// region:    --- Imports
use crate::database::DatabaseManager;
use crate::error::MarketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
// endregion: --- Imports

// region:    --- User Model

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "business_type", rename_all = "snake_case")]
pub enum BusinessType {
    LandscapeArchitect,
    Developer,
    Demolition,
    Enthusiast,
    Other,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub auth0_id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<BusinessType>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// endregion: --- User Model

// region:    --- Identity Operations

// The no-op DO UPDATE makes the insert return the existing row untouched, so
// profile hints only apply on first contact.
const ENSURE_USER: &str = r#"
    INSERT INTO users (auth0_id, email, name)
    VALUES ($1, $2, $3)
    ON CONFLICT (auth0_id) DO UPDATE SET auth0_id = EXCLUDED.auth0_id
    RETURNING id, auth0_id, email, name, phone, business_name, business_type,
        is_admin, created_at, updated_at
"#;

const FIND_USER: &str = r#"
    SELECT id, auth0_id, email, name, phone, business_name, business_type,
        is_admin, created_at, updated_at
    FROM users
    WHERE auth0_id = $1
"#;

/// Resolve the user for an external subject id, creating the record on first
/// contact. Idempotent: repeated calls return the same row.
pub async fn ensure_user(
    db: &DatabaseManager,
    auth0_id: &str,
    email: Option<&str>,
    name: Option<&str>,
) -> Result<User, MarketError> {
    info!("{:<12} --> ensure user {}", "Identity", auth0_id);
    let user = sqlx::query_as::<_, User>(ENSURE_USER)
        .bind(auth0_id)
        .bind(email.unwrap_or(""))
        .bind(name)
        .fetch_one(db.pool())
        .await?;
    Ok(user)
}

/// Look up a user without creating one.
pub async fn find_user(
    db: &DatabaseManager,
    auth0_id: &str,
) -> Result<Option<User>, MarketError> {
    let user = sqlx::query_as::<_, User>(FIND_USER)
        .bind(auth0_id)
        .fetch_optional(db.pool())
        .await?;
    Ok(user)
}

// endregion: --- Identity Operations

// endregion: --- Tests
