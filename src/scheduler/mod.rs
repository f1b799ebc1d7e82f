/// Listing expiry sweeper. Sellers may give a listing an expiry timestamp;
/// once it passes, the listing stops accepting bids and drops out of the
/// index by moving to the expired status.
// region:    --- Imports
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};
// endregion: --- Imports

// region:    --- Expiry Scheduler

const SWEEP_INTERVAL_SECS: u64 = 60;

const EXPIRE_LISTINGS: &str = r#"
    UPDATE listings
    SET status = 'expired', updated_at = now()
    WHERE status = 'active' AND expires_at IS NOT NULL AND expires_at <= $1
"#;

pub struct ExpiryScheduler {
    pool: Arc<PgPool>,
}

impl ExpiryScheduler {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Spawn the sweep loop next to the request loop.
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                interval.tick().await;
                if let Err(e) = Self::expire_listings(&pool).await {
                    error!("{:<12} --> expiry sweep failed: {:?}", "Scheduler", e);
                }
            }
        });
    }

    async fn expire_listings(pool: &PgPool) -> Result<(), sqlx::Error> {
        let result = sqlx::query(EXPIRE_LISTINGS)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(
                "{:<12} --> expired {} listing(s)",
                "Scheduler",
                result.rows_affected()
            );
        }

        Ok(())
    }
}

// endregion: --- Expiry Scheduler
