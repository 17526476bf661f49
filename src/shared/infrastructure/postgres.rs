// PostgreSQL connection pool.
//
// The schema is not migrated from here; `sql/schema.sql` documents what the
// adapters expect.

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(url = %mask_connection_string(&config.url), "connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(3600))
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("database connection established");
    Ok(pool)
}

/// Replaces the credentials of a connection URL for logging.
pub fn mask_connection_string(url: &str) -> String {
    match (url.find("//"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &url[..scheme_end + 2], &url[at..])
        }
        _ => match url.find("//") {
            Some(scheme_end) => url[..scheme_end + 2].to_string() + "****",
            None => "****".to_string(),
        },
    }
}
