//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! ecom-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! server library at compile time.

use secrecy::SecretString;

use ecom_cart_server::db;

/// Errors from running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if `DATABASE_URL` is unset, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!(
        migrations = db::MIGRATOR.iter().count(),
        "Running migrations..."
    );
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
