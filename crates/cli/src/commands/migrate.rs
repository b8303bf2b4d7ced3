//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ivy-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`)

use super::{CommandError, connect};

/// Run storefront database migrations.
///
/// Migration files live in `crates/storefront/migrations/` and are embedded
/// into the storefront crate at compile time.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    ivylane_storefront::migrator().run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
