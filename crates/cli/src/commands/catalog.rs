//! Catalog administration commands: soft delete, restore, free delivery.
//!
//! The storefront never hard-deletes catalog rows; these commands toggle
//! the flags its queries filter on.

use super::{CommandError, connect};

/// Which soft-deletable table a command targets.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Products,
    Categories,
    Orders,
}

impl Target {
    const fn table(self) -> &'static str {
        match self {
            Self::Products => "storefront.product",
            Self::Categories => "storefront.category",
            Self::Orders => r#"storefront."order""#,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
        }
    }
}

/// Flag or unflag rows as deleted.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the update fails.
pub async fn set_deleted(target: Target, ids: &[i32], deleted: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    let sql = format!(
        "UPDATE {} SET is_deleted = $1 WHERE id = ANY($2)",
        target.table()
    );
    let result = sqlx::query(&sql)
        .bind(deleted)
        .bind(ids)
        .execute(&pool)
        .await?;

    let verb = if deleted { "soft-deleted" } else { "restored" };
    tracing::info!(
        "{} {} of {} requested {}",
        verb,
        result.rows_affected(),
        ids.len(),
        target.label()
    );

    Ok(())
}

/// Toggle free delivery for products.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the update fails.
pub async fn set_free_delivery(ids: &[i32], enabled: bool) -> Result<(), CommandError> {
    let pool = connect().await?;

    let result = sqlx::query("UPDATE storefront.product SET free_delivery = $1 WHERE id = ANY($2)")
        .bind(enabled)
        .bind(ids)
        .execute(&pool)
        .await?;

    tracing::info!(
        "free delivery {} for {} of {} requested products",
        if enabled { "enabled" } else { "disabled" },
        result.rows_affected(),
        ids.len()
    );

    Ok(())
}
