//! Order repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use ivylane_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine, OrderUpdate};

const ORDER_SELECT: &str = r#"
    SELECT id, created_at, full_name, email, phone, delivery_type,
           payment_type, total_cost, status, city, address, products, user_id
    FROM storefront."order"
    WHERE NOT is_deleted"#;

/// Create an order from a snapshot of purchased lines.
///
/// The snapshot is stored verbatim as JSONB. For signed-in buyers the
/// basket is emptied in the same transaction, so a failed insert never
/// loses the basket.
///
/// # Errors
///
/// Returns `RepositoryError::DataCorruption` if the snapshot cannot be
/// serialized, `RepositoryError::Database` if a query fails.
pub async fn create(
    pool: &PgPool,
    user_id: Option<UserId>,
    lines: &[OrderLine],
    total_cost: Decimal,
) -> Result<OrderId, RepositoryError> {
    let products = serde_json::to_value(lines)
        .map_err(|e| RepositoryError::DataCorruption(format!("unserializable snapshot: {e}")))?;

    let mut tx = pool.begin().await?;

    let order_id: OrderId = sqlx::query_scalar(
        r#"
        INSERT INTO storefront."order" (user_id, products, total_cost)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(user_id.map(|id| id.as_i32()))
    .bind(&products)
    .bind(total_cost)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(user_id) = user_id {
        sqlx::query(
            r"
            DELETE FROM storefront.basket_item
            WHERE basket_id IN (SELECT id FROM storefront.basket WHERE user_id = $1)
            ",
        )
        .bind(user_id.as_i32())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(order_id)
}

/// All orders placed by a user, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
    let sql = format!("{ORDER_SELECT} AND user_id = $1 ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(user_id.as_i32())
        .fetch_all(pool)
        .await?;

    Ok(orders)
}

/// Fetch one order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let sql = format!("{ORDER_SELECT} AND id = $1");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id.as_i32())
        .fetch_optional(pool)
        .await?;

    Ok(order)
}

/// Apply the editable checkout fields to an order.
///
/// Returns `RepositoryError::NotFound` if the order does not exist or is
/// soft-deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn update(
    pool: &PgPool,
    id: OrderId,
    update: &OrderUpdate,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE storefront."order"
        SET full_name = $2, email = $3, phone = $4, delivery_type = $5,
            payment_type = $6, total_cost = $7, status = $8, city = $9, address = $10
        WHERE id = $1 AND NOT is_deleted
        "#,
    )
    .bind(id.as_i32())
    .bind(&update.full_name)
    .bind(&update.email)
    .bind(&update.phone)
    .bind(update.delivery_type)
    .bind(update.payment_type)
    .bind(update.total_cost)
    .bind(update.status)
    .bind(&update.city)
    .bind(&update.address)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Transition an order's status.
///
/// Returns `RepositoryError::NotFound` if the order does not exist or is
/// soft-deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn set_status(
    pool: &PgPool,
    id: OrderId,
    status: OrderStatus,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"UPDATE storefront."order" SET status = $2 WHERE id = $1 AND NOT is_deleted"#,
    )
    .bind(id.as_i32())
    .bind(status)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}
