//! Basket repository.
//!
//! Baskets are either user-owned (one per user) or anonymous, keyed through
//! the session. Merge-on-login re-parents anonymous items onto the user's
//! basket in a single transaction, summing counts where the same product is
//! in both.

use sqlx::PgPool;

use ivylane_core::{BasketId, ProductId, UserId};

use super::{RepositoryError, products};
use crate::models::{Basket, BasketLine};

/// Fetch a basket by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get(pool: &PgPool, id: BasketId) -> Result<Option<Basket>, RepositoryError> {
    let basket = sqlx::query_as::<_, Basket>(
        "SELECT id, user_id FROM storefront.basket WHERE id = $1",
    )
    .bind(id.as_i32())
    .fetch_optional(pool)
    .await?;

    Ok(basket)
}

/// Fetch or create the basket owned by a user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn get_or_create_for_user(
    pool: &PgPool,
    user_id: UserId,
) -> Result<Basket, RepositoryError> {
    // ON CONFLICT DO UPDATE so the row comes back whether or not it existed
    let basket = sqlx::query_as::<_, Basket>(
        r"
        INSERT INTO storefront.basket (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING id, user_id
        ",
    )
    .bind(user_id.as_i32())
    .fetch_one(pool)
    .await?;

    Ok(basket)
}

/// Create a fresh anonymous basket.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn create_anonymous(pool: &PgPool) -> Result<Basket, RepositoryError> {
    let basket = sqlx::query_as::<_, Basket>(
        "INSERT INTO storefront.basket DEFAULT VALUES RETURNING id, user_id",
    )
    .fetch_one(pool)
    .await?;

    Ok(basket)
}

/// Merge one basket's items into another and delete the source basket.
///
/// Counts are summed when both baskets contain the same product. Deleting
/// the source basket cascades to any leftover rows.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn merge(
    pool: &PgPool,
    from: BasketId,
    into: BasketId,
) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
        INSERT INTO storefront.basket_item (basket_id, product_id, count)
        SELECT $2, product_id, count
        FROM storefront.basket_item
        WHERE basket_id = $1
        ON CONFLICT (basket_id, product_id)
        DO UPDATE SET count = storefront.basket_item.count + EXCLUDED.count
        ",
    )
    .bind(from.as_i32())
    .bind(into.as_i32())
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM storefront.basket WHERE id = $1")
        .bind(from.as_i32())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Add `count` units of a product to a basket.
///
/// Returns `RepositoryError::NotFound` if the product does not exist or is
/// soft-deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn add_item(
    pool: &PgPool,
    basket_id: BasketId,
    product_id: ProductId,
    count: i32,
) -> Result<(), RepositoryError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM storefront.product WHERE id = $1 AND NOT is_deleted)",
    )
    .bind(product_id.as_i32())
    .fetch_one(pool)
    .await?;

    if !exists {
        return Err(RepositoryError::NotFound);
    }

    sqlx::query(
        r"
        INSERT INTO storefront.basket_item (basket_id, product_id, count)
        VALUES ($1, $2, $3)
        ON CONFLICT (basket_id, product_id)
        DO UPDATE SET count = storefront.basket_item.count + EXCLUDED.count
        ",
    )
    .bind(basket_id.as_i32())
    .bind(product_id.as_i32())
    .bind(count)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove `count` units of a product from a basket, deleting the line when
/// its count drops to zero or below.
///
/// Returns `RepositoryError::NotFound` if the basket has no line for the
/// product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn remove_item(
    pool: &PgPool,
    basket_id: BasketId,
    product_id: ProductId,
    count: i32,
) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;

    let current: Option<i32> = sqlx::query_scalar(
        r"
        SELECT count FROM storefront.basket_item
        WHERE basket_id = $1 AND product_id = $2
        FOR UPDATE
        ",
    )
    .bind(basket_id.as_i32())
    .bind(product_id.as_i32())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(current) = current else {
        return Err(RepositoryError::NotFound);
    };

    let remaining = current - count;
    if remaining > 0 {
        sqlx::query(
            r"
            UPDATE storefront.basket_item
            SET count = $3
            WHERE basket_id = $1 AND product_id = $2
            ",
        )
        .bind(basket_id.as_i32())
        .bind(product_id.as_i32())
        .bind(remaining)
        .execute(&mut *tx)
        .await?;
    } else {
        sqlx::query(
            "DELETE FROM storefront.basket_item WHERE basket_id = $1 AND product_id = $2",
        )
        .bind(basket_id.as_i32())
        .bind(product_id.as_i32())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    product_id: i32,
    count: i32,
}

/// The basket's lines, product snapshot included.
///
/// Lines whose product has been soft-deleted since it was added are
/// silently dropped from the payload.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn lines(pool: &PgPool, basket_id: BasketId) -> Result<Vec<BasketLine>, RepositoryError> {
    let items = sqlx::query_as::<_, ItemRow>(
        r"
        SELECT product_id, count
        FROM storefront.basket_item
        WHERE basket_id = $1
        ORDER BY id
        ",
    )
    .bind(basket_id.as_i32())
    .fetch_all(pool)
    .await?;

    let ids: Vec<i32> = items.iter().map(|item| item.product_id).collect();
    let cards = products::cards_by_ids(pool, &ids).await?;

    let mut counts = std::collections::HashMap::new();
    for item in items {
        counts.insert(item.product_id, item.count);
    }

    Ok(cards
        .into_iter()
        .filter_map(|product| {
            let count = counts.get(&product.id.as_i32()).copied()?;
            Some(BasketLine { product, count })
        })
        .collect())
}
