//! Sale repository.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use ivylane_core::SaleId;

use super::RepositoryError;
use crate::models::{Sale, SaleImage};

/// Fixed sale listing page size.
pub const SALES_PAGE_SIZE: i64 = 10;

/// One page of the sale listing.
#[derive(Debug, Clone)]
pub struct SalesPage {
    pub items: Vec<Sale>,
    pub current_page: i64,
    pub last_page: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: SaleId,
    title: String,
    price: Decimal,
    sale_price: Decimal,
    date_from: NaiveDate,
    date_to: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleImageRow {
    sale_id: i32,
    src: String,
    alt: String,
}

/// A page of sales, newest start date first; out-of-range pages clamp.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn page(pool: &PgPool, page: i64) -> Result<SalesPage, RepositoryError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM storefront.sale")
        .fetch_one(pool)
        .await?;

    let pages = (total + SALES_PAGE_SIZE - 1) / SALES_PAGE_SIZE;
    let last_page = if pages < 1 { 1 } else { pages };
    let current_page = page.clamp(1, last_page);
    let offset = (current_page - 1) * SALES_PAGE_SIZE;

    let rows = sqlx::query_as::<_, SaleRow>(
        r"
        SELECT id, title, price, sale_price, date_from, date_to
        FROM storefront.sale
        ORDER BY date_from DESC, id
        LIMIT $1 OFFSET $2
        ",
    )
    .bind(SALES_PAGE_SIZE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
    let mut images: HashMap<i32, Vec<SaleImage>> = HashMap::new();
    if !ids.is_empty() {
        let image_rows = sqlx::query_as::<_, SaleImageRow>(
            r"
            SELECT sale_id, src, alt
            FROM storefront.sale_image
            WHERE sale_id = ANY($1)
            ORDER BY sale_id, id
            ",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        for row in image_rows {
            images.entry(row.sale_id).or_default().push(SaleImage {
                src: row.src,
                alt: row.alt,
            });
        }
    }

    let items = rows
        .into_iter()
        .map(|row| {
            let id = row.id.as_i32();
            Sale {
                id: row.id,
                title: row.title,
                price: row.price,
                sale_price: row.sale_price,
                date_from: row.date_from,
                date_to: row.date_to,
                images: images.remove(&id).unwrap_or_default(),
            }
        })
        .collect();

    Ok(SalesPage {
        items,
        current_page,
        last_page,
    })
}
