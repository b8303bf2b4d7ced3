//! Sale listing route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ivylane_core::SaleId;

use crate::db::sales;
use crate::error::Result;
use crate::models::{Sale, SaleImage};
use crate::state::AppState;

/// Sale listing query parameters.
#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    /// 1-based page number; the frontend calls it `currentPage`.
    #[serde(rename = "currentPage")]
    pub current_page: Option<i64>,
}

/// One sale in the listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePayload {
    pub id: SaleId,
    pub price: Decimal,
    pub sale_price: Decimal,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub title: String,
    pub images: Vec<SaleImage>,
}

impl From<Sale> for SalePayload {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            price: sale.price,
            sale_price: sale.sale_price,
            date_from: sale.date_from,
            date_to: sale.date_to,
            title: sale.title,
            images: sale.images,
        }
    }
}

/// Sale listing response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPage {
    pub items: Vec<SalePayload>,
    pub current_page: i64,
    pub last_page: i64,
}

/// Paginated sale listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesPage>> {
    let page = query.current_page.unwrap_or(1).max(1);
    let result = sales::page(state.pool(), page).await?;

    Ok(Json(SalesPage {
        items: result.items.into_iter().map(SalePayload::from).collect(),
        current_page: result.current_page,
        last_page: result.last_page,
    }))
}
