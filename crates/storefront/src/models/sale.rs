//! Sale domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use ivylane_core::SaleId;

/// A sale (promotion) row plus its images.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: SaleId,
    pub title: String,
    pub price: Decimal,
    pub sale_price: Decimal,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub images: Vec<SaleImage>,
}

/// A sale banner image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleImage {
    pub src: String,
    pub alt: String,
}
