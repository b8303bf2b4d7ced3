//! Order domain types and total computation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ivylane_core::{CategoryId, DeliveryType, OrderId, OrderStatus, PaymentType, ProductId, UserId};

use super::product::{ProductImage, Tag};

/// Orders below this subtotal pay the flat delivery surcharge.
const FREE_DELIVERY_THRESHOLD: u32 = 2000;

/// Flat delivery surcharge for small orders.
const DELIVERY_SURCHARGE: u32 = 200;

/// An order row.
///
/// `products` is the denormalized snapshot of purchased lines, stored as
/// JSONB so later catalog edits never rewrite order history.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    pub total_cost: Option<Decimal>,
    pub status: OrderStatus,
    pub city: Option<String>,
    pub address: Option<String>,
    pub products: serde_json::Value,
    pub user_id: Option<UserId>,
}

/// One purchased line inside an order snapshot.
///
/// Mirrors the basket line shape the client posts back at checkout. Unknown
/// extra fields are dropped; `price` and `count` are the only fields the
/// total computation reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: ProductId,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub price: Decimal,
    pub count: i64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub free_delivery: bool,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Editable order fields, applied by the order update endpoint.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_type: PaymentType,
    pub total_cost: Option<Decimal>,
    pub status: OrderStatus,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Sum of `price * count` over the snapshot lines.
#[must_use]
pub fn order_subtotal(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .map(|line| line.price * Decimal::from(line.count))
        .sum()
}

/// Final order total: subtotal plus the flat surcharge for small orders.
#[must_use]
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    let subtotal = order_subtotal(lines);
    if subtotal < Decimal::from(FREE_DELIVERY_THRESHOLD) {
        subtotal + Decimal::from(DELIVERY_SURCHARGE)
    } else {
        subtotal
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: u32, count: i64) -> OrderLine {
        OrderLine {
            id: ProductId::new(1),
            category: None,
            price: Decimal::from(price),
            count,
            date: None,
            title: "Walnut shelf".to_string(),
            description: None,
            free_delivery: false,
            images: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_subtotal_multiplies_by_count() {
        let lines = vec![line(500, 3), line(250, 2)];
        assert_eq!(order_subtotal(&lines), Decimal::from(2000));
    }

    #[test]
    fn test_small_order_pays_surcharge() {
        let lines = vec![line(500, 1)];
        assert_eq!(order_total(&lines), Decimal::from(700));
    }

    #[test]
    fn test_threshold_order_ships_free() {
        let lines = vec![line(2000, 1)];
        assert_eq!(order_total(&lines), Decimal::from(2000));
    }

    #[test]
    fn test_empty_snapshot_still_pays_surcharge() {
        assert_eq!(order_total(&[]), Decimal::from(200));
    }

    #[test]
    fn test_line_accepts_minimal_payload() {
        let json = r#"{"id": 5, "price": "99.90", "count": 2, "title": "Oak stool"}"#;
        let parsed: OrderLine = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, ProductId::new(5));
        assert_eq!(parsed.count, 2);
        assert!(parsed.images.is_empty());
    }
}
