//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ivylane_core::{CategoryId, ProductId, TagId};

/// A product image.
///
/// Serialized directly into catalog, basket, and order payloads.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductImage {
    pub src: String,
    pub alt: String,
}

/// A catalog tag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A name/value specification row for a product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

/// A product review.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: i32,
    pub date: DateTime<Utc>,
}

/// A product with the aggregates and relations every list payload carries.
///
/// `rating` is the average review rate (0.0 with no reviews); assembled by
/// the products repository from the base row plus batch-loaded images/tags.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub price: Decimal,
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub free_delivery: bool,
    pub sales_count: i32,
    pub rating: f64,
    pub reviews_count: i64,
    pub images: Vec<ProductImage>,
    pub tags: Vec<Tag>,
}

/// Full product detail: card plus reviews and specifications.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub card: ProductCard,
    pub reviews: Vec<Review>,
    pub specifications: Vec<Specification>,
}
