//! Product detail and review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ivylane_core::{CategoryId, Email, ProductId};

use crate::db::products::{self, NewReview};
use crate::error::{AppError, Result};
use crate::models::{ProductDetail, ProductImage, Review, Specification, Tag};
use crate::state::AppState;

/// Product detail payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub id: ProductId,
    pub category: Option<CategoryId>,
    pub price: Decimal,
    pub count: i32,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub full_description: Option<String>,
    pub free_delivery: bool,
    pub images: Vec<ProductImage>,
    pub tags: Vec<Tag>,
    pub reviews: Vec<Review>,
    pub specifications: Vec<Specification>,
    pub rating: f64,
    pub sales_count: i32,
}

impl From<ProductDetail> for ProductPayload {
    fn from(detail: ProductDetail) -> Self {
        let card = detail.card;
        Self {
            id: card.id,
            category: card.category_id,
            price: card.price,
            count: card.count,
            date: card.created_at,
            title: card.title,
            description: card.description,
            full_description: card.full_description,
            free_delivery: card.free_delivery,
            images: card.images,
            tags: card.tags,
            reviews: detail.reviews,
            specifications: detail.specifications,
            rating: card.rating,
            sales_count: card.sales_count,
        }
    }
}

/// Review submission body.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: i32,
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductPayload>> {
    let detail = products::get_detail(state.pool(), ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductPayload::from(detail)))
}

/// Attach a review to a product.
#[instrument(skip(state, form))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = validate_review(form)?;

    let created = products::add_review(state.pool(), ProductId::new(id), &review)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Validate a review submission.
fn validate_review(form: ReviewForm) -> Result<NewReview> {
    let author = form.author.trim();
    if author.is_empty() {
        return Err(AppError::BadRequest("author is required".to_string()));
    }
    if author.len() > 100 {
        return Err(AppError::BadRequest(
            "author must be at most 100 characters".to_string(),
        ));
    }

    let email = Email::parse(form.email.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let text = form.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("text is required".to_string()));
    }

    if !(1..=5).contains(&form.rate) {
        return Err(AppError::BadRequest(
            "rate must be between 1 and 5".to_string(),
        ));
    }

    Ok(NewReview {
        author: author.to_owned(),
        email,
        text: text.to_owned(),
        rate: form.rate,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(rate: i32) -> ReviewForm {
        ReviewForm {
            author: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            text: "Sturdy and well finished.".to_string(),
            rate,
        }
    }

    #[test]
    fn test_validate_review_ok() {
        let review = validate_review(form(5)).unwrap();
        assert_eq!(review.author, "Ada");
        assert_eq!(review.rate, 5);
    }

    #[test]
    fn test_validate_review_rate_bounds() {
        assert!(validate_review(form(0)).is_err());
        assert!(validate_review(form(6)).is_err());
        assert!(validate_review(form(1)).is_ok());
    }

    #[test]
    fn test_validate_review_rejects_blank_author() {
        let mut bad = form(4);
        bad.author = "   ".to_string();
        assert!(matches!(
            validate_review(bad),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_validate_review_rejects_bad_email() {
        let mut bad = form(4);
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            validate_review(bad),
            Err(AppError::BadRequest(_))
        ));
    }
}
