//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use ivylane_core::{DeliveryType, OrderId, OrderStatus, PaymentType};

use crate::db::orders;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::{Order, OrderLine, OrderUpdate, order::order_total};
use crate::state::AppState;

/// Order payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
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
}

impl From<Order> for OrderPayload {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            full_name: order.full_name,
            email: order.email,
            phone: order.phone,
            delivery_type: order.delivery_type,
            payment_type: order.payment_type,
            total_cost: order.total_cost,
            status: order.status,
            city: order.city,
            address: order.address,
            products: order.products,
        }
    }
}

/// Order update body (checkout confirmation step).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdateForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub payment_type: PaymentType,
    pub total_cost: Option<Decimal>,
    #[serde(default)]
    pub status: OrderStatus,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Current user's orders, newest first.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderPayload>>> {
    let orders = orders::list_for_user(state.pool(), user.id).await?;
    Ok(Json(orders.into_iter().map(OrderPayload::from).collect()))
}

/// Create an order from the posted basket snapshot.
///
/// The total is recomputed server-side from the lines; for signed-in buyers
/// the basket is emptied in the same transaction.
#[instrument(skip(state, user, lines))]
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(lines): Json<Vec<OrderLine>>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("order has no products".to_string()));
    }
    if let Some(line) = lines.iter().find(|line| line.count < 1) {
        return Err(AppError::BadRequest(format!(
            "product {} has a non-positive count",
            line.id
        )));
    }

    let total = order_total(&lines);
    let user_id = user.map(|u| u.id);
    let order_id = orders::create(state.pool(), user_id, &lines, total).await?;

    tracing::info!(order = %order_id, "order created");

    Ok((StatusCode::CREATED, Json(json!({ "orderId": order_id }))))
}

/// Order detail.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderPayload>> {
    let order = orders::get(state.pool(), OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(Json(OrderPayload::from(order)))
}

/// Apply the checkout fields (contact, delivery, payment) to an order.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<OrderUpdateForm>,
) -> Result<Json<serde_json::Value>> {
    let update = OrderUpdate {
        full_name: form.full_name,
        email: form.email,
        phone: form.phone,
        delivery_type: form.delivery_type,
        payment_type: form.payment_type,
        total_cost: form.total_cost,
        status: form.status,
        city: form.city,
        address: form.address,
    };

    orders::update(state.pool(), OrderId::new(id), &update).await?;

    Ok(Json(json!({ "orderId": id })))
}

/// Confirm payment: the order moves to `accepted`.
///
/// The card details the frontend posts are deliberately ignored; there is
/// no payment provider behind this endpoint.
#[instrument(skip(state, _body))]
pub async fn payment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _body: Option<Json<serde_json::Value>>,
) -> Result<StatusCode> {
    orders::set_status(state.pool(), OrderId::new(id), OrderStatus::Accepted).await?;

    tracing::info!(order = id, "order paid");

    Ok(StatusCode::OK)
}
