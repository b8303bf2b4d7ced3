//! Basket route handlers.
//!
//! The basket is keyed by the session for anonymous visitors and by the
//! user for signed-in ones. Every handler resolves the basket first, which
//! is where merge-on-login happens: the first authenticated touch re-parents
//! any anonymous basket the session still carries.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ivylane_core::{BasketId, ProductId};

use crate::db::baskets;
use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::models::{Basket, CurrentUser, session_keys};
use crate::state::AppState;

use super::catalog::CatalogItem;

/// Body for adding to / removing from the basket.
#[derive(Debug, Deserialize)]
pub struct BasketItemForm {
    /// Product ID.
    pub id: i32,
    /// Quantity; defaults to 1.
    #[serde(default = "default_count")]
    pub count: i32,
}

const fn default_count() -> i32 {
    1
}

/// Resolve the basket for this request.
///
/// Signed-in: fetch-or-create the user basket and fold in any anonymous
/// basket left in the session. Anonymous: reuse the session basket or
/// create one and remember its ID.
async fn resolve_basket(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<Basket> {
    if let Some(user) = user {
        let owned = baskets::get_or_create_for_user(state.pool(), user.id).await?;

        let anonymous_id: Option<BasketId> = session
            .get(session_keys::BASKET_ID)
            .await
            .ok()
            .flatten();
        if let Some(anonymous_id) = anonymous_id {
            if anonymous_id != owned.id
                && let Some(anonymous) = baskets::get(state.pool(), anonymous_id).await?
                && !anonymous.is_owned()
            {
                baskets::merge(state.pool(), anonymous.id, owned.id).await?;
                tracing::debug!(user = %user.id, "merged anonymous basket into user basket");
            }
            let _merged: Option<BasketId> = session
                .remove(session_keys::BASKET_ID)
                .await
                .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
        }

        return Ok(owned);
    }

    let session_id: Option<BasketId> = session
        .get(session_keys::BASKET_ID)
        .await
        .ok()
        .flatten();
    if let Some(id) = session_id
        && let Some(basket) = baskets::get(state.pool(), id).await?
        && !basket.is_owned()
    {
        return Ok(basket);
    }

    let basket = baskets::create_anonymous(state.pool()).await?;
    session
        .insert(session_keys::BASKET_ID, basket.id)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(basket)
}

/// Serialize the basket's lines.
///
/// Lines reuse the catalog item shape with `count` swapped for the basket
/// quantity.
async fn line_payload(state: &AppState, basket: Basket) -> Result<Vec<CatalogItem>> {
    let lines = baskets::lines(state.pool(), basket.id).await?;

    Ok(lines
        .into_iter()
        .map(|line| {
            let mut item = CatalogItem::from(line.product);
            item.count = line.count;
            item
        })
        .collect())
}

/// Basket contents.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Json<Vec<CatalogItem>>> {
    let basket = resolve_basket(&state, &session, user.as_ref()).await?;
    Ok(Json(line_payload(&state, basket).await?))
}

/// Add a product to the basket; responds with the updated contents.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Json(form): Json<BasketItemForm>,
) -> Result<Json<Vec<CatalogItem>>> {
    if form.count < 1 {
        return Err(AppError::BadRequest("count must be at least 1".to_string()));
    }

    let basket = resolve_basket(&state, &session, user.as_ref()).await?;
    baskets::add_item(state.pool(), basket.id, ProductId::new(form.id), form.count).await?;

    Ok(Json(line_payload(&state, basket).await?))
}

/// Remove units of a product from the basket; the line disappears when its
/// count reaches zero. Responds with the updated contents.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Json(form): Json<BasketItemForm>,
) -> Result<Json<Vec<CatalogItem>>> {
    if form.count < 1 {
        return Err(AppError::BadRequest("count must be at least 1".to_string()));
    }

    let basket = resolve_basket(&state, &session, user.as_ref()).await?;
    baskets::remove_item(state.pool(), basket.id, ProductId::new(form.id), form.count).await?;

    Ok(Json(line_payload(&state, basket).await?))
}
