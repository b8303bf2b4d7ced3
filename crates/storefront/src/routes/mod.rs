//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Catalog
//! GET  /api/categories          - Nested category tree
//! GET  /api/catalog             - Filtered/sorted/paginated products
//! GET  /api/products/popular    - Curated top products
//! GET  /api/products/limited    - Limited-edition products
//! GET  /api/banners             - Newest products for banners
//! GET  /api/tags                - All tags
//! GET  /api/product/{id}        - Product detail
//! POST /api/product/{id}/reviews - Add a review
//!
//! # Basket
//! GET    /api/basket            - Basket contents
//! POST   /api/basket            - Add product {id, count}
//! DELETE /api/basket            - Remove product {id, count}
//!
//! # Orders
//! GET  /api/orders              - Current user's orders
//! POST /api/orders              - Create order from snapshot
//! GET  /api/order/{id}          - Order detail
//! POST /api/order/{id}          - Update checkout fields
//! POST /api/payment/{id}        - Confirm payment
//!
//! # Sales
//! GET  /api/sales               - Paginated sale listing
//!
//! # Auth (rate limited)
//! POST /api/sign-in             - Sign in
//! POST /api/sign-up             - Register
//! POST /api/sign-out            - Sign out
//!
//! # Profile (requires auth)
//! GET  /api/profile             - Profile + avatar
//! POST /api/profile             - Update contact details
//! POST /api/profile/avatar      - Upload avatar (multipart)
//! POST /api/profile/password    - Change password
//! ```

pub mod auth;
pub mod basket;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod profile;
pub mod sales;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(catalog::categories))
        .route("/catalog", get(catalog::catalog))
        .route("/products/popular", get(catalog::popular))
        .route("/products/limited", get(catalog::limited))
        .route("/banners", get(catalog::banners))
        .route("/tags", get(catalog::tags))
        .route("/product/{id}", get(products::show))
        .route("/product/{id}/reviews", post(products::create_review))
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new().route(
        "/basket",
        get(basket::show).post(basket::add).delete(basket::remove),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list).post(orders::create))
        .route("/order/{id}", get(orders::detail).post(orders::update))
        .route("/payment/{id}", post(orders::payment))
}

/// Create the auth routes router (brute-force rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-out", post(auth::sign_out))
        .layer(auth_rate_limiter())
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/avatar", post(profile::upload_avatar))
        .route("/profile/password", post(profile::change_password))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(basket_routes())
        .merge(order_routes())
        .route("/sales", get(sales::index))
        .merge(auth_routes())
        .merge(profile_routes());

    Router::new().nest("/api", api)
}
