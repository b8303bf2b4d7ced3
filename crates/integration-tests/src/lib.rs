//! Integration tests for Ivy Lane.
//!
//! # Running Tests
//!
//! These tests drive a running storefront over HTTP and are `#[ignore]`d by
//! default. To run them:
//!
//! ```bash
//! # Start the database, run migrations, seed demo data
//! ivy-cli migrate
//! ivy-cli seed -f crates/cli/fixtures/demo.yaml
//!
//! # Start the storefront, then:
//! cargo test -p ivylane-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Base URL of the running storefront
//!   (default: `http://localhost:3000`)

use reqwest::Client;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client with a cookie store, so the session (and with it
/// the anonymous basket and sign-in state) persists across requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique username for registration tests.
#[must_use]
pub fn unique_username() -> String {
    format!("test-{}", uuid::Uuid::new_v4().simple())
}

/// Register a fresh account on the given client and return its username.
///
/// # Panics
///
/// Panics if the sign-up request fails.
pub async fn sign_up(client: &Client, password: &str) -> String {
    let username = unique_username();
    let resp = client
        .post(format!("{}/api/sign-up", base_url()))
        .json(&serde_json::json!({
            "name": "Test User",
            "username": username,
            "password": password,
        }))
        .send()
        .await
        .expect("sign-up request failed");
    assert!(resp.status().is_success(), "sign-up returned {}", resp.status());
    username
}
