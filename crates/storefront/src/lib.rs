//! Ivy Lane Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused from the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

/// Embedded storefront migrations, shared with the CLI `migrate` command.
#[must_use]
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
