//! Database operations for the storefront `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `carts` - One row per customer; line items as JSONB
//! - `orders` - Placed orders; line items and payment details as JSONB
//! - `order_counters` - One row per year; the atomic order-id sequencer
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and run via
//! `sqlx migrate run`. They are not applied automatically on startup.
//!
//! Queries use the runtime-checked sqlx API rather than the compile-time
//! macros, so the workspace builds without a live database.

pub mod carts;
pub mod orders;

pub use carts::PgCartStore;
pub use orders::PgOrderStore;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
