//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (pings Postgres)
//!
//! # Cart (requires customer auth)
//! GET    /api/cart/cart                         - Current cart
//! POST   /api/cart/add-to-cart                  - Add a product (quantity 1)
//! PUT    /api/cart/update-quantity/{product_id} - Adjust a line's quantity
//! DELETE /api/cart/remove-from-cart/{product_id} - Remove a line
//! DELETE /api/cart/clear-cart                   - Empty the cart
//!
//! # Orders (requires customer auth)
//! POST /api/order/create-payment-order          - Register a gateway payment order
//! POST /api/order/verify-payment                - Verify payment and place the order
//! POST /api/order/order                         - Place a cash-on-delivery order
//! GET  /api/order/orders                        - Order history
//! PUT  /api/order/cancel/{order_id}             - Cancel an order
//!
//! # Admin (requires admin auth)
//! GET  /api/admin/orders                        - All orders
//! PUT  /api/admin/orders/{order_id}/status      - Override an order's status
//! ```

pub mod admin;
pub mod cart;
pub mod orders;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/cart", cart::router())
        .nest("/api/order", orders::router())
        .nest("/api/admin", admin::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
