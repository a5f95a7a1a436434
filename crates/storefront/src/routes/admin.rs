//! Administrative order routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use copper_kettle_core::{OrderId, OrderStatus};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Order;
use crate::services::CheckoutError;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{order_id}/status", put(set_status))
}

/// Payload for the status override. The status arrives as its wire string
/// and is rejected with 400 when unrecognized.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// `GET /api/admin/orders` - Every order in the system, most recent first.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = state.checkout().list_all_orders().await?;
    Ok(Json(orders))
}

/// `PUT /api/admin/orders/{order_id}/status` - Override an order's status.
/// Bypasses the customer-cancellation guards.
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = req
        .status
        .parse()
        .map_err(|_| CheckoutError::InvalidStatus)?;
    let order = state.checkout().set_order_status(order_id, status).await?;
    Ok(Json(order))
}
