//! Order route handlers: payment intents, placement, history, cancellation.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use copper_kettle_core::{Email, OrderId, PaymentMethod};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::{ContactDetails, Order};
use crate::services::PaymentConfirmation;
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-order", post(create_payment_order))
        .route("/verify-payment", post(verify_payment))
        .route("/order", post(place_order))
        .route("/orders", get(list_orders))
        .route("/cancel/{order_id}", put(cancel_order))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Contact fields shared by the placement payloads.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: String,
}

impl From<ContactRequest> for ContactDetails {
    fn from(req: ContactRequest) -> Self {
        Self {
            email: req.email,
            phone: req.phone,
            address: req.address,
        }
    }
}

/// Payload for the gateway verification callback.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
    #[serde(flatten)]
    pub contact: ContactRequest,
}

/// Payload for cash-on-delivery placement.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub contact: ContactRequest,
}

/// Payload for customer cancellation.
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

/// A provider-side payment order, plus the key id the checkout widget needs.
#[derive(Debug, Serialize)]
pub struct PaymentOrderResponse {
    pub provider_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// A freshly placed order.
#[derive(Debug, Serialize)]
pub struct PlacedOrderResponse {
    pub order_id: OrderId,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/order/create-payment-order` - Register a gateway payment order
/// for the customer's cart total.
pub async fn create_payment_order(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
) -> Result<Json<PaymentOrderResponse>> {
    let intent = state.checkout().create_payment_intent(&identity).await?;
    Ok(Json(PaymentOrderResponse {
        provider_order_id: intent.provider_order_id,
        amount: intent.amount,
        currency: intent.currency,
        key_id: state.config().razorpay.key_id.clone(),
    }))
}

/// `POST /api/order/verify-payment` - Verify the gateway confirmation and
/// place the order.
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<PlacedOrderResponse>> {
    let confirmation = PaymentConfirmation {
        provider_order_id: req.provider_order_id,
        provider_payment_id: req.provider_payment_id,
        signature: req.signature,
    };
    let order_id = state
        .checkout()
        .confirm_payment_and_place_order(&identity, confirmation, req.contact.into())
        .await?;
    Ok(Json(PlacedOrderResponse { order_id }))
}

/// `POST /api/order/order` - Place a cash-on-delivery order.
pub async fn place_order(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlacedOrderResponse>> {
    let order_id = state
        .checkout()
        .place_cash_on_delivery_order(&identity, req.payment_method, req.contact.into())
        .await?;
    Ok(Json(PlacedOrderResponse { order_id }))
}

/// `GET /api/order/orders` - The customer's order history, most recent first.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
) -> Result<Json<Vec<Order>>> {
    let orders = state.checkout().list_orders(&identity).await?;
    Ok(Json(orders))
}

/// `PUT /api/order/cancel/{order_id}` - Cancel one of the customer's orders.
pub async fn cancel_order(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Path(order_id): Path<OrderId>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<serde_json::Value>> {
    state
        .checkout()
        .cancel_order(&identity, order_id, req.reason)
        .await?;
    Ok(Json(serde_json::json!({ "message": "Order cancelled" })))
}
