//! Cart route handlers.
//!
//! Every handler resolves the customer from the bearer token and operates
//! only on that customer's cart.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use copper_kettle_core::{CustomerId, ProductId, Rupees};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::{Cart, CartItem};
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show))
        .route("/add-to-cart", post(add))
        .route("/update-quantity/{product_id}", put(update_quantity))
        .route("/remove-from-cart/{product_id}", delete(remove))
        .route("/clear-cart", delete(clear))
}

// =============================================================================
// Request Types
// =============================================================================

/// Payload for adding a product to the cart. A snapshot of the product at
/// add time; the stored line keeps these values even if the catalog changes.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub unit_price: Rupees,
}

/// Payload for adjusting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// Signed change applied to the current quantity. A result of zero or
    /// below removes the line.
    pub delta: i32,
}

// =============================================================================
// Response Types
// =============================================================================

/// A cart as returned to the client, with computed totals.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub customer_id: CustomerId,
    pub items: Vec<CartLineResponse>,
    pub subtotal: Rupees,
}

/// One cart line with its computed total.
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub unit_price: Rupees,
    pub quantity: u32,
    pub total: Rupees,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            customer_id: cart.customer_id,
            items: cart
                .items
                .into_iter()
                .map(|item| CartLineResponse {
                    total: item.line_total(),
                    product_id: item.product_id,
                    title: item.title,
                    image: item.image,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                })
                .collect(),
            subtotal,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart/cart` - The customer's cart.
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
) -> Result<Json<CartResponse>> {
    let cart = state.carts().get(&identity.customer_id).await?;
    Ok(Json(cart.into()))
}

/// `POST /api/cart/add-to-cart` - Add a product with quantity 1.
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    let item = CartItem {
        product_id: req.product_id,
        title: req.title,
        image: req.image,
        unit_price: req.unit_price,
        quantity: 1,
    };
    state.carts().add_item(&identity.customer_id, item).await?;
    let cart = state.carts().get(&identity.customer_id).await?;
    Ok(Json(cart.into()))
}

/// `PUT /api/cart/update-quantity/{product_id}` - Adjust a line's quantity.
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Path(product_id): Path<ProductId>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>> {
    state
        .carts()
        .adjust_quantity(&identity.customer_id, &product_id, req.delta)
        .await?;
    let cart = state.carts().get(&identity.customer_id).await?;
    Ok(Json(cart.into()))
}

/// `DELETE /api/cart/remove-from-cart/{product_id}` - Remove a line.
/// Idempotent; removing an absent line succeeds.
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartResponse>> {
    state
        .carts()
        .remove_item(&identity.customer_id, &product_id)
        .await?;
    let cart = state.carts().get(&identity.customer_id).await?;
    Ok(Json(cart.into()))
}

/// `DELETE /api/cart/clear-cart` - Empty the cart. Idempotent.
pub async fn clear(
    State(state): State<AppState>,
    RequireCustomer(identity): RequireCustomer,
) -> Result<Json<CartResponse>> {
    state.carts().clear(&identity.customer_id).await?;
    let cart = state.carts().get(&identity.customer_id).await?;
    Ok(Json(cart.into()))
}
