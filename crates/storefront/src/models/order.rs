//! Orders and the identities that place them.
//!
//! An order is created exactly once per successful placement. Its line items
//! are a value copy of the cart at placement time and never change afterwards;
//! only the status fields (order status, per-item status, cancellation reason)
//! are mutable.

use chrono::{DateTime, Utc};
use copper_kettle_core::{
    CustomerId, Email, LineItemStatus, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    ProductId, Rupees,
};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;

/// An authenticated customer, resolved at the edge and passed explicitly into
/// every core operation. Nothing below the route layer reads request state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub customer_id: CustomerId,
    pub username: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// Contact fields supplied with a placement request. Email and phone fall
/// back to the authenticated identity when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: String,
}

/// Gateway identifiers attached to an online payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentDetails {
    pub provider_order_id: String,
    pub provider_payment_id: String,
}

/// One line of a placed order. Copied by value from a [`CartItem`]; carries
/// its own cancellation status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub unit_price: Rupees,
    pub quantity: u32,
    pub status: LineItemStatus,
}

impl From<CartItem> for OrderLineItem {
    fn from(item: CartItem) -> Self {
        Self {
            product_id: item.product_id,
            title: item.title,
            image: item.image,
            unit_price: item.unit_price,
            quantity: item.quantity,
            status: LineItemStatus::Active,
        }
    }
}

impl OrderLineItem {
    /// Price for this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.unit_price.times(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub username: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Gateway payment id for online payments, absent for cash on delivery.
    pub transaction_id: Option<String>,
    pub payment_details: Option<PaymentDetails>,
    pub items: Vec<OrderLineItem>,
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Rupees {
        self.items.iter().map(OrderLineItem::line_total).sum()
    }

    /// Mark the order and every line item cancelled, recording the reason.
    pub fn cancel(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.status = OrderStatus::Cancelled;
        self.cancel_reason = reason;
        for item in &mut self.items {
            item.status = LineItemStatus::Cancelled;
        }
        self.updated_at = now;
    }
}
