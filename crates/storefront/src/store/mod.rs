//! Storage seams for carts and orders.
//!
//! The checkout pipeline talks to storage through the [`CartStore`] and
//! [`OrderStore`] traits so the whole pipeline can run against the in-memory
//! implementations in tests. Production wires the Postgres implementations
//! from [`crate::db`].

pub mod memory;

use async_trait::async_trait;
use copper_kettle_core::{CustomerId, Email, OrderId, ProductId};
use thiserror::Error;

use crate::models::{Cart, CartItem, Order};

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. duplicate order id).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The product is already in the cart.
    #[error("item already in cart")]
    DuplicateItem,

    /// The product has no line in the cart.
    #[error("item not found in cart")]
    ItemNotFound,
}

/// Per-customer cart storage.
///
/// All mutations are read-modify-write against the single cart record for the
/// customer; there is no cross-customer interaction.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The customer's cart, or an empty cart if none exists. Never persists a
    /// record as a side effect of reading.
    async fn get(&self, customer_id: &CustomerId) -> Result<Cart, StoreError>;

    /// Append a line with quantity 1, creating the cart record if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateItem`] if the product already has a line.
    async fn add_item(&self, customer_id: &CustomerId, item: CartItem) -> Result<(), StoreError>;

    /// Adjust a line's quantity by `delta`. A resulting quantity of zero or
    /// below removes the line rather than storing a non-positive quantity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ItemNotFound`] if the product has no line.
    async fn adjust_quantity(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<(), StoreError>;

    /// Remove a line. Idempotent; absent lines are not an error.
    async fn remove_item(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
    ) -> Result<(), StoreError>;

    /// Replace the item sequence with empty. Idempotent.
    async fn clear(&self, customer_id: &CustomerId) -> Result<(), StoreError>;
}

/// Order storage plus the per-year identifier sequencer.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Allocate the next order identifier for `year`.
    ///
    /// Allocation is linearizable across all concurrent callers: the serial
    /// comes from an atomic per-year counter, never from scanning existing
    /// orders, so concurrent placements always receive distinct, contiguous
    /// serials.
    async fn next_order_id(&self, year: i32) -> Result<OrderId, StoreError>;

    /// Persist a new order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the order id already exists.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Fetch one order by id.
    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Orders belonging to an email address, most recent first.
    async fn list_for_email(&self, email: &Email) -> Result<Vec<Order>, StoreError>;

    /// Every order, most recent first. Administrative use.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// The order holding a given gateway payment id, if any. Used to reject
    /// payment-id reuse.
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError>;

    /// Overwrite an order's mutable fields (status, line statuses, reason).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the order does not exist.
    async fn update(&self, order: &Order) -> Result<(), StoreError>;
}
