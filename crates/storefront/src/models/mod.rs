//! Domain models for the storefront.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartItem};
pub use order::{ContactDetails, CustomerIdentity, Order, OrderLineItem, PaymentDetails};
