//! Cart and cart line items.
//!
//! A cart is mutable and owned by exactly one customer. Line items carry a
//! snapshot of the product's title, image, and unit price taken when the item
//! was added; later catalog changes never affect a cart line, and a placed
//! order copies these values again.

use copper_kettle_core::{CustomerId, ProductId, Rupees};
use serde::{Deserialize, Serialize};

/// One line in a customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub title: String,
    pub image: Option<String>,
    /// Unit price snapshot taken at add time.
    pub unit_price: Rupees,
    /// Always >= 1; a quantity reaching zero removes the line instead.
    pub quantity: u32,
}

impl CartItem {
    /// Price for this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.unit_price.times(self.quantity)
    }
}

/// A customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart for a customer. Reading a cart that was never written
    /// returns this; it is not persisted.
    #[must_use]
    pub const fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a product already has a line in this cart.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Rupees {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
