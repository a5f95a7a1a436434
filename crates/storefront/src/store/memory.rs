//! In-memory store implementations.
//!
//! Used by the test suite and for running the service locally without
//! Postgres. Semantics mirror the Postgres implementations, including the
//! atomic per-year counter behind [`OrderStore::next_order_id`].

use std::collections::HashMap;

use async_trait::async_trait;
use copper_kettle_core::{CustomerId, Email, OrderId, ProductId};
use tokio::sync::{Mutex, RwLock};

use crate::models::{Cart, CartItem, Order};

use super::{CartStore, OrderStore, StoreError};

/// In-memory [`CartStore`].
#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<CustomerId, Vec<CartItem>>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn get(&self, customer_id: &CustomerId) -> Result<Cart, StoreError> {
        let carts = self.carts.read().await;
        Ok(Cart {
            customer_id: customer_id.clone(),
            items: carts.get(customer_id).cloned().unwrap_or_default(),
        })
    }

    async fn add_item(&self, customer_id: &CustomerId, item: CartItem) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        let items = carts.entry(customer_id.clone()).or_default();
        if items.iter().any(|line| line.product_id == item.product_id) {
            return Err(StoreError::DuplicateItem);
        }
        items.push(item);
        Ok(())
    }

    async fn adjust_quantity(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        let items = carts.get_mut(customer_id).ok_or(StoreError::ItemNotFound)?;
        let position = items
            .iter()
            .position(|line| &line.product_id == product_id)
            .ok_or(StoreError::ItemNotFound)?;

        let adjusted = i64::from(items[position].quantity) + i64::from(delta);
        if adjusted <= 0 {
            items.remove(position);
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                items[position].quantity = adjusted.min(i64::from(u32::MAX)) as u32;
            }
        }
        Ok(())
    }

    async fn remove_item(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
    ) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        if let Some(items) = carts.get_mut(customer_id) {
            items.retain(|line| &line.product_id != product_id);
        }
        Ok(())
    }

    async fn clear(&self, customer_id: &CustomerId) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        if let Some(items) = carts.get_mut(customer_id) {
            items.clear();
        }
        Ok(())
    }
}

/// In-memory [`OrderStore`].
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    /// Per-year serial counters. A `Mutex` rather than an atomic map entry:
    /// allocation must be linearizable across years too.
    counters: Mutex<HashMap<i32, u32>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn next_order_id(&self, year: i32) -> Result<OrderId, StoreError> {
        let mut counters = self.counters.lock().await;
        let serial = counters.entry(year).or_insert(0);
        *serial += 1;
        Ok(OrderId::new(year, *serial))
    }

    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.order_id
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| &o.order_id == order_id).cloned())
    }

    async fn list_for_email(&self, email: &Email) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|o| &o.email == email)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut all = orders.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|o| o.transaction_id.as_deref() == Some(payment_id))
            .cloned())
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .iter_mut()
            .find(|o| o.order_id == order.order_id)
            .ok_or(StoreError::NotFound)?;
        *slot = order.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use copper_kettle_core::Rupees;

    use super::*;

    fn item(product_id: &str, price: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            title: format!("Product {product_id}"),
            image: None,
            unit_price: Rupees::from(price),
            quantity: 1,
        }
    }

    #[tokio::test]
    async fn test_get_never_persists_empty_cart() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");

        let cart = store.get(&customer).await.expect("get");
        assert!(cart.is_empty());
        assert!(store.carts.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_adds_count_and_duplicate_rejected() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");

        for id in ["p1", "p2", "p3"] {
            store.add_item(&customer, item(id, 100)).await.expect("add");
        }
        assert_eq!(store.get(&customer).await.expect("get").items.len(), 3);

        let err = store
            .add_item(&customer, item("p2", 100))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::DuplicateItem));
        assert_eq!(store.get(&customer).await.expect("get").items.len(), 3);
    }

    #[tokio::test]
    async fn test_adjust_to_zero_removes_line() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");
        store.add_item(&customer, item("p1", 100)).await.expect("add");

        store
            .adjust_quantity(&customer, &ProductId::new("p1"), 2)
            .await
            .expect("increase");
        assert_eq!(store.get(&customer).await.expect("get").items[0].quantity, 3);

        store
            .adjust_quantity(&customer, &ProductId::new("p1"), -3)
            .await
            .expect("decrease to zero");
        assert!(store.get(&customer).await.expect("get").is_empty());
    }

    #[tokio::test]
    async fn test_adjust_below_zero_removes_line() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");
        store.add_item(&customer, item("p1", 100)).await.expect("add");

        store
            .adjust_quantity(&customer, &ProductId::new("p1"), -5)
            .await
            .expect("decrease below zero");
        assert!(store.get(&customer).await.expect("get").is_empty());
    }

    #[tokio::test]
    async fn test_adjust_missing_item() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");

        let err = store
            .adjust_quantity(&customer, &ProductId::new("ghost"), 1)
            .await
            .expect_err("missing");
        assert!(matches!(err, StoreError::ItemNotFound));
    }

    #[tokio::test]
    async fn test_remove_and_clear_are_idempotent() {
        let store = MemoryCartStore::new();
        let customer = CustomerId::new("c1");

        store
            .remove_item(&customer, &ProductId::new("ghost"))
            .await
            .expect("remove absent");

        store.add_item(&customer, item("p1", 100)).await.expect("add");
        store.clear(&customer).await.expect("clear");
        store.clear(&customer).await.expect("clear again");
        assert!(store.get(&customer).await.expect("get").is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_allocation_is_contiguous() {
        let store = Arc::new(MemoryOrderStore::new());
        let mut handles = Vec::new();

        for _ in 0..25 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(
                async move { store.next_order_id(2025).await },
            ));
        }

        let mut serials = Vec::new();
        for handle in handles {
            let id = handle.await.expect("join").expect("allocate");
            assert_eq!(id.year(), 2025);
            serials.push(id.serial());
        }

        serials.sort_unstable();
        assert_eq!(serials, (1..=25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_new_year_resets_serial() {
        let store = MemoryOrderStore::new();
        for _ in 0..3 {
            store.next_order_id(2024).await.expect("allocate");
        }

        let first_of_year = store.next_order_id(2025).await.expect("allocate");
        assert_eq!(first_of_year, OrderId::new(2025, 1));

        // The old year's counter is untouched
        let next_old = store.next_order_id(2024).await.expect("allocate");
        assert_eq!(next_old, OrderId::new(2024, 4));
    }
}
