//! Postgres cart store.
//!
//! One row per customer, line items as a JSONB array. All mutations are
//! read-modify-write against that single row; per-record atomicity is enough
//! because no operation touches more than one customer's cart.

use async_trait::async_trait;
use copper_kettle_core::{CustomerId, ProductId};
use sqlx::{PgPool, Row};

use crate::models::{Cart, CartItem};
use crate::store::{CartStore, StoreError};

/// [`CartStore`] backed by the `carts` table.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, customer_id: &CustomerId) -> Result<Vec<CartItem>, StoreError> {
        let row = sqlx::query("SELECT items FROM carts WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items: serde_json::Value = row.try_get("items")?;
                serde_json::from_value(items).map_err(|e| {
                    StoreError::DataCorruption(format!("invalid cart items in database: {e}"))
                })
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save_items(
        &self,
        customer_id: &CustomerId,
        items: &[CartItem],
    ) -> Result<(), StoreError> {
        let items = serde_json::to_value(items).map_err(|e| {
            StoreError::DataCorruption(format!("failed to serialize cart items: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO carts (customer_id, items, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (customer_id)
            DO UPDATE SET items = EXCLUDED.items, updated_at = NOW()
            ",
        )
        .bind(customer_id)
        .bind(items)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get(&self, customer_id: &CustomerId) -> Result<Cart, StoreError> {
        let items = self.load_items(customer_id).await?;
        Ok(Cart {
            customer_id: customer_id.clone(),
            items,
        })
    }

    async fn add_item(&self, customer_id: &CustomerId, item: CartItem) -> Result<(), StoreError> {
        let mut items = self.load_items(customer_id).await?;
        if items.iter().any(|line| line.product_id == item.product_id) {
            return Err(StoreError::DuplicateItem);
        }
        items.push(item);
        self.save_items(customer_id, &items).await
    }

    async fn adjust_quantity(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<(), StoreError> {
        let mut items = self.load_items(customer_id).await?;
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
        self.save_items(customer_id, &items).await
    }

    async fn remove_item(
        &self,
        customer_id: &CustomerId,
        product_id: &ProductId,
    ) -> Result<(), StoreError> {
        let mut items = self.load_items(customer_id).await?;
        let before = items.len();
        items.retain(|line| &line.product_id != product_id);
        if items.len() == before {
            // Idempotent; nothing to write.
            return Ok(());
        }
        self.save_items(customer_id, &items).await
    }

    async fn clear(&self, customer_id: &CustomerId) -> Result<(), StoreError> {
        sqlx::query("UPDATE carts SET items = '[]'::jsonb, updated_at = NOW() WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
