//! Postgres order store and the per-year order-id sequencer.
//!
//! Identifier allocation is a single atomic upsert against `order_counters`:
//! the first placement of a year inserts serial 1, every later placement
//! increments under the row lock Postgres takes for the conflicting insert.
//! Concurrent placements therefore always receive distinct, contiguous
//! serials, with no scan over existing orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copper_kettle_core::{CustomerId, Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::Order;
use crate::store::{OrderStore, StoreError};

const ORDER_COLUMNS: &str = "order_id, customer_id, username, email, phone, address, \
     payment_method, payment_status, transaction_id, payment_details, items, \
     status, cancel_reason, created_at, updated_at";

/// [`OrderStore`] backed by the `orders` and `order_counters` tables.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let corrupt = |what: &str, detail: String| {
        StoreError::DataCorruption(format!("invalid {what} in database: {detail}"))
    };

    let order_id: String = row.try_get("order_id")?;
    let order_id: OrderId = order_id
        .parse()
        .map_err(|e: copper_kettle_core::OrderIdError| corrupt("order id", e.to_string()))?;

    let email: String = row.try_get("email")?;
    let email = Email::parse(&email).map_err(|e| corrupt("email", e.to_string()))?;

    let payment_method: String = row.try_get("payment_method")?;
    let payment_method: PaymentMethod = payment_method
        .parse()
        .map_err(|e: copper_kettle_core::UnknownStatus| corrupt("payment method", e.to_string()))?;

    let payment_status: String = row.try_get("payment_status")?;
    let payment_status: PaymentStatus = payment_status
        .parse()
        .map_err(|e: copper_kettle_core::UnknownStatus| corrupt("payment status", e.to_string()))?;

    let status: String = row.try_get("status")?;
    let status: OrderStatus = status
        .parse()
        .map_err(|e: copper_kettle_core::UnknownStatus| corrupt("order status", e.to_string()))?;

    let payment_details: Option<serde_json::Value> = row.try_get("payment_details")?;
    let payment_details = payment_details
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| corrupt("payment details", e.to_string()))?;

    let items: serde_json::Value = row.try_get("items")?;
    let items =
        serde_json::from_value(items).map_err(|e| corrupt("order items", e.to_string()))?;

    Ok(Order {
        order_id,
        customer_id: row.try_get::<CustomerId, _>("customer_id")?,
        username: row.try_get("username")?,
        email,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        payment_method,
        payment_status,
        transaction_id: row.try_get("transaction_id")?,
        payment_details,
        items,
        status,
        cancel_reason: row.try_get("cancel_reason")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn next_order_id(&self, year: i32) -> Result<OrderId, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO order_counters (year, serial)
            VALUES ($1, 1)
            ON CONFLICT (year)
            DO UPDATE SET serial = order_counters.serial + 1
            RETURNING serial
            ",
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        let serial: i32 = row.try_get("serial")?;
        let serial = u32::try_from(serial).map_err(|_| {
            StoreError::DataCorruption(format!("negative serial for year {year}: {serial}"))
        })?;
        Ok(OrderId::new(year, serial))
    }

    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let items = serde_json::to_value(&order.items).map_err(|e| {
            StoreError::DataCorruption(format!("failed to serialize order items: {e}"))
        })?;
        let payment_details = order
            .payment_details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| {
                StoreError::DataCorruption(format!("failed to serialize payment details: {e}"))
            })?;

        sqlx::query(
            r"
            INSERT INTO orders (order_id, customer_id, username, email, phone, address,
                                payment_method, payment_status, transaction_id,
                                payment_details, items, status, cancel_reason,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(order.order_id.to_string())
        .bind(&order.customer_id)
        .bind(&order.username)
        .bind(order.email.as_str())
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(&order.transaction_id)
        .bind(payment_details)
        .bind(items)
        .bind(order.status.as_str())
        .bind(&order.cancel_reason)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict(format!("order {} already exists", order.order_id));
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn get(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
        let row = sqlx::query(&query)
            .bind(order_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn list_for_email(&self, email: &Email) -> Result<Vec<Order>, StoreError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE email = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(email.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE transaction_id = $1");
        let row = sqlx::query(&query)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let items = serde_json::to_value(&order.items).map_err(|e| {
            StoreError::DataCorruption(format!("failed to serialize order items: {e}"))
        })?;

        let result = sqlx::query(
            r"
            UPDATE orders
            SET payment_status = $2, status = $3, cancel_reason = $4,
                items = $5, updated_at = $6
            WHERE order_id = $1
            ",
        )
        .bind(order.order_id.to_string())
        .bind(order.payment_status.as_str())
        .bind(order.status.as_str())
        .bind(&order.cancel_reason)
        .bind(items)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
