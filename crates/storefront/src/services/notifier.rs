//! Order confirmation dispatch.
//!
//! Confirmation email is a courtesy, not a correctness requirement: the
//! checkout pipeline spawns the dispatch after the response is committed,
//! logs failures, and never retries or surfaces them.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::BrevoConfig;
use crate::models::Order;

/// Brevo transactional email endpoint.
const SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// Errors that can occur when dispatching a notification.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client.
    #[error("client error: {0}")]
    Client(String),
}

/// Dispatches order confirmations.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a confirmation for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] on dispatch failure; callers log and ignore.
    async fn order_placed(&self, order: &Order) -> Result<(), NotifierError>;
}

/// [`Notifier`] backed by the Brevo transactional email API.
#[derive(Clone)]
pub struct BrevoNotifier {
    client: reqwest::Client,
    sender_name: String,
    sender_email: String,
}

impl BrevoNotifier {
    /// Create a new Brevo client.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Client`] if the API key is not a valid header
    /// value or the HTTP client fails to build.
    pub fn new(config: &BrevoConfig) -> Result<Self, NotifierError> {
        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| NotifierError::Client(format!("invalid API key format: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("api-key", api_key);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NotifierError::Client(e.to_string()))?;

        Ok(Self {
            client,
            sender_name: config.sender_name.clone(),
            sender_email: config.sender_email.clone(),
        })
    }
}

#[async_trait]
impl Notifier for BrevoNotifier {
    async fn order_placed(&self, order: &Order) -> Result<(), NotifierError> {
        let body = serde_json::json!({
            "sender": {
                "name": self.sender_name,
                "email": self.sender_email,
            },
            "to": [{
                "email": order.email.as_str(),
                "name": order.username,
            }],
            "subject": format!("Order Confirmation - {}", self.sender_name),
            "htmlContent": build_confirmation_html(order),
        });

        let response = self.client.post(SEND_URL).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Build the confirmation email body for an order.
fn build_confirmation_html(order: &Order) -> String {
    let items = order
        .items
        .iter()
        .map(|item| {
            format!(
                "&bull; {} (Qty: {}) - {}",
                item.title,
                item.quantity,
                item.line_total()
            )
        })
        .collect::<Vec<_>>()
        .join("<br/>");

    format!(
        "<div>\
         <p>Dear <strong>{username}</strong>,</p>\
         <p>Your order has been successfully placed.</p>\
         <p><strong>Order ID:</strong> {order_id}<br/>\
         <strong>Order Date:</strong> {date}<br/>\
         <strong>Payment Method:</strong> {method}</p>\
         <p>{items}</p>\
         <p><strong>Total Amount:</strong> {total}</p>\
         <p><strong>Delivery Address:</strong> {address}</p>\
         </div>",
        username = order.username,
        order_id = order.order_id,
        date = order.created_at.format("%d/%m/%Y"),
        method = order.payment_method,
        items = items,
        total = order.total(),
        address = order.address,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use copper_kettle_core::{
        CustomerId, Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, Rupees,
    };

    use crate::models::OrderLineItem;

    use super::*;

    #[test]
    fn test_confirmation_body_mentions_order_and_total() {
        let now = Utc::now();
        let order = Order {
            order_id: OrderId::new(2025, 3),
            customer_id: CustomerId::new("c1"),
            username: "asha".to_owned(),
            email: Email::parse("asha@example.com").expect("valid email"),
            phone: None,
            address: "14 MG Road, Pune".to_owned(),
            payment_method: PaymentMethod::OnlinePayment,
            payment_status: PaymentStatus::Paid,
            transaction_id: Some("pay_1".to_owned()),
            payment_details: None,
            items: vec![OrderLineItem {
                product_id: ProductId::new("p1"),
                title: "Filter coffee".to_owned(),
                image: None,
                unit_price: Rupees::from(250),
                quantity: 2,
                status: copper_kettle_core::LineItemStatus::Active,
            }],
            status: OrderStatus::Pending,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };

        let html = build_confirmation_html(&order);
        assert!(html.contains("2025003"));
        assert!(html.contains("₹500.00"));
        assert!(html.contains("14 MG Road, Pune"));
        assert!(html.contains("Online Payment"));
    }
}
