//! The order placement pipeline.
//!
//! One placement attempt moves through: read cart → validate non-empty →
//! verify payment (online only) → allocate order id → persist order → clear
//! cart → dispatch notification. Persistence happens only after verification
//! succeeds, so a storage failure can never leave a Paid-but-unpersisted
//! order. Notification is spawned after the order stands and its failure is
//! logged, never surfaced.
//!
//! A per-customer placement lock serializes the validate→persist→clear window
//! for one customer, closing the double-submission window where the same cart
//! could produce two orders. Placements by different customers stay
//! concurrent; the only global serialization point is order-id allocation,
//! which the store performs atomically.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use copper_kettle_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus};
use thiserror::Error;
use tracing::instrument;

use crate::models::{ContactDetails, CustomerIdentity, Order, OrderLineItem, PaymentDetails};
use crate::store::{CartStore, OrderStore, StoreError};

use super::gateway::{GatewayError, PaymentGateway, PaymentIntent};
use super::notifier::Notifier;
use super::payment::PaymentVerifier;

/// Minimum chargeable amount: one rupee, in paise.
const MIN_AMOUNT_PAISE: i64 = 100;

/// Gateway currency for all charges.
const CURRENCY: &str = "INR";

/// Errors from the checkout pipeline.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart total rounds below the smallest chargeable amount.
    #[error("order amount must be at least ₹1")]
    AmountBelowMinimum,

    /// The payment signature did not verify.
    #[error("payment verification failed")]
    PaymentVerificationFailed,

    /// The gateway payment id is already attached to an order.
    #[error("payment already recorded")]
    DuplicatePayment,

    /// An online payment method was routed to the cash-on-delivery flow.
    #[error("use the gateway checkout for online payment")]
    InvalidPaymentMethodForRoute,

    /// Order id allocation failed.
    #[error("order id allocation failed: {0}")]
    SequencerUnavailable(StoreError),

    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// The requester does not own the order.
    #[error("unauthorized")]
    Unauthorized,

    /// The order is already cancelled.
    #[error("order already cancelled")]
    AlreadyCancelled,

    /// An unrecognized status value.
    #[error("invalid status")]
    InvalidStatus,

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Payment gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A gateway payment confirmation as delivered to the callback route.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub provider_order_id: String,
    pub provider_payment_id: String,
    pub signature: String,
}

/// Orchestrates cart reads, payment verification, order-id allocation,
/// order persistence, cart clearing, and notification dispatch.
pub struct CheckoutService {
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    verifier: PaymentVerifier,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    placement_locks: std::sync::Mutex<HashMap<copper_kettle_core::CustomerId, Arc<tokio::sync::Mutex<()>>>>,
}

impl CheckoutService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartStore>,
        orders: Arc<dyn OrderStore>,
        verifier: PaymentVerifier,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            carts,
            orders,
            verifier,
            gateway,
            notifier,
            placement_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// The cart store this service reads from (shared with the cart routes).
    #[must_use]
    pub fn carts(&self) -> &Arc<dyn CartStore> {
        &self.carts
    }

    fn placement_lock(
        &self,
        customer_id: &copper_kettle_core::CustomerId,
    ) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .placement_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(customer_id.clone()).or_default())
    }

    /// Register a provider-side payment order for the customer's cart total.
    ///
    /// # Errors
    ///
    /// Fails with [`CheckoutError::EmptyCart`] for an empty cart and
    /// [`CheckoutError::AmountBelowMinimum`] when the total rounds below one
    /// rupee.
    #[instrument(skip(self, identity), fields(customer_id = %identity.customer_id))]
    pub async fn create_payment_intent(
        &self,
        identity: &CustomerIdentity,
    ) -> Result<PaymentIntent, CheckoutError> {
        let cart = self.carts.get(&identity.customer_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount_paise = cart
            .subtotal()
            .to_paise()
            .filter(|paise| *paise >= MIN_AMOUNT_PAISE)
            .ok_or(CheckoutError::AmountBelowMinimum)?;

        let receipt = format!("rcpt_{}", Utc::now().timestamp_millis());
        let intent = self
            .gateway
            .create_order(amount_paise, CURRENCY, &receipt)
            .await?;

        tracing::info!(
            provider_order_id = %intent.provider_order_id,
            amount = intent.amount,
            "payment intent created"
        );
        Ok(intent)
    }

    /// Verify a gateway payment confirmation and place the order.
    ///
    /// Verification happens before anything is written; a forged signature or
    /// a reused payment id leaves no trace. The payment status of the
    /// resulting order is Paid for exactly the verified order/payment id pair.
    ///
    /// # Errors
    ///
    /// Fails with [`CheckoutError::PaymentVerificationFailed`],
    /// [`CheckoutError::DuplicatePayment`], or [`CheckoutError::EmptyCart`].
    #[instrument(skip_all, fields(customer_id = %identity.customer_id))]
    pub async fn confirm_payment_and_place_order(
        &self,
        identity: &CustomerIdentity,
        confirmation: PaymentConfirmation,
        contact: ContactDetails,
    ) -> Result<OrderId, CheckoutError> {
        if !self.verifier.verify(
            &confirmation.provider_order_id,
            &confirmation.provider_payment_id,
            &confirmation.signature,
        ) {
            tracing::warn!("payment signature mismatch");
            return Err(CheckoutError::PaymentVerificationFailed);
        }

        if self
            .orders
            .find_by_payment_id(&confirmation.provider_payment_id)
            .await?
            .is_some()
        {
            tracing::warn!("gateway payment id reused");
            return Err(CheckoutError::DuplicatePayment);
        }

        let lock = self.placement_lock(&identity.customer_id);
        let _guard = lock.lock().await;

        self.place_order(
            identity,
            contact,
            PaymentMethod::OnlinePayment,
            PaymentStatus::Paid,
            Some(confirmation.provider_payment_id.clone()),
            Some(PaymentDetails {
                provider_order_id: confirmation.provider_order_id,
                provider_payment_id: confirmation.provider_payment_id,
            }),
        )
        .await
    }

    /// Place a cash-on-delivery order. Payment status stays Pending.
    ///
    /// # Errors
    ///
    /// Fails with [`CheckoutError::InvalidPaymentMethodForRoute`] if an
    /// online method is supplied here, or [`CheckoutError::EmptyCart`].
    #[instrument(skip_all, fields(customer_id = %identity.customer_id))]
    pub async fn place_cash_on_delivery_order(
        &self,
        identity: &CustomerIdentity,
        method: PaymentMethod,
        contact: ContactDetails,
    ) -> Result<OrderId, CheckoutError> {
        if method == PaymentMethod::OnlinePayment {
            return Err(CheckoutError::InvalidPaymentMethodForRoute);
        }

        let lock = self.placement_lock(&identity.customer_id);
        let _guard = lock.lock().await;

        self.place_order(
            identity,
            contact,
            PaymentMethod::CashOnDelivery,
            PaymentStatus::Pending,
            None,
            None,
        )
        .await
    }

    /// The shared tail of both placement flows. Caller holds the placement
    /// lock and has completed payment verification (or skipped it for cash
    /// on delivery).
    async fn place_order(
        &self,
        identity: &CustomerIdentity,
        contact: ContactDetails,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        transaction_id: Option<String>,
        payment_details: Option<PaymentDetails>,
    ) -> Result<OrderId, CheckoutError> {
        let cart = self.carts.get(&identity.customer_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let now = Utc::now();
        let order_id = self
            .orders
            .next_order_id(now.year())
            .await
            .map_err(CheckoutError::SequencerUnavailable)?;

        let order = Order {
            order_id,
            customer_id: identity.customer_id.clone(),
            username: identity.username.clone(),
            email: contact.email.unwrap_or_else(|| identity.email.clone()),
            phone: contact.phone.or_else(|| identity.phone.clone()),
            address: contact.address,
            payment_method,
            payment_status,
            transaction_id,
            payment_details,
            items: cart.items.into_iter().map(OrderLineItem::from).collect(),
            status: OrderStatus::Pending,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };

        self.orders.insert(&order).await?;

        // The order stands from here on. A failed cart clear leaves stale
        // items the customer can clear on a later attempt; it must not fail
        // the placement.
        if let Err(e) = self.carts.clear(&identity.customer_id).await {
            tracing::error!(order_id = %order.order_id, error = %e, "cart clear failed after order persisted");
        }

        let notifier = Arc::clone(&self.notifier);
        let dispatched = order.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.order_placed(&dispatched).await {
                tracing::warn!(order_id = %dispatched.order_id, error = %e, "order confirmation dispatch failed");
            }
        });

        tracing::info!(order_id = %order.order_id, method = %payment_method, "order placed");
        Ok(order.order_id)
    }

    /// The customer's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] on storage failure.
    pub async fn list_orders(
        &self,
        identity: &CustomerIdentity,
    ) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_for_email(&identity.email).await?)
    }

    /// Cancel an order on behalf of its owning customer.
    ///
    /// Ownership is an identity match on email. Cancelling marks every line
    /// item cancelled and records the reason.
    ///
    /// # Errors
    ///
    /// Fails with [`CheckoutError::NotFound`], [`CheckoutError::Unauthorized`],
    /// or [`CheckoutError::AlreadyCancelled`].
    #[instrument(skip(self, identity, reason), fields(customer_id = %identity.customer_id, order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        identity: &CustomerIdentity,
        order_id: OrderId,
        reason: Option<String>,
    ) -> Result<(), CheckoutError> {
        let mut order = self
            .orders
            .get(&order_id)
            .await?
            .ok_or(CheckoutError::NotFound)?;

        if order.email != identity.email {
            return Err(CheckoutError::Unauthorized);
        }

        if order.status == OrderStatus::Cancelled {
            return Err(CheckoutError::AlreadyCancelled);
        }

        order.cancel(reason, Utc::now());
        self.orders.update(&order).await?;

        tracing::info!("order cancelled");
        Ok(())
    }

    /// Every order in the system, most recent first. Administrative.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Store`] on storage failure.
    pub async fn list_all_orders(&self) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_all().await?)
    }

    /// Set an order's status directly. Administrative override: bypasses the
    /// customer-cancellation guards and may move an order to any status.
    ///
    /// # Errors
    ///
    /// Fails with [`CheckoutError::NotFound`] for an unknown order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn set_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let mut order = self
            .orders
            .get(&order_id)
            .await?
            .ok_or(CheckoutError::NotFound)?;

        order.status = status;
        order.updated_at = Utc::now();
        self.orders.update(&order).await?;

        tracing::info!(status = %status, "order status overridden");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use copper_kettle_core::{CustomerId, Email, LineItemStatus, ProductId, Rupees};
    use hmac::{Hmac, Mac};
    use secrecy::SecretString;
    use sha2::Sha256;

    use crate::models::CartItem;
    use crate::store::memory::{MemoryCartStore, MemoryOrderStore};

    use super::*;

    const TEST_SECRET: &str = "kQ8vR2mL9xW4pD7nF1cJ6gB3tZ5hY0aN";

    struct FakeGateway;

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_order(
            &self,
            amount_paise: i64,
            currency: &str,
            _receipt: &str,
        ) -> Result<PaymentIntent, GatewayError> {
            Ok(PaymentIntent {
                provider_order_id: "order_test_1".to_owned(),
                amount: amount_paise,
                currency: currency.to_owned(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn order_placed(&self, _order: &Order) -> Result<(), NotifierError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NotifierError::Client("simulated outage".to_owned()));
            }
            Ok(())
        }
    }

    use super::super::notifier::NotifierError;

    struct Harness {
        service: CheckoutService,
        carts: Arc<MemoryCartStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness_with_notifier(notifier: RecordingNotifier) -> Harness {
        let carts = Arc::new(MemoryCartStore::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let notifier = Arc::new(notifier);
        let service = CheckoutService::new(
            Arc::clone(&carts) as Arc<dyn CartStore>,
            orders as Arc<dyn OrderStore>,
            PaymentVerifier::new(SecretString::from(TEST_SECRET)),
            Arc::new(FakeGateway),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Harness {
            service,
            carts,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with_notifier(RecordingNotifier::default())
    }

    fn identity(customer: &str, email: &str) -> CustomerIdentity {
        CustomerIdentity {
            customer_id: CustomerId::new(customer),
            username: customer.to_owned(),
            email: Email::parse(email).expect("valid email"),
            phone: Some("9800000000".to_owned()),
        }
    }

    fn contact() -> ContactDetails {
        ContactDetails {
            email: None,
            phone: None,
            address: "14 MG Road, Pune".to_owned(),
        }
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).expect("hmac key");
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn confirmation(payment_id: &str) -> PaymentConfirmation {
        PaymentConfirmation {
            provider_order_id: "order_test_1".to_owned(),
            provider_payment_id: payment_id.to_owned(),
            signature: sign("order_test_1", payment_id),
        }
    }

    async fn fill_cart(carts: &MemoryCartStore, customer: &str, price: i64, quantity: u32) {
        let customer = CustomerId::new(customer);
        carts
            .add_item(
                &customer,
                CartItem {
                    product_id: ProductId::new("P1"),
                    title: "Filter coffee".to_owned(),
                    image: None,
                    unit_price: Rupees::from(price),
                    quantity: 1,
                },
            )
            .await
            .expect("add item");
        if quantity > 1 {
            #[allow(clippy::cast_possible_wrap)]
            carts
                .adjust_quantity(
                    &customer,
                    &ProductId::new("P1"),
                    (quantity - 1) as i32,
                )
                .await
                .expect("adjust");
        }
    }

    #[tokio::test]
    async fn test_payment_intent_amount_in_paise() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 250, 2).await;

        let intent = h
            .service
            .create_payment_intent(&identity)
            .await
            .expect("intent");
        assert_eq!(intent.amount, 50_000);
        assert_eq!(intent.currency, "INR");
    }

    #[tokio::test]
    async fn test_payment_intent_empty_cart() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");

        let err = h
            .service
            .create_payment_intent(&identity)
            .await
            .expect_err("empty cart");
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_payment_intent_below_minimum() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        let customer = CustomerId::new("c1");
        h.carts
            .add_item(
                &customer,
                CartItem {
                    product_id: ProductId::new("P1"),
                    title: "Sugar sachet".to_owned(),
                    image: None,
                    unit_price: Rupees::new(rust_decimal::Decimal::new(40, 2)),
                    quantity: 1,
                },
            )
            .await
            .expect("add item");

        let err = h
            .service
            .create_payment_intent(&identity)
            .await
            .expect_err("below minimum");
        assert!(matches!(err, CheckoutError::AmountBelowMinimum));
    }

    #[tokio::test]
    async fn test_online_payment_end_to_end() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 250, 2).await;

        let intent = h
            .service
            .create_payment_intent(&identity)
            .await
            .expect("intent");
        assert_eq!(intent.amount, 50_000);

        let order_id = h
            .service
            .confirm_payment_and_place_order(&identity, confirmation("pay_1"), contact())
            .await
            .expect("place order");

        let shape = regex::Regex::new(r"^\d{4}\d{3}$").expect("regex");
        assert!(shape.is_match(&order_id.to_string()));

        let orders = h.service.list_orders(&identity).await.expect("list");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].payment_status, PaymentStatus::Paid);
        assert_eq!(orders[0].transaction_id.as_deref(), Some("pay_1"));

        // The cart is cleared by placement
        let cart = h
            .carts
            .get(&CustomerId::new("c1"))
            .await
            .expect("get cart");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_forged_signature_rejected_without_side_effects() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 250, 2).await;

        let mut forged = confirmation("pay_1");
        forged.signature.replace_range(0..1, "x");

        let err = h
            .service
            .confirm_payment_and_place_order(&identity, forged, contact())
            .await
            .expect_err("forged");
        assert!(matches!(err, CheckoutError::PaymentVerificationFailed));

        // No order, cart untouched
        assert!(h.service.list_orders(&identity).await.expect("list").is_empty());
        assert!(
            !h.carts
                .get(&CustomerId::new("c1"))
                .await
                .expect("get")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_payment_id_reuse_rejected() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 250, 2).await;

        h.service
            .confirm_payment_and_place_order(&identity, confirmation("pay_1"), contact())
            .await
            .expect("first placement");

        fill_cart(&h.carts, "c1", 250, 2).await;
        let err = h
            .service
            .confirm_payment_and_place_order(&identity, confirmation("pay_1"), contact())
            .await
            .expect_err("reused payment id");
        assert!(matches!(err, CheckoutError::DuplicatePayment));
        assert_eq!(h.service.list_orders(&identity).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_cod_placement_and_contact_fallback() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;

        let order_id = h
            .service
            .place_cash_on_delivery_order(&identity, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect("place");

        let orders = h.service.list_orders(&identity).await.expect("list");
        assert_eq!(orders[0].order_id, order_id);
        assert_eq!(orders[0].payment_status, PaymentStatus::Pending);
        assert_eq!(orders[0].transaction_id, None);
        // Contact fell back to the authenticated identity
        assert_eq!(orders[0].email.as_str(), "asha@example.com");
        assert_eq!(orders[0].phone.as_deref(), Some("9800000000"));
    }

    #[tokio::test]
    async fn test_cod_route_rejects_online_method() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;

        let err = h
            .service
            .place_cash_on_delivery_order(&identity, PaymentMethod::OnlinePayment, contact())
            .await
            .expect_err("online method");
        assert!(matches!(err, CheckoutError::InvalidPaymentMethodForRoute));
    }

    #[tokio::test]
    async fn test_empty_cart_cod_creates_no_order() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");

        let err = h
            .service
            .place_cash_on_delivery_order(&identity, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect_err("empty cart");
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(h.service.list_all_orders().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_cancel_once_then_already_cancelled() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;

        let order_id = h
            .service
            .place_cash_on_delivery_order(&identity, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect("place");

        h.service
            .cancel_order(&identity, order_id, Some("changed my mind".to_owned()))
            .await
            .expect("cancel");

        let orders = h.service.list_orders(&identity).await.expect("list");
        assert_eq!(orders[0].status, OrderStatus::Cancelled);
        assert_eq!(orders[0].cancel_reason.as_deref(), Some("changed my mind"));
        assert!(
            orders[0]
                .items
                .iter()
                .all(|item| item.status == LineItemStatus::Cancelled)
        );

        let err = h
            .service
            .cancel_order(&identity, order_id, None)
            .await
            .expect_err("second cancel");
        assert!(matches!(err, CheckoutError::AlreadyCancelled));
    }

    #[tokio::test]
    async fn test_cancel_requires_ownership() {
        let h = harness();
        let owner = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;
        let order_id = h
            .service
            .place_cash_on_delivery_order(&owner, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect("place");

        let stranger = identity("c2", "ravi@example.com");
        let err = h
            .service
            .cancel_order(&stranger, order_id, None)
            .await
            .expect_err("not the owner");
        assert!(matches!(err, CheckoutError::Unauthorized));

        let err = h
            .service
            .cancel_order(&owner, OrderId::new(2020, 999), None)
            .await
            .expect_err("unknown order");
        assert!(matches!(err, CheckoutError::NotFound));
    }

    #[tokio::test]
    async fn test_admin_status_override_bypasses_guards() {
        let h = harness();
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;
        let order_id = h
            .service
            .place_cash_on_delivery_order(&identity, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect("place");

        let order = h
            .service
            .set_order_status(order_id, OrderStatus::Approved)
            .await
            .expect("approve");
        assert_eq!(order.status, OrderStatus::Approved);

        // Override can also move a cancelled order back
        h.service
            .cancel_order(&identity, order_id, None)
            .await
            .expect("cancel");
        let order = h
            .service
            .set_order_status(order_id, OrderStatus::Pending)
            .await
            .expect("reopen");
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_placement() {
        let h = harness_with_notifier(RecordingNotifier {
            sent: AtomicUsize::new(0),
            fail: true,
        });
        let identity = identity("c1", "asha@example.com");
        fill_cart(&h.carts, "c1", 120, 1).await;

        h.service
            .place_cash_on_delivery_order(&identity, PaymentMethod::CashOnDelivery, contact())
            .await
            .expect("place despite notifier outage");

        // Dispatch happens off the request path
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_placements_get_distinct_ids() {
        let h = Arc::new(harness());
        let mut handles = Vec::new();

        for i in 0..8 {
            let customer = format!("c{i}");
            let email = format!("c{i}@example.com");
            fill_cart(&h.carts, &customer, 100, 1).await;

            let h = Arc::clone(&h);
            handles.push(tokio::spawn(async move {
                h.service
                    .place_cash_on_delivery_order(
                        &identity(&customer, &email),
                        PaymentMethod::CashOnDelivery,
                        contact(),
                    )
                    .await
            }));
        }

        let mut serials = Vec::new();
        for handle in handles {
            let order_id = handle.await.expect("join").expect("place");
            serials.push(order_id.serial());
        }
        serials.sort_unstable();
        assert_eq!(serials, (1..=8).collect::<Vec<_>>());
    }
}
