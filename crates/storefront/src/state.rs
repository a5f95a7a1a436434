//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{PgCartStore, PgOrderStore};
use crate::services::{
    BrevoNotifier, CheckoutService, GatewayError, NotifierError, PaymentVerifier, RazorpayClient,
};
use crate::store::CartStore;

/// Error wiring up application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment gateway client: {0}")]
    Gateway(#[from] GatewayError),
    #[error("notifier client: {0}")]
    Notifier(#[from] NotifierError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and the checkout service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    carts: Arc<dyn CartStore>,
    checkout: Arc<CheckoutService>,
}

impl AppState {
    /// Create a new application state backed by Postgres stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway or notifier HTTP clients cannot be
    /// constructed from the configuration.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let carts: Arc<dyn CartStore> = Arc::new(PgCartStore::new(pool.clone()));
        let orders = Arc::new(PgOrderStore::new(pool.clone()));
        let verifier = PaymentVerifier::new(config.razorpay.key_secret.clone());
        let gateway = Arc::new(RazorpayClient::new(&config.razorpay)?);
        let notifier = Arc::new(BrevoNotifier::new(&config.brevo)?);

        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&carts),
            orders,
            verifier,
            gateway,
            notifier,
        ));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts,
                checkout,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &Arc<dyn CartStore> {
        &self.inner.carts
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
