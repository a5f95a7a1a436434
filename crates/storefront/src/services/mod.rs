//! Business services: checkout pipeline, payment verification, gateway and
//! notification clients.

pub mod checkout;
pub mod gateway;
pub mod notifier;
pub mod payment;

pub use checkout::{CheckoutError, CheckoutService, PaymentConfirmation};
pub use gateway::{GatewayError, PaymentGateway, PaymentIntent, RazorpayClient};
pub use notifier::{BrevoNotifier, Notifier, NotifierError};
pub use payment::PaymentVerifier;
