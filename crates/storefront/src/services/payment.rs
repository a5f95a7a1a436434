//! Payment confirmation signature verification.
//!
//! The gateway signs each captured payment with
//! `HMAC-SHA256(secret, "{provider_order_id}|{provider_payment_id}")`,
//! hex-encoded. This check is the sole trust boundary against forged payment
//! confirmations: no order may be recorded as Paid without a passing
//! verification for that exact order/payment id pair.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies gateway payment signatures against the shared key secret.
///
/// The secret is process-wide configuration; it is never transmitted, never
/// logged, and never part of an error message.
#[derive(Clone)]
pub struct PaymentVerifier {
    key_secret: SecretString,
}

impl PaymentVerifier {
    #[must_use]
    pub const fn new(key_secret: SecretString) -> Self {
        Self { key_secret }
    }

    /// Whether `signature` is the gateway's authentic signature for this
    /// provider order/payment id pair.
    #[must_use]
    pub fn verify(&self, provider_order_id: &str, provider_payment_id: &str, signature: &str) -> bool {
        let payload = format!("{provider_order_id}|{provider_payment_id}");

        let Ok(mut mac) = HmacSha256::new_from_slice(self.key_secret.expose_secret().as_bytes())
        else {
            return false;
        };
        mac.update(payload.as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());

        constant_time_compare(&expected, signature)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "kQ8vR2mL9xW4pD7nF1cJ6gB3tZ5hY0aN";

    fn verifier() -> PaymentVerifier {
        PaymentVerifier::new(SecretString::from(TEST_SECRET))
    }

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(TEST_SECRET.as_bytes()).expect("hmac key");
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
        assert!(!constant_time_compare("hello", "helloo"));
    }

    #[test]
    fn test_valid_signature_accepted() {
        let signature = sign("order_abc", "pay_123");
        assert!(verifier().verify("order_abc", "pay_123", &signature));
    }

    #[test]
    fn test_mutated_signature_rejected() {
        let signature = sign("order_abc", "pay_123");

        // Flip one character of the signature
        let mut flipped = signature.clone().into_bytes();
        flipped[0] = if flipped[0] == b'0' { b'1' } else { b'0' };
        let flipped = String::from_utf8(flipped).expect("hex is ascii");
        assert!(!verifier().verify("order_abc", "pay_123", &flipped));
    }

    #[test]
    fn test_mutated_ids_rejected() {
        let signature = sign("order_abc", "pay_123");

        assert!(!verifier().verify("order_abd", "pay_123", &signature));
        assert!(!verifier().verify("order_abc", "pay_124", &signature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signature = sign("order_abc", "pay_123");
        let other = PaymentVerifier::new(SecretString::from(
            "zX1cV5bN8mQ2wE6rT9yU3iO7pA4sD0fG",
        ));
        assert!(!other.verify("order_abc", "pay_123", &signature));
    }
}
