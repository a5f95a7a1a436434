//! Status enums for orders, payments, and line items.
//!
//! Wire strings (`"Cash on Delivery"`, `"Online Payment"`, `"Paid"`, ...)
//! match what clients already send and what the store persists, so every enum
//! carries explicit serde renames plus `as_str`/`FromStr` for the database
//! layer and the admin status route.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Payment collected in cash when the order is delivered.
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
    /// Payment captured up front through the payment gateway.
    #[serde(rename = "Online Payment")]
    OnlinePayment,
}

impl PaymentMethod {
    /// Stable string form, used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Cash on Delivery",
            Self::OnlinePayment => "Online Payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash on Delivery" => Ok(Self::CashOnDelivery),
            "Online Payment" => Ok(Self::OnlinePayment),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Whether payment has been captured for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Payment not yet captured (always the case for cash on delivery).
    #[default]
    Pending,
    /// Payment captured and verified against the gateway signature.
    Paid,
}

impl PaymentStatus {
    /// Stable string form, used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Overall order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed, awaiting approval.
    #[default]
    Pending,
    /// Approved for fulfilment.
    Approved,
    /// Cancelled by the customer or an administrator.
    Cancelled,
}

impl OrderStatus {
    /// Stable string form, used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Per-line-item status inside an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LineItemStatus {
    /// Part of the live order.
    #[default]
    Active,
    /// Cancelled along with the order.
    Cancelled,
}

impl LineItemStatus {
    /// Stable string form, used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Error for a status string that matches no known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [PaymentMethod::CashOnDelivery, PaymentMethod::OnlinePayment] {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_order_status_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert!("Refunded".parse::<PaymentStatus>().is_err());
    }
}
