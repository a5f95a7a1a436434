//! Copper Kettle Core - Shared types library.
//!
//! This crate provides common types used by the storefront service:
//! IDs, email addresses, money amounts, order identifiers, and the
//! status enums for orders and payments.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
