//! Core types for Copper Kettle.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order_id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Rupees;
pub use order_id::{OrderId, OrderIdError};
pub use status::*;
