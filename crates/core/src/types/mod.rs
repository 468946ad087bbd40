//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod options;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use options::{AccountOption, CardType, ContactSubject, PaymentMethod, ShippingMethod};
pub use price::{CurrencyCode, Price};
pub use status::*;
