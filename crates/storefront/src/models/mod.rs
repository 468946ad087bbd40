//! Domain models for the storefront.
//!
//! These are the records persisted under the `user` and `users` keys. Field
//! names serialize in camelCase to match the stored layout.

pub mod purchase;
pub mod user;

pub use purchase::{Purchase, PurchasedItem};
pub use user::{Password, PaymentCard, User};
