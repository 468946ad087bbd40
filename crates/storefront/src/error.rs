//! Unified error handling.
//!
//! Provides a unified `AppError` type returned by every [`Storefront`]
//! operation. [`AppError::user_message`] gives the text to show a shopper;
//! it never exposes storage details.
//!
//! [`Storefront`]: crate::Storefront

use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::{AccountError, AuthError, CheckoutError, ContactError};
use crate::storage::StorageError;
use crate::validation::FieldErrors;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Key-value store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Account edit failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Cart mutation refused.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout submission failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Contact form rejected.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message safe to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        const INTERNAL: &str = "Something went wrong saving your data. Please try again.";
        const INVALID_FORM: &str = "Please correct the highlighted fields.";

        match self {
            Self::Storage(_) | Self::Database(_) => INTERNAL.to_string(),
            Self::Auth(err) => match err {
                AuthError::Validation(_) => INVALID_FORM.to_string(),
                AuthError::InvalidCredentials => "Invalid email or password.".to_string(),
                AuthError::UserAlreadyExists => "Email already exists".to_string(),
                AuthError::NotSignedIn => {
                    "You must be logged in to access this page.".to_string()
                }
                AuthError::AlreadySignedIn => "You are already signed in.".to_string(),
                AuthError::Repository(_) => INTERNAL.to_string(),
            },
            Self::Account(err) => match err {
                AccountError::Validation(_) => INVALID_FORM.to_string(),
                AccountError::EmailTaken => {
                    "That email is already used by another account.".to_string()
                }
                AccountError::CardNotFound(_) => "That card no longer exists.".to_string(),
                AccountError::Repository(_) => INTERNAL.to_string(),
            },
            Self::Cart(err) => match err {
                CartError::UnknownProduct(_) => "Product not found.".to_string(),
                CartError::OutOfStock(_) => "Out of stock".to_string(),
                CartError::NotInCart(_) => "That item is not in your cart.".to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_) => INVALID_FORM.to_string(),
                CheckoutError::DuplicateAccount => {
                    "User with this email already exists!".to_string()
                }
                CheckoutError::AccountOptionRequired => {
                    "Choose to continue as a guest or create an account.".to_string()
                }
                CheckoutError::EmptyCart => "Your cart is empty.".to_string(),
                CheckoutError::AlreadyPurchased => {
                    "This order has already been placed.".to_string()
                }
                CheckoutError::InvalidChoice(msg) => msg.clone(),
                CheckoutError::Repository(_) => INTERNAL.to_string(),
            },
            Self::Contact(ContactError::Validation(_)) => INVALID_FORM.to_string(),
            Self::Catalog(_) | Self::Config(_) | Self::NotFound(_) => self.to_string(),
        }
    }

    /// Field-level errors to show next to form inputs, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Auth(err) => err.field_errors(),
            Self::Account(AccountError::Validation(errors))
            | Self::Checkout(CheckoutError::Validation(errors))
            | Self::Contact(ContactError::Validation(errors)) => Some(errors.clone()),
            Self::Checkout(CheckoutError::DuplicateAccount) => {
                let mut errors = FieldErrors::new();
                errors.insert("email", "User with this email already exists!");
                Some(errors)
            }
            _ => None,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_storage_details_never_reach_the_user() {
        let err = AppError::from(StorageError::Io {
            key: "users".to_string(),
            source: io::Error::other("disk on fire"),
        });
        assert!(err.to_string().contains("disk on fire"));
        assert!(!err.user_message().contains("disk"));
        assert!(!err.user_message().contains("users"));
    }

    #[test]
    fn test_auth_messages() {
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).user_message(),
            "Invalid email or password."
        );
        assert_eq!(
            AppError::from(AuthError::NotSignedIn).user_message(),
            "You must be logged in to access this page."
        );
    }

    #[test]
    fn test_duplicate_account_lands_on_email_field() {
        let errors = AppError::from(CheckoutError::DuplicateAccount)
            .field_errors()
            .unwrap_or_default();
        assert_eq!(errors.get("email"), Some("User with this email already exists!"));
    }

    #[test]
    fn test_out_of_stock() {
        let err = AppError::from(CartError::OutOfStock(corner_shop_core::ProductId::new(3)));
        assert_eq!(err.user_message(), "Out of stock");
        assert!(err.field_errors().is_none());
    }
}
