//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::validation::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The sign-in or sign-up form has invalid fields.
    #[error("invalid form: {0}")]
    Validation(FieldErrors),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The page requires a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// The page is only for signed-out shoppers.
    #[error("already signed in")]
    AlreadySignedIn,

    /// Repository/storage error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Field-level errors, when the failure is a form problem.
    ///
    /// A duplicate sign-up is reported on the `email` field.
    #[must_use]
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::UserAlreadyExists => {
                let mut errors = FieldErrors::new();
                errors.insert("email", "Email already exists");
                Some(errors)
            }
            _ => None,
        }
    }
}
