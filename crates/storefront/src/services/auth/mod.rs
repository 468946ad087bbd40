//! Authentication service.
//!
//! Provides sign-in and sign-up against the locally stored user list.
//! Passwords are compared as entered; there is no hashing, rate limiting or
//! session expiry behind this mock account system.

mod error;

pub use error::AuthError;

use tracing::instrument;

use corner_shop_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{Password, User};
use crate::storage::KeyValueStore;
use crate::validation::{self, FieldErrors, MIN_PASSWORD_LEN};

/// Sign-in form input.
#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Validate the form without touching the user list.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !validation::is_checkout_email(&self.email) {
            errors.insert("email", "Please enter a valid email");
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }

        errors
    }
}

/// Sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    /// Validate the form without touching the user list.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !validation::is_sign_up_email(&self.email) || Email::parse(&self.email).is_err()
        {
            errors.insert("email", "Invalid email");
        }

        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "Password too short");
        }

        errors
    }
}

/// Authentication service.
///
/// Handles sign-up and sign-in. Tracking who is signed in is left to the
/// caller ([`Storefront`](crate::Storefront)).
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is incomplete.
    /// Returns `AuthError::InvalidCredentials` if no user matches both fields.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn sign_in(&self, form: &SignInForm) -> Result<User, AuthError> {
        form.validate().into_result().map_err(AuthError::Validation)?;

        let Some(user) = self.users.get_by_credentials(&form.email, &form.password)? else {
            tracing::warn!("Sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        };

        tracing::info!("User signed in");
        Ok(user)
    }

    /// Register a new user with an empty profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthError> {
        form.validate().into_result().map_err(AuthError::Validation)?;

        let email = Email::parse(&form.email).map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert("email", "Invalid email");
            AuthError::Validation(errors)
        })?;

        let user = User::new(email, Password::new(form.password.as_str()));
        self.users.create(&user).map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!("User registered");
        Ok(user)
    }
}
