//! User repository.
//!
//! The whole user list lives under the `users` key as one JSON array. Every
//! write loads the list, edits it and stores it back.

use corner_shop_core::Email;

use super::RepositoryError;
use crate::models::User;
use crate::storage::{KeyValueStore, keys, load_json, save_json};

/// Repository for registered users.
pub struct UserRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Every registered user, in sign-up order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the list cannot be read or is
    /// corrupt.
    pub fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(load_json(self.store, keys::USERS)?.unwrap_or_default())
    }

    /// Get a user by email (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the list cannot be read.
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|user| user.email.as_str() == email))
    }

    /// Get the user whose email and password both match exactly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the list cannot be read.
    pub fn get_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|user| user.email.as_str() == email && user.password.matches(password)))
    }

    /// Append a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Storage` if the list cannot be read or written.
    pub fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.list()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        users.push(user.clone());
        self.save_all(&users)?;
        tracing::debug!(email = %user.email, "Stored new user");
        Ok(())
    }

    /// Replace the user registered under `email` with `user`.
    ///
    /// `user.email` may differ from `email` when the address itself is being
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has `email`.
    /// Returns `RepositoryError::Conflict` if `user.email` belongs to another
    /// user.
    /// Returns `RepositoryError::Storage` if the list cannot be read or written.
    pub fn update(&self, email: &Email, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.list()?;

        if user.email != *email && users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let slot = users
            .iter_mut()
            .find(|u| u.email == *email)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();

        self.save_all(&users)
    }

    /// Overwrite the stored user list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the list cannot be written.
    pub fn save_all(&self, users: &[User]) -> Result<(), RepositoryError> {
        save_json(self.store, keys::USERS, users)?;
        Ok(())
    }
}
