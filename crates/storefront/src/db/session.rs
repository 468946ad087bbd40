//! Session repository: the shopper's cart and signed-in user.

use super::RepositoryError;
use crate::cart::Cart;
use crate::models::User;
use crate::storage::{KeyValueStore, keys, load_json, save_json};

/// Repository for the `cart` and `user` keys.
pub struct SessionRepository<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// The persisted cart, or an empty one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the cart cannot be read or is
    /// corrupt.
    pub fn load_cart(&self) -> Result<Cart, RepositoryError> {
        Ok(load_json(self.store, keys::CART)?.unwrap_or_default())
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the cart cannot be written.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        save_json(self.store, keys::CART, cart)?;
        Ok(())
    }

    /// The signed-in user record, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the record cannot be read or is
    /// corrupt.
    pub fn load_current_user(&self) -> Result<Option<User>, RepositoryError> {
        Ok(load_json(self.store, keys::USER)?)
    }

    /// Persist the signed-in user, or remove the key when signed out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store cannot be written.
    pub fn save_current_user(&self, user: Option<&User>) -> Result<(), RepositoryError> {
        match user {
            Some(user) => save_json(self.store, keys::USER, user)?,
            None => self.store.remove(keys::USER)?,
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_shop_core::Email;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::catalog::tests::product;
    use crate::models::Password;
    use crate::storage::MemoryStore;

    #[test]
    fn test_cart_defaults_to_empty() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        assert!(repo.load_cart().unwrap().is_empty());
    }

    #[test]
    fn test_cart_roundtrip() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);

        let mut cart = Cart::new();
        cart.add(&product(1, "Lamp", dec!(10), 5), None);
        repo.save_cart(&cart).unwrap();

        assert_eq!(repo.load_cart().unwrap(), cart);
    }

    #[test]
    fn test_cleared_cart_is_stored_as_empty_array() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        repo.save_cart(&Cart::new()).unwrap();
        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_sign_out_removes_user_key() {
        let store = MemoryStore::new();
        let repo = SessionRepository::new(&store);
        let user = User::new(
            Email::parse("ana@example.com").unwrap(),
            Password::new("secret1"),
        );

        repo.save_current_user(Some(&user)).unwrap();
        assert_eq!(repo.load_current_user().unwrap(), Some(user));

        repo.save_current_user(None).unwrap();
        assert_eq!(repo.load_current_user().unwrap(), None);
        assert_eq!(store.get(keys::USER).unwrap(), None);
    }
}
