//! Key-value storage for persisted storefront state.
//!
//! # Keys
//!
//! - `cart` - JSON array of cart items
//! - `user` - JSON user record of the signed-in shopper (absent when signed out)
//! - `users` - JSON array of every registered user
//!
//! The store is a cache rehydrated when the storefront opens, not a
//! transactional ledger. Values are opaque strings at this layer; the
//! [`load_json`] and [`save_json`] helpers handle (de)serialization.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys used by the storefront.
pub mod keys {
    /// Key for the shopper's cart.
    pub const CART: &str = "cart";

    /// Key for the signed-in user record.
    pub const USER: &str = "user";

    /// Key for the list of registered users.
    pub const USERS: &str = "users";
}

/// Errors raised by a [`KeyValueStore`] or the JSON helpers.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A persisted value is not valid JSON for its record type.
    #[error("corrupt value stored under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded as JSON.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters the backend cannot store.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A string-to-string store with local-storage semantics.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need it. The storefront assumes a single writer.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and decode the JSON value stored under `key`.
///
/// # Errors
///
/// Returns `StorageError::Corrupt` if the stored value does not decode.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if encoding or writing fails.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<u32>> = load_json(&store, keys::CART).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        save_json(&store, keys::CART, &[1, 2, 3]).unwrap();

        let value: Option<Vec<u32>> = load_json(&store, keys::CART).unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_corrupt_value_names_the_key() {
        let store = MemoryStore::new();
        store.set(keys::USERS, "[{not json").unwrap();

        let err = load_json::<Vec<u32>>(&store, keys::USERS).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "users"));
        assert!(err.to_string().contains("'users'"));
    }
}
