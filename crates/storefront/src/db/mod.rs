//! Repositories over the persisted storefront records.
//!
//! # Keys
//!
//! - `users` - Every registered user, read by [`UserRepository`]
//! - `cart` and `user` - The shopper's session, read by [`SessionRepository`]
//!
//! Repositories borrow a [`KeyValueStore`](crate::storage::KeyValueStore)
//! and decode on every call; nothing is cached at this layer.

mod session;
mod users;

pub use session::SessionRepository;
pub use users::UserRepository;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying store failed or held corrupt data.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., email already registered).
    #[error("constraint violation: {0}")]
    Conflict(String),
}
