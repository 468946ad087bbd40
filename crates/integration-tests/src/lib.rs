//! Integration tests for Corner Shop.
//!
//! The tests drive a [`Storefront`] backed by a [`FileStore`] in a temporary
//! directory, reopening it between steps the way separate CLI invocations
//! would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-shop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `persistence` - Rehydration and corrupt stored values
//! - `accounts` - Sign up, sign in and account edits across reopens
//! - `checkout` - Guest, new-account and signed-in purchases

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use tempfile::TempDir;

use corner_shop_core::ProductId;
use corner_shop_storefront::catalog::{Catalog, Product};
use corner_shop_storefront::storage::FileStore;
use corner_shop_storefront::{Result, Storefront};

/// Id of the lamp: $10.00, two in stock.
pub const LAMP: ProductId = ProductId::new(1);
/// Id of the mug: $5.00, nine in stock.
pub const MUG: ProductId = ProductId::new(2);

/// A storefront data directory that outlives individual [`Storefront`]s.
pub struct TestContext {
    dir: TempDir,
}

impl TestContext {
    /// Create an empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Open a storefront over the data directory with [`catalog`].
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Storefront::open`], e.g. for corrupt data.
    pub fn open(&self) -> Result<Storefront> {
        let store = FileStore::open(self.dir.path())?;
        Storefront::open(Box::new(store), catalog())
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    /// Raw JSON stored under `key`, if any.
    #[must_use]
    pub fn read_raw(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    /// Parsed JSON stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is missing or not valid JSON.
    #[must_use]
    pub fn read_json(&self, key: &str) -> serde_json::Value {
        let raw = self.read_raw(key).expect("Key is not stored");
        serde_json::from_str(&raw).expect("Stored value is not JSON")
    }

    /// Overwrite the value stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_raw(&self, key: &str, value: &str) {
        fs::write(self.path(key), value).expect("Failed to write stored value");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-product catalog used by every test.
///
/// # Panics
///
/// Panics if the fixture is invalid.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::from_products(vec![
        product(LAMP, "Lamp", Decimal::from(10), 2),
        product(MUG, "Mug", Decimal::from(5), 9),
    ])
    .expect("Invalid test catalog")
}

fn product(id: ProductId, name: &str, price: Decimal, stock: u32) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        stock,
        image: format!("/images/products/{id}.jpg"),
    }
}

/// A fixed purchase date.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("Invalid date")
}

/// A deterministic random source for purchase statuses.
#[must_use]
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}
