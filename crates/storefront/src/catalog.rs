//! Static product catalog.
//!
//! The catalog is read-only: it is compiled in from `data/products.json`
//! or loaded once from a JSON file named in configuration, and never
//! mutated afterwards. Stock levels here are the totals available; what a
//! shopper can still add is the stock minus what is already in the cart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use corner_shop_core::ProductId;

const BUILTIN_PRODUCTS: &str = include_str!("../data/products.json");

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a valid JSON product list.
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two products share an id.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),

    /// A product has a blank name.
    #[error("product {0} has an empty name")]
    EmptyName(ProductId),

    /// A product has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// A product offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Units still available once `in_cart` units are in the cart.
    ///
    /// Negative when the cart already holds more than the stock.
    #[must_use]
    pub fn remaining_stock(&self, in_cart: u32) -> i64 {
        i64::from(self.stock) - i64::from(in_cart)
    }

    /// Stock badge for this product given the quantity already in the cart.
    #[must_use]
    pub fn stock_status(&self, in_cart: u32) -> StockStatus {
        StockStatus::from_remaining(self.remaining_stock(in_cart))
    }
}

/// Availability badge shown next to a product or cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockStatus {
    InStock,
    /// Exactly one unit left.
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify a remaining-stock count.
    #[must_use]
    pub const fn from_remaining(remaining: i64) -> Self {
        if remaining <= 0 {
            Self::OutOfStock
        } else if remaining == 1 {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Whether another unit may be added to the cart.
    #[must_use]
    pub const fn can_add(&self) -> bool {
        !matches!(self, Self::OutOfStock)
    }

    /// Badge text, if any.
    #[must_use]
    pub const fn badge(&self) -> Option<&'static str> {
        match self {
            Self::InStock => None,
            Self::LowStock => Some("Low stock!"),
            Self::OutOfStock => Some("Out of stock"),
        }
    }
}

/// The read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from a product list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if ids repeat, a name is blank or a price is
    /// negative.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(product.id));
            }
            if product.price.is_sign_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products, index })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and the
    /// [`from_products`](Self::from_products) errors otherwise.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::from_products(products)
    }

    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_PRODUCTS)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, or a parse or
    /// validation error.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).and_then(|&i| self.products.get(i))
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The first `visible` products (fewer if the catalog is smaller).
    #[must_use]
    pub fn page(&self, visible: usize) -> &[Product] {
        let end = visible.min(self.products.len());
        self.products.get(..end).unwrap_or_default()
    }

    /// Case-insensitive name search.
    ///
    /// Names starting with the query rank before names merely containing
    /// it; otherwise catalog order is kept. An empty query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Product> {
        if query.is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let mut hits: Vec<(bool, &Product)> = self
            .products
            .iter()
            .filter_map(|product| {
                let name = product.name.to_lowercase();
                name.contains(&needle)
                    .then(|| (!name.starts_with(&needle), product))
            })
            .collect();

        hits.sort_by_key(|(not_prefix, _)| *not_prefix);
        hits.into_iter()
            .take(limit)
            .map(|(_, product)| product)
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// "Load more" paging state for the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductListing {
    visible: usize,
    step: usize,
}

impl ProductListing {
    /// Start with `page_size` products visible, growing by `step`.
    #[must_use]
    pub const fn new(page_size: usize, step: usize) -> Self {
        Self {
            visible: page_size,
            step,
        }
    }

    /// Reveal the next `step` products.
    pub const fn load_more(&mut self) {
        self.visible = self.visible.saturating_add(self.step);
    }

    /// Number of products currently requested.
    #[must_use]
    pub const fn visible(&self) -> usize {
        self.visible
    }

    /// Products visible in `catalog`.
    #[must_use]
    pub fn products<'c>(&self, catalog: &'c Catalog) -> &'c [Product] {
        catalog.page(self.visible)
    }

    /// Whether the catalog has products beyond the visible ones.
    #[must_use]
    pub fn has_more(&self, catalog: &Catalog) -> bool {
        self.visible < catalog.len()
    }
}
