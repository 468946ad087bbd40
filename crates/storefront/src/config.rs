//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_DATA_DIR` - Directory of the file store (default: `.corner-shop`)
//! - `STOREFRONT_CATALOG_PATH` - JSON product list replacing the built-in catalog
//! - `STOREFRONT_CURRENCY` - Display currency code (default: USD)
//! - `STOREFRONT_PAGE_SIZE` - Products shown before "load more" (default: 12)
//! - `STOREFRONT_PAGE_STEP` - Products added by each "load more" (default: 8)
//! - `STOREFRONT_SEARCH_LIMIT` - Maximum search results (default: 10)

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use corner_shop_core::CurrencyCode;

const DEFAULT_DATA_DIR: &str = ".corner-shop";
const DEFAULT_PAGE_SIZE: usize = 12;
const DEFAULT_PAGE_STEP: usize = 8;
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding the persisted `cart`, `user` and `users` values
    pub data_dir: PathBuf,
    /// Catalog file overriding the built-in products
    pub catalog_path: Option<PathBuf>,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// Products visible before the first "load more"
    pub page_size: usize,
    /// Products revealed by each "load more"
    pub page_step: usize,
    /// Maximum number of search results
    pub search_limit: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            catalog_path: None,
            currency: CurrencyCode::default(),
            page_size: DEFAULT_PAGE_SIZE,
            page_step: DEFAULT_PAGE_STEP,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        Ok(Self {
            data_dir: PathBuf::from(env.get_or_default("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR)),
            catalog_path: env.get_optional("STOREFRONT_CATALOG_PATH").map(PathBuf::from),
            currency: env.parse_or("STOREFRONT_CURRENCY", CurrencyCode::default())?,
            page_size: env.parse_positive("STOREFRONT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            page_step: env.parse_positive("STOREFRONT_PAGE_STEP", DEFAULT_PAGE_STEP)?,
            search_limit: env.parse_positive("STOREFRONT_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Set and non-blank.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    fn parse_positive(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        let value = self.parse_or(key, default)?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.data_dir, PathBuf::from(".corner-shop"));
        assert_eq!(config.page_size, 12);
        assert_eq!(config.page_step, 8);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_DATA_DIR", "/tmp/shop"),
            ("STOREFRONT_CATALOG_PATH", "catalog.json"),
            ("STOREFRONT_CURRENCY", "eur"),
            ("STOREFRONT_PAGE_SIZE", "6"),
            ("STOREFRONT_PAGE_STEP", " 3 "),
            ("STOREFRONT_SEARCH_LIMIT", "4"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.catalog_path, Some(PathBuf::from("catalog.json")));
        assert_eq!(config.currency, CurrencyCode::EUR);
        assert_eq!(config.page_size, 6);
        assert_eq!(config.page_step, 3);
        assert_eq!(config.search_limit, 4);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = load(&[("STOREFRONT_DATA_DIR", "  "), ("STOREFRONT_PAGE_SIZE", "")]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".corner-shop"));
        assert_eq!(config.page_size, 12);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("STOREFRONT_PAGE_SIZE", "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PAGE_SIZE"));

        let err = load(&[("STOREFRONT_SEARCH_LIMIT", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("STOREFRONT_CURRENCY", "DOGE")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
