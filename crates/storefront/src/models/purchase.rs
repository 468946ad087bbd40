//! Purchase records.

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use corner_shop_core::{PurchaseStatus, ShippingMethod};

use crate::cart::{Cart, CartItem};

/// A completed purchase, appended to a user's history.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(with = "purchase_date")]
    pub date: NaiveDate,
    pub items: Vec<PurchasedItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: PurchaseStatus,
}

impl Purchase {
    /// Snapshot `cart` into a purchase dated `date` with a random status.
    #[must_use]
    pub fn from_cart<R: Rng + ?Sized>(cart: &Cart, date: NaiveDate, rng: &mut R) -> Self {
        Self {
            date,
            items: cart.items().iter().map(PurchasedItem::from).collect(),
            total: cart.total(),
            status: PurchaseStatus::random(rng),
        }
    }

    /// Date as shown in the order history.
    #[must_use]
    pub fn date_display(&self) -> String {
        self.date.format(purchase_date::FORMAT).to_string()
    }

    /// Σ quantity over the purchased lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A cart line as it was at purchase time, without the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub image: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<ShippingMethod>,
}

impl PurchasedItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl From<&CartItem> for PurchasedItem {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price,
            stock: item.stock,
            image: item.image.clone(),
            quantity: item.quantity,
            shipping_method: item.shipping_method,
        }
    }
}

/// `dd/mm/yyyy` serde format for purchase dates.
mod purchase_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
