//! User domain types.

use serde::{Deserialize, Serialize};

use corner_shop_core::{CardType, Email};

use super::Purchase;

/// A registered storefront user.
///
/// Users are keyed by email and never deleted. The password is stored as
/// entered; this is a mock account system with no server behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: Email,
    pub password: Password,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub payment_info: Vec<PaymentCard>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

impl User {
    /// A new user with empty profile, address, cards and purchases.
    #[must_use]
    pub fn new(email: Email, password: Password) -> Self {
        Self {
            email,
            password,
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            zip: String::new(),
            country: String::new(),
            payment_info: Vec::new(),
            purchases: Vec::new(),
        }
    }

    /// "First Last", or `None` when both are blank.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Purchases, most recent first.
    pub fn purchase_history(&self) -> impl Iterator<Item = &Purchase> {
        self.purchases.iter().rev()
    }
}

/// A plaintext password.
///
/// Serialized as a bare string; `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a password string.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Exact comparison with an entered password.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the password is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// A saved payment card.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    pub card_type: CardType,
    pub last4: String,
    pub expiry: String,
    /// Card number grouped in fours ("1234 5678 9012 3456").
    pub number: String,
    pub cvc: String,
}

impl PaymentCard {
    /// Build a card record; `last4` is derived from the number's digits.
    #[must_use]
    pub fn new(card_type: CardType, number: String, expiry: String, cvc: String) -> Self {
        let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
        let last4 = digits
            .iter()
            .skip(digits.len().saturating_sub(4))
            .collect();
        Self {
            card_type,
            last4,
            expiry,
            number,
            cvc,
        }
    }

    /// Masked form for listings, e.g. "Visa •••• 3456".
    #[must_use]
    pub fn masked(&self) -> String {
        format!("{} •••• {}", self.card_type, self.last4)
    }
}

impl std::fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCard")
            .field("card_type", &self.card_type)
            .field("last4", &self.last4)
            .field("expiry", &self.expiry)
            .field("number", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Email::parse("ana@example.com").unwrap(),
            Password::new("hunter22"),
        )
    }

    #[test]
    fn test_new_user_has_empty_profile() {
        let user = user();
        assert!(user.first_name.is_empty());
        assert!(user.payment_info.is_empty());
        assert!(user.purchases.is_empty());
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["password"], "hunter22");
        assert!(json.get("firstName").is_some());
        assert!(json.get("paymentInfo").is_some());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let parsed: User =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret1"}"#).unwrap();
        assert_eq!(parsed.email.as_str(), "a@b.co");
        assert!(parsed.purchases.is_empty());
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter22");
        assert!(password.matches("hunter22"));
        assert!(!password.matches("Hunter22"));
        assert!(!format!("{password:?}").contains("hunter22"));
        assert!(!format!("{:?}", user()).contains("hunter22"));
    }

    #[test]
    fn test_card_last4_and_redaction() {
        let card = PaymentCard::new(
            CardType::Visa,
            "4111 1111 1111 3456".to_string(),
            "08/29".to_string(),
            "123".to_string(),
        );
        assert_eq!(card.last4, "3456");
        assert_eq!(card.masked(), "Visa •••• 3456");

        let debug = format!("{card:?}");
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("123"));
    }

    #[test]
    fn test_display_name() {
        let mut user = user();
        user.first_name = "Ana".to_string();
        assert_eq!(user.display_name().as_deref(), Some("Ana"));
        user.last_name = "Lima".to_string();
        assert_eq!(user.display_name().as_deref(), Some("Ana Lima"));
    }
}
