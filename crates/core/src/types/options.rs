//! Customer choices offered by the storefront forms.
//!
//! Each enum serializes to the same short token the persisted records use
//! (`"creditCard"`, `"express"`, `"Visa"` …) and parses back from it.

use serde::{Deserialize, Serialize};

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Token used in persisted records and on the command line.
            #[must_use]
            pub const fn token(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    _ => Err(format!(
                        concat!("invalid ", stringify!($name), ": {}"),
                        s
                    )),
                }
            }
        }
    };
}

token_enum! {
    /// How an order is paid for at checkout.
    PaymentMethod {
        CreditCard => "creditCard", "Credit Card";
        Paypal => "paypal", "PayPal";
        Cash => "cash", "Cash on Delivery";
    }
}

token_enum! {
    /// Choice a signed-out shopper makes before checking out.
    AccountOption {
        Guest => "guest", "Continue as Guest";
        Create => "create", "Create an Account";
    }
}

token_enum! {
    /// Delivery speed picked on the product page.
    ShippingMethod {
        Standard => "standard", "Standard Shipping (3-5 days)";
        Express => "express", "Express Shipping (1-2 days)";
        Overnight => "overnight", "Overnight Shipping (Next day)";
    }
}

token_enum! {
    /// Card networks accepted for saved payment cards.
    CardType {
        Visa => "Visa", "Visa";
        Mastercard => "Mastercard", "Mastercard";
        AmericanExpress => "American Express", "American Express";
    }
}

token_enum! {
    /// Topic of a contact form message.
    ContactSubject {
        General => "general", "General Inquiry";
        Support => "support", "Support";
        Feedback => "feedback", "Feedback";
        Other => "other", "Other";
    }
}

impl PaymentMethod {
    /// Label of the button that confirms a purchase with this method.
    #[must_use]
    pub const fn confirm_label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Pay with Credit Card",
            Self::Paypal => "Pay with PayPal",
            Self::Cash => "Confirm Cash on Delivery",
        }
    }
}

impl Default for ShippingMethod {
    fn default() -> Self {
        Self::Standard
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip_through_from_str() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.token().parse::<PaymentMethod>().unwrap(), *method);
        }
        for card in CardType::ALL {
            assert_eq!(card.token().parse::<CardType>().unwrap(), *card);
        }
    }

    #[test]
    fn test_serde_uses_tokens() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"creditCard\""
        );
        assert_eq!(
            serde_json::to_string(&CardType::AmericanExpress).unwrap(),
            "\"American Express\""
        );
        let method: ShippingMethod = serde_json::from_str("\"overnight\"").unwrap();
        assert_eq!(method, ShippingMethod::Overnight);
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err, "invalid PaymentMethod: bitcoin");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ShippingMethod::default().label(), "Standard Shipping (3-5 days)");
        assert_eq!(ContactSubject::General.to_string(), "General Inquiry");
        assert_eq!(PaymentMethod::Cash.confirm_label(), "Confirm Cash on Delivery");
    }
}
