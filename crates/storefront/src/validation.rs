//! Form validation helpers shared by the auth, account, checkout and
//! contact services.
//!
//! Every form reports all of its failing fields at once. Each field carries
//! at most one message: the first rule that fails for it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Email pattern used by checkout and sign-in.
static CHECKOUT_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

/// Looser, unanchored email pattern used by sign-up.
static SIGN_UP_EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex"));

/// Email pattern used by the profile and contact forms.
static FORM_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.-]+@[A-Za-z0-9_.-]+\.[A-Za-z0-9_]+$").expect("Invalid regex")
});

static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));

static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("Invalid regex"));

static CVV_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("Invalid regex"));

/// Minimum password length for new accounts and password changes.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `value` is blank.
    ///
    /// Returns whether the value was present, so callers can chain further
    /// checks that only make sense for non-empty input.
    pub fn require(&mut self, field: &'static str, value: &str, message: &str) -> bool {
        if is_blank(value) {
            self.insert(field, message);
            false
        } else {
            true
        }
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Whether `field` failed.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Drop the error for `field`. Returns whether there was one.
    pub fn clear_field(&mut self, field: &str) -> bool {
        self.errors.remove(field).is_some()
    }

    /// Errors in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the errors themselves when any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

/// Empty or whitespace only.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Email check applied by checkout and sign-in.
#[must_use]
pub fn is_checkout_email(value: &str) -> bool {
    CHECKOUT_EMAIL_RE.is_match(value)
}

/// Email check applied by sign-up.
#[must_use]
pub fn is_sign_up_email(value: &str) -> bool {
    SIGN_UP_EMAIL_RE.is_match(value)
}

/// Email check applied by the profile and contact forms.
#[must_use]
pub fn is_form_email(value: &str) -> bool {
    FORM_EMAIL_RE.is_match(value)
}

/// Exactly 16 digits once whitespace is removed.
#[must_use]
pub fn is_card_number(value: &str) -> bool {
    CARD_NUMBER_RE.is_match(&strip_whitespace(value))
}

/// `MM/YY` with a month from 01 to 12.
#[must_use]
pub fn is_expiry(value: &str) -> bool {
    EXPIRY_RE.is_match(value)
}

/// Three or four digits.
#[must_use]
pub fn is_cvv(value: &str) -> bool {
    CVV_RE.is_match(value)
}

/// One or more ASCII digits and nothing else.
#[must_use]
pub fn is_digits(value: &str) -> bool {
    DIGITS_RE.is_match(value)
}

/// Whether the value reads as a number.
///
/// Surrounding whitespace is ignored and a blank value counts as numeric.
/// Anything `f64` parses to a finite value passes, so `"1e3"` and `"-2"` do.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Remove every whitespace character.
#[must_use]
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Keep at most `max` ASCII digits from `value`.
#[must_use]
pub fn digits_only(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Normalize card number input: up to 16 digits in groups of four.
#[must_use]
pub fn format_card_number(value: &str) -> String {
    let digits = digits_only(value, 16);
    let mut formatted = String::with_capacity(digits.len() + 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    formatted
}

/// Normalize expiry input: up to four digits with `/` after the month.
#[must_use]
pub fn format_expiry(value: &str) -> String {
    let digits = digits_only(value, 4);
    if digits.len() > 2 {
        let (month, year) = digits.split_at(2);
        format!("{month}/{year}")
    } else {
        digits
    }
}
