//! Checkout flow.
//!
//! A [`Checkout`] holds the form, the guest's account choice and the flow
//! state:
//!
//! ```text
//! EmptyCart            cart has no lines
//! Filling ──submit──▶ Invalid ──edit──▶ Filling
//!    │
//!    └──submit──▶ Submitting ──▶ Purchased
//! ```
//!
//! A guest must pick an account option before submitting. Until then the
//! flow is disabled but not invalid. `Purchased` is terminal.

use std::str::FromStr;

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use corner_shop_core::{AccountOption, Email, PaymentMethod};

use crate::cart::Cart;
use crate::db::{RepositoryError, SessionRepository, UserRepository};
use crate::models::{Password, Purchase, User};
use crate::storage::KeyValueStore;
use crate::validation::{self, FieldErrors, MIN_PASSWORD_LEN};

/// Errors that can occur when submitting a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more fields are invalid.
    #[error("invalid checkout form: {0}")]
    Validation(FieldErrors),

    /// A guest asked to create an account with an email already registered.
    #[error("an account with this email already exists")]
    DuplicateAccount,

    /// A guest has not chosen between guest checkout and a new account.
    #[error("choose guest checkout or account creation first")]
    AccountOptionRequired,

    /// There is nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// This checkout already completed.
    #[error("purchase already completed")]
    AlreadyPurchased,

    /// A choice field was given an unknown value.
    #[error("{0}")]
    InvalidChoice(String),

    /// Repository/storage error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fields of the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutField {
    FirstName,
    LastName,
    /// Contact email; ignored when a user is signed in.
    Email,
    Phone,
    Address,
    City,
    Zip,
    Country,
    Password,
    PaymentMethod,
    CardHolder,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl CheckoutField {
    /// Every field, in form order.
    pub const ALL: [Self; 14] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::Zip,
        Self::Country,
        Self::Password,
        Self::PaymentMethod,
        Self::CardHolder,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
    ];

    /// Field name used as the error key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::Zip => "zip",
            Self::Country => "country",
            Self::Password => "password",
            Self::PaymentMethod => "paymentMethod",
            Self::CardHolder => "cardHolder",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
        }
    }
}

impl std::fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckoutField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("invalid checkout field: {s}"))
    }
}

/// Billing, shipping and payment details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    /// Only used when a guest creates an account.
    pub password: String,
    pub payment_method: Option<PaymentMethod>,
    pub card_holder: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl CheckoutForm {
    /// Form pre-filled from a signed-in user's profile and address.
    #[must_use]
    pub fn prefilled(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            city: user.city.clone(),
            zip: user.zip.clone(),
            country: user.country.clone(),
            ..Self::default()
        }
    }

    /// Set one field from raw input.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidChoice` if `field` is the payment
    /// method and `value` is not a known method. An empty value clears it.
    pub fn set(&mut self, field: CheckoutField, value: &str) -> Result<(), CheckoutError> {
        let slot = match field {
            CheckoutField::FirstName => &mut self.first_name,
            CheckoutField::LastName => &mut self.last_name,
            CheckoutField::Email => &mut self.email,
            CheckoutField::Phone => &mut self.phone,
            CheckoutField::Address => &mut self.address,
            CheckoutField::City => &mut self.city,
            CheckoutField::Zip => &mut self.zip,
            CheckoutField::Country => &mut self.country,
            CheckoutField::Password => &mut self.password,
            CheckoutField::CardHolder => &mut self.card_holder,
            CheckoutField::CardNumber => &mut self.card_number,
            CheckoutField::ExpiryDate => &mut self.expiry_date,
            CheckoutField::Cvv => &mut self.cvv,
            CheckoutField::PaymentMethod => {
                self.payment_method = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(CheckoutError::InvalidChoice)?)
                };
                return Ok(());
            }
        };
        value.clone_into(slot);
        Ok(())
    }

    /// Validate every field together.
    ///
    /// The password rules only apply when `account_option` is
    /// [`AccountOption::Create`]; the card rules only when paying by card.
    #[must_use]
    pub fn validate(&self, account_option: Option<AccountOption>) -> FieldErrors {
        use CheckoutField as F;

        let mut errors = FieldErrors::new();

        errors.require(F::FirstName.name(), &self.first_name, "First name is required");
        errors.require(F::LastName.name(), &self.last_name, "Last name is required");
        if errors.require(F::Email.name(), &self.email, "Email is required")
            && !validation::is_checkout_email(&self.email)
        {
            errors.insert(F::Email.name(), "Invalid email");
        }
        if !validation::is_numeric(&self.phone) {
            errors.insert(F::Phone.name(), "Phone must be numeric");
        }

        errors.require(F::Address.name(), &self.address, "Address is required");
        errors.require(F::City.name(), &self.city, "City is required");
        errors.require(F::Zip.name(), &self.zip, "ZIP is required");
        errors.require(F::Country.name(), &self.country, "Country is required");

        match self.payment_method {
            None => errors.insert(F::PaymentMethod.name(), "Please select a payment method"),
            Some(PaymentMethod::CreditCard) => self.validate_card(&mut errors),
            Some(PaymentMethod::Paypal | PaymentMethod::Cash) => {}
        }

        if account_option == Some(AccountOption::Create)
            && errors.require(F::Password.name(), &self.password, "Password is required")
            && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.insert(F::Password.name(), "Password must be at least 6 characters");
        }

        errors
    }

    fn validate_card(&self, errors: &mut FieldErrors) {
        use CheckoutField as F;

        errors.require(
            F::CardHolder.name(),
            &self.card_holder,
            "Card Holder Name is required",
        );
        if errors.require(F::CardNumber.name(), &self.card_number, "Card Number is required")
            && !validation::is_card_number(&self.card_number)
        {
            errors.insert(F::CardNumber.name(), "Card Number must be 16 digits");
        }
        if errors.require(F::ExpiryDate.name(), &self.expiry_date, "Expiry Date is required")
            && !validation::is_expiry(&self.expiry_date)
        {
            errors.insert(F::ExpiryDate.name(), "Expiry Date must be in MM/YY format");
        }
        if errors.require(F::Cvv.name(), &self.cvv, "CVV is required")
            && !validation::is_cvv(&self.cvv)
        {
            errors.insert(F::Cvv.name(), "CVV must be 3 or 4 digits");
        }
    }
}

/// Where the checkout flow stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// The cart is empty; there is nothing to check out.
    EmptyCart,
    /// The form is being edited.
    Filling,
    /// The last submission failed validation. See [`Checkout::errors`].
    Invalid,
    /// Validation passed and the purchase is being recorded.
    Submitting,
    /// The purchase completed.
    Purchased(Purchase),
}

/// One checkout session.
#[derive(Debug, Clone)]
pub struct Checkout {
    form: CheckoutForm,
    account_option: Option<AccountOption>,
    signed_in: bool,
    errors: FieldErrors,
    state: CheckoutState,
}

impl Checkout {
    /// Start a checkout for `cart`, pre-filling the form for a signed-in user.
    #[must_use]
    pub fn begin(user: Option<&User>, cart: &Cart) -> Self {
        Self {
            form: user.map(CheckoutForm::prefilled).unwrap_or_default(),
            account_option: None,
            signed_in: user.is_some(),
            errors: FieldErrors::new(),
            state: if cart.is_empty() {
                CheckoutState::EmptyCart
            } else {
                CheckoutState::Filling
            },
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The form as entered so far.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Field errors still shown from the last submission.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The guest's account choice, if made.
    #[must_use]
    pub const fn account_option(&self) -> Option<AccountOption> {
        self.account_option
    }

    /// The completed purchase, once the flow reaches `Purchased`.
    #[must_use]
    pub const fn purchase(&self) -> Option<&Purchase> {
        match &self.state {
            CheckoutState::Purchased(purchase) => Some(purchase),
            _ => None,
        }
    }

    /// Choose guest checkout or account creation.
    ///
    /// Signed-in users have no choice to make; for them this does nothing
    /// and returns `false`.
    pub fn choose_account_option(&mut self, option: AccountOption) -> bool {
        if self.signed_in {
            return false;
        }
        self.account_option = Some(option);
        true
    }

    /// Whether submission is held back because a guest has not chosen an
    /// account option yet.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        !self.signed_in && self.account_option.is_none()
    }

    /// Edit one field, clearing its error and returning an invalid flow to
    /// `Filling`.
    ///
    /// For a signed-in user the email field is validated but never saved:
    /// the purchase is recorded on the account that is signed in, and only
    /// profile and address fields are copied onto it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AlreadyPurchased` after completion, or
    /// `CheckoutError::InvalidChoice` for an unknown payment method.
    pub fn set_field(&mut self, field: CheckoutField, value: &str) -> Result<(), CheckoutError> {
        if matches!(self.state, CheckoutState::Purchased(_)) {
            return Err(CheckoutError::AlreadyPurchased);
        }

        self.form.set(field, value)?;
        self.errors.clear_field(field.name());
        if self.state == CheckoutState::Invalid {
            self.state = CheckoutState::Filling;
        }
        Ok(())
    }

    /// Validate the form as it stands without changing state.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        self.form.validate(self.effective_option())
    }

    const fn effective_option(&self) -> Option<AccountOption> {
        if self.signed_in {
            None
        } else {
            self.account_option
        }
    }

    fn reject(&mut self, errors: FieldErrors) -> CheckoutError {
        self.errors = errors.clone();
        self.state = CheckoutState::Invalid;
        CheckoutError::Validation(errors)
    }
}

/// Records purchases and the accounts created along the way.
pub struct CheckoutService<'a> {
    users: UserRepository<'a>,
    session: SessionRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            users: UserRepository::new(store),
            session: SessionRepository::new(store),
        }
    }

    /// Submit `checkout`.
    ///
    /// On success the purchase (dated `today`, status drawn from `rng`) is
    /// stored for signed-in users and new accounts, a new account becomes
    /// `current_user`, the cart is emptied and the flow is `Purchased`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` or `CheckoutError::DuplicateAccount`
    /// with the field errors recorded on `checkout`, the state errors
    /// (`EmptyCart`, `AccountOptionRequired`, `AlreadyPurchased`), or
    /// `CheckoutError::Repository` if `users` cannot be written. Failing to
    /// save the emptied cart or the current user afterwards is logged and
    /// does not undo the purchase.
    #[instrument(skip_all, fields(signed_in = current_user.is_some()))]
    pub fn submit<R: Rng + ?Sized>(
        &self,
        checkout: &mut Checkout,
        cart: &mut Cart,
        current_user: &mut Option<User>,
        rng: &mut R,
        today: NaiveDate,
    ) -> Result<Purchase, CheckoutError> {
        if matches!(checkout.state, CheckoutState::Purchased(_)) {
            return Err(CheckoutError::AlreadyPurchased);
        }
        if cart.is_empty() {
            checkout.state = CheckoutState::EmptyCart;
            return Err(CheckoutError::EmptyCart);
        }
        if checkout.is_disabled() {
            return Err(CheckoutError::AccountOptionRequired);
        }

        let errors = checkout.validate();
        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "Checkout form invalid");
            return Err(checkout.reject(errors));
        }

        checkout.state = CheckoutState::Submitting;
        let purchase = Purchase::from_cart(cart, today, rng);

        let recorded = self.record(checkout, current_user, &purchase);
        if let Err(err) = recorded {
            if matches!(checkout.state, CheckoutState::Submitting) {
                checkout.state = CheckoutState::Filling;
            }
            return Err(err);
        }

        // The purchase is committed once `users` is written; later session
        // writes only refresh the cache and must not fail the checkout.
        cart.clear();
        if let Err(err) = self.session.save_cart(cart) {
            tracing::warn!(error = %err, "Failed to persist emptied cart after purchase");
        }

        tracing::info!(
            total = %purchase.total,
            items = purchase.item_count(),
            status = %purchase.status,
            "Purchase completed"
        );
        checkout.errors = FieldErrors::new();
        checkout.state = CheckoutState::Purchased(purchase.clone());
        Ok(purchase)
    }

    fn record(
        &self,
        checkout: &mut Checkout,
        current_user: &mut Option<User>,
        purchase: &Purchase,
    ) -> Result<(), CheckoutError> {
        let form = &checkout.form;

        if let Some(user) = current_user.as_mut() {
            let mut updated = user.clone();
            updated.first_name.clone_from(&form.first_name);
            updated.last_name.clone_from(&form.last_name);
            updated.phone.clone_from(&form.phone);
            updated.address.clone_from(&form.address);
            updated.city.clone_from(&form.city);
            updated.zip.clone_from(&form.zip);
            updated.country.clone_from(&form.country);
            updated.purchases.push(purchase.clone());

            self.users.update(&user.email, &updated)?;
            self.save_session_user(&updated);
            *user = updated;
            return Ok(());
        }

        if checkout.account_option != Some(AccountOption::Create) {
            tracing::debug!("Guest purchase, nothing stored");
            return Ok(());
        }

        let mut new_user = new_account(form).map_err(|errors| checkout.reject(errors))?;
        new_user.purchases.push(purchase.clone());

        match self.users.create(&new_user) {
            Ok(()) => {}
            Err(RepositoryError::Conflict(_)) => {
                let mut errors = FieldErrors::new();
                errors.insert(
                    CheckoutField::Email.name(),
                    "User with this email already exists!",
                );
                checkout.reject(errors);
                tracing::warn!("Checkout account email already registered");
                return Err(CheckoutError::DuplicateAccount);
            }
            Err(other) => return Err(other.into()),
        }

        self.save_session_user(&new_user);
        tracing::info!(email = %new_user.email, "Account created at checkout");
        *current_user = Some(new_user);
        Ok(())
    }

    /// Mirror `user` into the session after `users` already holds it.
    fn save_session_user(&self, user: &User) {
        if let Err(err) = self.session.save_current_user(Some(user)) {
            tracing::warn!(error = %err, "Failed to persist current user after purchase");
        }
    }
}

/// A new user built from the checkout form.
fn new_account(form: &CheckoutForm) -> Result<User, FieldErrors> {
    let email = Email::parse(&form.email).map_err(|_| {
        let mut errors = FieldErrors::new();
        errors.insert(CheckoutField::Email.name(), "Invalid email");
        errors
    })?;

    let mut user = User::new(email, Password::new(form.password.as_str()));
    user.first_name.clone_from(&form.first_name);
    user.last_name.clone_from(&form.last_name);
    user.phone.clone_from(&form.phone);
    user.address.clone_from(&form.address);
    user.city.clone_from(&form.city);
    user.zip.clone_from(&form.zip);
    user.country.clone_from(&form.country);
    Ok(user)
}
