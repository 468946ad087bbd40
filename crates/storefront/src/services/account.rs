//! Account management for signed-in users.
//!
//! Each edit validates its form, applies it to a copy of the user and, once
//! both `users` and `user` have been written, swaps the copy in. A failed
//! edit leaves the caller's user untouched.

use thiserror::Error;
use tracing::instrument;

use corner_shop_core::{CardType, Email};

use crate::db::{RepositoryError, SessionRepository, UserRepository};
use crate::models::{Password, PaymentCard, User};
use crate::storage::KeyValueStore;
use crate::validation::{self, FieldErrors, MIN_PASSWORD_LEN};

/// Errors that can occur while editing an account.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The submitted form has invalid fields.
    #[error("invalid form: {0}")]
    Validation(FieldErrors),

    /// The new email already belongs to another user.
    #[error("email already registered to another user")]
    EmailTaken,

    /// No saved card at this position.
    #[error("no saved card at position {0}")]
    CardNotFound(usize),

    /// Repository/storage error.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Personal details form.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl ProfileForm {
    /// Form pre-filled from `user`.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.to_string(),
            phone: user.phone.clone(),
        }
    }

    /// Validate every field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("firstName", &self.first_name, "First name is required.");
        errors.require("lastName", &self.last_name, "Last name is required.");

        if errors.require("email", &self.email, "Email is required.")
            && (!validation::is_form_email(&self.email) || Email::parse(&self.email).is_err())
        {
            errors.insert("email", "Invalid email address.");
        }

        let phone = self.phone.trim();
        if !phone.is_empty() && !validation::is_digits(phone) {
            errors.insert("phone", "Phone must contain only numbers.");
        }
        errors
    }
}

/// Password change form.
#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    /// Validate against the user's stored password.
    #[must_use]
    pub fn validate(&self, stored: &Password) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.current_password.is_empty() {
            errors.insert("currentPassword", "Current password is required.");
        } else if !stored.matches(&self.current_password) {
            errors.insert("currentPassword", "Current password is incorrect.");
        }

        if self.new_password.is_empty() {
            errors.insert("newPassword", "New password is required.");
        } else if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("newPassword", "Password must be at least 6 characters.");
        }

        if self.confirm_password != self.new_password {
            errors.insert("confirmPassword", "Passwords do not match.");
        }
        errors
    }
}

/// Shipping address form.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

impl AddressForm {
    /// Form pre-filled from `user`.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            address: user.address.clone(),
            city: user.city.clone(),
            zip: user.zip.clone(),
            country: user.country.clone(),
        }
    }

    /// Validate every field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("address", &self.address, "Address is required.");
        errors.require("city", &self.city, "City is required.");
        errors.require("zip", &self.zip, "ZIP code is required.");
        errors.require("country", &self.country, "Country is required.");
        errors
    }
}

/// New payment card form.
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub card_type: Option<CardType>,
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl CardForm {
    /// Build a form, normalizing raw input the way the card fields do as
    /// the user types.
    #[must_use]
    pub fn new(card_type: Option<CardType>, number: &str, expiry: &str, cvc: &str) -> Self {
        Self {
            card_type,
            number: validation::format_card_number(number),
            expiry: validation::format_expiry(expiry),
            cvc: validation::digits_only(cvc, 4),
        }
    }

    /// Validate every field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.card_type.is_none() {
            errors.insert("cardType", "Card type is required.");
        }

        let digits = validation::strip_whitespace(&self.number);
        if digits.is_empty() {
            errors.insert("number", "Card number is required.");
        } else if digits.chars().count() != 16 {
            errors.insert("number", "Card number must be 16 digits.");
        }

        errors.require("expiry", &self.expiry, "Expiry date is required.");
        errors.require("cvc", &self.cvc, "CVC is required.");
        errors
    }
}

/// Account management service.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
    session: SessionRepository<'a>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            users: UserRepository::new(store),
            session: SessionRepository::new(store),
        }
    }

    /// Update name, email and phone.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for invalid fields,
    /// `AccountError::EmailTaken` if the new email belongs to someone else,
    /// or `AccountError::Repository` if saving fails.
    #[instrument(skip(self, user, form), fields(email = %user.email))]
    pub fn update_profile(&self, user: &mut User, form: &ProfileForm) -> Result<(), AccountError> {
        form.validate().into_result().map_err(AccountError::Validation)?;

        let mut updated = user.clone();
        updated.first_name.clone_from(&form.first_name);
        updated.last_name.clone_from(&form.last_name);
        updated.phone.clone_from(&form.phone);
        updated.email = Email::parse(&form.email).map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.insert("email", "Invalid email address.");
            AccountError::Validation(errors)
        })?;

        self.commit(user, updated)?;
        tracing::info!("Profile updated");
        Ok(())
    }

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for invalid fields or a wrong
    /// current password, or `AccountError::Repository` if saving fails.
    #[instrument(skip(self, user, form), fields(email = %user.email))]
    pub fn change_password(&self, user: &mut User, form: &PasswordForm) -> Result<(), AccountError> {
        form.validate(&user.password)
            .into_result()
            .map_err(AccountError::Validation)?;

        let mut updated = user.clone();
        updated.password = Password::new(form.new_password.as_str());

        self.commit(user, updated)?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Update the shipping address.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for missing fields, or
    /// `AccountError::Repository` if saving fails.
    #[instrument(skip(self, user, form), fields(email = %user.email))]
    pub fn update_address(&self, user: &mut User, form: &AddressForm) -> Result<(), AccountError> {
        form.validate().into_result().map_err(AccountError::Validation)?;

        let mut updated = user.clone();
        updated.address.clone_from(&form.address);
        updated.city.clone_from(&form.city);
        updated.zip.clone_from(&form.zip);
        updated.country.clone_from(&form.country);

        self.commit(user, updated)?;
        tracing::info!("Address updated");
        Ok(())
    }

    /// Save a new payment card.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for invalid fields, or
    /// `AccountError::Repository` if saving fails.
    #[instrument(skip(self, user, form), fields(email = %user.email))]
    pub fn add_card(&self, user: &mut User, form: &CardForm) -> Result<PaymentCard, AccountError> {
        let errors = form.validate();
        let Some(card_type) = form.card_type else {
            return Err(AccountError::Validation(errors));
        };
        errors.into_result().map_err(AccountError::Validation)?;

        let card = PaymentCard::new(
            card_type,
            form.number.clone(),
            form.expiry.clone(),
            form.cvc.clone(),
        );
        let mut updated = user.clone();
        updated.payment_info.push(card.clone());

        self.commit(user, updated)?;
        tracing::info!(last4 = %card.last4, "Payment card added");
        Ok(card)
    }

    /// Remove the saved card at `index`.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::CardNotFound` if there is no card at `index`,
    /// or `AccountError::Repository` if saving fails.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub fn remove_card(&self, user: &mut User, index: usize) -> Result<PaymentCard, AccountError> {
        if index >= user.payment_info.len() {
            return Err(AccountError::CardNotFound(index));
        }

        let mut updated = user.clone();
        let removed = updated.payment_info.remove(index);

        self.commit(user, updated)?;
        tracing::info!(last4 = %removed.last4, "Payment card removed");
        Ok(removed)
    }

    /// Write `updated` to `users` (matched by the old email) and `user`, then
    /// replace `user` with it.
    fn commit(&self, user: &mut User, updated: User) -> Result<(), AccountError> {
        self.users.update(&user.email, &updated).map_err(|e| match e {
            RepositoryError::Conflict(_) => AccountError::EmailTaken,
            other => AccountError::Repository(other),
        })?;
        self.session.save_current_user(Some(&updated))?;
        *user = updated;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn setup(store: &MemoryStore) -> User {
        let user = User::new(
            Email::parse("ana@example.com").unwrap(),
            Password::new("secret1"),
        );
        UserRepository::new(store).create(&user).unwrap();
        SessionRepository::new(store)
            .save_current_user(Some(&user))
            .unwrap();
        user
    }

    fn profile(first: &str, last: &str, email: &str, phone: &str) -> ProfileForm {
        ProfileForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_profile_update_persists_to_both_keys() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let service = AccountService::new(&store);

        service
            .update_profile(&mut user, &profile("Ana", "Lima", "ana@example.com", "5551234"))
            .unwrap();

        assert_eq!(user.first_name, "Ana");
        let stored = UserRepository::new(&store)
            .get_by_email("ana@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(stored, user);
        let current = SessionRepository::new(&store)
            .load_current_user()
            .unwrap()
            .unwrap();
        assert_eq!(current, user);
    }

    #[test]
    fn test_profile_validation_messages() {
        let errors = profile(" ", "", "bad", "555-1234").validate();
        assert_eq!(errors.get("firstName"), Some("First name is required."));
        assert_eq!(errors.get("lastName"), Some("Last name is required."));
        assert_eq!(errors.get("email"), Some("Invalid email address."));
        assert_eq!(errors.get("phone"), Some("Phone must contain only numbers."));

        let errors = profile("A", "B", "", "").validate();
        assert_eq!(errors.get("email"), Some("Email is required."));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_failed_edit_leaves_user_untouched() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let before = user.clone();
        let service = AccountService::new(&store);

        let err = service
            .update_profile(&mut user, &profile("", "Lima", "ana@example.com", ""))
            .unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
        assert_eq!(user, before);
    }

    #[test]
    fn test_email_change_rekeys_user() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let service = AccountService::new(&store);

        service
            .update_profile(&mut user, &profile("Ana", "Lima", "ana@new.example.com", ""))
            .unwrap();

        let users = UserRepository::new(&store);
        assert!(users.get_by_email("ana@example.com").unwrap().is_none());
        assert!(users.get_by_email("ana@new.example.com").unwrap().is_some());
        assert_eq!(users.list().unwrap().len(), 1);
    }

    #[test]
    fn test_email_change_to_taken_address() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let other = User::new(
            Email::parse("bo@example.com").unwrap(),
            Password::new("secret2"),
        );
        UserRepository::new(&store).create(&other).unwrap();

        let err = AccountService::new(&store)
            .update_profile(&mut user, &profile("Ana", "Lima", "bo@example.com", ""))
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken));
        assert_eq!(user.email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_change_password() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let service = AccountService::new(&store);

        let wrong = PasswordForm {
            current_password: "nope".to_string(),
            new_password: "abc".to_string(),
            confirm_password: "abd".to_string(),
        };
        let AccountError::Validation(errors) =
            service.change_password(&mut user, &wrong).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("currentPassword"),
            Some("Current password is incorrect.")
        );
        assert_eq!(
            errors.get("newPassword"),
            Some("Password must be at least 6 characters.")
        );
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match."));

        let good = PasswordForm {
            current_password: "secret1".to_string(),
            new_password: "secret9".to_string(),
            confirm_password: "secret9".to_string(),
        };
        service.change_password(&mut user, &good).unwrap();
        assert!(
            UserRepository::new(&store)
                .get_by_credentials("ana@example.com", "secret9")
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_address_validation_and_update() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let service = AccountService::new(&store);

        let empty = AddressForm::default();
        let errors = empty.validate();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("zip"), Some("ZIP code is required."));

        let form = AddressForm {
            address: "1 Main St".to_string(),
            city: "Porto".to_string(),
            zip: "4000".to_string(),
            country: "Portugal".to_string(),
        };
        service.update_address(&mut user, &form).unwrap();
        assert_eq!(user.city, "Porto");
        assert_eq!(AddressForm::from_user(&user).country, "Portugal");
    }

    #[test]
    fn test_card_form_normalizes_input() {
        let form = CardForm::new(
            Some(CardType::Mastercard),
            "5500-0000-0000-0004",
            "1/2/2/8",
            "12ab34",
        );
        assert_eq!(form.number, "5500 0000 0000 0004");
        assert_eq!(form.expiry, "12/28");
        assert_eq!(form.cvc, "1234");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_card_validation_messages() {
        let errors = CardForm::new(None, "1234", "", "").validate();
        assert_eq!(errors.get("cardType"), Some("Card type is required."));
        assert_eq!(errors.get("number"), Some("Card number must be 16 digits."));
        assert_eq!(errors.get("expiry"), Some("Expiry date is required."));
        assert_eq!(errors.get("cvc"), Some("CVC is required."));

        let errors = CardForm::default().validate();
        assert_eq!(errors.get("number"), Some("Card number is required."));
    }

    #[test]
    fn test_add_and_remove_cards() {
        let store = MemoryStore::new();
        let mut user = setup(&store);
        let service = AccountService::new(&store);

        let visa = CardForm::new(Some(CardType::Visa), "4111111111111111", "0830", "123");
        let amex = CardForm::new(
            Some(CardType::AmericanExpress),
            "3782822463100005",
            "0131",
            "4321",
        );
        service.add_card(&mut user, &visa).unwrap();
        let card = service.add_card(&mut user, &amex).unwrap();
        assert_eq!(card.last4, "0005");
        assert_eq!(user.payment_info.len(), 2);

        let removed = service.remove_card(&mut user, 0).unwrap();
        assert_eq!(removed.card_type, CardType::Visa);
        assert_eq!(user.payment_info.len(), 1);
        assert!(matches!(
            service.remove_card(&mut user, 5),
            Err(AccountError::CardNotFound(5))
        ));

        let stored = UserRepository::new(&store)
            .get_by_email("ana@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(stored.payment_info.len(), 1);
    }
}
