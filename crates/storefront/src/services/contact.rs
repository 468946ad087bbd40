//! Contact form.
//!
//! There is no delivery channel: an accepted message is recorded as a
//! tracing event and handed back to the caller.

use thiserror::Error;
use tracing::instrument;

use corner_shop_core::ContactSubject;

use crate::validation::{self, FieldErrors};

/// Errors that can occur when submitting the contact form.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The form has invalid fields.
    #[error("invalid form: {0}")]
    Validation(FieldErrors),
}

/// Contact form input.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: Option<ContactSubject>,
    pub message: String,
}

impl ContactForm {
    /// Validate every field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.require("name", &self.name, "Name is required.");

        if errors.require("email", &self.email, "Email is required.")
            && !validation::is_form_email(&self.email)
        {
            errors.insert("email", "Invalid email address.");
        }

        if self.subject.is_none() {
            errors.insert("subject", "Please select a subject.");
        }

        errors.require("message", &self.message, "Message is required.");
        errors
    }
}

/// An accepted contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: ContactSubject,
    pub message: String,
}

/// Validate and accept a contact form.
///
/// # Errors
///
/// Returns `ContactError::Validation` listing every invalid field.
#[instrument(skip(form), fields(email = %form.email))]
pub fn submit(form: &ContactForm) -> Result<ContactMessage, ContactError> {
    let errors = form.validate();
    let Some(subject) = form.subject else {
        return Err(ContactError::Validation(errors));
    };
    errors.into_result().map_err(ContactError::Validation)?;

    let message = ContactMessage {
        name: form.name.trim().to_string(),
        email: form.email.clone(),
        subject,
        message: form.message.trim().to_string(),
    };

    tracing::info!(
        name = %message.name,
        subject = subject.token(),
        length = message.message.len(),
        "Contact message received"
    );
    Ok(message)
}
