//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in and sign-up against the stored user list
//! - `account` - Profile, password, address and payment card edits
//! - `checkout` - The checkout form, its state machine and purchase recording
//! - `contact` - Contact form validation

pub mod account;
pub mod auth;
pub mod checkout;
pub mod contact;

pub use account::{AccountError, AccountService, AddressForm, CardForm, PasswordForm, ProfileForm};
pub use auth::{AuthError, AuthService, SignInForm, SignUpForm};
pub use checkout::{
    Checkout, CheckoutError, CheckoutField, CheckoutForm, CheckoutService, CheckoutState,
};
pub use contact::{ContactError, ContactForm, ContactMessage};
