//! Sign up, sign in and sign out.

use tracing::info;

use corner_shop_storefront::Storefront;
use corner_shop_storefront::services::{SignInForm, SignUpForm};

/// Create an account and sign in.
///
/// # Errors
///
/// Returns the errors of [`Storefront::sign_up`].
pub fn sign_up(
    shop: &mut Storefront,
    email: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = shop.sign_up(&SignUpForm { email, password })?;
    info!(email = %user.email, "Account created, you are signed in");
    Ok(())
}

/// Sign in.
///
/// # Errors
///
/// Returns the errors of [`Storefront::sign_in`].
pub fn sign_in(
    shop: &mut Storefront,
    email: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = shop.sign_in(&SignInForm { email, password })?;
    let name = user
        .display_name()
        .unwrap_or_else(|| user.email.to_string());
    info!("Welcome back, {name}");
    Ok(())
}

/// Sign out.
///
/// # Errors
///
/// Returns a storage error if the session cannot be cleared.
pub fn sign_out(shop: &mut Storefront) -> Result<(), Box<dyn std::error::Error>> {
    if !shop.is_signed_in() {
        info!("Not signed in");
        return Ok(());
    }
    shop.sign_out()?;
    info!("Signed out");
    Ok(())
}

/// Show who is signed in.
pub fn whoami(shop: &Storefront) {
    match shop.user() {
        Some(user) => info!(email = %user.email, "Signed in"),
        None => info!("Not signed in"),
    }
}
