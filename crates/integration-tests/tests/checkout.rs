//! Integration tests for the checkout flow.

#![allow(clippy::unwrap_used)]

use corner_shop_core::{AccountOption, PurchaseStatus};
use corner_shop_integration_tests::{LAMP, MUG, TestContext, rng, today};
use corner_shop_storefront::services::{
    Checkout, CheckoutError, CheckoutField, CheckoutState, SignInForm, SignUpForm,
};
use corner_shop_storefront::storage::keys;
use corner_shop_storefront::{AppError, Storefront};
use rust_decimal_macros::dec;

/// Lamp x2 + Mug x1, the $25.00 cart.
fn fill_cart(shop: &mut Storefront) {
    shop.add_to_cart(LAMP, None).unwrap();
    shop.add_to_cart(LAMP, None).unwrap();
    shop.add_to_cart(MUG, None).unwrap();
}

fn fill_form(checkout: &mut Checkout, email: &str) {
    for (field, value) in [
        (CheckoutField::FirstName, "Ana"),
        (CheckoutField::LastName, "Lima"),
        (CheckoutField::Email, email),
        (CheckoutField::Phone, "5551234"),
        (CheckoutField::Address, "1 Main St"),
        (CheckoutField::City, "Porto"),
        (CheckoutField::Zip, "4000"),
        (CheckoutField::Country, "Portugal"),
        (CheckoutField::PaymentMethod, "cash"),
    ] {
        checkout.set_field(field, value).unwrap();
    }
}

fn submit(shop: &mut Storefront, checkout: &mut Checkout) -> corner_shop_storefront::Result<()> {
    shop.submit_checkout_with(checkout, &mut rng(), today())
        .map(|_| ())
}

// ============================================================================
// Guest checkout
// ============================================================================

#[test]
fn test_guest_checkout_clears_cart_and_stores_nothing() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    fill_cart(&mut shop);
    assert_eq!(shop.cart().total(), dec!(25));

    let mut checkout = shop.begin_checkout();
    assert!(checkout.is_disabled());
    assert!(checkout.choose_account_option(AccountOption::Guest));
    fill_form(&mut checkout, "ana@example.com");

    let purchase = shop
        .submit_checkout_with(&mut checkout, &mut rng(), today())
        .unwrap();

    assert_eq!(purchase.total, dec!(25));
    assert_eq!(purchase.item_count(), 3);
    assert_eq!(purchase.date_display(), "14/03/2025");
    assert!(PurchaseStatus::ALL.contains(&purchase.status));
    assert_eq!(checkout.state(), &CheckoutState::Purchased(purchase));

    assert!(shop.cart().is_empty());
    assert!(!shop.is_signed_in());
    assert_eq!(ctx.read_raw(keys::CART).as_deref(), Some("[]"));
    assert!(ctx.read_raw(keys::USERS).is_none());
    assert!(ctx.read_raw(keys::USER).is_none());
    assert!(ctx.open().unwrap().cart().is_empty());
}

#[test]
fn test_guest_must_choose_an_account_option() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    fill_cart(&mut shop);

    let mut checkout = shop.begin_checkout();
    fill_form(&mut checkout, "ana@example.com");
    let err = submit(&mut shop, &mut checkout).unwrap_err();

    assert!(matches!(
        err,
        AppError::Checkout(CheckoutError::AccountOptionRequired)
    ));
    assert_eq!(shop.cart().item_count(), 3);
}

#[test]
fn test_invalid_form_keeps_cart_and_reports_fields() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    fill_cart(&mut shop);

    let mut checkout = shop.begin_checkout();
    checkout.choose_account_option(AccountOption::Guest);
    checkout
        .set_field(CheckoutField::Phone, "call me")
        .unwrap();
    checkout
        .set_field(CheckoutField::PaymentMethod, "creditCard")
        .unwrap();

    let err = submit(&mut shop, &mut checkout).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.get("firstName"), Some("First name is required"));
    assert_eq!(errors.get("phone"), Some("Phone must be numeric"));
    assert_eq!(errors.get("cardNumber"), Some("Card Number is required"));
    assert_eq!(checkout.state(), &CheckoutState::Invalid);

    checkout.set_field(CheckoutField::Phone, "555").unwrap();
    assert_eq!(checkout.state(), &CheckoutState::Filling);
    assert!(!checkout.errors().contains("phone"));
    assert!(checkout.errors().contains("firstName"));

    assert_eq!(ctx.open().unwrap().cart().total(), dec!(25));
}

#[test]
fn test_completed_checkout_cannot_be_resubmitted() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    fill_cart(&mut shop);

    let mut checkout = shop.begin_checkout();
    checkout.choose_account_option(AccountOption::Guest);
    fill_form(&mut checkout, "ana@example.com");
    submit(&mut shop, &mut checkout).unwrap();

    assert!(matches!(
        checkout.set_field(CheckoutField::City, "Lisbon"),
        Err(CheckoutError::AlreadyPurchased)
    ));
    assert!(matches!(
        submit(&mut shop, &mut checkout),
        Err(AppError::Checkout(CheckoutError::AlreadyPurchased))
    ));
}

// ============================================================================
// Account creation at checkout
// ============================================================================

#[test]
fn test_create_account_checkout_signs_in_with_purchase() {
    let ctx = TestContext::new();
    {
        let mut shop = ctx.open().unwrap();
        fill_cart(&mut shop);

        let mut checkout = shop.begin_checkout();
        checkout.choose_account_option(AccountOption::Create);
        fill_form(&mut checkout, "ana@example.com");
        checkout
            .set_field(CheckoutField::Password, "secret1")
            .unwrap();
        submit(&mut shop, &mut checkout).unwrap();
        assert!(shop.is_signed_in());
    }

    let mut shop = ctx.open().unwrap();
    let user = shop.require_user().unwrap();
    assert_eq!(user.city, "Porto");
    assert_eq!(user.purchases.len(), 1);
    assert_eq!(user.purchases[0].total, dec!(25));

    shop.sign_out().unwrap();
    shop.sign_in(&SignInForm {
        email: "ana@example.com".to_string(),
        password: "secret1".to_string(),
    })
    .unwrap();
    assert_eq!(shop.purchases().unwrap().len(), 1);
}

#[test]
fn test_create_account_requires_a_password() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    fill_cart(&mut shop);

    let mut checkout = shop.begin_checkout();
    checkout.choose_account_option(AccountOption::Create);
    fill_form(&mut checkout, "ana@example.com");
    checkout.set_field(CheckoutField::Password, "123").unwrap();

    let err = submit(&mut shop, &mut checkout).unwrap_err();
    assert_eq!(
        err.field_errors().unwrap().get("password"),
        Some("Password must be at least 6 characters")
    );
    assert!(ctx.read_raw(keys::USERS).is_none());
}

#[test]
fn test_create_account_with_registered_email_is_rejected() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    shop.sign_up(&SignUpForm {
        email: "ana@example.com".to_string(),
        password: "secret1".to_string(),
    })
    .unwrap();
    shop.sign_out().unwrap();
    fill_cart(&mut shop);

    let mut checkout = shop.begin_checkout();
    checkout.choose_account_option(AccountOption::Create);
    fill_form(&mut checkout, "ana@example.com");
    checkout
        .set_field(CheckoutField::Password, "another1")
        .unwrap();

    let err = submit(&mut shop, &mut checkout).unwrap_err();
    assert!(matches!(
        err,
        AppError::Checkout(CheckoutError::DuplicateAccount)
    ));
    assert_eq!(
        checkout.errors().get("email"),
        Some("User with this email already exists!")
    );
    assert!(!shop.is_signed_in());
    assert_eq!(shop.cart().item_count(), 3);
}

// ============================================================================
// Signed-in checkout
// ============================================================================

#[test]
fn test_signed_in_checkout_appends_history_newest_first() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();
    shop.sign_up(&SignUpForm {
        email: "ana@example.com".to_string(),
        password: "secret1".to_string(),
    })
    .unwrap();

    shop.add_to_cart(MUG, None).unwrap();
    let mut first = shop.begin_checkout();
    assert!(!first.is_disabled());
    assert!(!first.choose_account_option(AccountOption::Guest));
    fill_form(&mut first, "ana@example.com");
    submit(&mut shop, &mut first).unwrap();

    fill_cart(&mut shop);
    let mut second = shop.begin_checkout();
    assert_eq!(second.form().city, "Porto");
    second
        .set_field(CheckoutField::PaymentMethod, "paypal")
        .unwrap();
    submit(&mut shop, &mut second).unwrap();

    let shop = ctx.open().unwrap();
    let history = shop.purchases().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].total, dec!(25));
    assert_eq!(history[1].total, dec!(5));

    let user = shop.require_user().unwrap();
    assert!(user.password.matches("secret1"));
    assert_eq!(user.first_name, "Ana");
}

#[test]
fn test_empty_cart_cannot_check_out() {
    let ctx = TestContext::new();
    let mut shop = ctx.open().unwrap();

    let mut checkout = shop.begin_checkout();
    assert_eq!(checkout.state(), &CheckoutState::EmptyCart);
    checkout.choose_account_option(AccountOption::Guest);
    fill_form(&mut checkout, "ana@example.com");

    assert!(matches!(
        submit(&mut shop, &mut checkout),
        Err(AppError::Checkout(CheckoutError::EmptyCart))
    ));
}
