//! Account management for the signed-in user.

use clap::Args;
use tracing::info;

use corner_shop_core::CardType;
use corner_shop_storefront::Storefront;
use corner_shop_storefront::services::{AddressForm, CardForm, PasswordForm, ProfileForm};

/// Profile fields to change. Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
}

/// Address fields to change. Omitted fields keep their current value.
#[derive(Debug, Args)]
pub struct AddressArgs {
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
}

#[derive(Debug, Args)]
pub struct PasswordArgs {
    #[arg(long)]
    pub current: String,
    #[arg(long = "new")]
    pub new_password: String,
    #[arg(long)]
    pub confirm: String,
}

#[derive(Debug, Args)]
pub struct CardArgs {
    /// Card network (`Visa`, `Mastercard`, `American Express`)
    #[arg(long)]
    pub card_type: CardType,
    /// 16-digit card number; spaces are ignored
    #[arg(long)]
    pub number: String,
    /// Expiry as MM/YY
    #[arg(long)]
    pub expiry: String,
    #[arg(long)]
    pub cvc: String,
}

fn apply(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Show the profile, address and saved cards.
///
/// # Errors
///
/// Returns `AuthError::NotSignedIn` when signed out.
pub fn show(shop: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let user = shop.require_user()?;

    info!(
        email = %user.email,
        phone = %user.phone,
        "{}",
        user.display_name().unwrap_or_default()
    );
    info!(
        city = %user.city,
        zip = %user.zip,
        country = %user.country,
        "Address: {}",
        user.address
    );

    if user.payment_info.is_empty() {
        info!("No saved cards");
    }
    for (position, card) in user.payment_info.iter().enumerate() {
        info!(expiry = %card.expiry, "{}. {}", position + 1, card.masked());
    }
    Ok(())
}

/// List past purchases, newest first.
///
/// # Errors
///
/// Returns `AuthError::NotSignedIn` when signed out.
pub fn purchases(shop: &Storefront) -> Result<(), Box<dyn std::error::Error>> {
    let history = shop.purchases()?;
    if history.is_empty() {
        info!("No purchases yet");
        return Ok(());
    }

    for purchase in history {
        info!(
            date = %purchase.date_display(),
            status = purchase.status.as_str(),
            items = purchase.item_count(),
            "Order total {}",
            shop.display_price(purchase.total)
        );
        for item in &purchase.items {
            info!(
                quantity = item.quantity,
                "  {} {}",
                item.name,
                shop.display_price(item.price)
            );
        }
    }
    Ok(())
}

/// Update name, email and phone.
///
/// # Errors
///
/// Returns the errors of [`Storefront::update_profile`].
pub fn profile(shop: &mut Storefront, args: ProfileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = ProfileForm::from_user(shop.require_user()?);
    apply(&mut form.first_name, args.first_name);
    apply(&mut form.last_name, args.last_name);
    apply(&mut form.email, args.email);
    apply(&mut form.phone, args.phone);

    shop.update_profile(&form)?;
    info!("Profile updated successfully!");
    Ok(())
}

/// Update the shipping address.
///
/// # Errors
///
/// Returns the errors of [`Storefront::update_address`].
pub fn address(shop: &mut Storefront, args: AddressArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut form = AddressForm::from_user(shop.require_user()?);
    apply(&mut form.address, args.address);
    apply(&mut form.city, args.city);
    apply(&mut form.zip, args.zip);
    apply(&mut form.country, args.country);

    shop.update_address(&form)?;
    info!("Address updated successfully!");
    Ok(())
}

/// Change the password.
///
/// # Errors
///
/// Returns the errors of [`Storefront::change_password`].
pub fn password(shop: &mut Storefront, args: PasswordArgs) -> Result<(), Box<dyn std::error::Error>> {
    shop.change_password(&PasswordForm {
        current_password: args.current,
        new_password: args.new_password,
        confirm_password: args.confirm,
    })?;
    info!("Password changed successfully!");
    Ok(())
}

/// Save a payment card.
///
/// # Errors
///
/// Returns the errors of [`Storefront::add_card`].
pub fn add_card(shop: &mut Storefront, args: CardArgs) -> Result<(), Box<dyn std::error::Error>> {
    let form = CardForm::new(Some(args.card_type), &args.number, &args.expiry, &args.cvc);
    let card = shop.add_card(&form)?;
    info!("Saved {}", card.masked());
    Ok(())
}

/// Remove the card at `position` (1-based, as listed by `account show`).
///
/// # Errors
///
/// Returns the errors of [`Storefront::remove_card`].
pub fn remove_card(shop: &mut Storefront, position: usize) -> Result<(), Box<dyn std::error::Error>> {
    let index = position.checked_sub(1).ok_or("card positions start at 1")?;
    let card = shop.remove_card(index)?;
    info!("Removed {}", card.masked());
    Ok(())
}
