//! Checkout command.

use clap::Args;
use tracing::{info, warn};

use corner_shop_core::{AccountOption, PaymentMethod};
use corner_shop_storefront::Storefront;
use corner_shop_storefront::services::CheckoutField;

/// Billing, shipping and payment details for one order.
///
/// Fields left out keep their pre-filled value: the signed-in user's profile
/// and address, or blank for a guest.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Guest checkout or create an account (`guest`, `create`)
    #[arg(long)]
    pub account: Option<AccountOption>,

    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Contact email; ignored when signed in, the order goes to your account
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    #[arg(long)]
    pub country: Option<String>,

    /// Password for the new account (with `--account create`)
    #[arg(long)]
    pub password: Option<String>,

    /// Payment method (`creditCard`, `paypal`, `cash`)
    #[arg(long)]
    pub payment: Option<PaymentMethod>,

    #[arg(long)]
    pub card_holder: Option<String>,
    #[arg(long)]
    pub card_number: Option<String>,
    /// Card expiry as MM/YY
    #[arg(long)]
    pub expiry: Option<String>,
    #[arg(long)]
    pub cvv: Option<String>,
}

impl CheckoutArgs {
    /// Values given on the command line, by form field.
    fn fields(&self) -> Vec<(CheckoutField, String)> {
        let text = [
            (CheckoutField::FirstName, &self.first_name),
            (CheckoutField::LastName, &self.last_name),
            (CheckoutField::Email, &self.email),
            (CheckoutField::Phone, &self.phone),
            (CheckoutField::Address, &self.address),
            (CheckoutField::City, &self.city),
            (CheckoutField::Zip, &self.zip),
            (CheckoutField::Country, &self.country),
            (CheckoutField::Password, &self.password),
            (CheckoutField::CardHolder, &self.card_holder),
            (CheckoutField::CardNumber, &self.card_number),
            (CheckoutField::ExpiryDate, &self.expiry),
            (CheckoutField::Cvv, &self.cvv),
        ];

        text.into_iter()
            .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
            .chain(
                self.payment
                    .map(|method| (CheckoutField::PaymentMethod, method.token().to_string())),
            )
            .collect()
    }
}

/// Fill in a checkout for the current cart and submit it.
///
/// # Errors
///
/// Returns the checkout errors of [`Storefront::submit_checkout`], with
/// field errors for every invalid input.
pub fn run(shop: &mut Storefront, args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut checkout = shop.begin_checkout();

    if let Some(option) = args.account
        && !checkout.choose_account_option(option)
    {
        warn!("Already signed in, ignoring --account {}", option.token());
    }
    if args.email.is_some() && shop.is_signed_in() {
        warn!("Already signed in, ignoring --email");
    }

    for (field, value) in args.fields() {
        checkout.set_field(field, &value)?;
    }

    let purchase = shop.submit_checkout(&mut checkout)?;

    for item in &purchase.items {
        info!(
            quantity = item.quantity,
            "{} {}",
            item.name,
            shop.display_price(item.line_total())
        );
    }
    info!(
        date = %purchase.date_display(),
        status = purchase.status.as_str(),
        "Thank you for your purchase! Total: {}",
        shop.display_price(purchase.total)
    );
    if let Some(user) = shop.user() {
        info!(email = %user.email, "Saved to your purchase history");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::{Args, Command};

    use super::*;

    fn empty() -> CheckoutArgs {
        CheckoutArgs {
            account: None,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            zip: None,
            country: None,
            password: None,
            payment: None,
            card_holder: None,
            card_number: None,
            expiry: None,
            cvv: None,
        }
    }

    #[test]
    fn test_only_given_fields_are_set() {
        let args = CheckoutArgs {
            city: Some("Porto".to_string()),
            payment: Some(PaymentMethod::Cash),
            ..empty()
        };
        assert_eq!(
            args.fields(),
            vec![
                (CheckoutField::City, "Porto".to_string()),
                (CheckoutField::PaymentMethod, "cash".to_string()),
            ]
        );
        assert!(empty().fields().is_empty());
    }

    #[test]
    fn test_email_help_mentions_signed_in_accounts() {
        let command = CheckoutArgs::augment_args(Command::new("checkout"));
        let email = command
            .get_arguments()
            .find(|arg| arg.get_id() == "email")
            .unwrap();
        let help = email.get_help().unwrap().to_string();
        assert!(help.contains("ignored when signed in"));
    }
}
