//! Contact form.

use clap::Args;
use tracing::info;

use corner_shop_core::ContactSubject;
use corner_shop_storefront::Storefront;
use corner_shop_storefront::services::ContactForm;

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub email: String,
    /// Topic (`general`, `support`, `feedback`, `other`)
    #[arg(long)]
    pub subject: Option<ContactSubject>,
    #[arg(long, default_value = "")]
    pub message: String,
}

/// Send a contact message.
///
/// # Errors
///
/// Returns `ContactError::Validation` listing every invalid field.
pub fn send(shop: &Storefront, args: ContactArgs) -> Result<(), Box<dyn std::error::Error>> {
    let message = shop.send_contact(&ContactForm {
        name: args.name,
        email: args.email,
        subject: args.subject,
        message: args.message,
    })?;
    info!(
        subject = message.subject.label(),
        "Thanks {}, your message has been sent!",
        message.name
    );
    Ok(())
}
