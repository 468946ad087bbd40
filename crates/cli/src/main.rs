//! Corner Shop CLI - browse, fill a cart and check out from the terminal.
//!
//! State lives in the data directory (`STOREFRONT_DATA_DIR`, default
//! `.corner-shop`), so the cart and the signed-in user carry over from one
//! invocation to the next.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop-cli products list --more 1
//! shop-cli products search lamp
//!
//! # Fill the cart
//! shop-cli cart add 3 --shipping express
//! shop-cli cart show
//!
//! # Check out as a guest
//! shop-cli checkout --account guest --first-name Ana --last-name Lima \
//!     --email ana@example.com --phone 5551234 --address "1 Main St" \
//!     --city Porto --zip 4000 --country Portugal --payment cash
//!
//! # Manage an account
//! shop-cli auth sign-up -e ana@example.com -p secret1
//! shop-cli account purchases
//! ```
//!
//! # Commands
//!
//! - `products` - List, show and search products
//! - `cart` - Inspect and edit the cart
//! - `auth` - Sign up, sign in and sign out
//! - `checkout` - Place an order for the cart
//! - `account` - Profile, address, password, cards and purchase history
//! - `contact` - Send a message to the shop

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corner_shop_core::{ProductId, ShippingMethod};
use corner_shop_storefront::config::StorefrontConfig;
use corner_shop_storefront::{AppError, Storefront};

mod commands;

use commands::account::{AddressArgs, CardArgs, PasswordArgs, ProfileArgs};
use commands::checkout::CheckoutArgs;
use commands::contact::ContactArgs;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Corner Shop storefront CLI")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign up, sign in and sign out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Place an order for everything in the cart
    Checkout(CheckoutArgs),
    /// Manage the signed-in account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Send a message to the shop
    Contact(ContactArgs),
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products page by page
    List {
        /// Number of times to "load more" past the first page
        #[arg(short, long, default_value_t = 0)]
        more: usize,
    },
    /// Show one product
    Show {
        /// Product id
        id: ProductId,
    },
    /// Search product names
    Search {
        /// Case-insensitive text to look for
        query: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and the total
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: ProductId,

        /// Shipping method (`standard`, `express`, `overnight`)
        #[arg(short, long)]
        shipping: Option<ShippingMethod>,
    },
    /// Remove one unit of a product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Drop a product's line whatever its quantity
    Drop {
        /// Product id
        id: ProductId,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account and sign in
    SignUp {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Sign in to an existing account
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    SignOut,
    /// Show who is signed in
    Whoami,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Show profile, address and saved cards
    Show,
    /// List past purchases, newest first
    Purchases,
    /// Update name, email and phone
    Profile(ProfileArgs),
    /// Update the shipping address
    Address(AddressArgs),
    /// Change the password
    Password(PasswordArgs),
    /// Save a payment card
    AddCard(CardArgs),
    /// Remove a saved card by its position in `account show`
    RemoveCard {
        /// Card position, starting at 1
        position: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        report(&*e);
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corner_shop_storefront=info,shop_cli=info".into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
            .init();
    }
}

/// Log a failure the way a shopper should see it.
fn report(error: &(dyn std::error::Error + 'static)) {
    let Some(app_error) = error.downcast_ref::<AppError>() else {
        tracing::error!("Command failed: {error}");
        return;
    };

    tracing::error!("{}", app_error.user_message());
    if let Some(errors) = app_error.field_errors() {
        for (field, message) in errors.iter() {
            tracing::error!(field, "{message}");
        }
    }
    tracing::debug!(error = %app_error, "Command failed");
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env().map_err(AppError::from)?;
    let mut shop = Storefront::from_config(config)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { more } => commands::products::list(&shop, more),
            ProductsAction::Show { id } => commands::products::show(&shop, id)?,
            ProductsAction::Search { query } => commands::products::search(&shop, &query),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&shop),
            CartAction::Add { id, shipping } => commands::cart::add(&mut shop, id, shipping)?,
            CartAction::Remove { id } => commands::cart::remove(&mut shop, id)?,
            CartAction::Drop { id } => commands::cart::drop_line(&mut shop, id)?,
            CartAction::Clear => commands::cart::clear(&mut shop)?,
        },
        Commands::Auth { action } => match action {
            AuthAction::SignUp { email, password } => {
                commands::auth::sign_up(&mut shop, email, password)?;
            }
            AuthAction::SignIn { email, password } => {
                commands::auth::sign_in(&mut shop, email, password)?;
            }
            AuthAction::SignOut => commands::auth::sign_out(&mut shop)?,
            AuthAction::Whoami => commands::auth::whoami(&shop),
        },
        Commands::Checkout(args) => commands::checkout::run(&mut shop, args)?,
        Commands::Account { action } => match action {
            AccountAction::Show => commands::account::show(&shop)?,
            AccountAction::Purchases => commands::account::purchases(&shop)?,
            AccountAction::Profile(args) => commands::account::profile(&mut shop, args)?,
            AccountAction::Address(args) => commands::account::address(&mut shop, args)?,
            AccountAction::Password(args) => commands::account::password(&mut shop, args)?,
            AccountAction::AddCard(args) => commands::account::add_card(&mut shop, args)?,
            AccountAction::RemoveCard { position } => {
                commands::account::remove_card(&mut shop, position)?;
            }
        },
        Commands::Contact(args) => commands::contact::send(&shop, args)?,
    }
    Ok(())
}
