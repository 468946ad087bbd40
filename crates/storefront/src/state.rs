//! Application state tying the catalog, cart, accounts and checkout together.

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::instrument;

use corner_shop_core::{Price, ProductId, ShippingMethod};

use crate::cart::{Cart, CartError, CartItem};
use crate::catalog::{Catalog, Product, ProductListing, StockStatus};
use crate::config::StorefrontConfig;
use crate::db::SessionRepository;
use crate::error::Result;
use crate::models::{PaymentCard, Purchase, User};
use crate::services::contact::{self, ContactForm, ContactMessage};
use crate::services::{
    AccountError, AccountService, AddressForm, AuthError, AuthService, CardForm, Checkout,
    CheckoutService, PasswordForm, ProfileForm, SignInForm, SignUpForm,
};
use crate::storage::{FileStore, KeyValueStore};

/// The storefront application state.
///
/// Owns the cart and the signed-in user and mirrors every change into the
/// key-value store, from which both are rehydrated on open.
pub struct Storefront {
    store: Box<dyn KeyValueStore>,
    catalog: Catalog,
    cart: Cart,
    user: Option<User>,
    config: StorefrontConfig,
}

impl Storefront {
    /// Open a storefront with default settings, rehydrating the cart and
    /// signed-in user from `store`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the persisted state is unreadable or
    /// corrupt.
    pub fn open(store: Box<dyn KeyValueStore>, catalog: Catalog) -> Result<Self> {
        Self::with_config(store, catalog, StorefrontConfig::default())
    }

    /// Open a storefront with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the persisted state is unreadable or
    /// corrupt.
    pub fn with_config(
        store: Box<dyn KeyValueStore>,
        catalog: Catalog,
        config: StorefrontConfig,
    ) -> Result<Self> {
        let session = SessionRepository::new(store.as_ref());
        let cart = session.load_cart()?;
        let user = session.load_current_user()?;

        tracing::info!(
            products = catalog.len(),
            cart_items = cart.item_count(),
            signed_in = user.is_some(),
            "Storefront opened"
        );

        Ok(Self {
            store,
            catalog,
            cart,
            user,
            config,
        })
    }

    /// Open the file-backed storefront described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the data directory cannot be created,
    /// `AppError::Catalog` if the catalog cannot be loaded, or the errors of
    /// [`with_config`](Self::with_config).
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir)?;
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };
        Self::with_config(Box::new(store), catalog, config)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// The product catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// A fresh product listing at the configured page size.
    #[must_use]
    pub const fn listing(&self) -> ProductListing {
        ProductListing::new(self.config.page_size, self.config.page_step)
    }

    /// Look up a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    pub fn product(&self, id: ProductId) -> Result<&Product> {
        self.catalog
            .get(id)
            .ok_or_else(|| crate::AppError::NotFound(format!("product {id}")))
    }

    /// Search product names, capped at the configured limit.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        self.catalog.search(query, self.config.search_limit)
    }

    /// Stock badge for a product given what is already in the cart.
    #[must_use]
    pub fn stock_status(&self, id: ProductId) -> Option<StockStatus> {
        self.catalog
            .get(id)
            .map(|product| product.stock_status(self.cart.quantity_of(id)))
    }

    /// Format an amount in the display currency, e.g. `$25.00`.
    #[must_use]
    pub fn display_price(&self, amount: Decimal) -> String {
        Price::new(amount, self.config.currency).display()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add one unit of a product, refusing once the cart holds all its stock.
    ///
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownProduct`, `CartError::OutOfStock`, or a
    /// storage error if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn add_to_cart(
        &mut self,
        id: ProductId,
        shipping_method: Option<ShippingMethod>,
    ) -> Result<u32> {
        let product = self.catalog.get(id).ok_or(CartError::UnknownProduct(id))?;
        if !product.stock_status(self.cart.quantity_of(id)).can_add() {
            tracing::warn!(stock = product.stock, "Add to cart refused, out of stock");
            return Err(CartError::OutOfStock(id).into());
        }

        let quantity = self.cart.add(product, shipping_method);
        self.save_cart()?;
        tracing::info!(quantity, "Added to cart");
        Ok(quantity)
    }

    /// Remove one unit of a product. Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` or a storage error.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<u32> {
        let remaining = self.cart.remove(id).ok_or(CartError::NotInCart(id))?;
        self.save_cart()?;
        tracing::info!(remaining, "Removed from cart");
        Ok(remaining)
    }

    /// Delete a product's line whatever its quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` or a storage error.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: ProductId) -> Result<CartItem> {
        let removed = self.cart.remove_item(id).ok_or(CartError::NotInCart(id))?;
        self.save_cart()?;
        tracing::info!(quantity = removed.quantity, "Removed line from cart");
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart cannot be saved.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear();
        self.save_cart()?;
        tracing::info!("Cart cleared");
        Ok(())
    }

    fn save_cart(&self) -> Result<()> {
        SessionRepository::new(self.store.as_ref()).save_cart(&self.cart)?;
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, for pages that need one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when signed out.
    pub fn require_user(&self) -> Result<&User> {
        Ok(self.user.as_ref().ok_or(AuthError::NotSignedIn)?)
    }

    /// Sign in and persist the current user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadySignedIn`, the sign-in errors of
    /// [`AuthService::sign_in`], or a storage error.
    pub fn sign_in(&mut self, form: &SignInForm) -> Result<&User> {
        self.require_signed_out()?;
        let user = AuthService::new(self.store.as_ref()).sign_in(form)?;
        SessionRepository::new(self.store.as_ref()).save_current_user(Some(&user))?;
        Ok(&*self.user.insert(user))
    }

    /// Register and sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadySignedIn`, the sign-up errors of
    /// [`AuthService::sign_up`], or a storage error.
    pub fn sign_up(&mut self, form: &SignUpForm) -> Result<&User> {
        self.require_signed_out()?;
        let user = AuthService::new(self.store.as_ref()).sign_up(form)?;
        SessionRepository::new(self.store.as_ref()).save_current_user(Some(&user))?;
        Ok(&*self.user.insert(user))
    }

    /// Sign out, removing the persisted current user. Signing out while
    /// signed out does nothing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the `user` key cannot be removed.
    pub fn sign_out(&mut self) -> Result<()> {
        if let Some(user) = self.user.take() {
            SessionRepository::new(self.store.as_ref()).save_current_user(None)?;
            tracing::info!(email = %user.email, "User signed out");
        }
        Ok(())
    }

    fn require_signed_out(&self) -> Result<()> {
        if self.user.is_some() {
            return Err(AuthError::AlreadySignedIn.into());
        }
        Ok(())
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Update name, email and phone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` or the errors of
    /// [`AccountService::update_profile`].
    pub fn update_profile(&mut self, form: &ProfileForm) -> Result<()> {
        self.with_account(|service, user| service.update_profile(user, form))
    }

    /// Change the password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` or the errors of
    /// [`AccountService::change_password`].
    pub fn change_password(&mut self, form: &PasswordForm) -> Result<()> {
        self.with_account(|service, user| service.change_password(user, form))
    }

    /// Update the shipping address.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` or the errors of
    /// [`AccountService::update_address`].
    pub fn update_address(&mut self, form: &AddressForm) -> Result<()> {
        self.with_account(|service, user| service.update_address(user, form))
    }

    /// Save a payment card.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` or the errors of
    /// [`AccountService::add_card`].
    pub fn add_card(&mut self, form: &CardForm) -> Result<PaymentCard> {
        self.with_account(|service, user| service.add_card(user, form))
    }

    /// Remove the saved card at `index`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` or the errors of
    /// [`AccountService::remove_card`].
    pub fn remove_card(&mut self, index: usize) -> Result<PaymentCard> {
        self.with_account(|service, user| service.remove_card(user, index))
    }

    /// Purchase history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when signed out.
    pub fn purchases(&self) -> Result<Vec<&Purchase>> {
        Ok(self.require_user()?.purchase_history().collect())
    }

    fn with_account<T>(
        &mut self,
        edit: impl FnOnce(&AccountService<'_>, &mut User) -> std::result::Result<T, AccountError>,
    ) -> Result<T> {
        let user = self.user.as_mut().ok_or(AuthError::NotSignedIn)?;
        let service = AccountService::new(self.store.as_ref());
        Ok(edit(&service, user)?)
    }

    // =========================================================================
    // Checkout & contact
    // =========================================================================

    /// Start a checkout over the current cart.
    #[must_use]
    pub fn begin_checkout(&self) -> Checkout {
        Checkout::begin(self.user.as_ref(), &self.cart)
    }

    /// Submit a checkout dated today with a randomly drawn status.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CheckoutService::submit`].
    pub fn submit_checkout(&mut self, checkout: &mut Checkout) -> Result<Purchase> {
        let today = chrono::Local::now().date_naive();
        self.submit_checkout_with(checkout, &mut rand::rng(), today)
    }

    /// Submit a checkout with an explicit date and random source.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CheckoutService::submit`].
    pub fn submit_checkout_with<R: Rng + ?Sized>(
        &mut self,
        checkout: &mut Checkout,
        rng: &mut R,
        today: NaiveDate,
    ) -> Result<Purchase> {
        let service = CheckoutService::new(self.store.as_ref());
        Ok(service.submit(checkout, &mut self.cart, &mut self.user, rng, today)?)
    }

    /// Validate and accept a contact message.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` listing every invalid field.
    pub fn send_contact(&self, form: &ContactForm) -> Result<ContactMessage> {
        Ok(contact::submit(form)?)
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("products", &self.catalog.len())
            .field("cart", &self.cart)
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
