//! Cart commands.

use tracing::info;

use corner_shop_core::{ProductId, ShippingMethod};
use corner_shop_storefront::Storefront;

/// Show every cart line and the total.
pub fn show(shop: &Storefront) {
    let cart = shop.cart();
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for item in cart.items() {
        let shipping = item.shipping_method.unwrap_or_default();
        info!(
            id = %item.id,
            quantity = item.quantity,
            shipping = shipping.token(),
            "{} {} x{} = {} {}",
            item.name,
            shop.display_price(item.price),
            item.quantity,
            shop.display_price(item.line_total()),
            item.stock_status().badge().unwrap_or_default()
        );
    }
    info!(
        items = cart.item_count(),
        "Total: {}",
        shop.display_price(cart.total())
    );
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns the cart errors of [`Storefront::add_to_cart`].
pub fn add(
    shop: &mut Storefront,
    id: ProductId,
    shipping: Option<ShippingMethod>,
) -> Result<(), Box<dyn std::error::Error>> {
    let quantity = shop.add_to_cart(id, shipping)?;
    let name = shop.product(id)?.name.clone();
    info!(quantity, "Added {name} to cart");
    Ok(())
}

/// Remove one unit of a product.
///
/// # Errors
///
/// Returns `CartError::NotInCart` or a storage error.
pub fn remove(shop: &mut Storefront, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let remaining = shop.remove_from_cart(id)?;
    info!(remaining, id = %id, "Removed one unit");
    Ok(())
}

/// Drop a whole cart line.
///
/// # Errors
///
/// Returns `CartError::NotInCart` or a storage error.
pub fn drop_line(shop: &mut Storefront, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let removed = shop.remove_item(id)?;
    info!(quantity = removed.quantity, "Removed {} from cart", removed.name);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns a storage error if the cart cannot be saved.
pub fn clear(shop: &mut Storefront) -> Result<(), Box<dyn std::error::Error>> {
    shop.clear_cart()?;
    info!("Cart cleared");
    Ok(())
}
