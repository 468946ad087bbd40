//! Catalog browsing.

use tracing::info;

use corner_shop_core::ProductId;
use corner_shop_storefront::Storefront;
use corner_shop_storefront::catalog::Product;

/// List the first page of products, loading `more` extra pages.
pub fn list(shop: &Storefront, more: usize) {
    let mut listing = shop.listing();
    for _ in 0..more {
        listing.load_more();
    }

    for product in listing.products(shop.catalog()) {
        log_product(shop, product);
    }

    if listing.has_more(shop.catalog()) {
        info!(
            shown = listing.visible(),
            total = shop.catalog().len(),
            "More products available, pass --more {}",
            more + 1
        );
    }
}

/// Show one product with its stock badge.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown id.
pub fn show(shop: &Storefront, id: ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let product = shop.product(id)?;
    log_product(shop, product);
    info!(stock = product.stock, image = %product.image, "Details");
    Ok(())
}

/// Search product names.
pub fn search(shop: &Storefront, query: &str) {
    let results = shop.search(query);
    if results.is_empty() {
        info!(query, "No products found");
        return;
    }
    for product in results {
        log_product(shop, product);
    }
}

fn log_product(shop: &Storefront, product: &Product) {
    let badge = shop
        .stock_status(product.id)
        .and_then(|status| status.badge())
        .unwrap_or_default();
    info!(
        id = %product.id,
        "{} {} {}",
        product.name,
        shop.display_price(product.price),
        badge
    );
}
