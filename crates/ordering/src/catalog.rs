//! Catalog browsing views.

use leipomo_core::ProductId;

use crate::api::{Category, Product};
use crate::cart::Cart;

/// What the catalog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogView {
    /// Categories to pick from.
    Categories(Vec<Category>),
    /// Products, either in a category or as the flat fallback listing.
    Products {
        products: Vec<ProductEntry>,
        /// Categories could not be loaded and all products are listed.
        flat: bool,
    },
}

/// A product together with what the cart already holds of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    pub product: Product,
    pub in_cart: u32,
}

impl ProductEntry {
    #[must_use]
    pub fn is_sold_out(&self) -> bool {
        self.product.is_sold_out()
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }
}

/// Keep only featured categories when any category matches.
///
/// `featured` holds lowercase name fragments. When nothing matches, or the
/// list is empty, every category is shown.
#[must_use]
pub fn featured_categories(categories: Vec<Category>, featured: &[String]) -> Vec<Category> {
    if featured.is_empty() {
        return categories;
    }

    let is_featured = |category: &Category| {
        let name = category.name.to_lowercase();
        featured.iter().any(|fragment| name.contains(fragment.as_str()))
    };

    if categories.iter().any(is_featured) {
        categories.into_iter().filter(is_featured).collect()
    } else {
        categories
    }
}

/// Pair products with the quantities already in the cart.
#[must_use]
pub fn product_entries(products: Vec<Product>, cart: &Cart) -> Vec<ProductEntry> {
    products
        .into_iter()
        .map(|product| ProductEntry {
            in_cart: cart.quantity_of(product.id),
            product,
        })
        .collect()
}
