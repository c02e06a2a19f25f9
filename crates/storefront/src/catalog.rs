//! Static product catalog.
//!
//! Products are bundled into the binary from `content/products.json` and held
//! in memory for the lifetime of the process. Lookup is by slug; listing order
//! is the order of the file.

use std::collections::HashMap;
use std::sync::Arc;

use elegant_haven_core::{Product, ProductId};
use thiserror::Error;

/// Bundled catalog data.
const PRODUCTS_JSON: &str = include_str!("../content/products.json");

/// Number of related products shown on a product page.
pub const RELATED_LIMIT: usize = 3;

/// Errors loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate product id: {0}")]
    DuplicateId(ProductId),
}

/// In-memory product catalog. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    index: Arc<HashMap<ProductId, usize>>,
}

impl Catalog {
    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or two products share an id.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Build a catalog from products in listing order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an id.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self {
            products: Arc::new(products),
            index: Arc::new(index),
        })
    }

    /// The catalog bundled with the storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data is invalid.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(PRODUCTS_JSON)
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Products flagged for the home page.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.featured)
    }

    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).and_then(|&i| self.products.get(i))
    }

    /// Up to [`RELATED_LIMIT`] other products from the same category.
    #[must_use]
    pub fn related(&self, product: &Product) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(RELATED_LIMIT)
            .collect()
    }
}
