//! Catalog product types.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Room category a product is merchandised under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Living Room")]
    LivingRoom,
    Bedroom,
    Dining,
    Office,
    Outdoor,
    Decor,
}

impl Category {
    /// Human-readable name, as shown in the storefront.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LivingRoom => "Living Room",
            Self::Bedroom => "Bedroom",
            Self::Dining => "Dining",
            Self::Office => "Office",
            Self::Outdoor => "Outdoor",
            Self::Decor => "Decor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical dimensions, kept as display strings ("84 in", "95 lbs").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: String,
    pub height: String,
    pub depth: String,
    pub weight: String,
}

/// A read-only catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Previous price, shown struck through when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Price>,
    pub category: Category,
    /// Image URL path.
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Product {
    /// Whether the product is discounted from a previous price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.old_price.is_some_and(|old| old > self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_uses_display_names() {
        let json = serde_json::to_string(&Category::LivingRoom).unwrap();
        assert_eq!(json, "\"Living Room\"");
        let cat: Category = serde_json::from_str("\"Office\"").unwrap();
        assert_eq!(cat, Category::Office);
        assert_eq!(Category::LivingRoom.to_string(), "Living Room");
    }

    #[test]
    fn test_optional_fields_default() {
        let product: Product = serde_json::from_str(
            r#"{
                "id": "oak-stool",
                "name": "Oak Stool",
                "description": "A stool.",
                "price": "89.00",
                "category": "Dining",
                "image": "/static/images/products/oak-stool.jpg"
            }"#,
        )
        .unwrap();

        assert!(!product.featured);
        assert!(product.dimensions.is_none());
        assert!(!product.on_sale());
        assert_eq!(product.price, Price::from_cents(8_900));
    }
}
