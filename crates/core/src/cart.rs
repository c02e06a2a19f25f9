//! Shopping cart and order totals.
//!
//! The cart is a flat list of product snapshots with quantities. Totals are
//! derived on demand:
//!
//! ```text
//! subtotal = Σ price × quantity
//! shipping = 0 if subtotal > 100 else 10
//! tax      = subtotal × 0.07
//! total    = subtotal + shipping + tax
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Category, Price, Product, ProductId};

/// Subtotal above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::new(Decimal::ONE_HUNDRED);

/// Flat shipping charge below the free-shipping threshold.
pub const FLAT_SHIPPING: Price = Price::new(Decimal::TEN);

/// Sales tax rate (7%).
pub const TAX_RATE: Decimal = Decimal::from_parts(7, 0, 0, false, 2);

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: Category,
    pub image: String,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// Derived order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl CartTotals {
    /// Compute totals for a subtotal using the fixed shipping and tax rules.
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            FLAT_SHIPPING
        };
        let tax = subtotal.scale(TAX_RATE);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Whether the order qualifies for free shipping.
    #[must_use]
    pub const fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Add `quantity` units of a product.
    ///
    /// Adding a product that is already in the cart increases that line's
    /// quantity instead of appending a duplicate line. A quantity of zero is
    /// treated as one.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);

        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.lines.push(CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            category: product.category,
            image: product.image.clone(),
            quantity,
        });
    }

    /// Set the quantity of a line, clamping to at least 1.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        self.line_mut(product_id).is_some_and(|line| {
            line.quantity = quantity.max(1);
            true
        })
    }

    /// Remove a line. Returns `false` if the product was not in the cart.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal, shipping, tax and grand total.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_subtotal(self.subtotal())
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}
