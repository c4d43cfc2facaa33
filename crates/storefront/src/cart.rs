//! Shopping cart state.
//!
//! One line item per product, kept in the order products were first added.
//! Every mutation writes the whole cart back to the key-value store; a
//! missing or unreadable snapshot at load time yields an empty cart.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Price, PriceFormatter, Product, ProductId};

use crate::storage::{KeyValueStore, keys, load_json, save_json};

/// A product snapshot and how many units of it are in the cart.
///
/// The product is copied at add time; later catalog changes do not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    /// `product.price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// The shopping cart.
pub struct CartStore {
    items: IndexMap<ProductId, CartLineItem>,
    open: bool,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Restore the cart from `store`, starting empty if nothing usable is saved.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let saved: Vec<CartLineItem> = load_json(store.as_ref(), keys::CART).unwrap_or_default();

        let mut items = IndexMap::with_capacity(saved.len());
        for item in saved {
            if item.quantity == 0 {
                continue;
            }
            // A hand-edited snapshot may repeat a product; merge rather than drop.
            items
                .entry(item.product.id.clone())
                .and_modify(|existing: &mut CartLineItem| {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                })
                .or_insert(item);
        }

        Self {
            items,
            open: false,
            store,
        }
    }

    /// Add one unit of `product`, creating the line item if needed.
    pub fn add_to_cart(&mut self, product: &Product) {
        match self.items.get_mut(&product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => {
                self.items.insert(
                    product.id.clone(),
                    CartLineItem {
                        product: product.clone(),
                        quantity: 1,
                    },
                );
            }
        }
        self.persist();
    }

    /// Increase quantity by one. An absent product is added.
    pub fn increment_quantity(&mut self, product: &Product) {
        self.add_to_cart(product);
    }

    /// Decrease quantity by one, removing the line item when it reaches zero.
    pub fn decrement_quantity(&mut self, id: &ProductId) {
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        if item.quantity <= 1 {
            self.items.shift_remove(id);
        } else {
            item.quantity -= 1;
        }
        self.persist();
    }

    /// Set the quantity directly. Zero or negative removes the line item.
    ///
    /// Absent products are ignored; there is no upper bound.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }
        let Some(item) = self.items.get_mut(id) else {
            return;
        };
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.persist();
    }

    /// Remove the line item for `id`, if any.
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        if self.items.shift_remove(id).is_some() {
            self.persist();
        }
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Quantity of `id` in the cart, or 0.
    #[must_use]
    pub fn get_item_quantity(&self, id: &ProductId) -> u32 {
        self.items.get(id).map_or(0, |item| item.quantity)
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn get_total_items(&self) -> u64 {
        self.items.values().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of every line total, using the prices captured at add time.
    #[must_use]
    pub fn get_total_price(&self) -> Price {
        self.items.values().map(CartLineItem::line_total).sum()
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.open
    }

    /// Show or hide the cart panel. Not persisted.
    pub const fn set_cart_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Line items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart as it is persisted.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.items.values().cloned().collect()
    }

    /// Display view with prices rendered by `formatter`.
    #[must_use]
    pub fn summary(&self, formatter: &dyn PriceFormatter) -> CartSummary {
        CartSummary {
            items: self
                .items()
                .map(|item| CartItemSummary {
                    product_id: item.product.id.clone(),
                    name: item.product.name.clone(),
                    variant: item.product.variant_label().to_owned(),
                    image: item.product.display_image().to_owned(),
                    quantity: item.quantity,
                    unit_price: formatter.format(item.product.price),
                    line_total: formatter.format(item.line_total()),
                })
                .collect(),
            total_items: self.get_total_items(),
            total_price: formatter.format(self.get_total_price()),
            is_open: self.open,
        }
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), keys::CART, &self.snapshot());
    }
}

/// Cart contents ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItemSummary>,
    pub total_items: u64,
    pub total_price: String,
    pub is_open: bool,
}

/// One cart line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemSummary {
    pub product_id: ProductId,
    pub name: String,
    pub variant: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}
