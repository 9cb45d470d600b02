//! Cart entries and the immutable cart snapshot.

use crate::catalog::CatalogRecord;
use crate::error::CoreError;
use crate::ids::ProductId;
use crate::price::Price;
use serde::{Deserialize, Serialize};

/// Keys a serialized entry writes itself. Catalog extras under these names
/// would be written twice.
const ENTRY_KEYS: [&str; 6] = ["id", "name", "title", "price", "image", "amount"];

/// One product line in the cart.
///
/// Catalog fields are copied in when the product is first added and are not
/// refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    /// Product ID.
    pub id: ProductId,
    /// Product name (denormalized for display).
    #[serde(alias = "title")]
    pub name: String,
    /// Unit price at add time.
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Other catalog fields, carried verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// Quantity in the cart.
    pub amount: i64,
}

impl CartEntry {
    /// Create an entry from catalog data.
    ///
    /// Catalog extras that collide with the entry's own fields are dropped.
    pub fn from_catalog(record: &CatalogRecord, amount: i64) -> Self {
        let extra = record
            .extra
            .iter()
            .filter(|(key, _)| !ENTRY_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            id: record.id,
            name: record.name.clone(),
            price: record.price,
            image: record.image.clone(),
            extra,
            amount,
        }
    }

    /// Unit price times amount.
    pub fn subtotal(&self) -> Price {
        self.price * self.amount
    }
}

/// An ordered, immutable snapshot of the cart.
///
/// Holds at most one entry per product. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// An empty cart.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cart from entries, merging duplicate products and dropping
    /// entries whose amount is below one.
    ///
    /// Duplicates keep the position of their first occurrence and the sum of
    /// their amounts.
    pub fn from_entries(entries: impl IntoIterator<Item = CartEntry>) -> Self {
        let mut merged: Vec<CartEntry> = Vec::new();
        for entry in entries {
            if entry.amount < 1 {
                continue;
            }
            match merged.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => existing.amount = existing.amount.saturating_add(entry.amount),
                None => merged.push(entry),
            }
        }
        Self { entries: merged }
    }

    /// Whether the cart already satisfies the one-entry-per-product and
    /// positive-amount rules.
    pub fn is_normalized(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, entry)| {
            entry.amount >= 1 && !self.entries[..i].iter().any(|e| e.id == entry.id)
        })
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, CartEntry> {
        self.entries.iter()
    }

    /// Get the entry for a product.
    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id == product_id)
    }

    /// Check whether a product is in the cart.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Amount held for a product.
    pub fn amount_of(&self, product_id: ProductId) -> Option<i64> {
        self.get(product_id).map(|e| e.amount)
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all amounts.
    pub fn total_units(&self) -> i64 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Sum of all subtotals.
    pub fn total(&self) -> Price {
        self.entries.iter().map(CartEntry::subtotal).sum()
    }

    /// Append a new entry with amount 1.
    ///
    /// Fails if the product is already present; use [`Cart::with_amount`]
    /// to change an existing line.
    pub fn with_new_entry(&self, record: &CatalogRecord) -> Result<Self, CoreError> {
        if self.contains(record.id) {
            return Err(CoreError::AlreadyInCart(record.id));
        }
        let mut entries = self.entries.clone();
        entries.push(CartEntry::from_catalog(record, 1));
        Ok(Self { entries })
    }

    /// Remove the entry for a product.
    pub fn without(&self, product_id: ProductId) -> Result<Self, CoreError> {
        if !self.contains(product_id) {
            return Err(CoreError::NotInCart(product_id));
        }
        let entries = self
            .entries
            .iter()
            .filter(|e| e.id != product_id)
            .cloned()
            .collect();
        Ok(Self { entries })
    }

    /// Replace the amount of a product's entry.
    ///
    /// Entries for other products are left as they are. If the product is
    /// not in the cart the result equals `self`.
    pub fn with_amount(&self, product_id: ProductId, amount: i64) -> Result<Self, CoreError> {
        if amount < 1 {
            return Err(CoreError::InvalidAmount { product_id, amount });
        }
        let entries = self
            .entries
            .iter()
            .map(|e| {
                if e.id == product_id {
                    CartEntry {
                        amount,
                        ..e.clone()
                    }
                } else {
                    e.clone()
                }
            })
            .collect();
        Ok(Self { entries })
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
