//! Records returned by the shop API.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;
use crate::price::Price;

/// Product details from `GET /products/{id}`.
///
/// Fields the cart does not interpret are kept in `extra` so they survive
/// the trip into a cart entry and back out to storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRecord {
    /// Product ID.
    pub id: ProductId,
    /// Display name. The catalog calls it `title`.
    #[serde(alias = "title")]
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Any other catalog fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CatalogRecord {
    /// Create a record with no image and no extra fields.
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set the image URL.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// Available quantity from `GET /stock/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockRecord {
    /// Product ID, when the endpoint echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    /// Units available for purchase.
    pub amount: i64,
}

impl StockRecord {
    /// Create a stock record for a product.
    pub fn new(id: ProductId, amount: i64) -> Self {
        Self {
            id: Some(id),
            amount,
        }
    }

    /// Whether at least one unit can be sold.
    pub fn is_available(&self) -> bool {
        self.amount >= 1
    }

    /// Whether `quantity` units can be held in a cart.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity <= self.amount
    }
}
