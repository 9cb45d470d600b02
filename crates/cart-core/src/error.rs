//! Domain error types.

use thiserror::Error;

use crate::ids::ProductId;

/// Errors raised by cart snapshot transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Stored amounts are always at least one.
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i64 },

    /// Product already has an entry.
    #[error("Product already in cart: {0}")]
    AlreadyInCart(ProductId),

    /// Item not in cart.
    #[error("Product not in cart: {0}")]
    NotInCart(ProductId),

    /// Unknown currency code.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}
