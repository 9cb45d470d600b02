//! Cart store error types and user-facing notices.

use std::fmt;

use cart_core::{CoreError, ProductId};
use cart_data::FetchError;
use cart_storage::StorageError;
use thiserror::Error;

/// Errors returned by cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// The catalog has no such product.
    #[error("Product not found: {0}")]
    CatalogNotFound(ProductId),

    /// Not enough stock for the requested amount.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Item not in cart.
    #[error("Product not in cart: {0}")]
    NotInCart(ProductId),

    /// A snapshot transition was rejected.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A stock or catalog lookup failed.
    #[error("Lookup failed: {0}")]
    Fetch(#[from] FetchError),

    /// Reading or writing the persisted cart failed.
    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether the operation was refused by a cart rule rather than failing
    /// in transport or storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CartError::CatalogNotFound(_) | CartError::OutOfStock { .. } | CartError::NotInCart(_)
        )
    }
}

/// The cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// What the user should be told when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    AddFailed,
    OutOfStock,
    RemoveFailed,
    UpdateFailed,
}

impl Notice {
    /// Pick the notice for a failed operation.
    ///
    /// Insufficient stock always reads as out of stock; anything else is
    /// reported as a failure of the operation itself.
    pub fn for_failure(operation: CartOperation, error: &CartError) -> Self {
        if matches!(error, CartError::OutOfStock { .. }) {
            return Notice::OutOfStock;
        }
        match operation {
            CartOperation::Add => Notice::AddFailed,
            CartOperation::Remove => Notice::RemoveFailed,
            CartOperation::Update => Notice::UpdateFailed,
        }
    }

    /// Default message text.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::AddFailed => "Error adding product",
            Notice::OutOfStock => "Requested quantity out of stock",
            Notice::RemoveFailed => "Error removing product",
            Notice::UpdateFailed => "Error changing product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
