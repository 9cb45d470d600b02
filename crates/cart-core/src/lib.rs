//! Cart domain types and snapshot transitions.
//!
//! This crate holds the data a shopping cart is made of and nothing else:
//!
//! - **Ids**: `ProductId`
//! - **Prices**: `Price` in minor units, `Currency` for display
//! - **Catalog**: `CatalogRecord` and `StockRecord` as returned by the shop API
//! - **Cart**: `CartEntry` line items and the immutable `Cart` snapshot
//!
//! Every transition on `Cart` takes `&self` and returns a new snapshot, so a
//! caller can validate first and publish the result only when it is final.
//!
//! # Example
//!
//! ```rust
//! use cart_core::prelude::*;
//!
//! let shoe = CatalogRecord::new(ProductId::new(1), "Shoe", Price::from_decimal(100.0));
//! let cart = Cart::empty().with_new_entry(&shoe).unwrap();
//! assert_eq!(cart.amount_of(ProductId::new(1)), Some(1));
//! assert_eq!(cart.total().display(Currency::USD), "$100.00");
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod price;

pub use cart::{Cart, CartEntry};
pub use catalog::{CatalogRecord, StockRecord};
pub use error::CoreError;
pub use ids::ProductId;
pub use price::{Currency, Price};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartEntry};
    pub use crate::catalog::{CatalogRecord, StockRecord};
    pub use crate::error::CoreError;
    pub use crate::ids::ProductId;
    pub use crate::price::{Currency, Price};
}
