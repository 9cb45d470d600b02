//! Shopping cart state container.
//!
//! `CartStore` holds the cart in memory, mirrors it to key-value storage on
//! every change, and validates each change against stock and catalog
//! lookups. Construct it once and hand clones to whatever needs the cart.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cart_data::HttpShopApi;
//! use cart_storage::{FileStore, SnapshotStorage};
//! use cart_store::CartStore;
//!
//! let api = Arc::new(HttpShopApi::new("http://localhost:3333")?);
//! let storage = SnapshotStorage::new(Arc::new(FileStore::open(".cart/storage.json")?));
//! let store = CartStore::builder(storage, api.clone(), api).open()?;
//!
//! match store.add_product(ProductId::new(1)).await {
//!     Ok(cart) => println!("{} items", cart.item_count()),
//!     Err(e) => println!("{}", Notice::for_failure(CartOperation::Add, &e)),
//! }
//! ```

mod error;
mod notify;
mod store;

pub use error::{CartError, CartOperation, Notice};
pub use notify::{Failure, LogNotifier, Notifier};
pub use store::{CartStore, CartStoreBuilder, CorruptSnapshotPolicy};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CartError, CartOperation, CartStore, CorruptSnapshotPolicy, Notice};
    pub use cart_core::prelude::*;
}
