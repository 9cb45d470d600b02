//! Key-value persistence for cart snapshots.
//!
//! Mirrors the browser's local storage: a flat map of string keys to string
//! values, written synchronously. The cart lives under a single key as a JSON
//! array of entries.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cart_core::Cart;
//! use cart_storage::{MemoryStore, SnapshotStorage};
//!
//! let storage = SnapshotStorage::new(Arc::new(MemoryStore::new()));
//! assert!(storage.load().unwrap().is_none());
//!
//! storage.save(&Cart::empty()).unwrap();
//! assert_eq!(storage.load().unwrap(), Some(Cart::empty()));
//! ```

mod error;
mod kv;
mod snapshot;

pub use error::StorageError;
pub use kv::{FileStore, KvStore, MemoryStore};
pub use snapshot::{SnapshotStorage, DEFAULT_CART_KEY};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FileStore, KvStore, MemoryStore, SnapshotStorage, StorageError};
}
