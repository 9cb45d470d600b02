//! Typed cart persistence under a fixed key.

use std::sync::Arc;

use cart_core::Cart;

use crate::{KvStore, StorageError};

/// Key the storefront keeps its cart under.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Reads and writes the cart snapshot as a JSON array under one key.
#[derive(Clone)]
pub struct SnapshotStorage {
    store: Arc<dyn KvStore>,
    key: String,
}

impl SnapshotStorage {
    /// Use the default cart key.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_key(store, DEFAULT_CART_KEY)
    }

    /// Use a custom key.
    pub fn with_key(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The key snapshots are stored under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted cart.
    ///
    /// Returns `Ok(None)` if nothing was ever saved and
    /// `Err(StorageError::Corrupt)` if the value cannot be decoded.
    pub fn load(&self) -> Result<Option<Cart>, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };

        let cart: Cart = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        tracing::debug!(key = %self.key, entries = cart.item_count(), "loaded cart snapshot");
        Ok(Some(cart))
    }

    /// Persist the whole cart, replacing the previous snapshot.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(&self.key, &raw)?;
        tracing::debug!(key = %self.key, entries = cart.item_count(), "saved cart snapshot");
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStorage")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
