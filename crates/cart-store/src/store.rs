//! The cart store.

use std::sync::{Arc, Mutex};

use cart_core::{Cart, CatalogRecord, CoreError, ProductId, StockRecord};
use cart_data::{CatalogService, StockService};
use cart_storage::SnapshotStorage;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{CartError, CartOperation, Notice};
use crate::notify::{Failure, LogNotifier, Notifier};

/// What to do when the persisted cart exists but cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptSnapshotPolicy {
    /// Start with an empty cart. The stored value is left in place until the
    /// next successful mutation overwrites it.
    #[default]
    Reset,
    /// Refuse to open the store.
    Fail,
}

/// Builder for [`CartStore`].
pub struct CartStoreBuilder {
    storage: SnapshotStorage,
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
    on_corrupt: CorruptSnapshotPolicy,
}

impl CartStoreBuilder {
    /// Report failures to `notifier` instead of the log.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the policy for undecodable persisted data.
    pub fn on_corrupt(mut self, policy: CorruptSnapshotPolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Load the persisted cart and create the store.
    pub fn open(self) -> Result<CartStore, CartError> {
        let initial = match self.storage.load() {
            Ok(Some(cart)) if cart.is_normalized() => cart,
            Ok(Some(cart)) => {
                tracing::warn!(
                    key = self.storage.key(),
                    "persisted cart has duplicate or empty entries, merging"
                );
                Cart::from_entries(cart.entries().to_vec())
            }
            Ok(None) => Cart::empty(),
            Err(e) if e.is_corrupt() && self.on_corrupt == CorruptSnapshotPolicy::Reset => {
                tracing::warn!(key = self.storage.key(), error = %e, "ignoring corrupt persisted cart");
                Cart::empty()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(entries = initial.item_count(), "cart store opened");
        let (state, _) = watch::channel(Arc::new(initial));

        Ok(CartStore {
            inner: Arc::new(Inner {
                storage: self.storage,
                stock: self.stock,
                catalog: self.catalog,
                notifier: self.notifier,
                lookups: tokio::sync::Mutex::new(()),
                commit: Mutex::new(()),
                state,
            }),
        })
    }
}

struct Inner {
    storage: SnapshotStorage,
    stock: Arc<dyn StockService>,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
    /// Serializes add/update across their lookups.
    lookups: tokio::sync::Mutex<()>,
    /// Guards read-compute-persist-publish of one snapshot.
    commit: Mutex<()>,
    state: watch::Sender<Arc<Cart>>,
}

/// Shopping cart state, persisted on every change and validated against
/// stock and catalog lookups.
///
/// Cloning is cheap and every clone shares the same cart. Add and update run
/// one at a time, each seeing the snapshot left by the previous one; reads
/// never wait for them.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl CartStore {
    /// Start building a store.
    pub fn builder(
        storage: SnapshotStorage,
        stock: Arc<dyn StockService>,
        catalog: Arc<dyn CatalogService>,
    ) -> CartStoreBuilder {
        CartStoreBuilder {
            storage,
            stock,
            catalog,
            notifier: Arc::new(LogNotifier),
            on_corrupt: CorruptSnapshotPolicy::default(),
        }
    }

    /// The current cart.
    pub fn snapshot(&self) -> Arc<Cart> {
        self.inner.state.borrow().clone()
    }

    /// Watch for new snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.inner.state.subscribe()
    }

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart is added with amount 1 from catalog
    /// data; otherwise its amount goes up by one if stock allows.
    #[tracing::instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let result = self.add(product_id).await;
        self.report(CartOperation::Add, product_id, result)
    }

    /// Remove a product's entry.
    #[tracing::instrument(skip_all, fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let result = self.transact(|cart| {
            cart.without(product_id).map_err(|e| match e {
                CoreError::NotInCart(id) => CartError::NotInCart(id),
                other => other.into(),
            })
        });
        self.report(CartOperation::Remove, product_id, result)
    }

    /// Set a product's amount.
    ///
    /// Amounts below one are ignored and return the current cart unchanged.
    /// Setting the amount of a product that is not in the cart leaves the
    /// cart as it is.
    #[tracing::instrument(skip_all, fields(product_id = %product_id, amount = amount))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Arc<Cart>, CartError> {
        if amount < 1 {
            tracing::debug!(amount, "ignoring amount below one");
            return Ok(self.snapshot());
        }
        let result = self.update(product_id, amount).await;
        self.report(CartOperation::Update, product_id, result)
    }

    async fn add(&self, product_id: ProductId) -> Result<Arc<Cart>, CartError> {
        let _serial = self.inner.lookups.lock().await;

        let (stock, product) = futures::future::join(
            self.inner.stock.stock(product_id),
            self.inner.catalog.product(product_id),
        )
        .await;
        let product: CatalogRecord = product?
            .filter(|record| record.id == product_id)
            .ok_or(CartError::CatalogNotFound(product_id))?;
        let stock = stock?;
        tracing::debug!(available = stock.amount, "looked up product");

        self.transact(|cart| {
            let requested = cart.amount_of(product_id).unwrap_or(0).saturating_add(1);
            if !stock.is_available() {
                return Err(out_of_stock(product_id, requested, &stock));
            }
            if cart.contains(product_id) {
                with_checked_amount(cart, product_id, requested, &stock)
            } else {
                Ok(cart.with_new_entry(&product)?)
            }
        })
    }

    async fn update(&self, product_id: ProductId, amount: i64) -> Result<Arc<Cart>, CartError> {
        let _serial = self.inner.lookups.lock().await;

        let stock = self.inner.stock.stock(product_id).await?;
        tracing::debug!(available = stock.amount, "looked up stock");

        self.transact(|cart| with_checked_amount(cart, product_id, amount, &stock))
    }

    /// Compute the next snapshot from the latest one, persist it, then
    /// publish it. Nothing changes if `f` or the write fails.
    fn transact<F>(&self, f: F) -> Result<Arc<Cart>, CartError>
    where
        F: FnOnce(&Cart) -> Result<Cart, CartError>,
    {
        let _commit = self
            .inner
            .commit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.snapshot();
        let next = f(&current)?;
        self.inner.storage.save(&next)?;

        let next = Arc::new(next);
        self.inner.state.send_replace(next.clone());
        tracing::info!(
            entries = next.item_count(),
            units = next.total_units(),
            "cart updated"
        );
        Ok(next)
    }

    fn report(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<Arc<Cart>, CartError>,
    ) -> Result<Arc<Cart>, CartError> {
        if let Err(error) = &result {
            self.inner.notifier.notify(&Failure {
                operation,
                product_id,
                notice: Notice::for_failure(operation, error),
                error,
            });
        }
        result
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.inner.storage)
            .field("entries", &self.snapshot().item_count())
            .finish_non_exhaustive()
    }
}

fn with_checked_amount(
    cart: &Cart,
    product_id: ProductId,
    amount: i64,
    stock: &StockRecord,
) -> Result<Cart, CartError> {
    if !stock.can_fulfill(amount) {
        return Err(out_of_stock(product_id, amount, stock));
    }
    Ok(cart.with_amount(product_id, amount)?)
}

fn out_of_stock(product_id: ProductId, requested: i64, stock: &StockRecord) -> CartError {
    CartError::OutOfStock {
        product_id,
        requested,
        available: stock.amount,
    }
}
