//! Lookup ports the cart store depends on.
//!
//! Both traits use `async_trait` so they can be held as trait objects.

use std::sync::Arc;

use cart_core::{CatalogRecord, ProductId, StockRecord};

use crate::FetchError;

/// Source of available stock per product.
#[async_trait::async_trait]
pub trait StockService: Send + Sync {
    /// Look up the available quantity for a product.
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, FetchError>;
}

/// Source of product details.
#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    /// Look up a product. Returns `Ok(None)` if the catalog has no such product.
    async fn product(&self, product_id: ProductId) -> Result<Option<CatalogRecord>, FetchError>;
}

#[async_trait::async_trait]
impl<T: StockService + ?Sized> StockService for Arc<T> {
    async fn stock(&self, product_id: ProductId) -> Result<StockRecord, FetchError> {
        (**self).stock(product_id).await
    }
}

#[async_trait::async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn product(&self, product_id: ProductId) -> Result<Option<CatalogRecord>, FetchError> {
        (**self).product(product_id).await
    }
}
