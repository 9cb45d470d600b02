//! Stock and catalog lookups for the cart.
//!
//! This crate provides:
//! - `StockService` / `CatalogService` - the two lookups the cart validates against
//! - `HttpShopApi` - both lookups over HTTP (`GET /stock/{id}`, `GET /products/{id}`)
//! - `TimeoutConfig` - connect and total timeouts for the HTTP client
//! - `FetchError` - transport, status and decode failures

mod error;
mod http;
mod ports;
mod timeout;

pub use error::FetchError;
pub use http::HttpShopApi;
pub use ports::{CatalogService, StockService};
pub use timeout::TimeoutConfig;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CatalogService, FetchError, HttpShopApi, StockService, TimeoutConfig};
}
