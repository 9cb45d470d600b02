//! Failure notification port.

use cart_core::ProductId;

use crate::error::{CartError, CartOperation, Notice};

/// A failed cart operation, as reported to a [`Notifier`].
#[derive(Debug)]
pub struct Failure<'a> {
    pub operation: CartOperation,
    pub product_id: ProductId,
    pub notice: Notice,
    pub error: &'a CartError,
}

/// Receives operation failures, e.g. to show a toast. Must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, failure: &Failure<'_>);
}

/// Writes failures to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, failure: &Failure<'_>) {
        if failure.error.is_validation() {
            tracing::warn!(
                operation = %failure.operation,
                product_id = %failure.product_id,
                error = %failure.error,
                "{}",
                failure.notice
            );
        } else {
            tracing::error!(
                operation = %failure.operation,
                product_id = %failure.product_id,
                error = %failure.error,
                "{}",
                failure.notice
            );
        }
    }
}
