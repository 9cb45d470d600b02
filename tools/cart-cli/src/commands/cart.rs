//! Cart commands.

use std::sync::Arc;

use anyhow::Result;
use cart_core::Cart;
use cart_store::{CartError, CartOperation, Notice};

use super::{AddArgs, RemoveArgs, ShowArgs, UpdateArgs};
use crate::context::Context;

/// A cart operation that failed after its notice was shown.
#[derive(Debug, thiserror::Error)]
#[error("{notice}")]
pub struct OperationFailed {
    pub notice: Notice,
    #[source]
    pub source: CartError,
}

impl OperationFailed {
    fn new(operation: CartOperation, source: CartError) -> Self {
        Self {
            notice: Notice::for_failure(operation, &source),
            source,
        }
    }
}

/// Show the cart.
pub async fn show(_args: ShowArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    render(&store.snapshot(), ctx);
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let before = store.snapshot().amount_of(args.id);

    let cart = store
        .add_product(args.id)
        .await
        .map_err(|e| OperationFailed::new(CartOperation::Add, e))?;

    match (before, cart.get(args.id)) {
        (None, Some(entry)) => ctx.output.success(&format!("Added {}", entry.name)),
        (Some(_), Some(entry)) => ctx
            .output
            .success(&format!("{} x{}", entry.name, entry.amount)),
        _ => {}
    }
    render(&cart, ctx);
    Ok(())
}

/// Remove a product from the cart.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let name = store.snapshot().get(args.id).map(|entry| entry.name.clone());

    let cart = store
        .remove_product(args.id)
        .map_err(|e| OperationFailed::new(CartOperation::Remove, e))?;

    if let Some(name) = name {
        ctx.output.success(&format!("Removed {}", name));
    }
    render(&cart, ctx);
    Ok(())
}

/// Set the amount of a product in the cart.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    if args.amount < 1 {
        ctx.output
            .warn(&format!("Amount {} ignored, must be at least 1", args.amount));
    }

    let cart = store
        .update_product_amount(args.id, args.amount)
        .await
        .map_err(|e| OperationFailed::new(CartOperation::Update, e))?;

    render(&cart, ctx);
    Ok(())
}

fn render(cart: &Arc<Cart>, ctx: &Context) {
    ctx.output.cart(cart, ctx.config.display.currency);
}
