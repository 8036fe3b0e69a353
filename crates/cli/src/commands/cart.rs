//! Cart editing.
//!
//! Every change goes through the flow so it is persisted and, when it
//! empties the cart, ends a checkout in progress.

use leipomo_core::ProductId;
use leipomo_ordering::cart::{CartItem, LineRef};
use leipomo_ordering::checkout::Command;

use super::{CliError, Flow, confirm};
use crate::render;

pub fn show(flow: &Flow) -> Result<(), CliError> {
    let summary = flow.session().cart.summary();
    render::cart(&mut std::io::stdout().lock(), &summary)?;
    Ok(())
}

/// Add `quantity` of a catalog product.
pub async fn add(flow: &mut Flow, product: ProductId, quantity: i64) -> Result<(), CliError> {
    let Some(product) = flow.find_product(product).await? else {
        return Err(CliError::Input(format!("No product with ID {product}.")));
    };
    if product.is_sold_out() {
        return Err(CliError::Input(format!("{} is sold out.", product.name)));
    }

    let view = flow
        .dispatch(Command::AddItem {
            item: CartItem::from(&product),
            quantity,
        })
        .await?;
    render::view(&mut std::io::stdout().lock(), &view)?;
    Ok(())
}

/// Change a line by `delta`. `line` is a product ID or a line key.
pub async fn change(flow: &mut Flow, line: &str, delta: i64) -> Result<(), CliError> {
    let line = line
        .parse::<ProductId>()
        .map_or_else(|_| LineRef::from(line), LineRef::from);

    let view = flow.dispatch(Command::ChangeQuantity { line, delta }).await?;
    render::view(&mut std::io::stdout().lock(), &view)?;
    Ok(())
}

pub async fn remove(flow: &mut Flow, key: String) -> Result<(), CliError> {
    let view = flow.dispatch(Command::RemoveLine { key }).await?;
    render::view(&mut std::io::stdout().lock(), &view)?;
    Ok(())
}

/// Empty the cart after confirmation.
pub async fn clear(flow: &mut Flow, yes: bool) -> Result<(), CliError> {
    if flow.session().cart.is_empty() {
        return show(flow);
    }
    if !yes && !confirm("Empty the cart?")? {
        return Ok(());
    }

    let view = flow.dispatch(Command::ClearCart).await?;
    render::view(&mut std::io::stdout().lock(), &view)?;
    Ok(())
}
