//! Catalog browsing.

use std::io::Write;

use leipomo_core::CategoryId;

use super::{CliError, Flow};
use crate::render;

/// Show categories, or the products of `category`.
pub async fn browse(flow: &Flow, category: Option<CategoryId>) -> Result<(), CliError> {
    let view = flow.browse(category).await?;

    let mut stdout = std::io::stdout().lock();
    render::catalog(&mut stdout, &view)?;
    if category.is_none() {
        writeln!(stdout, "Add products with `leipomo cart add <ID>`.")?;
    }
    Ok(())
}
