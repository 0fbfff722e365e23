// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing::info;

use crate::api::FinanceBackend;
use crate::error::{ApiResult, ValidationError};
use crate::models::InventoryItem;

/// Stock left after moving `quantity` units into a tank. Refuses anything that
/// would take stock below zero.
pub fn remaining_after_assign(item: &InventoryItem, quantity: i64) -> Result<i64, ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity(quantity));
    }
    if quantity > item.stock {
        return Err(ValidationError::InsufficientStock {
            requested: quantity,
            available: item.stock,
        });
    }
    Ok(item.stock - quantity)
}

/// Re-reads the item so the check runs against current stock, then writes the new count.
pub fn assign_to_tank(
    backend: &dyn FinanceBackend,
    item_id: &str,
    tank: &str,
    quantity: i64,
) -> ApiResult<InventoryItem> {
    let item = backend.inventory_item(item_id)?;
    let remaining = remaining_after_assign(&item, quantity)?;
    let updated = backend.set_stock(item_id, remaining)?;
    info!(item = %item.name, tank, quantity, remaining, "assigned to tank");
    Ok(updated)
}

pub fn low_stock(items: &[InventoryItem], threshold: i64) -> Vec<&InventoryItem> {
    items.iter().filter(|i| i.stock <= threshold).collect()
}
