use crate::entities::inventory::Category;
use crate::entities::item::{Slot, MAX_INVENTORY_SLOT};
use crate::inventory::error::{InventoryError, InventoryResult};
use crate::persistence::store::{ItemQuery, Transaction};

/// Smallest positive slot absent from `sorted_slots`.
///
/// The input must already be sorted ascending. Non-positive entries (equipped
/// positions, staging) never occupy inventory space and are skipped.
pub fn min_free_slot(sorted_slots: &[i32]) -> i32 {
    let mut candidate = 1;
    for &slot in sorted_slots {
        if slot <= 0 {
            continue;
        }
        if slot == candidate {
            candidate += 1;
        } else if slot > candidate {
            break;
        }
    }
    candidate
}

/// Lowest free inventory slot of `category` as seen inside `tx`.
pub fn next_free_slot(tx: &mut dyn Transaction, category: Category) -> InventoryResult<Slot> {
    let slots: Vec<i32> = tx
        .items(category, ItemQuery::All)?
        .iter()
        .map(|item| i32::from(item.slot.raw()))
        .collect();
    let free = min_free_slot(&slots);
    if free > i32::from(MAX_INVENTORY_SLOT) {
        return Err(InventoryError::Validation(format!(
            "{} container has no free slot",
            category
        )));
    }
    Ok(Slot::Inventory(free as u16))
}
