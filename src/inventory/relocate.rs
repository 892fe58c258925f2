use crate::entities::inventory::Category;
use crate::entities::item::{Slot, SlottedItem, MAX_INVENTORY_SLOT};
use crate::inventory::error::{InventoryError, InventoryResult};
use crate::persistence::store::{ItemQuery, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub item: SlottedItem,
    pub from: Slot,
    pub to: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub item: SlottedItem,
    pub removed: u32,
    pub remaining: u32,
}

fn item_at(
    tx: &mut dyn Transaction,
    category: Category,
    slot: Slot,
) -> InventoryResult<Option<SlottedItem>> {
    Ok(tx.items(category, ItemQuery::Slot(slot))?.into_iter().next())
}

/// Moves an item between two inventory slots of one container, swapping
/// with whatever already sits at `to`.
pub fn move_item(
    tx: &mut dyn Transaction,
    category: Category,
    from: Slot,
    to: Slot,
) -> InventoryResult<Vec<Relocation>> {
    if !from.is_inventory() || !to.is_inventory() {
        return Err(InventoryError::Validation(format!(
            "move needs two inventory slots, got {} -> {}",
            from, to
        )));
    }
    if !from.is_storable() || !to.is_storable() {
        return Err(InventoryError::Validation(format!(
            "inventory slots run from 1 to {}, got {} -> {}",
            MAX_INVENTORY_SLOT, from, to
        )));
    }
    let item = item_at(tx, category, from)?
        .ok_or(InventoryError::ItemNotFound { category, slot: from })?;
    if from == to {
        return Ok(Vec::new());
    }

    let mut relocations = Vec::with_capacity(2);
    let occupant = item_at(tx, category, to)?;
    if let Some(occupant) = occupant {
        tx.update_slot(category, occupant.id, Slot::Staging)?;
    }
    tx.update_slot(category, item.id, to)?;
    relocations.push(Relocation { item, from, to });
    if let Some(occupant) = occupant {
        tx.update_slot(category, occupant.id, from)?;
        relocations.push(Relocation {
            item: occupant,
            from: to,
            to: from,
        });
    }
    Ok(relocations)
}

/// Removes `quantity` units from the stack at `slot`; 0 or the whole stack
/// deletes the row.
pub fn remove_item(
    tx: &mut dyn Transaction,
    category: Category,
    slot: Slot,
    quantity: u32,
) -> InventoryResult<Removal> {
    let item = item_at(tx, category, slot)?.ok_or(InventoryError::ItemNotFound { category, slot })?;
    if quantity == 0 || quantity >= item.quantity {
        tx.delete_items(category, ItemQuery::Slot(slot))?;
        return Ok(Removal {
            item,
            removed: item.quantity,
            remaining: 0,
        });
    }
    let remaining = item.quantity - quantity;
    tx.update_quantity(category, item.id, remaining)?;
    Ok(Removal {
        item,
        removed: quantity,
        remaining,
    })
}
