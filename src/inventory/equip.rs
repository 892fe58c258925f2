use crate::entities::equipment::{EquipPosition, Variant};
use crate::entities::inventory::Category;
use crate::entities::item::{Slot, SlottedItem};
use crate::inventory::error::{InventoryError, InventoryResult};
use crate::inventory::slots::next_free_slot;
use crate::inventory::templates::TemplateResolver;
use crate::persistence::store::{ItemQuery, Transaction};

/// An item that left the board as a side effect of an equip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displacement {
    pub item: SlottedItem,
    pub from: Slot,
    pub to: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipOutcome {
    pub item: SlottedItem,
    pub from: Slot,
    pub to: Slot,
    /// In the order the corresponding events must be emitted.
    pub unequipped: Vec<Displacement>,
}

fn item_at(tx: &mut dyn Transaction, slot: Slot) -> InventoryResult<Option<SlottedItem>> {
    Ok(tx
        .items(Category::Equip, ItemQuery::Slot(slot))?
        .into_iter()
        .next())
}

/// Moves the item at `source` onto its first resolved board position.
///
/// A previous occupant is parked at `Slot::Staging` and then placed at
/// `source`, so the two items swap. Overall and Bottom of the same variant
/// exclude each other; the loser goes to a fresh inventory slot. Returns
/// `None` when the item already sits at its destination.
pub fn equip(
    tx: &mut dyn Transaction,
    resolver: &dyn TemplateResolver,
    source: Slot,
) -> InventoryResult<Option<EquipOutcome>> {
    let item = item_at(tx, source)?.ok_or(InventoryError::ItemNotFound {
        category: Category::Equip,
        slot: source,
    })?;
    let destination = resolver
        .resolve_positions(item.template)
        .into_iter()
        .find(|slot| slot.is_equipped())
        .ok_or(InventoryError::NoEquipPosition(item.template))?;
    if destination == source {
        return Ok(None);
    }

    let occupant = item_at(tx, destination)?;
    if let Some(occupant) = occupant {
        tx.update_slot(Category::Equip, occupant.id, Slot::Staging)?;
    }
    tx.update_slot(Category::Equip, item.id, destination)?;

    let mut unequipped = Vec::new();
    if let Some(occupant) = occupant {
        tx.update_slot(Category::Equip, occupant.id, source)?;
        unequipped.push(Displacement {
            item: occupant,
            from: destination,
            to: source,
        });
    }

    if let Some((_, variant)) = destination.position() {
        if let Some(conflict) = exclusive_conflict(tx, &item, variant)? {
            let free = next_free_slot(tx, Category::Equip)?;
            tx.update_slot(Category::Equip, conflict.id, free)?;
            unequipped.push(Displacement {
                item: conflict,
                from: conflict.slot,
                to: free,
            });
        }
    }

    Ok(Some(EquipOutcome {
        item,
        from: source,
        to: destination,
        unequipped,
    }))
}

/// The equipped item of the same variant that can no longer stay next to
/// `item`.
fn exclusive_conflict(
    tx: &mut dyn Transaction,
    item: &SlottedItem,
    variant: Variant,
) -> InventoryResult<Option<SlottedItem>> {
    if item.template.is_overall() {
        let bottom = item_at(tx, Slot::equipped(EquipPosition::Bottom, variant))?;
        return Ok(bottom);
    }
    if item.template.is_bottom() {
        let top = item_at(tx, Slot::equipped(EquipPosition::Top, variant))?;
        return Ok(top.filter(|top| top.template.is_overall()));
    }
    Ok(None)
}

/// Moves the equipped item at `source` to the lowest free inventory slot.
pub fn unequip(tx: &mut dyn Transaction, source: Slot) -> InventoryResult<Displacement> {
    let not_found = InventoryError::ItemNotFound {
        category: Category::Equip,
        slot: source,
    };
    if !source.is_equipped() {
        return Err(not_found);
    }
    let item = item_at(tx, source)?.ok_or(not_found)?;
    let free = next_free_slot(tx, Category::Equip)?;
    tx.update_slot(Category::Equip, item.id, free)?;
    Ok(Displacement {
        item,
        from: source,
        to: free,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::character::{CharacterId, CharacterKey, TenantId};
    use crate::entities::item::TemplateId;
    use crate::config::TemplateOverride;
    use crate::inventory::templates::TemplateCatalog;
    use crate::persistence::store::{MemoryStore, Store};

    const OVERALL: TemplateId = TemplateId(1_052_075);
    const TOP: TemplateId = TemplateId(1_040_002);
    const BOTTOM: TemplateId = TemplateId(1_060_002);
    const SWORD: TemplateId = TemplateId(1_302_000);

    fn key() -> CharacterKey {
        CharacterKey::new(TenantId("t".to_string()), CharacterId(1))
    }

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new(200, &[]).expect("catalog")
    }

    const CASH_OVERALL: TemplateId = TemplateId(1_052_201);
    const CASH_BOTTOM: TemplateId = TemplateId(1_062_201);
    const CASH_WEAPON: TemplateId = TemplateId(1_702_000);

    fn cash_catalog() -> TemplateCatalog {
        let overrides: Vec<TemplateOverride> = [CASH_OVERALL, CASH_BOTTOM, CASH_WEAPON]
            .iter()
            .map(|template| TemplateOverride {
                id: template.0,
                slot_max: None,
                cash: true,
                positions: Vec::new(),
            })
            .collect();
        TemplateCatalog::new(200, &overrides).expect("catalog")
    }

    fn normal(position: EquipPosition) -> Slot {
        Slot::equipped(position, Variant::Normal)
    }

    fn cash(position: EquipPosition) -> Slot {
        Slot::equipped(position, Variant::Cash)
    }

    fn seed(store: &MemoryStore, rows: &[(TemplateId, Slot)]) -> Vec<SlottedItem> {
        let mut tx = store.begin(&key()).expect("begin");
        let items = rows
            .iter()
            .map(|(template, slot)| {
                tx.create_item(Category::Equip, *template, *slot, 1)
                    .expect("create")
            })
            .collect();
        tx.commit().expect("commit");
        items
    }

    fn slot_of(store: &MemoryStore, item: &SlottedItem) -> Slot {
        store
            .items(&key(), Category::Equip)
            .expect("items")
            .into_iter()
            .find(|row| row.id == item.id)
            .map(|row| row.slot)
            .expect("row")
    }

    #[test]
    fn equip_into_empty_position() {
        let store = MemoryStore::new();
        let items = seed(&store, &[(SWORD, Slot::Inventory(3))]);
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), Slot::Inventory(3))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");
        assert_eq!(outcome.to, normal(EquipPosition::Weapon));
        assert!(outcome.unequipped.is_empty());
        assert_eq!(slot_of(&store, &items[0]), normal(EquipPosition::Weapon));
    }

    #[test]
    fn equip_into_occupied_position_swaps() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (SWORD, Slot::Inventory(5)),
                (TemplateId(1_302_001), normal(EquipPosition::Weapon)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), Slot::Inventory(5))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        assert_eq!(outcome.unequipped.len(), 1);
        assert_eq!(outcome.unequipped[0].item.id, items[1].id);
        assert_eq!(outcome.unequipped[0].to, Slot::Inventory(5));
        assert_eq!(slot_of(&store, &items[0]), normal(EquipPosition::Weapon));
        assert_eq!(slot_of(&store, &items[1]), Slot::Inventory(5));
    }

    #[test]
    fn overall_displaces_equipped_bottom() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (OVERALL, Slot::Inventory(1)),
                (TOP, normal(EquipPosition::Top)),
                (BOTTOM, normal(EquipPosition::Bottom)),
                (SWORD, Slot::Inventory(2)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        let displaced: Vec<_> = outcome.unequipped.iter().map(|entry| entry.item.id).collect();
        assert_eq!(displaced, vec![items[1].id, items[2].id]);
        assert_eq!(slot_of(&store, &items[0]), normal(EquipPosition::Top));
        assert_eq!(slot_of(&store, &items[1]), Slot::Inventory(1));
        assert_eq!(slot_of(&store, &items[2]), Slot::Inventory(3));
        assert_eq!(outcome.unequipped[1].from, normal(EquipPosition::Bottom));
    }

    #[test]
    fn bottom_displaces_equipped_overall() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[(OVERALL, normal(EquipPosition::Top)), (BOTTOM, Slot::Inventory(1))],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        assert_eq!(outcome.unequipped.len(), 1);
        assert_eq!(outcome.unequipped[0].item.id, items[0].id);
        assert_eq!(slot_of(&store, &items[0]), Slot::Inventory(1));
        assert_eq!(slot_of(&store, &items[1]), normal(EquipPosition::Bottom));
    }

    #[test]
    fn bottom_keeps_plain_top() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[(TOP, normal(EquipPosition::Top)), (BOTTOM, Slot::Inventory(1))],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        assert!(outcome.unequipped.is_empty());
        tx.commit().expect("commit");
        assert_eq!(slot_of(&store, &items[0]), normal(EquipPosition::Top));
    }

    #[test]
    fn cash_overall_leaves_normal_bottom_alone() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (BOTTOM, normal(EquipPosition::Bottom)),
                (CASH_OVERALL, Slot::Inventory(1)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &cash_catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        assert_eq!(outcome.to, cash(EquipPosition::Top));
        assert!(outcome.unequipped.is_empty());
        assert_eq!(slot_of(&store, &items[0]), normal(EquipPosition::Bottom));
        assert_eq!(slot_of(&store, &items[1]), cash(EquipPosition::Top));
    }

    #[test]
    fn cash_overall_displaces_cash_bottom() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (CASH_BOTTOM, cash(EquipPosition::Bottom)),
                (BOTTOM, normal(EquipPosition::Bottom)),
                (CASH_OVERALL, Slot::Inventory(1)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &cash_catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        assert_eq!(outcome.unequipped.len(), 1);
        assert_eq!(outcome.unequipped[0].item.id, items[0].id);
        assert_eq!(outcome.unequipped[0].from, cash(EquipPosition::Bottom));
        assert_eq!(slot_of(&store, &items[0]), Slot::Inventory(1));
        assert_eq!(slot_of(&store, &items[1]), normal(EquipPosition::Bottom));
    }

    #[test]
    fn cash_bottom_displaces_cash_overall_only() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (CASH_OVERALL, cash(EquipPosition::Top)),
                (OVERALL, normal(EquipPosition::Top)),
                (CASH_BOTTOM, Slot::Inventory(1)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &cash_catalog(), Slot::Inventory(1))
            .expect("equip")
            .expect("moved");
        tx.commit().expect("commit");

        assert_eq!(outcome.to, cash(EquipPosition::Bottom));
        assert_eq!(outcome.unequipped.len(), 1);
        assert_eq!(outcome.unequipped[0].item.id, items[0].id);
        assert_eq!(slot_of(&store, &items[0]), Slot::Inventory(1));
        assert_eq!(slot_of(&store, &items[1]), normal(EquipPosition::Top));
        assert_eq!(slot_of(&store, &items[2]), cash(EquipPosition::Bottom));
    }

    #[test]
    fn unequip_from_cash_position() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (CASH_WEAPON, cash(EquipPosition::Weapon)),
                (SWORD, normal(EquipPosition::Weapon)),
                (TOP, Slot::Inventory(1)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let moved = unequip(tx.as_mut(), cash(EquipPosition::Weapon)).expect("unequip");
        tx.commit().expect("commit");

        assert_eq!(moved.from, cash(EquipPosition::Weapon));
        assert_eq!(moved.to, Slot::Inventory(2));
        assert_eq!(slot_of(&store, &items[0]), Slot::Inventory(2));
        assert_eq!(slot_of(&store, &items[1]), normal(EquipPosition::Weapon));
    }

    #[test]
    fn missing_source_and_unknown_template_fail() {
        let store = MemoryStore::new();
        seed(&store, &[(TemplateId(1_990_000), Slot::Inventory(1))]);
        let mut tx = store.begin(&key()).expect("begin");
        let err = equip(tx.as_mut(), &catalog(), Slot::Inventory(9)).expect_err("missing");
        assert!(err.is_not_found());
        let err = equip(tx.as_mut(), &catalog(), Slot::Inventory(1)).expect_err("no position");
        assert!(matches!(err, InventoryError::NoEquipPosition(_)));
    }

    #[test]
    fn equip_at_destination_is_noop() {
        let store = MemoryStore::new();
        seed(&store, &[(SWORD, normal(EquipPosition::Weapon))]);
        let mut tx = store.begin(&key()).expect("begin");
        let outcome = equip(tx.as_mut(), &catalog(), normal(EquipPosition::Weapon)).expect("equip");
        assert!(outcome.is_none());
    }

    #[test]
    fn unequip_moves_to_lowest_free_slot() {
        let store = MemoryStore::new();
        let items = seed(
            &store,
            &[
                (SWORD, normal(EquipPosition::Weapon)),
                (TOP, Slot::Inventory(1)),
                (BOTTOM, Slot::Inventory(3)),
            ],
        );
        let mut tx = store.begin(&key()).expect("begin");
        let moved = unequip(tx.as_mut(), normal(EquipPosition::Weapon)).expect("unequip");
        tx.commit().expect("commit");
        assert_eq!(moved.to, Slot::Inventory(2));
        assert_eq!(slot_of(&store, &items[0]), Slot::Inventory(2));
    }

    #[test]
    fn unequip_rejects_inventory_and_empty_slots() {
        let store = MemoryStore::new();
        seed(&store, &[(SWORD, Slot::Inventory(1))]);
        let mut tx = store.begin(&key()).expect("begin");
        assert!(unequip(tx.as_mut(), Slot::Inventory(1))
            .expect_err("not equipped")
            .is_not_found());
        assert!(unequip(tx.as_mut(), normal(EquipPosition::Hat))
            .expect_err("empty")
            .is_not_found());
    }
}
