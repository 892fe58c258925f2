use crate::entities::inventory::Category;
use crate::entities::item::{ItemId, Slot, TemplateId};
use crate::inventory::error::InventoryResult;
use crate::inventory::slots::next_free_slot;
use crate::persistence::store::{ItemQuery, Transaction};

/// One slot/quantity change made while placing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Create {
        item: ItemId,
        slot: Slot,
        quantity: u32,
    },
    Update {
        item: ItemId,
        slot: Slot,
        changed: u32,
        total: u32,
    },
}

impl Adjustment {
    pub fn changed(self) -> u32 {
        match self {
            Adjustment::Create { quantity, .. } => quantity,
            Adjustment::Update { changed, .. } => changed,
        }
    }
}

/// Places `requested` units of `template` into `category`.
///
/// Existing stacks are topped up ascending by slot before new stacks of at
/// most `slot_max` are created at the lowest free slots. Equipment never
/// merges and always yields a single item of quantity 1. A request of 0 is
/// treated as 1.
pub fn distribute(
    tx: &mut dyn Transaction,
    category: Category,
    template: TemplateId,
    requested: u32,
    slot_max: u32,
) -> InventoryResult<Vec<Adjustment>> {
    let cap = slot_max.max(1);
    let mut remaining = requested.max(1);
    let mut adjustments = Vec::new();

    if category == Category::Equip {
        let slot = next_free_slot(tx, category)?;
        let item = tx.create_item(category, template, slot, 1)?;
        adjustments.push(Adjustment::Create {
            item: item.id,
            slot,
            quantity: 1,
        });
        return Ok(adjustments);
    }

    for stack in tx.items(category, ItemQuery::Template(template))? {
        if remaining == 0 {
            break;
        }
        if !stack.slot.is_inventory() || stack.quantity >= cap {
            continue;
        }
        let added = remaining.min(cap - stack.quantity);
        let total = stack.quantity + added;
        tx.update_quantity(category, stack.id, total)?;
        remaining -= added;
        adjustments.push(Adjustment::Update {
            item: stack.id,
            slot: stack.slot,
            changed: added,
            total,
        });
    }

    while remaining > 0 {
        let quantity = remaining.min(cap);
        let slot = next_free_slot(tx, category)?;
        let item = tx.create_item(category, template, slot, quantity)?;
        remaining -= quantity;
        adjustments.push(Adjustment::Create {
            item: item.id,
            slot,
            quantity,
        });
    }
    Ok(adjustments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::character::{CharacterId, CharacterKey, TenantId};
    use crate::persistence::store::{MemoryStore, Store};

    fn key() -> CharacterKey {
        CharacterKey::new(TenantId("t".to_string()), CharacterId(1))
    }

    fn quantities(store: &MemoryStore, category: Category) -> Vec<(u16, u32)> {
        store
            .items(&key(), category)
            .expect("items")
            .iter()
            .filter_map(|item| match item.slot {
                Slot::Inventory(slot) => Some((slot, item.quantity)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn splits_over_cap_into_new_stacks() {
        let store = MemoryStore::new();
        let mut tx = store.begin(&key()).expect("begin");
        let adjustments = distribute(tx.as_mut(), Category::Use, TemplateId(2_000_000), 250, 200)
            .expect("distribute");
        tx.commit().expect("commit");

        assert_eq!(adjustments.len(), 2);
        assert!(matches!(
            adjustments[0],
            Adjustment::Create { slot: Slot::Inventory(1), quantity: 200, .. }
        ));
        assert!(matches!(
            adjustments[1],
            Adjustment::Create { slot: Slot::Inventory(2), quantity: 50, .. }
        ));
        assert_eq!(quantities(&store, Category::Use), vec![(1, 200), (2, 50)]);
    }

    #[test]
    fn tops_up_existing_stacks_before_creating() {
        let store = MemoryStore::new();
        let mut tx = store.begin(&key()).expect("begin");
        tx.create_item(Category::Etc, TemplateId(4_000_000), Slot::Inventory(1), 90)
            .expect("create");
        tx.create_item(Category::Etc, TemplateId(4_000_001), Slot::Inventory(2), 5)
            .expect("create");
        tx.create_item(Category::Etc, TemplateId(4_000_000), Slot::Inventory(4), 100)
            .expect("create");
        let adjustments = distribute(tx.as_mut(), Category::Etc, TemplateId(4_000_000), 35, 100)
            .expect("distribute");
        tx.commit().expect("commit");

        assert_eq!(
            adjustments
                .iter()
                .map(|adjustment| adjustment.changed())
                .collect::<Vec<_>>(),
            vec![10, 25]
        );
        assert!(matches!(
            adjustments[0],
            Adjustment::Update { slot: Slot::Inventory(1), changed: 10, total: 100, .. }
        ));
        assert!(matches!(
            adjustments[1],
            Adjustment::Create { slot: Slot::Inventory(3), quantity: 25, .. }
        ));
        assert_eq!(
            quantities(&store, Category::Etc),
            vec![(1, 100), (2, 5), (3, 25), (4, 100)]
        );
    }

    #[test]
    fn new_stack_count_is_ceiling_of_remaining_over_cap() {
        for (requested, cap) in [(1u32, 200u32), (200, 200), (201, 200), (999, 100), (7, 3)] {
            let store = MemoryStore::new();
            let mut tx = store.begin(&key()).expect("begin");
            let adjustments = distribute(
                tx.as_mut(),
                Category::Setup,
                TemplateId(3_010_000),
                requested,
                cap,
            )
            .expect("distribute");
            let expected = (requested + cap - 1) / cap;
            assert_eq!(adjustments.len() as u32, expected, "requested {requested} cap {cap}");
            let total: u32 = adjustments.iter().map(|adjustment| adjustment.changed()).sum();
            assert_eq!(total, requested);
        }
    }

    #[test]
    fn equipment_never_merges_and_ignores_quantity() {
        let store = MemoryStore::new();
        let mut tx = store.begin(&key()).expect("begin");
        distribute(tx.as_mut(), Category::Equip, TemplateId(1_302_000), 1, 1).expect("first");
        let adjustments =
            distribute(tx.as_mut(), Category::Equip, TemplateId(1_302_000), 5, 1).expect("second");
        tx.commit().expect("commit");
        assert_eq!(adjustments.len(), 1);
        assert_eq!(quantities(&store, Category::Equip), vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn zero_quantity_is_normalized_to_one() {
        let store = MemoryStore::new();
        let mut tx = store.begin(&key()).expect("begin");
        let adjustments = distribute(tx.as_mut(), Category::Use, TemplateId(2_000_000), 0, 200)
            .expect("distribute");
        assert!(matches!(adjustments[0], Adjustment::Create { quantity: 1, .. }));
    }
}
