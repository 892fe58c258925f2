use crate::entities::item::{ItemId, Slot, SlottedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipPosition {
    Hat,
    Medal,
    Forehead,
    Ring1,
    Ring2,
    Ring3,
    Ring4,
    Eye,
    Earring,
    Shoulder,
    Cape,
    Top,
    Pendant,
    Weapon,
    Shield,
    Gloves,
    Bottom,
    Belt,
    Shoes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variant {
    Normal,
    Cash,
}

impl EquipPosition {
    const COUNT: usize = 19;

    /// Body-part code; stays below 100 so the cash offset never collides.
    pub fn code(self) -> i16 {
        match self {
            EquipPosition::Hat => 1,
            EquipPosition::Forehead => 2,
            EquipPosition::Eye => 3,
            EquipPosition::Earring => 4,
            EquipPosition::Top => 5,
            EquipPosition::Bottom => 6,
            EquipPosition::Shoes => 7,
            EquipPosition::Gloves => 8,
            EquipPosition::Cape => 9,
            EquipPosition::Shield => 10,
            EquipPosition::Weapon => 11,
            EquipPosition::Ring1 => 12,
            EquipPosition::Ring2 => 13,
            EquipPosition::Ring3 => 15,
            EquipPosition::Ring4 => 16,
            EquipPosition::Pendant => 17,
            EquipPosition::Medal => 49,
            EquipPosition::Belt => 50,
            EquipPosition::Shoulder => 51,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        EQUIP_POSITIONS
            .iter()
            .copied()
            .find(|position| position.code() == code)
    }

    pub fn index(self) -> usize {
        EQUIP_POSITIONS
            .iter()
            .position(|position| *position == self)
            .unwrap_or(0)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        EQUIP_POSITIONS
            .iter()
            .copied()
            .find(|position| format!("{:?}", position).eq_ignore_ascii_case(name))
    }
}

pub const EQUIP_POSITIONS: [EquipPosition; EquipPosition::COUNT] = [
    EquipPosition::Hat,
    EquipPosition::Medal,
    EquipPosition::Forehead,
    EquipPosition::Ring1,
    EquipPosition::Ring2,
    EquipPosition::Ring3,
    EquipPosition::Ring4,
    EquipPosition::Eye,
    EquipPosition::Earring,
    EquipPosition::Shoulder,
    EquipPosition::Cape,
    EquipPosition::Top,
    EquipPosition::Pendant,
    EquipPosition::Weapon,
    EquipPosition::Shield,
    EquipPosition::Gloves,
    EquipPosition::Bottom,
    EquipPosition::Belt,
    EquipPosition::Shoes,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardEntry {
    pub normal: Option<ItemId>,
    pub cash: Option<ItemId>,
}

/// Read-only projection of the equipped part of the Equip container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentBoard {
    entries: Vec<BoardEntry>,
}

impl Default for EquipmentBoard {
    fn default() -> Self {
        Self {
            entries: vec![BoardEntry::default(); EquipPosition::COUNT],
        }
    }
}

impl EquipmentBoard {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a SlottedItem>) -> Self {
        let mut board = Self::default();
        for item in items {
            if let Slot::Equipped { position, variant } = item.slot {
                board.set(position, variant, Some(item.id));
            }
        }
        board
    }

    pub fn entry(&self, position: EquipPosition) -> BoardEntry {
        self.entries
            .get(position.index())
            .copied()
            .unwrap_or_default()
    }

    pub fn get(&self, position: EquipPosition, variant: Variant) -> Option<ItemId> {
        let entry = self.entry(position);
        match variant {
            Variant::Normal => entry.normal,
            Variant::Cash => entry.cash,
        }
    }

    fn set(&mut self, position: EquipPosition, variant: Variant, item: Option<ItemId>) {
        if let Some(entry) = self.entries.get_mut(position.index()) {
            match variant {
                Variant::Normal => entry.normal = item,
                Variant::Cash => entry.cash = item,
            }
        }
    }

    pub fn equipped_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.normal.is_some() as usize + entry.cash.is_some() as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::TemplateId;

    #[test]
    fn position_codes_are_unique_and_below_cash_offset() {
        for (index, position) in EQUIP_POSITIONS.iter().enumerate() {
            assert!(position.code() > 0 && position.code() < 100);
            assert_eq!(position.index(), index);
            assert_eq!(EquipPosition::from_code(position.code()), Some(*position));
        }
    }

    #[test]
    fn board_projects_both_variants() {
        let items = [
            SlottedItem {
                id: ItemId(1),
                template: TemplateId(1_002_000),
                slot: Slot::equipped(EquipPosition::Hat, Variant::Normal),
                quantity: 1,
            },
            SlottedItem {
                id: ItemId(2),
                template: TemplateId(1_002_001),
                slot: Slot::equipped(EquipPosition::Hat, Variant::Cash),
                quantity: 1,
            },
            SlottedItem {
                id: ItemId(3),
                template: TemplateId(1_302_000),
                slot: Slot::Inventory(1),
                quantity: 1,
            },
        ];
        let board = EquipmentBoard::from_items(&items);
        assert_eq!(
            board.entry(EquipPosition::Hat),
            BoardEntry {
                normal: Some(ItemId(1)),
                cash: Some(ItemId(2)),
            }
        );
        assert_eq!(board.get(EquipPosition::Weapon, Variant::Normal), None);
        assert_eq!(board.equipped_count(), 2);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(EquipPosition::from_name("ring3"), Some(EquipPosition::Ring3));
        assert_eq!(EquipPosition::from_name("wings"), None);
    }
}
