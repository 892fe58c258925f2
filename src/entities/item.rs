use crate::entities::equipment::{EquipPosition, Variant};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u32);

impl TemplateId {
    /// Leading digit of the id, e.g. `1` for `1_302_000`.
    pub fn leading_digit(self) -> u32 {
        self.0 / 1_000_000
    }

    /// Four-digit equipment bucket, e.g. `130` for `1_302_000`.
    pub fn bucket(self) -> u32 {
        self.0 / 10_000
    }

    pub fn is_overall(self) -> bool {
        self.bucket() == 105
    }

    pub fn is_bottom(self) -> bool {
        self.bucket() == 106
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw value stored for the staging placeholder.
pub const STAGING_RAW_SLOT: i16 = i16::MIN;

const CASH_OFFSET: i16 = 100;

/// Highest inventory slot the signed column can hold.
pub const MAX_INVENTORY_SLOT: u16 = i16::MAX as u16;

/// Where an item sits inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Occupies inventory space, always `>= 1`.
    Inventory(u16),
    Equipped {
        position: EquipPosition,
        variant: Variant,
    },
    /// Transient parking spot used while swapping two items.
    Staging,
}

impl Slot {
    pub fn equipped(position: EquipPosition, variant: Variant) -> Self {
        Slot::Equipped { position, variant }
    }

    pub fn is_inventory(self) -> bool {
        matches!(self, Slot::Inventory(_))
    }

    pub fn is_equipped(self) -> bool {
        matches!(self, Slot::Equipped { .. })
    }

    /// False for inventory slots `raw` cannot encode: 0 and anything above
    /// `MAX_INVENTORY_SLOT`.
    pub fn is_storable(self) -> bool {
        match self {
            Slot::Inventory(slot) => (1..=MAX_INVENTORY_SLOT).contains(&slot),
            _ => true,
        }
    }

    pub fn position(self) -> Option<(EquipPosition, Variant)> {
        match self {
            Slot::Equipped { position, variant } => Some((position, variant)),
            _ => None,
        }
    }

    /// Signed column encoding used by the store.
    pub fn raw(self) -> i16 {
        match self {
            Slot::Inventory(slot) => slot as i16,
            Slot::Equipped {
                position,
                variant: Variant::Normal,
            } => -position.code(),
            Slot::Equipped {
                position,
                variant: Variant::Cash,
            } => -(position.code() + CASH_OFFSET),
            Slot::Staging => STAGING_RAW_SLOT,
        }
    }

    pub fn from_raw(raw: i16) -> Option<Self> {
        if raw == STAGING_RAW_SLOT {
            return Some(Slot::Staging);
        }
        if raw > 0 {
            return Some(Slot::Inventory(raw as u16));
        }
        if raw == 0 {
            return None;
        }
        let (code, variant) = if raw <= -CASH_OFFSET {
            (-raw - CASH_OFFSET, Variant::Cash)
        } else {
            (-raw, Variant::Normal)
        };
        EquipPosition::from_code(code).map(|position| Slot::Equipped { position, variant })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Inventory(slot) => write!(f, "{}", slot),
            Slot::Equipped { position, variant } => write!(f, "{:?}/{:?}", position, variant),
            Slot::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlottedItem {
    pub id: ItemId,
    pub template: TemplateId,
    pub slot: Slot,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_slot_encoding_roundtrips_for_every_position() {
        for position in crate::entities::equipment::EQUIP_POSITIONS {
            for variant in [Variant::Normal, Variant::Cash] {
                let slot = Slot::equipped(position, variant);
                assert_eq!(Slot::from_raw(slot.raw()), Some(slot));
            }
        }
    }

    #[test]
    fn raw_slot_encoding_follows_sign_convention() {
        assert_eq!(Slot::from_raw(7), Some(Slot::Inventory(7)));
        assert_eq!(
            Slot::from_raw(-11),
            Some(Slot::equipped(EquipPosition::Weapon, Variant::Normal))
        );
        assert_eq!(
            Slot::from_raw(-101),
            Some(Slot::equipped(EquipPosition::Hat, Variant::Cash))
        );
        assert_eq!(Slot::from_raw(0), None);
        assert_eq!(Slot::from_raw(-14), None);
        assert_eq!(Slot::from_raw(STAGING_RAW_SLOT), Some(Slot::Staging));
    }

    #[test]
    fn inventory_slots_outside_the_column_range_are_not_storable() {
        assert!(Slot::Inventory(1).is_storable());
        assert!(Slot::Inventory(MAX_INVENTORY_SLOT).is_storable());
        assert!(!Slot::Inventory(0).is_storable());
        assert!(!Slot::Inventory(40_000).is_storable());
        assert!(Slot::Staging.is_storable());
        assert_eq!(
            Slot::from_raw(Slot::Inventory(MAX_INVENTORY_SLOT).raw()),
            Some(Slot::Inventory(MAX_INVENTORY_SLOT))
        );
    }

    #[test]
    fn template_buckets() {
        assert!(TemplateId(1_052_075).is_overall());
        assert!(TemplateId(1_062_000).is_bottom());
        assert!(!TemplateId(1_040_002).is_overall());
        assert_eq!(TemplateId(2_000_000).leading_digit(), 2);
    }
}
