use crate::entities::inventory::Category;
use crate::entities::item::{Slot, TemplateId};
use crate::persistence::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no item at slot {slot} in {category} container")]
    ItemNotFound { category: Category, slot: Slot },
    #[error("template {0} has no equip position")]
    NoEquipPosition(TemplateId),
    #[error("portal {portal} not found on map {map}")]
    PortalNotFound { map: u32, portal: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InventoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InventoryError::ItemNotFound { .. }
                | InventoryError::NoEquipPosition(_)
                | InventoryError::PortalNotFound { .. }
        )
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
