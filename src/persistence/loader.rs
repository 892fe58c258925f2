use crate::config::Capacities;
use crate::entities::character::CharacterKey;
use crate::entities::inventory::{Container, InventoryAggregate, CATEGORIES};
use crate::persistence::store::{Store, StoreError};

/// Rebuilds the five containers of a character from committed rows. Takes no
/// locks; the result is a projection and may be stale as soon as it returns.
pub fn load_aggregate(
    store: &dyn Store,
    key: &CharacterKey,
    defaults: &Capacities,
) -> Result<InventoryAggregate, StoreError> {
    let mut containers = Vec::with_capacity(CATEGORIES.len());
    for category in CATEGORIES {
        let capacity = store
            .capacity(key, category)?
            .unwrap_or_else(|| defaults.get(category));
        let items = store.items(key, category)?;
        containers.push(Container::new(category, capacity, items));
    }
    InventoryAggregate::new(containers).map_err(StoreError::Unavailable)
}
