use crate::entities::character::CharacterKey;
use crate::world::position::TemporalPosition;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-wide cache of where each character was last seen. Never persisted;
/// concurrent writers race and the last write wins.
#[derive(Debug, Default)]
pub struct TemporalRegistry {
    positions: RwLock<HashMap<CharacterKey, TemporalPosition>>,
}

impl TemporalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to the origin for characters never seen.
    pub fn get(&self, key: &CharacterKey) -> TemporalPosition {
        self.positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    pub fn update(&self, key: &CharacterKey, position: TemporalPosition) {
        self.positions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), position);
    }

    /// Overwrites the point, keeping the last stance.
    pub fn place(&self, key: &CharacterKey, x: i16, y: i16) -> TemporalPosition {
        let mut positions = self.positions.write().unwrap_or_else(PoisonError::into_inner);
        let entry = positions.entry(key.clone()).or_default();
        *entry = entry.with_point(x, y);
        *entry
    }

    pub fn remove(&self, key: &CharacterKey) {
        self.positions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn len(&self) -> usize {
        self.positions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
