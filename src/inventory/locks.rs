use crate::entities::character::CharacterKey;
use crate::entities::inventory::{Category, CATEGORIES};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Handle = Arc<Mutex<()>>;

/// Per (character, category) mutual exclusion for structural mutations.
///
/// Owned by the service root and shared through `Arc`. Handles are created on
/// first use and dropped by `release_all`; a holder that still owns a handle
/// keeps it alive until it finishes.
#[derive(Debug, Default)]
pub struct LockRegistry {
    handles: Mutex<HashMap<(CharacterKey, Category), Handle>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<(CharacterKey, Category), Handle>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn handle(&self, key: &CharacterKey, category: Category) -> Handle {
        let mut handles = self.handles();
        Arc::clone(
            handles
                .entry((key.clone(), category))
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Runs `f` while holding the (character, category) handle. Blocks without
    /// a timeout.
    pub fn with_lock<T>(&self, key: &CharacterKey, category: Category, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(key, category);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Runs `f` while holding every category handle of the character, taken in
    /// `CATEGORIES` order.
    pub fn with_all_locks<T>(&self, key: &CharacterKey, f: impl FnOnce() -> T) -> T {
        let handles: Vec<Handle> = CATEGORIES
            .iter()
            .map(|category| self.handle(key, *category))
            .collect();
        let _guards: Vec<MutexGuard<'_, ()>> = handles
            .iter()
            .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();
        f()
    }

    /// Drops all five handles of a character. Callers must ensure no operation
    /// on that character is still in flight.
    pub fn release_all(&self, key: &CharacterKey) {
        let mut handles = self.handles();
        for category in CATEGORIES {
            handles.remove(&(key.clone(), category));
        }
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }
}
