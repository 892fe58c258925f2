use crate::entities::character::CharacterKey;
use crate::entities::inventory::Category;
use crate::entities::item::{ItemId, Slot, TemplateId};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemGained {
        character: CharacterKey,
        category: Category,
        item: ItemId,
        template: TemplateId,
        slot: Slot,
        quantity: u32,
    },
    ItemUpdated {
        character: CharacterKey,
        category: Category,
        item: ItemId,
        template: TemplateId,
        slot: Slot,
        changed: u32,
        total: u32,
    },
    ItemMoved {
        character: CharacterKey,
        category: Category,
        item: ItemId,
        template: TemplateId,
        from: Slot,
        to: Slot,
    },
    ItemRemoved {
        character: CharacterKey,
        category: Category,
        item: ItemId,
        template: TemplateId,
        slot: Slot,
        removed: u32,
        remaining: u32,
    },
    Equipped {
        character: CharacterKey,
        item: ItemId,
        template: TemplateId,
        from: Slot,
        to: Slot,
    },
    Unequipped {
        character: CharacterKey,
        item: ItemId,
        template: TemplateId,
        from: Slot,
        to: Slot,
    },
    MapChanged {
        character: CharacterKey,
        map: u32,
        portal: u32,
        x: i16,
        y: i16,
    },
}

impl InventoryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InventoryEvent::ItemGained { .. } => "item_gained",
            InventoryEvent::ItemUpdated { .. } => "item_updated",
            InventoryEvent::ItemMoved { .. } => "item_moved",
            InventoryEvent::ItemRemoved { .. } => "item_removed",
            InventoryEvent::Equipped { .. } => "equipped",
            InventoryEvent::Unequipped { .. } => "unequipped",
            InventoryEvent::MapChanged { .. } => "map_changed",
        }
    }

    pub fn character(&self) -> &CharacterKey {
        match self {
            InventoryEvent::ItemGained { character, .. }
            | InventoryEvent::ItemUpdated { character, .. }
            | InventoryEvent::ItemMoved { character, .. }
            | InventoryEvent::ItemRemoved { character, .. }
            | InventoryEvent::Equipped { character, .. }
            | InventoryEvent::Unequipped { character, .. }
            | InventoryEvent::MapChanged { character, .. } => character,
        }
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// Best-effort outbound delivery. Called only after the state change it
/// describes has committed.
pub trait EventEmitter: Send + Sync {
    fn publish(&self, event: &InventoryEvent) -> Result<(), EmitError>;
}

/// Publishes in order; failures are logged and never surface to the caller.
pub fn publish_all(emitter: &dyn EventEmitter, events: &[InventoryEvent]) {
    for event in events {
        if let Err(err) = emitter.publish(event) {
            tracing::warn!(
                event = event.name(),
                character = %event.character(),
                error = %err,
                "event publish failed"
            );
        }
    }
}

/// Writes each event to the log.
#[derive(Debug, Default)]
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn publish(&self, event: &InventoryEvent) -> Result<(), EmitError> {
        tracing::info!(event = event.name(), character = %event.character(), "{:?}", event);
        Ok(())
    }
}

/// Keeps published events in memory.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<InventoryEvent>>,
    failing: Mutex<bool>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InventoryEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take(&self) -> Vec<InventoryEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// While set, every publish fails without recording.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }
}

impl EventEmitter for RecordingEmitter {
    fn publish(&self, event: &InventoryEvent) -> Result<(), EmitError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(EmitError::Unavailable("recording emitter set to fail".to_string()));
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
