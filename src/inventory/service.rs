use crate::config::Capacities;
use crate::entities::character::{CharacterId, CharacterKey, TenantId};
use crate::entities::equipment::EquipmentBoard;
use crate::entities::inventory::{Category, Container, InventoryAggregate, CATEGORIES};
use crate::entities::item::{Slot, TemplateId};
use crate::inventory::equip::{self, Displacement, EquipOutcome};
use crate::inventory::error::{InventoryError, InventoryResult};
use crate::inventory::events::{publish_all, EventEmitter, InventoryEvent};
use crate::inventory::locks::LockRegistry;
use crate::inventory::relocate::{self, Relocation, Removal};
use crate::inventory::stacking::{self, Adjustment};
use crate::inventory::templates::TemplateResolver;
use crate::persistence::loader::load_aggregate;
use crate::persistence::store::{ItemQuery, Store, Transaction};
use crate::world::movement::Movement;
use crate::world::portal::PortalService;
use crate::world::position::TemporalPosition;
use crate::world::temporal::TemporalRegistry;
use std::sync::Arc;

/// Read-only view of everything known about one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSnapshot {
    pub aggregate: InventoryAggregate,
    pub board: EquipmentBoard,
    pub position: TemporalPosition,
}

/// Collaborators the service is built from.
pub struct ServiceParts {
    pub tenant: TenantId,
    pub store: Arc<dyn Store>,
    pub resolver: Arc<dyn TemplateResolver>,
    pub portals: Arc<dyn PortalService>,
    pub emitter: Arc<dyn EventEmitter>,
    pub capacities: Capacities,
}

/// Entry point for every inventory command of one tenant.
///
/// Mutations take the (character, category) lock, run inside a single store
/// transaction and publish their events only after commit. Reads take no lock.
pub struct InventoryService {
    tenant: TenantId,
    store: Arc<dyn Store>,
    resolver: Arc<dyn TemplateResolver>,
    portals: Arc<dyn PortalService>,
    emitter: Arc<dyn EventEmitter>,
    capacities: Capacities,
    locks: Arc<LockRegistry>,
    positions: Arc<TemporalRegistry>,
}

impl InventoryService {
    pub fn new(parts: ServiceParts) -> Self {
        Self::with_registries(
            parts,
            Arc::new(LockRegistry::new()),
            Arc::new(TemporalRegistry::new()),
        )
    }

    pub fn with_registries(
        parts: ServiceParts,
        locks: Arc<LockRegistry>,
        positions: Arc<TemporalRegistry>,
    ) -> Self {
        Self {
            tenant: parts.tenant,
            store: parts.store,
            resolver: parts.resolver,
            portals: parts.portals,
            emitter: parts.emitter,
            capacities: parts.capacities,
            locks,
            positions,
        }
    }

    pub fn key(&self, character: CharacterId) -> CharacterKey {
        CharacterKey::new(self.tenant.clone(), character)
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    pub fn positions(&self) -> &TemporalRegistry {
        &self.positions
    }

    fn mutate<T>(
        &self,
        key: &CharacterKey,
        category: Category,
        apply: impl FnOnce(&mut dyn Transaction) -> InventoryResult<T>,
    ) -> InventoryResult<T> {
        self.locks.with_lock(key, category, || -> InventoryResult<T> {
            let mut tx = self.store.begin(key)?;
            let value = apply(tx.as_mut())?;
            tx.commit()?;
            Ok(value)
        })
    }

    pub fn create_item(
        &self,
        character: CharacterId,
        category: Category,
        template: TemplateId,
        quantity: u32,
    ) -> InventoryResult<Vec<Adjustment>> {
        let info = self.resolver.template(template);
        if info.category != Some(category) {
            return Err(InventoryError::Validation(format!(
                "template {} does not belong to the {} container",
                template, category
            )));
        }
        let key = self.key(character);
        let adjustments = self.mutate(&key, category, |tx| {
            stacking::distribute(tx, category, template, quantity, info.slot_max)
        })?;
        tracing::info!(
            character = %key,
            %category,
            %template,
            quantity,
            adjustments = adjustments.len(),
            "item created"
        );
        self.warn_if_over_capacity(&key, category);

        let events: Vec<InventoryEvent> = adjustments
            .iter()
            .map(|adjustment| match *adjustment {
                Adjustment::Create {
                    item,
                    slot,
                    quantity,
                } => InventoryEvent::ItemGained {
                    character: key.clone(),
                    category,
                    item,
                    template,
                    slot,
                    quantity,
                },
                Adjustment::Update {
                    item,
                    slot,
                    changed,
                    total,
                } => InventoryEvent::ItemUpdated {
                    character: key.clone(),
                    category,
                    item,
                    template,
                    slot,
                    changed,
                    total,
                },
            })
            .collect();
        publish_all(self.emitter.as_ref(), &events);
        Ok(adjustments)
    }

    fn warn_if_over_capacity(&self, key: &CharacterKey, category: Category) {
        let capacity = match self.store.capacity(key, category) {
            Ok(Some(capacity)) => capacity,
            Ok(None) => self.capacities.get(category),
            Err(err) => {
                tracing::debug!(character = %key, error = %err, "capacity lookup failed");
                return;
            }
        };
        if let Ok(items) = self.store.items(key, category) {
            let container = Container::new(category, capacity, items);
            if container.is_over_capacity() {
                tracing::warn!(
                    character = %key,
                    %category,
                    occupied = container.occupied(),
                    capacity,
                    "container over capacity"
                );
            }
        }
    }

    /// `proposed` is advisory; the destination comes from the template.
    pub fn equip(
        &self,
        character: CharacterId,
        source: Slot,
        proposed: Option<Slot>,
    ) -> InventoryResult<Option<EquipOutcome>> {
        let key = self.key(character);
        let outcome = self.mutate(&key, Category::Equip, |tx| {
            equip::equip(tx, self.resolver.as_ref(), source)
        })?;
        let Some(outcome) = outcome else {
            tracing::debug!(character = %key, %source, "item already at destination");
            return Ok(None);
        };
        if let Some(proposed) = proposed.filter(|proposed| *proposed != outcome.to) {
            tracing::debug!(
                character = %key,
                %proposed,
                resolved = %outcome.to,
                "proposed equip destination ignored"
            );
        }
        tracing::info!(
            character = %key,
            from = %outcome.from,
            to = %outcome.to,
            displaced = outcome.unequipped.len(),
            "item equipped"
        );

        let mut events = Vec::with_capacity(1 + outcome.unequipped.len());
        events.push(InventoryEvent::Equipped {
            character: key.clone(),
            item: outcome.item.id,
            template: outcome.item.template,
            from: outcome.from,
            to: outcome.to,
        });
        events.extend(
            outcome
                .unequipped
                .iter()
                .map(|displacement| unequipped_event(&key, displacement)),
        );
        publish_all(self.emitter.as_ref(), &events);
        Ok(Some(outcome))
    }

    pub fn unequip(&self, character: CharacterId, source: Slot) -> InventoryResult<Displacement> {
        let key = self.key(character);
        let displacement = self.mutate(&key, Category::Equip, |tx| equip::unequip(tx, source))?;
        tracing::info!(
            character = %key,
            from = %displacement.from,
            to = %displacement.to,
            "item unequipped"
        );
        publish_all(self.emitter.as_ref(), &[unequipped_event(&key, &displacement)]);
        Ok(displacement)
    }

    pub fn move_item(
        &self,
        character: CharacterId,
        category: Category,
        from: Slot,
        to: Slot,
    ) -> InventoryResult<Vec<Relocation>> {
        let key = self.key(character);
        let relocations = self.mutate(&key, category, |tx| {
            relocate::move_item(tx, category, from, to)
        })?;
        tracing::info!(character = %key, %category, %from, %to, "item moved");
        let events: Vec<InventoryEvent> = relocations
            .iter()
            .map(|relocation| InventoryEvent::ItemMoved {
                character: key.clone(),
                category,
                item: relocation.item.id,
                template: relocation.item.template,
                from: relocation.from,
                to: relocation.to,
            })
            .collect();
        publish_all(self.emitter.as_ref(), &events);
        Ok(relocations)
    }

    pub fn remove_item(
        &self,
        character: CharacterId,
        category: Category,
        slot: Slot,
        quantity: u32,
    ) -> InventoryResult<Removal> {
        let key = self.key(character);
        let removal = self.mutate(&key, category, |tx| {
            relocate::remove_item(tx, category, slot, quantity)
        })?;
        tracing::info!(
            character = %key,
            %category,
            %slot,
            removed = removal.removed,
            "item removed"
        );
        publish_all(
            self.emitter.as_ref(),
            &[InventoryEvent::ItemRemoved {
                character: key.clone(),
                category,
                item: removal.item.id,
                template: removal.item.template,
                slot,
                removed: removal.removed,
                remaining: removal.remaining,
            }],
        );
        Ok(removal)
    }

    /// Folds a movement path into the registry entry of the character.
    pub fn apply_movement(&self, character: CharacterId, movement: &Movement) -> TemporalPosition {
        let key = self.key(character);
        let last = self.positions.get(&key);
        let summary = movement.summarize(last.stance);
        self.positions.update(&key, summary);
        tracing::trace!(
            character = %key,
            x = summary.x,
            y = summary.y,
            stance = summary.stance,
            "movement folded"
        );
        summary
    }

    /// Authoritative placement at a portal; bypasses movement folding.
    pub fn change_map(
        &self,
        character: CharacterId,
        map: u32,
        portal: u32,
    ) -> InventoryResult<TemporalPosition> {
        let key = self.key(character);
        let (x, y) = self
            .portals
            .resolve(map, portal)
            .ok_or(InventoryError::PortalNotFound { map, portal })?;
        let placed = self.positions.place(&key, x, y);
        tracing::info!(character = %key, map, portal, x, y, "map changed");
        publish_all(
            self.emitter.as_ref(),
            &[InventoryEvent::MapChanged {
                character: key,
                map,
                portal,
                x,
                y,
            }],
        );
        Ok(placed)
    }

    /// Deletes every item of the character, then forgets its lock handles and
    /// temporal entry. Returns the number of rows removed.
    pub fn delete_character_state(&self, character: CharacterId) -> InventoryResult<usize> {
        let key = self.key(character);
        let removed = self.locks.with_all_locks(&key, || -> InventoryResult<usize> {
            let mut tx = self.store.begin(&key)?;
            let mut removed = 0;
            for category in CATEGORIES {
                removed += tx.delete_items(category, ItemQuery::All)?;
            }
            tx.commit()?;
            Ok(removed)
        })?;
        self.locks.release_all(&key);
        self.positions.remove(&key);
        tracing::info!(character = %key, removed, "character state deleted");
        Ok(removed)
    }

    pub fn aggregate(&self, character: CharacterId) -> InventoryResult<InventoryAggregate> {
        Ok(load_aggregate(self.store.as_ref(), &self.key(character), &self.capacities)?)
    }

    pub fn snapshot(&self, character: CharacterId) -> InventoryResult<CharacterSnapshot> {
        let aggregate = self.aggregate(character)?;
        let board = EquipmentBoard::from_items(aggregate.container(Category::Equip).equipped());
        Ok(CharacterSnapshot {
            board,
            position: self.positions.get(&self.key(character)),
            aggregate,
        })
    }
}

fn unequipped_event(key: &CharacterKey, displacement: &Displacement) -> InventoryEvent {
    InventoryEvent::Unequipped {
        character: key.clone(),
        item: displacement.item.id,
        template: displacement.item.template,
        from: displacement.from,
        to: displacement.to,
    }
}
