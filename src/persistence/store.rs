use crate::entities::character::CharacterKey;
use crate::entities::inventory::Category;
use crate::entities::item::{ItemId, Slot, SlottedItem, TemplateId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slot {slot} already taken in {category} container")]
    SlotTaken { category: Category, slot: Slot },
    #[error("slot {slot} cannot be stored in {category} container")]
    InvalidSlot { category: Category, slot: Slot },
    #[error("item {0:?} not found")]
    UnknownItem(ItemId),
    #[error("row {id:?} holds undecodable slot {raw}")]
    CorruptSlot { id: ItemId, raw: i16 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row predicate for queries and deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemQuery {
    All,
    Template(TemplateId),
    Slot(Slot),
}

impl ItemQuery {
    pub fn matches(&self, item: &SlottedItem) -> bool {
        match self {
            ItemQuery::All => true,
            ItemQuery::Template(template) => item.template == *template,
            ItemQuery::Slot(slot) => item.slot == *slot,
        }
    }
}

/// One logical unit of work scoped to a single character. Dropping a
/// transaction without calling `commit` discards every write made through it.
pub trait Transaction {
    /// Matching rows ascending by raw slot.
    fn items(
        &mut self,
        category: Category,
        query: ItemQuery,
    ) -> Result<Vec<SlottedItem>, StoreError>;

    fn create_item(
        &mut self,
        category: Category,
        template: TemplateId,
        slot: Slot,
        quantity: u32,
    ) -> Result<SlottedItem, StoreError>;

    fn update_slot(&mut self, category: Category, id: ItemId, slot: Slot) -> Result<(), StoreError>;

    fn update_quantity(
        &mut self,
        category: Category,
        id: ItemId,
        quantity: u32,
    ) -> Result<(), StoreError>;

    fn delete_items(&mut self, category: Category, query: ItemQuery) -> Result<usize, StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

pub trait Store: Send + Sync {
    fn begin<'a>(&'a self, key: &CharacterKey) -> Result<Box<dyn Transaction + 'a>, StoreError>;

    /// Committed rows ascending by raw slot, outside of any transaction.
    fn items(&self, key: &CharacterKey, category: Category) -> Result<Vec<SlottedItem>, StoreError>;

    /// Stored capacity override, if the character has one.
    fn capacity(&self, key: &CharacterKey, category: Category) -> Result<Option<u32>, StoreError>;

    fn set_capacity(
        &self,
        key: &CharacterKey,
        category: Category,
        capacity: u32,
    ) -> Result<(), StoreError>;
}

/// Row as the slot column stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StoredRow {
    id: ItemId,
    template: TemplateId,
    slot: i16,
    quantity: u32,
}

impl StoredRow {
    fn decode(&self) -> Result<SlottedItem, StoreError> {
        let slot = Slot::from_raw(self.slot).ok_or(StoreError::CorruptSlot {
            id: self.id,
            raw: self.slot,
        })?;
        Ok(SlottedItem {
            id: self.id,
            template: self.template,
            slot,
            quantity: self.quantity,
        })
    }
}

type TableKey = (CharacterKey, Category);

/// In-process store with per-transaction working copies.
///
/// A transaction copies each category table on first touch and writes the
/// copies back on commit. Callers serialize writers of one (character,
/// category) table through the lock registry.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<HashMap<TableKey, Vec<StoredRow>>>,
    capacities: Mutex<HashMap<TableKey, u32>>,
    next_id: AtomicU32,
    write_budget: Mutex<Option<usize>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            capacities: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            write_budget: Mutex::new(None),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, HashMap<TableKey, Vec<StoredRow>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every write after the next `writes` successful ones fail with
    /// `Unavailable`, to exercise rollback paths.
    pub fn fail_writes_after(&self, writes: usize) {
        *self.write_budget.lock().unwrap_or_else(PoisonError::into_inner) = Some(writes);
    }

    fn charge_write(&self) -> Result<(), StoreError> {
        let mut budget = self.write_budget.lock().unwrap_or_else(PoisonError::into_inner);
        match *budget {
            Some(0) => Err(StoreError::Unavailable("injected write failure".to_string())),
            Some(ref mut remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn load_rows(&self, key: &CharacterKey, category: Category) -> Vec<StoredRow> {
        self.tables()
            .get(&(key.clone(), category))
            .cloned()
            .unwrap_or_default()
    }
}

fn decode_sorted<'a>(
    rows: impl Iterator<Item = &'a StoredRow>,
    query: ItemQuery,
) -> Result<Vec<SlottedItem>, StoreError> {
    let mut items = Vec::new();
    for row in rows {
        let item = row.decode()?;
        if query.matches(&item) {
            items.push(item);
        }
    }
    items.sort_by_key(|item| item.slot.raw());
    Ok(items)
}

impl Store for MemoryStore {
    fn begin<'a>(&'a self, key: &CharacterKey) -> Result<Box<dyn Transaction + 'a>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            key: key.clone(),
            working: HashMap::new(),
        }))
    }

    fn items(
        &self,
        key: &CharacterKey,
        category: Category,
    ) -> Result<Vec<SlottedItem>, StoreError> {
        let rows = self.load_rows(key, category);
        decode_sorted(rows.iter(), ItemQuery::All)
    }

    fn capacity(&self, key: &CharacterKey, category: Category) -> Result<Option<u32>, StoreError> {
        let capacities = self.capacities.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(capacities.get(&(key.clone(), category)).copied())
    }

    fn set_capacity(
        &self,
        key: &CharacterKey,
        category: Category,
        capacity: u32,
    ) -> Result<(), StoreError> {
        let mut capacities = self.capacities.lock().unwrap_or_else(PoisonError::into_inner);
        capacities.insert((key.clone(), category), capacity);
        Ok(())
    }
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    key: CharacterKey,
    working: HashMap<Category, Vec<StoredRow>>,
}

impl MemoryTransaction<'_> {
    fn table(&mut self, category: Category) -> &mut Vec<StoredRow> {
        let store = self.store;
        let key = &self.key;
        self.working
            .entry(category)
            .or_insert_with(|| store.load_rows(key, category))
    }

    fn ensure_free(
        &mut self,
        category: Category,
        id: Option<ItemId>,
        slot: Slot,
    ) -> Result<(), StoreError> {
        if !slot.is_storable() {
            return Err(StoreError::InvalidSlot { category, slot });
        }
        let raw = slot.raw();
        let taken = self
            .table(category)
            .iter()
            .any(|row| row.slot == raw && Some(row.id) != id);
        if taken {
            return Err(StoreError::SlotTaken { category, slot });
        }
        Ok(())
    }

    fn row_mut(&mut self, category: Category, id: ItemId) -> Result<&mut StoredRow, StoreError> {
        self.table(category)
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(StoreError::UnknownItem(id))
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn items(
        &mut self,
        category: Category,
        query: ItemQuery,
    ) -> Result<Vec<SlottedItem>, StoreError> {
        let rows = self.table(category);
        decode_sorted(rows.iter(), query)
    }

    fn create_item(
        &mut self,
        category: Category,
        template: TemplateId,
        slot: Slot,
        quantity: u32,
    ) -> Result<SlottedItem, StoreError> {
        self.store.charge_write()?;
        self.ensure_free(category, None, slot)?;
        let id = ItemId(self.store.next_id.fetch_add(1, Ordering::Relaxed));
        self.table(category).push(StoredRow {
            id,
            template,
            slot: slot.raw(),
            quantity,
        });
        Ok(SlottedItem {
            id,
            template,
            slot,
            quantity,
        })
    }

    fn update_slot(
        &mut self,
        category: Category,
        id: ItemId,
        slot: Slot,
    ) -> Result<(), StoreError> {
        self.store.charge_write()?;
        self.ensure_free(category, Some(id), slot)?;
        self.row_mut(category, id)?.slot = slot.raw();
        Ok(())
    }

    fn update_quantity(
        &mut self,
        category: Category,
        id: ItemId,
        quantity: u32,
    ) -> Result<(), StoreError> {
        self.store.charge_write()?;
        self.row_mut(category, id)?.quantity = quantity;
        Ok(())
    }

    fn delete_items(&mut self, category: Category, query: ItemQuery) -> Result<usize, StoreError> {
        self.store.charge_write()?;
        let table = self.table(category);
        let mut kept = Vec::with_capacity(table.len());
        for row in table.iter() {
            if !query.matches(&row.decode()?) {
                kept.push(*row);
            }
        }
        let removed = table.len() - kept.len();
        *table = kept;
        Ok(removed)
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction {
            store,
            key,
            working,
        } = *self;
        let mut tables = store.tables();
        for (category, rows) in working {
            if rows.is_empty() {
                tables.remove(&(key.clone(), category));
            } else {
                tables.insert((key.clone(), category), rows);
            }
        }
        Ok(())
    }
}
