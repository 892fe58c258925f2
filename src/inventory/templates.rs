use crate::config::TemplateOverride;
use crate::entities::equipment::{EquipPosition, Variant};
use crate::entities::inventory::Category;
use crate::entities::item::{Slot, TemplateId};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

/// What the engine needs to know about a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub id: TemplateId,
    pub category: Option<Category>,
    /// Candidate destinations, best first. Empty for non-equipment.
    pub positions: Vec<Slot>,
    pub slot_max: u32,
}

pub trait TemplateResolver: Send + Sync {
    fn template(&self, template: TemplateId) -> Arc<TemplateInfo>;

    fn resolve_positions(&self, template: TemplateId) -> Vec<Slot> {
        self.template(template).positions.clone()
    }

    fn resolve_category(&self, template: TemplateId) -> Option<Category> {
        self.template(template).category
    }

    fn slot_max(&self, template: TemplateId) -> u32 {
        self.template(template).slot_max
    }
}

/// Equip positions implied by the id bucket alone.
pub fn bucket_positions(template: TemplateId) -> Vec<EquipPosition> {
    match template.bucket() {
        100 => vec![EquipPosition::Hat],
        101 => vec![EquipPosition::Forehead],
        102 => vec![EquipPosition::Eye],
        103 => vec![EquipPosition::Earring],
        104 | 105 => vec![EquipPosition::Top],
        106 => vec![EquipPosition::Bottom],
        107 => vec![EquipPosition::Shoes],
        108 => vec![EquipPosition::Gloves],
        109 => vec![EquipPosition::Shield],
        110 => vec![EquipPosition::Cape],
        111 => vec![
            EquipPosition::Ring1,
            EquipPosition::Ring2,
            EquipPosition::Ring3,
            EquipPosition::Ring4,
        ],
        112 => vec![EquipPosition::Pendant],
        113 => vec![EquipPosition::Belt],
        114 => vec![EquipPosition::Medal],
        115 => vec![EquipPosition::Shoulder],
        130..=170 => vec![EquipPosition::Weapon],
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CatalogEntry {
    slot_max: Option<u32>,
    variant: Variant,
    positions: Vec<EquipPosition>,
}

/// Bucket rules plus per-template overrides from configuration.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    stack_max: u32,
    entries: HashMap<TemplateId, CatalogEntry>,
}

impl TemplateCatalog {
    pub fn new(stack_max: u32, overrides: &[TemplateOverride]) -> Result<Self, String> {
        let mut entries = HashMap::new();
        for entry in overrides {
            let mut positions = Vec::with_capacity(entry.positions.len());
            for name in &entry.positions {
                let position = EquipPosition::from_name(name).ok_or_else(|| {
                    format!("template {} names unknown position '{}'", entry.id, name)
                })?;
                positions.push(position);
            }
            let variant = if entry.cash { Variant::Cash } else { Variant::Normal };
            let previous = entries.insert(
                TemplateId(entry.id),
                CatalogEntry {
                    slot_max: entry.slot_max,
                    variant,
                    positions,
                },
            );
            if previous.is_some() {
                return Err(format!("template {} listed twice", entry.id));
            }
        }
        Ok(Self {
            stack_max: stack_max.max(1),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TemplateResolver for TemplateCatalog {
    fn template(&self, template: TemplateId) -> Arc<TemplateInfo> {
        let category = Category::from_leading_digit(template.leading_digit());
        let entry = self.entries.get(&template);
        let variant = entry.map_or(Variant::Normal, |entry| entry.variant);
        let positions = match entry {
            Some(entry) if !entry.positions.is_empty() => entry.positions.clone(),
            _ if category == Some(Category::Equip) => bucket_positions(template),
            _ => Vec::new(),
        };
        let slot_max = if category == Some(Category::Equip) {
            1
        } else {
            entry
                .and_then(|entry| entry.slot_max)
                .unwrap_or(self.stack_max)
                .max(1)
        };
        Arc::new(TemplateInfo {
            id: template,
            category,
            positions: positions
                .into_iter()
                .map(|position| Slot::equipped(position, variant))
                .collect(),
            slot_max,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct CacheState {
    entries: LruCache<TemplateId, Arc<TemplateInfo>>,
    stats: CacheStats,
}

/// LRU front for a slower resolver.
pub struct CachingResolver<R> {
    inner: R,
    state: Mutex<CacheState>,
}

impl<R: TemplateResolver> CachingResolver<R> {
    pub fn new(inner: R, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stats
    }
}

impl<R: TemplateResolver> TemplateResolver for CachingResolver<R> {
    fn template(&self, template: TemplateId) -> Arc<TemplateInfo> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(info) = state.entries.get(&template).cloned() {
                state.stats.hits += 1;
                return info;
            }
            state.stats.misses += 1;
        }
        let info = self.inner.template(template);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.put(template, Arc::clone(&info));
        info
    }
}
