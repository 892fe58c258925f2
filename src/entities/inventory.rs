use crate::entities::item::{SlottedItem, TemplateId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Equip,
    Use,
    Setup,
    Etc,
    Cash,
}

impl Category {
    const COUNT: usize = 5;

    pub fn index(self) -> usize {
        match self {
            Category::Equip => 0,
            Category::Use => 1,
            Category::Setup => 2,
            Category::Etc => 3,
            Category::Cash => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Category::Equip),
            1 => Some(Category::Use),
            2 => Some(Category::Setup),
            3 => Some(Category::Etc),
            4 => Some(Category::Cash),
            _ => None,
        }
    }

    /// Category encoded by the leading digit of a template id.
    pub fn from_leading_digit(digit: u32) -> Option<Self> {
        match digit {
            1 => Some(Category::Equip),
            2 => Some(Category::Use),
            3 => Some(Category::Setup),
            4 => Some(Category::Etc),
            5 => Some(Category::Cash),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "equip" => Some(Category::Equip),
            "use" => Some(Category::Use),
            "setup" => Some(Category::Setup),
            "etc" => Some(Category::Etc),
            "cash" => Some(Category::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Equip => "equip",
            Category::Use => "use",
            Category::Setup => "setup",
            Category::Etc => "etc",
            Category::Cash => "cash",
        };
        f.write_str(name)
    }
}

/// Fixed lock acquisition order; also the order containers are loaded in.
pub const CATEGORIES: [Category; Category::COUNT] = [
    Category::Equip,
    Category::Use,
    Category::Setup,
    Category::Etc,
    Category::Cash,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub category: Category,
    pub capacity: u32,
    items: Vec<SlottedItem>,
}

impl Container {
    pub fn new(category: Category, capacity: u32, mut items: Vec<SlottedItem>) -> Self {
        items.sort_by_key(|item| item.slot.raw());
        Self {
            category,
            capacity,
            items,
        }
    }

    /// Items ascending by raw slot.
    pub fn items(&self) -> &[SlottedItem] {
        &self.items
    }

    pub fn equipped(&self) -> impl Iterator<Item = &SlottedItem> + '_ {
        self.items.iter().filter(|item| item.slot.is_equipped())
    }

    /// Items that occupy inventory space; the only ones counted against capacity.
    pub fn occupied(&self) -> usize {
        self.items.iter().filter(|item| item.slot.is_inventory()).count()
    }

    pub fn is_over_capacity(&self) -> bool {
        self.occupied() as u64 > u64::from(self.capacity)
    }

    pub fn count_template(&self, template: TemplateId) -> u64 {
        self.items
            .iter()
            .filter(|item| item.template == template)
            .fold(0u64, |acc, item| acc + u64::from(item.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryAggregate {
    containers: Vec<Container>,
}

impl InventoryAggregate {
    /// Containers must be given in `CATEGORIES` order.
    pub fn new(containers: Vec<Container>) -> Result<Self, String> {
        if containers.len() != Category::COUNT {
            return Err(format!(
                "inventory aggregate expects {} containers, got {}",
                Category::COUNT,
                containers.len()
            ));
        }
        for (index, container) in containers.iter().enumerate() {
            if Category::from_index(index) != Some(container.category) {
                return Err(format!(
                    "container {} out of order at index {}",
                    container.category, index
                ));
            }
        }
        Ok(Self { containers })
    }

    pub fn container(&self, category: Category) -> &Container {
        &self.containers[category.index()]
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn item_count(&self) -> usize {
        self.containers.iter().map(|container| container.items().len()).sum()
    }
}
