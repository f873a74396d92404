use crate::creature::Creature;

/// Item type identifier as used by the item database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemTypeId(pub u16);

pub trait ItemOracle: Send + Sync {
    fn definition(&self, item_type: ItemTypeId) -> Option<ItemDefinition>;

    /// Instantiates an item of `item_type`, with an empty container when the
    /// definition says it holds items.
    fn create_item(&self, item_type: ItemTypeId) -> Option<Item> {
        let definition = self.definition(item_type)?;
        Some(Item {
            item_type,
            contents: definition.container_capacity.map(Container::with_capacity),
        })
    }
}

/// Loot-drop policy consulted when a corpse container is created.
pub trait LootOracle: Send + Sync {
    fn drop_loot(&self, victim: &Creature, corpse: &mut Container);
}

/// Item definition as far as the creature layer cares.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub item_type: ItemTypeId,
    pub name: String,
    /// `Some(slots)` if the item is a container.
    pub container_capacity: Option<u16>,
}

impl ItemDefinition {
    pub fn new(item_type: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            item_type,
            name: name.into(),
            container_capacity: None,
        }
    }

    pub fn container(mut self, capacity: u16) -> Self {
        self.container_capacity = Some(capacity);
        self
    }
}

/// Item instance handed to the world.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub item_type: ItemTypeId,
    pub contents: Option<Container>,
}

impl Item {
    pub fn simple(item_type: ItemTypeId) -> Self {
        Self {
            item_type,
            contents: None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut Container> {
        self.contents.as_mut()
    }
}

/// Fixed-capacity item container.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Container {
    capacity: u16,
    items: Vec<Item>,
}

impl Container {
    pub fn with_capacity(capacity: u16) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Adds an item; returns it back if the container is full.
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if self.items.len() >= usize::from(self.capacity) {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
