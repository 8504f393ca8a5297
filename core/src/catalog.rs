//! Immutable definitions of the item kinds that can appear on the belt.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ItemKindId;

const DEFAULT_SCORE_INCREASE: u32 = 100;
const DEFAULT_HEALTH_DECREASE: u32 = 1;

/// Pool an item kind is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemPool {
    /// Lost items that destinations may ask for.
    Searchable,
    /// Junk that should be shredded.
    Trash,
}

/// Authoring-time description of an item kind, as read from configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemDefinition {
    /// Human readable, catalog-unique name.
    pub name: String,
    /// Asset reference used by presentation layers.
    #[serde(default)]
    pub sprite: String,
    /// Score awarded when the item is delivered.
    #[serde(default = "default_score_increase")]
    pub score_increase: u32,
    /// Health lost when a wanted item of this kind is shredded.
    #[serde(default = "default_health_decrease")]
    pub health_decrease: u32,
}

impl ItemDefinition {
    /// Creates a definition with the default score and health metadata.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprite: String::new(),
            score_increase: DEFAULT_SCORE_INCREASE,
            health_decrease: DEFAULT_HEALTH_DECREASE,
        }
    }

    /// Overrides the score awarded on delivery.
    #[must_use]
    pub fn with_score_increase(mut self, score_increase: u32) -> Self {
        self.score_increase = score_increase;
        self
    }

    /// Overrides the health lost when the item is shredded while wanted.
    #[must_use]
    pub fn with_health_decrease(mut self, health_decrease: u32) -> Self {
        self.health_decrease = health_decrease;
        self
    }
}

fn default_score_increase() -> u32 {
    DEFAULT_SCORE_INCREASE
}

fn default_health_decrease() -> u32 {
    DEFAULT_HEALTH_DECREASE
}

/// Loaded item kind with its assigned identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemKind {
    id: ItemKindId,
    name: String,
    sprite: String,
    score_increase: u32,
    health_decrease: u32,
    pool: ItemPool,
}

impl ItemKind {
    /// Identifier assigned by the catalog.
    #[must_use]
    pub const fn id(&self) -> ItemKindId {
        self.id
    }

    /// Catalog-unique name of the kind.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asset reference used by presentation layers.
    #[must_use]
    pub fn sprite(&self) -> &str {
        &self.sprite
    }

    /// Score awarded when the item is delivered.
    #[must_use]
    pub const fn score_increase(&self) -> u32 {
        self.score_increase
    }

    /// Health lost when a wanted item of this kind is shredded.
    #[must_use]
    pub const fn health_decrease(&self) -> u32 {
        self.health_decrease
    }

    /// Pool the kind belongs to.
    #[must_use]
    pub const fn pool(&self) -> ItemPool {
        self.pool
    }
}

/// Configuration errors detected while loading a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// One of the two pools contained no item kinds.
    #[error("the {0:?} pool must contain at least one item kind")]
    EmptyPool(ItemPool),
    /// Two definitions shared the same name.
    #[error("item kind `{0}` is defined more than once")]
    DuplicateName(String),
}

/// Ordered, immutable set of item kinds split into searchable and trash pools.
///
/// Identifiers are assigned in definition order, searchable kinds first. Both
/// pools are guaranteed to be non-empty.
#[derive(Clone, Debug)]
pub struct Catalog {
    kinds: Vec<ItemKind>,
    searchable: Vec<ItemKindId>,
    trash: Vec<ItemKindId>,
}

impl Catalog {
    /// Builds a catalog from the searchable and trash definitions.
    pub fn new(
        searchable: Vec<ItemDefinition>,
        trash: Vec<ItemDefinition>,
    ) -> Result<Self, CatalogError> {
        if searchable.is_empty() {
            return Err(CatalogError::EmptyPool(ItemPool::Searchable));
        }
        if trash.is_empty() {
            return Err(CatalogError::EmptyPool(ItemPool::Trash));
        }

        let mut names = HashSet::new();
        let mut kinds = Vec::with_capacity(searchable.len() + trash.len());
        let tagged = searchable
            .into_iter()
            .map(|definition| (definition, ItemPool::Searchable))
            .chain(trash.into_iter().map(|definition| (definition, ItemPool::Trash)));

        for (index, (definition, pool)) in tagged.enumerate() {
            if !names.insert(definition.name.clone()) {
                return Err(CatalogError::DuplicateName(definition.name));
            }
            let id = ItemKindId::new(u32::try_from(index).unwrap_or(u32::MAX));
            kinds.push(ItemKind {
                id,
                name: definition.name,
                sprite: definition.sprite,
                score_increase: definition.score_increase,
                health_decrease: definition.health_decrease,
                pool,
            });
        }

        let searchable = pool_members(&kinds, ItemPool::Searchable);
        let trash = pool_members(&kinds, ItemPool::Trash);

        Ok(Self {
            kinds,
            searchable,
            trash,
        })
    }

    /// Identifiers of the searchable kinds in definition order.
    #[must_use]
    pub fn searchable(&self) -> &[ItemKindId] {
        &self.searchable
    }

    /// Identifiers of the trash kinds in definition order.
    #[must_use]
    pub fn trash(&self) -> &[ItemKindId] {
        &self.trash
    }

    /// Looks up the kind assigned to the identifier.
    #[must_use]
    pub fn kind(&self, id: ItemKindId) -> Option<&ItemKind> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.kinds.get(index))
    }

    /// Finds a kind by its catalog-unique name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ItemKind> {
        self.kinds.iter().find(|kind| kind.name == name)
    }

    /// Pool the identifier belongs to, if it is part of the catalog.
    #[must_use]
    pub fn pool_of(&self, id: ItemKindId) -> Option<ItemPool> {
        self.kind(id).map(ItemKind::pool)
    }

    /// Reports whether the identifier names a searchable kind.
    #[must_use]
    pub fn is_searchable(&self, id: ItemKindId) -> bool {
        self.pool_of(id) == Some(ItemPool::Searchable)
    }

    /// Reports whether the identifier names a trash kind.
    #[must_use]
    pub fn is_trash(&self, id: ItemKindId) -> bool {
        self.pool_of(id) == Some(ItemPool::Trash)
    }

    /// Reports whether the identifier belongs to the catalog.
    #[must_use]
    pub fn contains(&self, id: ItemKindId) -> bool {
        self.kind(id).is_some()
    }

    /// Total number of kinds across both pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false; a catalog holds at least one kind per pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterates over every kind in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemKind> {
        self.kinds.iter()
    }
}

fn pool_members(kinds: &[ItemKind], pool: ItemPool) -> Vec<ItemKindId> {
    kinds
        .iter()
        .filter(|kind| kind.pool == pool)
        .map(ItemKind::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions(names: &[&str]) -> Vec<ItemDefinition> {
        names.iter().map(|name| ItemDefinition::named(*name)).collect()
    }

    #[test]
    fn assigns_searchable_identifiers_first() {
        let catalog = Catalog::new(definitions(&["sock", "key"]), definitions(&["can"]))
            .expect("catalog is valid");

        assert_eq!(catalog.searchable(), &[ItemKindId::new(0), ItemKindId::new(1)]);
        assert_eq!(catalog.trash(), &[ItemKindId::new(2)]);
        assert!(catalog.is_searchable(ItemKindId::new(1)));
        assert!(catalog.is_trash(ItemKindId::new(2)));
        assert!(!catalog.contains(ItemKindId::new(3)));
        assert_eq!(
            catalog.find_by_name("can").map(ItemKind::id),
            Some(ItemKindId::new(2))
        );
    }

    #[test]
    fn rejects_empty_pools() {
        assert_eq!(
            Catalog::new(Vec::new(), definitions(&["can"])).unwrap_err(),
            CatalogError::EmptyPool(ItemPool::Searchable)
        );
        assert_eq!(
            Catalog::new(definitions(&["sock"]), Vec::new()).unwrap_err(),
            CatalogError::EmptyPool(ItemPool::Trash)
        );
    }

    #[test]
    fn rejects_names_shared_across_pools() {
        let error = Catalog::new(definitions(&["sock"]), definitions(&["sock"])).unwrap_err();
        assert_eq!(error, CatalogError::DuplicateName("sock".to_owned()));
    }

    #[test]
    fn keeps_item_metadata() {
        let sock = ItemDefinition::named("sock")
            .with_score_increase(10)
            .with_health_decrease(2);
        let catalog = Catalog::new(vec![sock], definitions(&["can"])).expect("catalog is valid");

        let kind = catalog.kind(ItemKindId::new(0)).expect("sock exists");
        assert_eq!(kind.score_increase(), 10);
        assert_eq!(kind.health_decrease(), 2);
        assert_eq!(kind.pool(), ItemPool::Searchable);
    }

    #[test]
    fn definitions_fill_defaults_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            item: ItemDefinition,
        }

        let wrapper: Wrapper = toml::from_str("[item]\nname = \"umbrella\"\n").expect("parses");
        assert_eq!(wrapper.item, ItemDefinition::named("umbrella"));
    }
}
