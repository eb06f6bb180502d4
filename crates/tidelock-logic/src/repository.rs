//! Entity registry with reachability tracking.
//!
//! The [`EntityRepository`] owns every randomizable entity for a run and
//! answers the queries the rest of the engine needs: which entities are
//! "in logic" (reachable), which match a category filter under a depth
//! ceiling, and which remain usable as bounded-use ingredients.
//!
//! All mutation is monotonic: the in-logic flag is set at most once per
//! entity, use counters only ever decrement, and nothing is removed. That
//! keeps the single-threaded batch model trivially consistent.
//!
//! Unlock notification is an explicit queue drained once per pass
//! ([`EntityRepository::drain_unlocked`]) rather than a live callback, so
//! the recipe assembler learns about newly legal ingredients at a
//! deterministic point in the run.

use std::collections::{BTreeMap, BTreeSet};

use tidelock_types::{Entity, ItemCategory, ItemId};
use tracing::{debug, warn};

/// Registry of all randomizable entities with reachability bookkeeping.
#[derive(Debug, Clone)]
pub struct EntityRepository {
    /// All entities indexed by their identifier.
    entities: BTreeMap<ItemId, Entity>,
    /// Entities marked reachable, in monotonic insertion order.
    in_logic: BTreeSet<ItemId>,
    /// Unlock events not yet consumed by the assembler.
    unlock_queue: Vec<ItemId>,
    /// Remaining uses for bounded-use entities (absent = unbounded).
    remaining_uses: BTreeMap<ItemId, u32>,
    /// For each ingredient, the recipes that already consumed it.
    used_in_recipes: BTreeMap<ItemId, Vec<ItemId>>,
}

impl EntityRepository {
    /// Build a repository from a parsed entity list.
    ///
    /// Duplicate IDs keep the first occurrence; later duplicates are
    /// dropped with a warning (the data audit upstream treats them as a
    /// recoverable data error).
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut map: BTreeMap<ItemId, Entity> = BTreeMap::new();
        let mut remaining_uses = BTreeMap::new();
        for entity in entities {
            if map.contains_key(&entity.id) {
                warn!(id = %entity.id, "duplicate entity id dropped");
                continue;
            }
            if entity.max_uses_per_game > 0 {
                remaining_uses.insert(entity.id.clone(), entity.max_uses_per_game);
            }
            map.insert(entity.id.clone(), entity);
        }
        Self {
            entities: map,
            in_logic: BTreeSet::new(),
            unlock_queue: Vec::new(),
            remaining_uses,
            used_in_recipes: BTreeMap::new(),
        }
    }

    /// Number of entities in the repository.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the repository holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether an entity with the given ID exists.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.entities.contains_key(id)
    }

    /// Look up an entity by ID.
    ///
    /// Unknown IDs return `None` with a warning; config-driven queries may
    /// legitimately miss in modded data sets, so this is never fatal.
    pub fn get(&self, id: &ItemId) -> Option<&Entity> {
        let found = self.entities.get(id);
        if found.is_none() {
            warn!(id = %id, "lookup of unknown entity id");
        }
        found
    }

    /// Iterate over all entities in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    // -------------------------------------------------------------------
    // Reachability
    // -------------------------------------------------------------------

    /// Mark an entity reachable.
    ///
    /// Idempotent: returns `false` if the entity is already in logic or
    /// unknown. A successful addition enqueues an unlock event for the
    /// assembler.
    pub fn add_to_logic(&mut self, id: &ItemId) -> bool {
        if !self.entities.contains_key(id) {
            warn!(id = %id, "cannot add unknown entity to logic");
            return false;
        }
        if !self.in_logic.insert(id.clone()) {
            return false;
        }
        debug!(id = %id, "entity entered logic");
        self.unlock_queue.push(id.clone());
        true
    }

    /// Mark several entities reachable.
    ///
    /// Returns `true` iff any individual addition succeeded.
    pub fn add_all_to_logic(&mut self, ids: &[ItemId]) -> bool {
        let mut any = false;
        for id in ids {
            if self.add_to_logic(id) {
                any = true;
            }
        }
        any
    }

    /// Whether the given entity has been marked reachable.
    pub fn is_in_logic(&self, id: &ItemId) -> bool {
        self.in_logic.contains(id)
    }

    /// Number of entities currently in logic.
    pub fn in_logic_count(&self) -> usize {
        self.in_logic.len()
    }

    /// The set of reachable entity IDs.
    pub const fn in_logic(&self) -> &BTreeSet<ItemId> {
        &self.in_logic
    }

    /// Take all unlock events accumulated since the last drain.
    pub fn drain_unlocked(&mut self) -> Vec<ItemId> {
        core::mem::take(&mut self.unlock_queue)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// All entities in one of the given categories obtainable at or above
    /// the given depth ceiling.
    pub fn find_by_category(
        &self,
        categories: &[ItemCategory],
        max_depth: u32,
    ) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|entity| {
                categories.contains(&entity.category) && entity.accessible_depth <= max_depth
            })
            .collect()
    }

    /// Category query additionally filtered by prerequisite.
    ///
    /// With `invert` false, returns entities whose *sole* prerequisite is
    /// exactly `prereq`; with `invert` true, returns entities that do not
    /// require `prereq` at all.
    pub fn find_by_category_with_prerequisite(
        &self,
        categories: &[ItemCategory],
        max_depth: u32,
        prereq: &ItemId,
        invert: bool,
    ) -> Vec<&Entity> {
        self.find_by_category(categories, max_depth)
            .into_iter()
            .filter(|entity| {
                if invert {
                    !entity.prerequisites.contains(prereq)
                } else {
                    entity.prerequisites.len() == 1
                        && entity.prerequisites.first() == Some(prereq)
                }
            })
            .collect()
    }

    /// Overwrite an entity's value with the cost its assembled recipe
    /// actually sums to, so later recipes budget against real cost.
    pub fn set_effective_value(&mut self, id: &ItemId, value: u32) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.value = value;
        } else {
            warn!(id = %id, "cannot record effective value for unknown entity");
        }
    }

    // -------------------------------------------------------------------
    // Bounded-use bookkeeping
    // -------------------------------------------------------------------

    /// Remaining uses for a bounded-use entity, `None` if unbounded.
    pub fn remaining_uses(&self, id: &ItemId) -> Option<u32> {
        self.remaining_uses.get(id).copied()
    }

    /// Whether a bounded-use entity has no uses left.
    pub fn is_exhausted(&self, id: &ItemId) -> bool {
        self.remaining_uses.get(id) == Some(&0)
    }

    /// Record that `recipe` consumed `ingredient`, decrementing the
    /// bounded-use counter when one exists.
    ///
    /// Returns the remaining uses afterward, `None` for unbounded
    /// ingredients.
    pub fn record_use(&mut self, ingredient: &ItemId, recipe: &ItemId) -> Option<u32> {
        self.used_in_recipes
            .entry(ingredient.clone())
            .or_default()
            .push(recipe.clone());
        if let Some(remaining) = self.remaining_uses.get_mut(ingredient) {
            *remaining = remaining.saturating_sub(1);
            Some(*remaining)
        } else {
            None
        }
    }

    /// The recipes that have consumed the given ingredient so far.
    pub fn recipes_using(&self, ingredient: &ItemId) -> &[ItemId] {
        self.used_in_recipes
            .get(ingredient)
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entity(id: &str, category: ItemCategory, depth: u32) -> Entity {
        Entity {
            id: ItemId::from(id),
            category,
            value: 5,
            accessible_depth: depth,
            unit_size: 1,
            dependencies: Vec::new(),
            prerequisites: Vec::new(),
            max_uses_per_game: 0,
            craftable: false,
        }
    }

    fn sample_repository() -> EntityRepository {
        let mut gold = entity("gold_ore", ItemCategory::RawMaterial, 120);
        gold.max_uses_per_game = 2;
        let mut mk2 = entity("depth_module_mk2", ItemCategory::VehicleUpgrade, 0);
        mk2.prerequisites = vec![ItemId::from("depth_module_mk1")];
        let mut knife = entity("survival_knife", ItemCategory::Tool, 0);
        knife.prerequisites = vec![
            ItemId::from("iron_ingot"),
            ItemId::from("vine_cluster"),
        ];
        EntityRepository::from_entities(vec![
            entity("copper_ore", ItemCategory::RawMaterial, 10),
            gold,
            entity("depth_module_mk1", ItemCategory::VehicleUpgrade, 0),
            mk2,
            knife,
        ])
    }

    #[test]
    fn add_to_logic_is_idempotent() {
        let mut repo = sample_repository();
        let id = ItemId::from("copper_ore");
        assert!(repo.add_to_logic(&id));
        assert!(!repo.add_to_logic(&id));
        assert!(repo.is_in_logic(&id));
        assert_eq!(repo.in_logic_count(), 1);
    }

    #[test]
    fn add_to_logic_rejects_unknown_ids() {
        let mut repo = sample_repository();
        assert!(!repo.add_to_logic(&ItemId::from("kraken_scale")));
        assert_eq!(repo.in_logic_count(), 0);
    }

    #[test]
    fn add_all_reports_any_success() {
        let mut repo = sample_repository();
        let ids = vec![ItemId::from("copper_ore"), ItemId::from("gold_ore")];
        assert!(repo.add_all_to_logic(&ids));
        // Second round: everything already in logic.
        assert!(!repo.add_all_to_logic(&ids));
    }

    #[test]
    fn unlock_events_drain_once() {
        let mut repo = sample_repository();
        repo.add_to_logic(&ItemId::from("copper_ore"));
        repo.add_to_logic(&ItemId::from("gold_ore"));
        let drained = repo.drain_unlocked();
        assert_eq!(
            drained,
            vec![ItemId::from("copper_ore"), ItemId::from("gold_ore")]
        );
        assert!(repo.drain_unlocked().is_empty());
    }

    #[test]
    fn find_by_category_applies_depth_ceiling() {
        let repo = sample_repository();
        let shallow = repo.find_by_category(&[ItemCategory::RawMaterial], 50);
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow.first().unwrap().id, ItemId::from("copper_ore"));

        let deep = repo.find_by_category(&[ItemCategory::RawMaterial], 200);
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn sole_prerequisite_query() {
        let repo = sample_repository();
        let prereq = ItemId::from("depth_module_mk1");
        let upgrades = repo.find_by_category_with_prerequisite(
            &[ItemCategory::VehicleUpgrade],
            1000,
            &prereq,
            false,
        );
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades.first().unwrap().id, ItemId::from("depth_module_mk2"));
    }

    #[test]
    fn inverted_prerequisite_query_excludes_requirers() {
        let repo = sample_repository();
        let prereq = ItemId::from("iron_ingot");
        let tools = repo.find_by_category_with_prerequisite(
            &[ItemCategory::Tool, ItemCategory::VehicleUpgrade],
            1000,
            &prereq,
            true,
        );
        // The knife requires iron_ingot and must be excluded; both upgrade
        // modules do not.
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|e| e.id != ItemId::from("survival_knife")));
    }

    #[test]
    fn unknown_lookup_returns_none() {
        let repo = sample_repository();
        assert!(repo.get(&ItemId::from("leviathan_fang")).is_none());
    }

    #[test]
    fn bounded_use_counts_down_and_tracks_consumers() {
        let mut repo = sample_repository();
        let gold = ItemId::from("gold_ore");
        let knife = ItemId::from("survival_knife");
        let mk1 = ItemId::from("depth_module_mk1");

        assert_eq!(repo.remaining_uses(&gold), Some(2));
        assert_eq!(repo.record_use(&gold, &knife), Some(1));
        assert_eq!(repo.record_use(&gold, &mk1), Some(0));
        assert!(repo.is_exhausted(&gold));
        assert_eq!(repo.recipes_using(&gold), &[knife, mk1]);
    }

    #[test]
    fn unbounded_use_never_exhausts() {
        let mut repo = sample_repository();
        let copper = ItemId::from("copper_ore");
        let knife = ItemId::from("survival_knife");
        assert_eq!(repo.remaining_uses(&copper), None);
        assert_eq!(repo.record_use(&copper, &knife), None);
        assert!(!repo.is_exhausted(&copper));
    }

    #[test]
    fn duplicate_entities_keep_first() {
        let mut a = entity("copper_ore", ItemCategory::RawMaterial, 10);
        a.value = 7;
        let mut b = entity("copper_ore", ItemCategory::RawMaterial, 10);
        b.value = 99;
        let repo = EntityRepository::from_entities(vec![a, b]);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(&ItemId::from("copper_ore")).unwrap().value, 7);
    }

    #[test]
    fn effective_value_overwrites() {
        let mut repo = sample_repository();
        let id = ItemId::from("survival_knife");
        repo.set_effective_value(&id, 42);
        assert_eq!(repo.get(&id).unwrap().value, 42);
    }
}
