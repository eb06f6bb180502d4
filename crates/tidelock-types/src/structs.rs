//! Core data structures for the Tidelock randomizer.
//!
//! These are the serializable, engine-independent descriptions of the
//! game's randomizable content: entities with their static attributes,
//! regions and the locked transitions between them, and assembled recipes.
//!
//! All cross-references between objects are by stable ID into the owning
//! registry, never by nested ownership, so the progression graph stays
//! cheap to compare and impossible to make cyclic through ownership alone.

use serde::{Deserialize, Serialize};

use crate::enums::ItemCategory;
use crate::ids::{ItemId, RegionId};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A randomizable game object: an item, blueprint, spawn, or pickup.
///
/// Entities carry only static attributes from the game's data files.
/// Runtime bookkeeping (reachability flags, remaining uses) lives in the
/// engine's repository, keeping this type round-trippable as pure data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier, unique across the data set.
    pub id: ItemId,

    /// Category driving stacking, ingredient eligibility, and budget clamps.
    pub category: ItemCategory,

    /// Integer cost proxy used for value-balanced recipe assembly.
    #[serde(default = "default_value")]
    pub value: u32,

    /// Minimum world depth (in meters) at which the entity can be obtained.
    #[serde(default)]
    pub accessible_depth: u32,

    /// Inventory slots one unit occupies.
    #[serde(default = "default_unit_size")]
    pub unit_size: u32,

    /// Entities that must be reachable before this one can be (weak
    /// references by ID, never owned).
    #[serde(default)]
    pub dependencies: Vec<ItemId>,

    /// Items whose blueprints must be unlocked before this entity's
    /// blueprint unlocks.
    #[serde(default)]
    pub prerequisites: Vec<ItemId>,

    /// Upper bound on how many recipes may consume this entity across one
    /// randomized game. Zero means unbounded.
    #[serde(default)]
    pub max_uses_per_game: u32,

    /// Whether this entity gets a randomized recipe of its own.
    #[serde(default)]
    pub craftable: bool,
}

const fn default_value() -> u32 {
    1
}

const fn default_unit_size() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// One ingredient line of an assembled recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// The consumed item.
    pub item: ItemId,
    /// How many units the recipe consumes.
    pub count: u32,
}

/// The ingredient multiset and craft amount assigned to a craftable entity.
///
/// Created once per craftable entity, mutated only during that entity's
/// randomization pass, immutable afterward. Ingredient order carries no
/// meaning; it is kept stable for reproducible serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// The crafted item.
    pub item: ItemId,
    /// Ingredient lines; no duplicate items within one recipe.
    pub ingredients: Vec<RecipeIngredient>,
    /// How many units one craft produces.
    #[serde(default = "default_craft_amount")]
    pub craft_amount: u32,
}

impl Recipe {
    /// Create an empty recipe for the given item with craft amount 1.
    pub const fn new(item: ItemId) -> Self {
        Self {
            item,
            ingredients: Vec::new(),
            craft_amount: 1,
        }
    }

    /// Number of distinct ingredient types.
    pub fn ingredient_type_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Whether the recipe already references the given item.
    pub fn contains(&self, item: &ItemId) -> bool {
        self.ingredients.iter().any(|line| &line.item == item)
    }
}

const fn default_craft_amount() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Regions and transitions
// ---------------------------------------------------------------------------

/// A named area of the game world.
///
/// Reaching a region grants access to every entity it contains, subject to
/// each entity's own dependencies and depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier, unique across the data set.
    pub id: RegionId,
    /// Representative depth of the region in meters.
    #[serde(default)]
    pub depth: u32,
    /// Entities obtainable inside this region.
    #[serde(default)]
    pub entities: Vec<ItemId>,
}

/// A predicate gating a transition.
///
/// A closed variant set: the lock kinds are fixed per ruleset, so they are
/// matched exhaustively rather than dispatched through trait objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lock {
    /// Satisfied once the named item is in logic.
    RequiresItem(ItemId),
    /// Satisfied once any one of the named items is in logic.
    RequiresAnyOf(Vec<ItemId>),
    /// Satisfied once the reachable world reaches this depth in meters.
    RequiresDepth(u32),
}

/// A directed edge between two regions, guarded by zero or more locks.
///
/// Bidirectional passages are stored as two directed transitions. A
/// transition with no locks is trivially open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Origin region.
    pub from: RegionId,
    /// Destination region.
    pub to: RegionId,
    /// Predicates that must all hold for the transition to open.
    #[serde(default)]
    pub locks: Vec<Lock>,
}

impl Transition {
    /// Create an unlocked transition between two regions.
    pub fn open(from: impl Into<RegionId>, to: impl Into<RegionId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            locks: Vec::new(),
        }
    }

    /// Create a transition guarded by the given locks.
    pub fn locked(
        from: impl Into<RegionId>,
        to: impl Into<RegionId>,
        locks: Vec<Lock>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            locks,
        }
    }
}
