//! Serializable output of a randomization run.
//!
//! Everything a save/load layer needs to reproduce or persist the shuffle:
//! the seed, every assembled recipe, the sphere assignment per region and
//! entity, and any items the priority fill had to grant. All maps are
//! `BTreeMap`s so serialization order is stable and two identical runs
//! produce byte-identical encodings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tidelock_types::{ItemId, Recipe, RegionId};

/// The complete result of one randomization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomizerOutput {
    /// The seed the run was computed from.
    pub seed: u64,

    /// Final recipe per craftable entity.
    pub recipes: BTreeMap<ItemId, Recipe>,

    /// The tier at which each region first became reachable.
    pub region_spheres: BTreeMap<RegionId, u32>,

    /// The tier at which each entity entered logic.
    pub entity_spheres: BTreeMap<ItemId, u32>,

    /// Items deliberately granted to force a stalled sphere open, in grant
    /// order.
    pub priority_grants: Vec<ItemId>,
}

impl RandomizerOutput {
    /// Number of assembled recipes.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Number of sphere tiers the run produced.
    pub fn sphere_count(&self) -> u32 {
        self.entity_spheres
            .values()
            .chain(self.region_spheres.values())
            .max()
            .map_or(0, |&tier| tier.saturating_add(1))
    }

    /// Encode the output as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] on encoding failure.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
