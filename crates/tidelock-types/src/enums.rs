//! Enumeration types for the Tidelock randomizer.
//!
//! Closed sets only: the randomizer never dispatches over open-ended
//! inheritance, so every variant family here is a tagged enum matched
//! exhaustively at the call sites.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Item categories
// ---------------------------------------------------------------------------

/// The category of a randomizable entity.
///
/// Categories drive what an entity may be used for during randomization:
/// whether it stacks, whether it can appear as an ingredient, and which
/// budget clamps apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    // --- Materials ---
    /// Harvested directly from the world (ores, plants, salvage).
    RawMaterial,
    /// Crafted from raw materials in one step.
    BasicMaterial,
    /// Crafted from basic materials; multi-step chains.
    AdvancedMaterial,

    // --- Gear ---
    /// Wearable equipment (fins, tanks, suits).
    Equipment,
    /// Handheld tools (cutters, scanners, beacons).
    Tool,

    // --- Mobility ---
    /// Pilotable vehicles.
    Vehicle,
    /// Modules upgrading a vehicle.
    VehicleUpgrade,
    /// Modules upgrading a fabrication workbench.
    WorkbenchUpgrade,

    // --- Construction ---
    /// Structural base pieces (corridors, rooms, hatches).
    BasePiece,
    /// Functional base interior pieces (lockers, planters, chargers).
    BaseUtility,

    // --- Flora and fauna ---
    /// Creature eggs.
    Egg,
    /// Plantable seeds.
    Seed,
    /// Catchable fish.
    Fish,

    // --- Progression pickups ---
    /// Scannable wreck fragments.
    Fragment,
    /// Data boxes granting blueprints.
    Databox,
}

impl ItemCategory {
    /// Whether items of this category stack in an inventory slot.
    ///
    /// Non-stacking categories are clamped to one unit per recipe.
    pub const fn is_stackable(self) -> bool {
        !matches!(
            self,
            Self::Tool | Self::VehicleUpgrade | Self::WorkbenchUpgrade
        )
    }

    /// Whether this category is a structural or functional base piece.
    pub const fn is_base_piece(self) -> bool {
        matches!(self, Self::BasePiece | Self::BaseUtility)
    }

    /// Whether this category is an upgrade module.
    pub const fn is_upgrade(self) -> bool {
        matches!(self, Self::VehicleUpgrade | Self::WorkbenchUpgrade)
    }

    /// Whether items of this category can themselves be consumed as a
    /// crafting ingredient at all.
    ///
    /// Base pieces are welded in place once built and vehicles never fit
    /// in a fabricator, so both are permanently excluded from ingredient
    /// pools; fragments and databoxes are world pickups, not inventory
    /// items.
    pub const fn is_ingredient_material(self) -> bool {
        !matches!(
            self,
            Self::BasePiece | Self::BaseUtility | Self::Vehicle | Self::Fragment | Self::Databox
        )
    }
}

// ---------------------------------------------------------------------------
// Random distribution shaping
// ---------------------------------------------------------------------------

/// How a uniform random draw is reshaped before scaling to an output range.
///
/// The shaping functions are applied to `x` in `[0, 1)` and clamped back to
/// `[0, 1]` before the result is scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// Identity: `f(x) = x`.
    #[default]
    Normal,
    /// Weighted toward the low end: `f(x) = 2(x-1)^2`.
    PreferLow,
    /// Weighted toward the high end: `f(x) = 2x^2`.
    PreferHigh,
    /// Weighted toward both ends: `f(x) = 8(x-0.5)^2`.
    PreferExtremes,
}

// ---------------------------------------------------------------------------
// Ingredient inclusion levels
// ---------------------------------------------------------------------------

/// How freely a gear category (equipment, tools, upgrades) may be consumed
/// as a crafting ingredient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionLevel {
    /// Never usable as an ingredient.
    Never,
    /// Usable only in recipes that cannot themselves become ingredients
    /// (base pieces), so the gear is never buried two recipes deep.
    #[default]
    TopLevelOnly,
    /// Usable in any recipe.
    Unrestricted,
}

// ---------------------------------------------------------------------------
// Recipe assembly modes
// ---------------------------------------------------------------------------

/// The ingredient-selection strategy used when assembling recipes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    /// Value-targeted selection: one primary ingredient near a configured
    /// fraction of the recipe's value, then secondaries until the value
    /// budget is met within tolerance.
    #[default]
    Balanced,
    /// Uniform selection: a random number of random ingredients with no
    /// value targeting.
    Random,
}
