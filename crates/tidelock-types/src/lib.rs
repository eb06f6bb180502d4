//! Shared type definitions for the Tidelock randomizer.
//!
//! This crate holds the serializable, engine-independent vocabulary of the
//! randomizer: typed string identifiers, category and mode enumerations, and
//! the entity/region/recipe data structures. The engine crate
//! (`tidelock-logic`) owns all behavior; everything here is pure data.

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{AssemblyMode, Distribution, InclusionLevel, ItemCategory};
pub use ids::{ItemId, RegionId};
pub use structs::{Entity, Lock, Recipe, RecipeIngredient, Region, Transition};
