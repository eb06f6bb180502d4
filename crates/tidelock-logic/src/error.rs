//! Error types for the `tidelock-logic` crate.
//!
//! Errors fall into three families with different handling contracts:
//!
//! - **Configuration errors** abort the randomization run and name the
//!   entity or region that triggered them. They are never silently
//!   defaulted.
//! - **Data errors** are recovered locally (the offending entity is skipped
//!   with a warning) unless skipping would orphan a dependency, in which
//!   case they escalate to [`RandomizerError::OrphanedDependency`].
//! - **Exhaustion errors** always propagate: the engine has reached a state
//!   it cannot complete, and the caller must treat the run as failed.
//!
//! No retries happen anywhere in the engine. Every computation is a
//! deterministic function of the seed and configuration, so retrying with
//! identical inputs reproduces the same failure.

use tidelock_types::{ItemId, RegionId};

/// Errors that can occur during a randomization run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RandomizerError {
    /// Sphere expansion reached a fixed point with content still
    /// unreachable and no priority grant able to force the next sphere open.
    #[error("progression is unsatisfiable: {} region(s) and {} entity(ies) unreachable", .stranded_regions.len(), .stranded_entities.len())]
    UnsatisfiableProgression {
        /// Regions outside every sphere.
        stranded_regions: Vec<RegionId>,
        /// Entities that never entered logic.
        stranded_entities: Vec<ItemId>,
    },

    /// Sphere expansion exceeded the configured iteration ceiling.
    #[error("sphere expansion exceeded the configured limit of {limit} tiers")]
    SphereLimitExceeded {
        /// The configured maximum number of sphere tiers.
        limit: u32,
    },

    /// A region was inserted twice into the reachability graph.
    #[error("duplicate region id: {0}")]
    DuplicateRegion(RegionId),

    /// A transition references a region that does not exist.
    #[error("transition endpoint references unknown region: {0}")]
    UnknownRegion(RegionId),

    /// The designated starting region does not exist in the graph.
    #[error("starting region not found: {0}")]
    UnknownStartRegion(RegionId),

    /// A kept entity depends on an entity that was skipped or missing,
    /// so skipping cannot be recovered locally.
    #[error("entity '{entity}' depends on '{dependency}' which is missing from the data set")]
    OrphanedDependency {
        /// The entity left with a dangling reference.
        entity: ItemId,
        /// The missing dependency.
        dependency: ItemId,
    },

    /// A numeric configuration knob makes every recipe impossible.
    #[error("configuration budget '{setting}' = {value} cannot produce a valid recipe")]
    InvalidBudget {
        /// The offending configuration field.
        setting: &'static str,
        /// The rejected value, widened for display.
        value: i64,
    },

    /// The valid-ingredient pool was empty when a selection was attempted.
    ///
    /// Signals a configuration that has starved a recipe of legal
    /// ingredients; a recipe left unassembled breaks reachability
    /// downstream, so this always propagates.
    #[error("no valid ingredients available while assembling recipe for '{recipe}'")]
    EmptyIngredientPool {
        /// The recipe that could not be filled.
        recipe: ItemId,
    },

    /// A weighted table was drawn from while holding no entries.
    #[error("weighted table is empty")]
    EmptyTable,

    /// A random choice was requested from an empty collection.
    #[error("cannot choose from an empty collection")]
    EmptyCollection,

    /// A distribution-shaping input fell outside the unit interval.
    #[error("distribution shaping input {value} is outside [0, 1]")]
    DomainError {
        /// The out-of-range input.
        value: f64,
    },
}
