//! Progression-gated randomization engine for the Tidelock randomizer.
//!
//! Given a seed, a rule configuration, and a data set of entities and
//! regions, the engine decides which items become obtainable at which
//! progression tier and what each item's randomized recipe is, such that
//! the resulting game stays completable and roughly balanced in cost.
//!
//! # Modules
//!
//! - [`rng`] -- seeded `xorshift64` source with distribution shaping; every
//!   stochastic decision flows through it for byte-identical reruns.
//! - [`weighted`] -- generic weighted-choice table (cumulative-sum walk).
//! - [`repository`] -- [`repository::EntityRepository`]: entity arena,
//!   monotonic in-logic set, unlock queue, bounded-use counters.
//! - [`graph`] -- [`graph::RegionGraph`]: regions, locked transitions,
//!   structural validation, lock evaluation.
//! - [`sphere`] -- concentric sphere expansion with stall detection and
//!   priority fill.
//! - [`assembler`] -- budgeted ingredient selection (balanced and random
//!   generators).
//! - [`config`] -- YAML-backed [`config::RandomizerConfig`].
//! - [`catalog`] -- built-in base-game data set.
//! - [`randomize`] -- the [`randomize::randomize`] entry point.
//! - [`report`] -- serializable [`report::RandomizerOutput`].
//! - [`error`] -- the [`error::RandomizerError`] taxonomy.

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod randomize;
pub mod report;
pub mod repository;
pub mod rng;
pub mod sphere;
pub mod weighted;

pub use assembler::RecipeAssembler;
pub use catalog::{Catalog, default_catalog};
pub use config::{ConfigError, LoggingConfig, RandomizerConfig};
pub use error::RandomizerError;
pub use graph::RegionGraph;
pub use randomize::randomize;
pub use report::RandomizerOutput;
pub use repository::EntityRepository;
pub use rng::SeededRng;
pub use sphere::{Sphere, SphereExpander};
pub use weighted::WeightedTable;
