//! Reachability graph: regions as nodes, locked transitions as edges.
//!
//! The [`RegionGraph`] is the spatial backbone of the randomizer. It stores
//! all [`Region`] nodes and [`Transition`] edges, indexes outbound edges
//! per region, and evaluates lock predicates against the current reachable
//! set. Sphere expansion (the fixed-point traversal) lives in
//! [`crate::sphere`]; this module only answers structural queries.
//!
//! Cross-references are id-keyed: transitions name their endpoint regions
//! and locks name their gating items, so the graph is cheap to compare and
//! cannot form ownership cycles.

use std::collections::{BTreeMap, BTreeSet};

use tidelock_types::{ItemId, Lock, Region, RegionId, Transition};

use crate::error::RandomizerError;
use crate::repository::EntityRepository;

/// The world graph holding all regions and transitions.
#[derive(Debug, Clone)]
pub struct RegionGraph {
    /// All regions indexed by their identifier.
    regions: BTreeMap<RegionId, Region>,
    /// All transitions in insertion order.
    transitions: Vec<Transition>,
    /// Outbound adjacency: region -> indices into `transitions`.
    outbound: BTreeMap<RegionId, Vec<usize>>,
    /// Reverse index: entity -> the region containing it.
    containing_region: BTreeMap<ItemId, RegionId>,
}

impl RegionGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            transitions: Vec::new(),
            outbound: BTreeMap::new(),
            containing_region: BTreeMap::new(),
        }
    }

    /// Build a graph from parsed regions and transitions.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::DuplicateRegion`] or
    /// [`RandomizerError::UnknownRegion`] on malformed input; both are
    /// configuration errors that abort the run.
    pub fn from_parts(
        regions: Vec<Region>,
        transitions: Vec<Transition>,
    ) -> Result<Self, RandomizerError> {
        let mut graph = Self::new();
        for region in regions {
            graph.add_region(region)?;
        }
        for transition in transitions {
            graph.add_transition(transition)?;
        }
        Ok(graph)
    }

    /// Add a region to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::DuplicateRegion`] if a region with the
    /// same ID already exists.
    pub fn add_region(&mut self, region: Region) -> Result<(), RandomizerError> {
        let id = region.id.clone();
        if self.regions.contains_key(&id) {
            return Err(RandomizerError::DuplicateRegion(id));
        }
        for entity in &region.entities {
            self.containing_region.insert(entity.clone(), id.clone());
        }
        self.regions.insert(id.clone(), region);
        self.outbound.entry(id).or_default();
        Ok(())
    }

    /// Add a transition to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::UnknownRegion`] if either endpoint does
    /// not exist.
    pub fn add_transition(&mut self, transition: Transition) -> Result<(), RandomizerError> {
        if !self.regions.contains_key(&transition.from) {
            return Err(RandomizerError::UnknownRegion(transition.from));
        }
        if !self.regions.contains_key(&transition.to) {
            return Err(RandomizerError::UnknownRegion(transition.to));
        }
        let index = self.transitions.len();
        self.outbound
            .entry(transition.from.clone())
            .or_default()
            .push(index);
        self.transitions.push(transition);
        Ok(())
    }

    /// Look up a region by ID.
    pub fn region(&self, id: &RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Number of regions in the graph.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// All region IDs in sorted order.
    pub fn region_ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.keys()
    }

    /// All transitions in insertion order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions departing from the given region.
    pub fn transitions_from(&self, id: &RegionId) -> impl Iterator<Item = &Transition> {
        self.outbound
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|&index| self.transitions.get(index))
    }

    /// The region containing the given entity, if any.
    ///
    /// Entities not owned by any region (crafted intermediates) are gated
    /// only by their dependencies and prerequisites.
    pub fn containing_region(&self, entity: &ItemId) -> Option<&RegionId> {
        self.containing_region.get(entity)
    }

    /// Maximum depth across the given set of regions.
    pub fn max_depth_of(&self, regions: &BTreeSet<RegionId>) -> u32 {
        regions
            .iter()
            .filter_map(|id| self.regions.get(id))
            .map(|region| region.depth)
            .max()
            .unwrap_or(0)
    }

    /// Structural audit of the graph against the known entity set.
    ///
    /// Returns a list of error messages; an empty list means the graph is
    /// structurally sound. Unknown lock items are reported here rather than
    /// at expansion time, where they would only surface as a stall.
    pub fn validate(&self, repository: &EntityRepository) -> Vec<String> {
        let mut errors = Vec::new();

        for region in self.regions.values() {
            for entity in &region.entities {
                if !repository.contains(entity) {
                    errors.push(format!(
                        "region '{}' lists entity '{}' which is not in the data set",
                        region.id, entity
                    ));
                }
            }
        }

        for transition in &self.transitions {
            for lock in &transition.locks {
                match lock {
                    Lock::RequiresItem(item) => {
                        if !repository.contains(item) {
                            errors.push(format!(
                                "transition '{}' -> '{}' is locked on unknown item '{}'",
                                transition.from, transition.to, item
                            ));
                        }
                    }
                    Lock::RequiresAnyOf(items) => {
                        if items.is_empty() {
                            errors.push(format!(
                                "transition '{}' -> '{}' has an any-of lock with no candidates",
                                transition.from, transition.to
                            ));
                        }
                        for item in items {
                            if !repository.contains(item) {
                                errors.push(format!(
                                    "transition '{}' -> '{}' is locked on unknown item '{}'",
                                    transition.from, transition.to, item
                                ));
                            }
                        }
                    }
                    Lock::RequiresDepth(_) => {}
                }
            }
        }

        errors
    }
}

impl Default for RegionGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a single lock against the reachable set and reachable depth.
pub fn lock_satisfied(lock: &Lock, in_logic: &BTreeSet<ItemId>, reachable_depth: u32) -> bool {
    match lock {
        Lock::RequiresItem(item) => in_logic.contains(item),
        Lock::RequiresAnyOf(items) => items.iter().any(|item| in_logic.contains(item)),
        Lock::RequiresDepth(depth) => reachable_depth >= *depth,
    }
}

/// A transition is unlocked iff all its locks evaluate true.
///
/// An empty lock set is trivially unlocked.
pub fn transition_unlocked(
    transition: &Transition,
    in_logic: &BTreeSet<ItemId>,
    reachable_depth: u32,
) -> bool {
    transition
        .locks
        .iter()
        .all(|lock| lock_satisfied(lock, in_logic, reachable_depth))
}
