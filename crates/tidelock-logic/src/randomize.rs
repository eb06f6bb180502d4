//! The randomization entry point.
//!
//! [`randomize`] wires the engine together for one run:
//!
//! 1. Validate the configuration budgets.
//! 2. Audit the entity data: entities with dangling references are skipped
//!    with a warning unless something else depends on them, which escalates
//!    to a configuration error.
//! 3. Build the region graph and log its structural audit.
//! 4. Expand spheres and assemble recipes tier by tier: each sphere's
//!    newly unlocked craftables get their recipes before the next sphere
//!    exists, so every recipe draws only from already-reachable content.
//! 5. Collect the serializable output.
//!
//! The whole pass is a deterministic function of `(seed, config, data)`:
//! no retries, no clocks, no unseeded randomness.

use std::collections::{BTreeMap, BTreeSet};

use tidelock_types::{Entity, ItemId};
use tracing::{info, warn};

use crate::assembler::RecipeAssembler;
use crate::catalog::Catalog;
use crate::config::RandomizerConfig;
use crate::error::RandomizerError;
use crate::graph::RegionGraph;
use crate::report::RandomizerOutput;
use crate::repository::EntityRepository;
use crate::rng::SeededRng;
use crate::sphere::SphereExpander;

/// Run the full randomization pass over the given data set.
///
/// # Errors
///
/// Configuration errors ([`RandomizerError::InvalidBudget`],
/// [`RandomizerError::OrphanedDependency`],
/// [`RandomizerError::UnsatisfiableProgression`], graph construction
/// failures) abort the run. Exhaustion errors from recipe assembly
/// propagate unchanged.
pub fn randomize(
    config: &RandomizerConfig,
    catalog: Catalog,
) -> Result<RandomizerOutput, RandomizerError> {
    config.validate()?;

    let entities = audit_entities(catalog.entities)?;
    let mut repository = EntityRepository::from_entities(entities);
    let graph = RegionGraph::from_parts(catalog.regions, catalog.transitions)?;
    for issue in graph.validate(&repository) {
        warn!(issue, "graph audit");
    }

    info!(
        seed = config.seed,
        mode = ?config.mode,
        entities = repository.len(),
        regions = graph.region_count(),
        "randomization started"
    );

    let mut expander = SphereExpander::new(
        &graph,
        &catalog.start,
        config.max_sphere_count,
        config.priority_fill,
    )?;
    let mut assembler = RecipeAssembler::new(config, SeededRng::new(config.seed));

    let mut recipes = BTreeMap::new();
    let mut region_spheres = BTreeMap::new();
    let mut entity_spheres = BTreeMap::new();

    while let Some(sphere) = expander.advance(&mut repository)? {
        for region in &sphere.regions {
            region_spheres.entry(region.clone()).or_insert(sphere.tier);
        }
        for id in &sphere.unlocked_entities {
            entity_spheres.insert(id.clone(), sphere.tier);
        }

        // Admit this tier's unlocks before assembling its recipes, so a
        // tier's craftables may reference each other but never anything
        // from a later tier.
        assembler.refresh_pool(&mut repository);
        for id in &sphere.unlocked_entities {
            let Some(entity) = repository.get(id).cloned() else {
                continue;
            };
            if !entity.craftable {
                continue;
            }
            let recipe = assembler.randomize_ingredients(&mut repository, &entity)?;
            recipes.insert(id.clone(), recipe);
        }
    }

    let priority_grants = expander.priority_grants().to_vec();
    info!(
        recipes = recipes.len(),
        spheres = region_spheres.values().max().map_or(0, |&t| u64::from(t).saturating_add(1)),
        grants = priority_grants.len(),
        "randomization finished"
    );

    Ok(RandomizerOutput {
        seed: config.seed,
        recipes,
        region_spheres,
        entity_spheres,
        priority_grants,
    })
}

/// Drop entities with dangling references, escalating when a dropped
/// entity is itself depended upon.
///
/// # Errors
///
/// Returns [`RandomizerError::OrphanedDependency`] if a kept entity
/// references a skipped one -- skipping cannot be recovered locally there.
fn audit_entities(entities: Vec<Entity>) -> Result<Vec<Entity>, RandomizerError> {
    let known: BTreeSet<ItemId> = entities.iter().map(|e| e.id.clone()).collect();
    let mut skipped: BTreeSet<ItemId> = BTreeSet::new();
    let mut kept: Vec<Entity> = Vec::with_capacity(entities.len());

    for entity in entities {
        let dangling = entity
            .dependencies
            .iter()
            .chain(&entity.prerequisites)
            .find(|reference| !known.contains(*reference));
        if let Some(reference) = dangling {
            warn!(
                entity = %entity.id,
                reference = %reference,
                "skipping entity with dangling reference"
            );
            skipped.insert(entity.id);
        } else {
            kept.push(entity);
        }
    }

    for entity in &kept {
        let orphaned = entity
            .dependencies
            .iter()
            .chain(&entity.prerequisites)
            .find(|reference| skipped.contains(*reference));
        if let Some(reference) = orphaned {
            return Err(RandomizerError::OrphanedDependency {
                entity: entity.id.clone(),
                dependency: reference.clone(),
            });
        }
    }

    Ok(kept)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use tidelock_types::{ItemCategory, RegionId};

    fn entity(id: &str, deps: &[&str]) -> Entity {
        Entity {
            id: ItemId::from(id),
            category: ItemCategory::RawMaterial,
            value: 5,
            accessible_depth: 0,
            unit_size: 1,
            dependencies: deps.iter().map(|d| ItemId::from(*d)).collect(),
            prerequisites: Vec::new(),
            max_uses_per_game: 0,
            craftable: false,
        }
    }

    #[test]
    fn default_catalog_run_succeeds() {
        let config = RandomizerConfig::default();
        let output = randomize(&config, default_catalog()).unwrap();

        // Every region got a sphere assignment.
        assert_eq!(output.region_spheres.len(), 11);
        assert_eq!(
            output.region_spheres.get(&RegionId::from("surface_shallows")),
            Some(&0)
        );

        // Every craftable entity got a recipe, nothing else did.
        let catalog = default_catalog();
        for item in &catalog.entities {
            assert_eq!(
                output.recipes.contains_key(&item.id),
                item.craftable,
                "recipe presence mismatch for {}",
                item.id
            );
        }

        // The well-formed base catalog needs no priority grants.
        assert!(output.priority_grants.is_empty());
    }

    #[test]
    fn runs_are_deterministic_per_seed() {
        let config = RandomizerConfig::default();
        let a = randomize(&config, default_catalog()).unwrap();
        let b = randomize(&config, default_catalog()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.to_json_string().unwrap(),
            b.to_json_string().unwrap()
        );

        let other = RandomizerConfig {
            seed: 43,
            ..RandomizerConfig::default()
        };
        let c = randomize(&other, default_catalog()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn dependencies_never_unlock_after_their_dependents() {
        let config = RandomizerConfig::default();
        let output = randomize(&config, default_catalog()).unwrap();
        let catalog = default_catalog();
        for item in &catalog.entities {
            let own_tier = output.entity_spheres.get(&item.id).unwrap();
            for dep in item.dependencies.iter().chain(&item.prerequisites) {
                let dep_tier = output.entity_spheres.get(dep).unwrap();
                assert!(
                    dep_tier <= own_tier,
                    "'{dep}' (tier {dep_tier}) unlocked after dependent '{}' (tier {own_tier})",
                    item.id
                );
            }
        }
    }

    #[test]
    fn dangling_reference_is_skipped_with_no_dependents() {
        let kept = audit_entities(vec![
            entity("copper_ore", &[]),
            entity("phantom_alloy", &["missing_ore"]),
        ])
        .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().unwrap().id, ItemId::from("copper_ore"));
    }

    #[test]
    fn dangling_reference_with_dependents_escalates() {
        let result = audit_entities(vec![
            entity("phantom_alloy", &["missing_ore"]),
            entity("phantom_blade", &["phantom_alloy"]),
        ]);
        assert!(matches!(
            result,
            Err(RandomizerError::OrphanedDependency { entity, dependency })
                if entity == ItemId::from("phantom_blade")
                    && dependency == ItemId::from("phantom_alloy")
        ));
    }

    #[test]
    fn invalid_budget_aborts_before_any_work() {
        let config = RandomizerConfig {
            max_per_ingredient: 0,
            ..RandomizerConfig::default()
        };
        let result = randomize(&config, default_catalog());
        assert!(matches!(
            result,
            Err(RandomizerError::InvalidBudget { .. })
        ));
    }

    #[test]
    fn unknown_start_region_aborts() {
        let mut catalog = default_catalog();
        catalog.start = RegionId::from("atlantis");
        let result = randomize(&RandomizerConfig::default(), catalog);
        assert!(matches!(
            result,
            Err(RandomizerError::UnknownStartRegion(_))
        ));
    }
}
