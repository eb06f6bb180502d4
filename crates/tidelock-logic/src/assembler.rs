//! Budgeted ingredient selection for randomized recipes.
//!
//! The [`RecipeAssembler`] consumes the repository's reachable set and
//! produces a randomized ingredient list for each craftable entity,
//! respecting several simultaneous budgets:
//!
//! - ingredient-type count per recipe,
//! - cumulative inventory size per recipe,
//! - a running outpost-size budget shared by all base-piece recipes,
//! - per-ingredient unit caps (global, stacking, egg-specific),
//! - bounded total uses per ingredient across the whole run.
//!
//! The assembler learns about newly legal ingredients by draining the
//! repository's unlock queue ([`RecipeAssembler::refresh_pool`]) once per
//! sphere tier, so a recipe can only ever draw from content that was
//! reachable before the recipe's own tier.
//!
//! Two generators sit behind the closed [`AssemblyMode`] switch: balanced
//! (value-targeted) and random (uniform). Both share the seeding, budget,
//! and bookkeeping pass here.

use std::collections::BTreeSet;

use tidelock_types::{
    AssemblyMode, Entity, InclusionLevel, ItemCategory, ItemId, Recipe, RecipeIngredient,
};
use tracing::debug;

use crate::config::RandomizerConfig;
use crate::error::RandomizerError;
use crate::repository::EntityRepository;
use crate::rng::SeededRng;
use crate::weighted::WeightedTable;

/// Numerator/denominator of the outpost budget cutoff: base-piece recipes
/// stop once the running outpost size exceeds 70% of its cap.
const OUTPOST_CUTOFF_PERCENT: u32 = 70;

/// Selection weight per ingredient category.
///
/// Raw materials dominate the draw so randomized recipes lean on common
/// resources; crafted intermediates and wildlife are less frequent, gear
/// the rarest.
const fn category_weight(category: ItemCategory) -> f64 {
    match category {
        ItemCategory::RawMaterial => 1.0,
        ItemCategory::BasicMaterial => 0.8,
        ItemCategory::AdvancedMaterial => 0.5,
        ItemCategory::Egg | ItemCategory::Seed | ItemCategory::Fish => 0.4,
        _ => 0.25,
    }
}

/// In-progress state for one recipe pass.
struct RecipeDraft {
    recipe: Recipe,
    size_spent: u32,
    value_sum: u32,
}

/// Assembles randomized recipes from the currently reachable pool.
#[derive(Debug)]
pub struct RecipeAssembler<'a> {
    config: &'a RandomizerConfig,
    rng: SeededRng,
    /// Reachable, ingredient-eligible items.
    pool: BTreeSet<ItemId>,
    /// The one raw material shared by all base-piece recipes, chosen on
    /// first use.
    base_theme: Option<ItemId>,
    /// Inventory size consumed by base-piece recipes so far.
    outpost_size_spent: u32,
}

impl<'a> RecipeAssembler<'a> {
    /// Create an assembler seeded from the run configuration.
    pub const fn new(config: &'a RandomizerConfig, rng: SeededRng) -> Self {
        Self {
            config,
            rng,
            pool: BTreeSet::new(),
            base_theme: None,
            outpost_size_spent: 0,
        }
    }

    /// The raw material chosen as the base-building theme, if one has been
    /// picked yet.
    pub const fn base_theme(&self) -> Option<&ItemId> {
        self.base_theme.as_ref()
    }

    /// Admit entities that entered logic since the last refresh.
    ///
    /// Drains the repository's unlock queue; only ingredient-eligible
    /// categories join the pool.
    pub fn refresh_pool(&mut self, repository: &mut EntityRepository) {
        for id in repository.drain_unlocked() {
            let Some(entity) = repository.get(&id) else {
                continue;
            };
            if entity.category.is_ingredient_material() {
                self.pool.insert(id);
            }
        }
    }

    /// Assemble a randomized recipe for the given target entity.
    ///
    /// # Errors
    ///
    /// Returns [`RandomizerError::EmptyIngredientPool`] if the valid pool
    /// is empty when a selection is attempted; this propagates, since a
    /// recipe left unassembled breaks reachability downstream.
    pub fn randomize_ingredients(
        &mut self,
        repository: &mut EntityRepository,
        target: &Entity,
    ) -> Result<Recipe, RandomizerError> {
        let blocked = self.blocked_categories(target);
        let mut draft = RecipeDraft {
            recipe: Recipe::new(target.id.clone()),
            size_spent: 0,
            value_sum: 0,
        };

        self.seed_mandatory_ingredients(repository, target, &mut draft)?;

        match self.config.mode {
            AssemblyMode::Balanced => {
                self.fill_balanced(repository, target, &blocked, &mut draft)?;
                repository.set_effective_value(&target.id, draft.value_sum);
            }
            AssemblyMode::Random => {
                self.fill_random(repository, target, &blocked, &mut draft)?;
            }
        }

        if target.category.is_base_piece() {
            self.outpost_size_spent = self.outpost_size_spent.saturating_add(draft.size_spent);
        }
        debug!(
            recipe = %target.id,
            ingredients = draft.recipe.ingredient_type_count(),
            size = draft.size_spent,
            value = draft.value_sum,
            "recipe assembled"
        );
        Ok(draft.recipe)
    }

    // -------------------------------------------------------------------
    // Shared pass
    // -------------------------------------------------------------------

    /// Categories disallowed as ingredients for this particular target.
    ///
    /// `TopLevelOnly` blocks a gear category unless the target recipe
    /// itself can never be reused as an ingredient (base pieces,
    /// vehicles), so gear is never buried two recipes deep.
    fn blocked_categories(&self, target: &Entity) -> Vec<ItemCategory> {
        let target_reusable = target.category.is_ingredient_material();
        let mut blocked = Vec::new();
        let levels = [
            (self.config.equipment_as_ingredients, &[ItemCategory::Equipment][..]),
            (self.config.tools_as_ingredients, &[ItemCategory::Tool][..]),
            (
                self.config.upgrades_as_ingredients,
                &[ItemCategory::VehicleUpgrade, ItemCategory::WorkbenchUpgrade][..],
            ),
        ];
        for (level, categories) in levels {
            let block = match level {
                InclusionLevel::Never => true,
                InclusionLevel::TopLevelOnly => target_reusable,
                InclusionLevel::Unrestricted => false,
            };
            if block {
                blocked.extend_from_slice(categories);
            }
        }
        blocked
    }

    /// Mandatory special ingredients, added before the mode generator runs:
    /// the base theme for base pieces, and the upgrade-chain predecessor
    /// when chain preservation is on.
    fn seed_mandatory_ingredients(
        &mut self,
        repository: &mut EntityRepository,
        target: &Entity,
        draft: &mut RecipeDraft,
    ) -> Result<(), RandomizerError> {
        if target.category.is_base_piece() && self.config.use_base_theme {
            let theme = self.pick_base_theme(repository)?;
            if !repository.is_exhausted(&theme) {
                let cap = self.find_maximum_for(repository, &theme, draft.size_spent);
                let count = self
                    .rng
                    .next_weighted(1, cap.saturating_add(1), self.config.distribution)?;
                self.accept(repository, draft, &theme, count);
            }
        }

        if self.config.preserve_upgrade_chains
            && target.category.is_upgrade()
            && target.prerequisites.len() == 1
            && let Some(predecessor) = target.prerequisites.first().cloned()
            && repository.contains(&predecessor)
            && !repository.is_exhausted(&predecessor)
            && !draft.recipe.contains(&predecessor)
        {
            // Chain predecessors are gear; they never stack.
            self.accept(repository, draft, &predecessor, 1);
        }

        Ok(())
    }

    /// Choose (once per run) the raw material every base piece shares.
    fn pick_base_theme(
        &mut self,
        repository: &EntityRepository,
    ) -> Result<ItemId, RandomizerError> {
        if let Some(theme) = &self.base_theme {
            return Ok(theme.clone());
        }
        let raw_materials: Vec<ItemId> = repository
            .find_by_category(&[ItemCategory::RawMaterial], u32::MAX)
            .into_iter()
            .map(|entity| entity.id.clone())
            .filter(|id| self.pool.contains(id) && !repository.is_exhausted(id))
            .collect();
        let theme = self.rng.choice(&raw_materials)?.clone();
        debug!(theme = %theme, "base theme material chosen");
        self.base_theme = Some(theme.clone());
        Ok(theme)
    }

    /// Current selectable ingredients for this draft, in sorted order.
    fn candidates(
        &self,
        repository: &EntityRepository,
        target: &Entity,
        blocked: &[ItemCategory],
        draft: &RecipeDraft,
    ) -> Vec<ItemId> {
        self.pool
            .iter()
            .filter(|&id| {
                if id == &target.id || draft.recipe.contains(id) {
                    return false;
                }
                if repository.is_exhausted(id) {
                    return false;
                }
                repository
                    .get(id)
                    .is_some_and(|entity| !blocked.contains(&entity.category))
            })
            .cloned()
            .collect()
    }

    /// Whether a budget stop condition has been hit.
    fn budget_exhausted(&self, target: &Entity, draft: &RecipeDraft) -> bool {
        let type_count =
            u32::try_from(draft.recipe.ingredient_type_count()).unwrap_or(u32::MAX);
        if type_count >= self.config.max_ingredients_per_recipe {
            return true;
        }
        if draft.size_spent >= self.config.max_inventory_size_per_recipe {
            return true;
        }
        if target.category.is_base_piece() {
            let cutoff = self
                .config
                .max_basic_outpost_size
                .saturating_mul(OUTPOST_CUTOFF_PERCENT)
                .checked_div(100)
                .unwrap_or(0);
            let running = self.outpost_size_spent.saturating_add(draft.size_spent);
            if running > cutoff {
                return true;
            }
        }
        false
    }

    /// Largest unit count a single ingredient may contribute right now.
    ///
    /// Bounded by the global per-ingredient cap, the remaining size budget
    /// divided by the unit size, clamped to 1 for non-stacking categories
    /// and to the configured egg cap for eggs. Never below 1.
    fn find_maximum_for(
        &self,
        repository: &EntityRepository,
        item: &ItemId,
        size_spent: u32,
    ) -> u32 {
        let Some(entity) = repository.get(item) else {
            return 1;
        };
        let remaining = self
            .config
            .max_inventory_size_per_recipe
            .saturating_sub(size_spent);
        let mut cap = self.config.max_per_ingredient;
        if let Some(by_size) = remaining.checked_div(entity.unit_size) {
            cap = cap.min(by_size);
        }
        if !entity.category.is_stackable() {
            cap = cap.min(1);
        }
        if entity.category == ItemCategory::Egg {
            cap = cap.min(self.config.max_eggs_as_ingredient);
        }
        cap.max(1)
    }

    /// Draw one ingredient from the candidates, weighted by category so
    /// common resources dominate and gear stays rare.
    fn pick_ingredient(
        &mut self,
        repository: &EntityRepository,
        candidates: &[ItemId],
    ) -> Result<ItemId, RandomizerError> {
        let mut table = WeightedTable::new();
        for id in candidates {
            let weight = repository
                .get(id)
                .map_or(0.0, |entity| category_weight(entity.category));
            table.add(id.clone(), weight);
        }
        Ok(table.draw(&mut self.rng)?.clone())
    }

    /// Commit an ingredient line: update size and value totals, decrement
    /// bounded uses, and purge the pool when an ingredient exhausts.
    fn accept(
        &mut self,
        repository: &mut EntityRepository,
        draft: &mut RecipeDraft,
        item: &ItemId,
        count: u32,
    ) {
        let (unit_size, unit_value) = repository
            .get(item)
            .map_or((1, 0), |entity| (entity.unit_size, entity.value));
        draft.recipe.ingredients.push(RecipeIngredient {
            item: item.clone(),
            count,
        });
        draft.size_spent = draft
            .size_spent
            .saturating_add(count.saturating_mul(unit_size));
        draft.value_sum = draft
            .value_sum
            .saturating_add(count.saturating_mul(unit_value));

        if repository.record_use(item, &draft.recipe.item) == Some(0) {
            // The ingredient is spent for the rest of the run. Its own
            // entry leaves the pool, and so does every recipe that already
            // referenced it: their dependents can no longer be guaranteed
            // craftable.
            self.pool.remove(item);
            let dependents: Vec<ItemId> = repository.recipes_using(item).to_vec();
            for recipe in &dependents {
                if self.pool.remove(recipe) {
                    debug!(
                        ingredient = %item,
                        dependent = %recipe,
                        "purged dependent recipe from ingredient pool"
                    );
                }
            }
        }
    }

    // -------------------------------------------------------------------
    // Balanced generator
    // -------------------------------------------------------------------

    /// Value-targeted fill: one primary ingredient near the configured
    /// fraction of the target's value, then random secondaries until the
    /// remaining gap falls inside the tolerance band (closed at both
    /// ends).
    fn fill_balanced(
        &mut self,
        repository: &mut EntityRepository,
        target: &Entity,
        blocked: &[ItemCategory],
        draft: &mut RecipeDraft,
    ) -> Result<(), RandomizerError> {
        let target_value = target.value.max(1);
        let tolerance_half =
            f64::from(target_value) * self.config.variance_tolerance / 2.0;
        let value_ceiling = f64::from(target_value) + tolerance_half;

        if !self.budget_exhausted(target, draft) {
            let candidates = self.candidates(repository, target, blocked, draft);
            if candidates.is_empty() {
                return Err(RandomizerError::EmptyIngredientPool {
                    recipe: target.id.clone(),
                });
            }
            let fraction = self.config.primary_ingredient_fraction;
            let band_low = f64::from(target_value) * (fraction - 0.1);
            let band_high = f64::from(target_value) * (fraction + 0.1);
            let in_band: Vec<ItemId> = candidates
                .iter()
                .filter(|&id| {
                    repository.get(id).is_some_and(|entity| {
                        let value = f64::from(entity.value);
                        value >= band_low && value <= band_high
                    })
                })
                .cloned()
                .collect();
            // No candidate in range: fall back to any valid ingredient.
            let primary = if in_band.is_empty() {
                self.pick_ingredient(repository, &candidates)?
            } else {
                self.rng.choice(&in_band)?.clone()
            };
            self.accept(repository, draft, &primary, 1);
        }

        while f64::from(target_value) - f64::from(draft.value_sum) > tolerance_half {
            if self.budget_exhausted(target, draft) {
                break;
            }
            let candidates = self.candidates(repository, target, blocked, draft);
            if candidates.is_empty() {
                return Err(RandomizerError::EmptyIngredientPool {
                    recipe: target.id.clone(),
                });
            }
            let pick = self.pick_ingredient(repository, &candidates)?;
            let mut cap = self.find_maximum_for(repository, &pick, draft.size_spent);
            // Keep the assembled value inside the closed tolerance band:
            // never draw more units than the value headroom allows.
            if let Some(entity) = repository.get(&pick)
                && entity.value > 0
            {
                let headroom = value_ceiling - f64::from(draft.value_sum);
                let by_value = (headroom / f64::from(entity.value)).floor();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                // non-negative and far below u32::MAX after the floor
                let by_value = by_value.clamp(0.0, f64::from(u32::MAX)) as u32;
                cap = cap.min(by_value.max(1));
            }
            let count = self
                .rng
                .next_weighted(1, cap.saturating_add(1), self.config.distribution)?;
            self.accept(repository, draft, &pick, count);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Random generator
    // -------------------------------------------------------------------

    /// Uniform fill: a shaped draw decides the ingredient-type count, then
    /// each ingredient gets an independent count bounded only by
    /// `find_maximum`.
    fn fill_random(
        &mut self,
        repository: &mut EntityRepository,
        target: &Entity,
        blocked: &[ItemCategory],
        draft: &mut RecipeDraft,
    ) -> Result<(), RandomizerError> {
        let wanted = self.rng.next_weighted(
            1,
            self.config.max_ingredients_per_recipe.saturating_add(1),
            self.config.distribution,
        )?;
        loop {
            let have = u32::try_from(draft.recipe.ingredient_type_count()).unwrap_or(u32::MAX);
            if have >= wanted || self.budget_exhausted(target, draft) {
                break;
            }
            let candidates = self.candidates(repository, target, blocked, draft);
            if candidates.is_empty() {
                return Err(RandomizerError::EmptyIngredientPool {
                    recipe: target.id.clone(),
                });
            }
            let pick = self.pick_ingredient(repository, &candidates)?;
            let cap = self.find_maximum_for(repository, &pick, draft.size_spent);
            let count = self.rng.next_int(1, cap.saturating_add(1));
            self.accept(repository, draft, &pick, count);
        }
        Ok(())
    }
}
