//! Catalog query: filters the recipe catalog down to a candidate pool
//! honoring dietary restrictions and soft preferences, with progressive
//! relaxation and a coverage report for downstream infeasibility signaling.

use crate::domain::{MealSlotKind, Recipe, UserProfile};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

/// Per-slot-kind coverage, so the coordinator can name which meal types have zero
/// candidates rather than only knowing the aggregate pool is empty.
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub counts: HashMap<String, usize>,
}

impl CoverageReport {
    pub fn empty_slot_kinds(&self) -> Vec<String> {
        self.counts
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(kind, _)| kind.clone())
            .collect()
    }

    pub fn is_fully_covered(&self) -> bool {
        self.empty_slot_kinds().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CandidatePool {
    pub recipes: Vec<Recipe>,
    pub coverage: CoverageReport,
}

fn coverage_for(recipes: &[Recipe], slot_kinds: &[MealSlotKind]) -> CoverageReport {
    let mut counts = HashMap::new();
    for kind in slot_kinds {
        let count = recipes.iter().filter(|r| r.suitable_for(*kind)).count();
        counts.insert(kind.as_str(), count);
    }
    CoverageReport { counts }
}

/// `pool_floor` and `pool_cap` come from [`crate::config::CatalogConfig`].
pub fn candidates(
    all_recipes: &[Recipe],
    profile: &UserProfile,
    previous_week_ids: &HashSet<String>,
    pool_floor: usize,
    pool_cap: usize,
    seed: Option<u64>,
) -> CandidatePool {
    // 1. Active flag.
    let mut pool: Vec<Recipe> = all_recipes.iter().filter(|r| r.active).cloned().collect();

    // 2. Dietary hard filter — AND logic, never relaxed.
    pool.retain(|r| {
        profile
            .dietary_restrictions
            .iter()
            .all(|restriction| r.satisfies_restriction(restriction))
    });

    // 3. Historical exclusion.
    pool.retain(|r| {
        !previous_week_ids.contains(&r.id) && !profile.disliked_recipe_ids.contains(&r.id)
    });

    // 4. Soft preference gate: budget tier + cooking-time cap, progressively relaxed.
    let with_both_gates: Vec<Recipe> = pool
        .iter()
        .filter(|r| passes_budget(r, profile) && passes_cooking_time(r, profile))
        .cloned()
        .collect();

    let gated = if with_both_gates.len() >= pool_floor {
        with_both_gates
    } else {
        let with_budget_only: Vec<Recipe> = pool
            .iter()
            .filter(|r| passes_budget(r, profile))
            .cloned()
            .collect();
        if with_budget_only.len() >= pool_floor {
            with_budget_only
        } else {
            pool.clone()
        }
    };

    let slot_kinds = MealSlotKind::for_meals_per_day(profile.meals_per_day_or_default());

    // 5. Pool cap: sample to balance meal-type coverage when over cap.
    let capped = if gated.len() > pool_cap {
        sample_balanced(&gated, &slot_kinds, pool_cap, seed)
    } else {
        gated
    };

    let coverage = coverage_for(&capped, &slot_kinds);
    CandidatePool {
        recipes: capped,
        coverage,
    }
}

fn passes_budget(recipe: &Recipe, profile: &UserProfile) -> bool {
    recipe.budget_tier <= profile.budget_tier
}

fn passes_cooking_time(recipe: &Recipe, profile: &UserProfile) -> bool {
    match profile.max_cooking_minutes {
        Some(max) => recipe.total_cooking_minutes <= max,
        None => true,
    }
}

/// Sample down to `cap` recipes while trying to keep every slot kind covered:
/// round-robin-allocate a share of the cap to each slot kind's eligible
/// recipes before topping up with whatever remains.
fn sample_balanced(
    recipes: &[Recipe],
    slot_kinds: &[MealSlotKind],
    cap: usize,
    seed: Option<u64>,
) -> Vec<Recipe> {
    let mut rng = match seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s),
        None => rand::rngs::StdRng::from_entropy(),
    };

    let mut selected: HashSet<String> = HashSet::new();
    let mut result = Vec::new();
    let per_kind_share = (cap / slot_kinds.len().max(1)).max(1);

    for kind in slot_kinds {
        let mut eligible: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| r.suitable_for(*kind) && !selected.contains(&r.id))
            .collect();
        eligible.shuffle(&mut rng);
        for recipe in eligible.into_iter().take(per_kind_share) {
            if selected.insert(recipe.id.clone()) {
                result.push(recipe.clone());
            }
            if result.len() >= cap {
                break;
            }
        }
        if result.len() >= cap {
            break;
        }
    }

    if result.len() < cap {
        let mut remaining: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| !selected.contains(&r.id))
            .collect();
        remaining.shuffle(&mut rng);
        for recipe in remaining {
            if result.len() >= cap {
                break;
            }
            if selected.insert(recipe.id.clone()) {
                result.push(recipe.clone());
            }
        }
    }

    result
}
