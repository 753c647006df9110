//! Optimizer: an integer program that selects one recipe per slot
//! maximizing liked-recipe exposure while respecting per-day macro bands
//! and uniqueness, solved with `good_lp`'s pure-Rust `microlp` backend.

use crate::domain::{MacroTargets, PlanRecipeAssignment, PlanSlot, Recipe};
use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, Solution, SolverModel,
    Variable,
};
use std::collections::{HashMap, HashSet};

/// `solve` is synchronous and CPU-bound; the coordinator enforces the
/// solver time budget by running it inside `tokio::task::spawn_blocking`
/// wrapped in `tokio::time::timeout`, rather than threading a deadline into
/// the model itself.
#[derive(Debug, Clone)]
pub struct OptimizerInput<'a> {
    pub slots: &'a [PlanSlot],
    pub candidates: &'a [Recipe],
    pub liked_recipe_ids: &'a HashSet<String>,
    pub disliked_recipe_ids: &'a HashSet<String>,
    pub daily_targets: &'a MacroTargets,
    pub macro_band: f32,
}

#[derive(Debug, Clone)]
pub enum OptimizerOutcome {
    Solved(Vec<PlanRecipeAssignment>),
    Infeasible,
    TimedOut,
}

/// Weight ratio of a liked recipe's contribution to the objective versus a
/// neutral one: maximize liked-recipe exposure at 10:1 weighting.
const LIKED_WEIGHT: f64 = 10.0;
const NEUTRAL_WEIGHT: f64 = 1.0;

/// Builds one binary variable per (slot, candidate-recipe) pair that is
/// slot-suitable and not disliked, then:
/// - exactly one recipe chosen per slot (coverage),
/// - a recipe used at most once across the week, or at most twice when the
///   candidate pool is smaller than the slot count (relaxed uniqueness),
/// - each day's summed macro totals fall within `macro_band` of
///   `daily_targets`,
/// maximizing the liked-weighted sum.
pub fn solve(input: OptimizerInput) -> OptimizerOutcome {
    let days: Vec<u8> = {
        let mut d: Vec<u8> = input.slots.iter().map(|s| s.day_index).collect();
        d.sort_unstable();
        d.dedup();
        d
    };

    let allow_double_use = input.candidates.len() < input.slots.len();
    let max_uses = if allow_double_use { 2 } else { 1 };

    let mut vars = ProblemVariables::new();
    // var_index[(slot_idx, recipe_idx)] = Variable
    let mut var_index: HashMap<(usize, usize), Variable> = HashMap::new();

    for (slot_idx, slot) in input.slots.iter().enumerate() {
        for (recipe_idx, recipe) in input.candidates.iter().enumerate() {
            if !recipe.suitable_for(slot.meal_type) {
                continue;
            }
            if input.disliked_recipe_ids.contains(&recipe.id) {
                continue;
            }
            let v = vars.add(variable().binary());
            var_index.insert((slot_idx, recipe_idx), v);
        }
    }

    if var_index.is_empty() {
        return OptimizerOutcome::Infeasible;
    }

    // Objective: maximize liked-weighted coverage.
    let mut objective = Expression::from(0.0);
    for (&(_slot_idx, recipe_idx), &v) in var_index.iter() {
        let weight = if input
            .liked_recipe_ids
            .contains(&input.candidates[recipe_idx].id)
        {
            LIKED_WEIGHT
        } else {
            NEUTRAL_WEIGHT
        };
        objective += weight * v;
    }

    let mut model = vars.maximise(objective).using(default_solver);

    // Coverage: exactly one recipe per slot.
    for (slot_idx, _slot) in input.slots.iter().enumerate() {
        let mut sum = Expression::from(0.0);
        let mut has_any = false;
        for (recipe_idx, _) in input.candidates.iter().enumerate() {
            if let Some(&v) = var_index.get(&(slot_idx, recipe_idx)) {
                sum += v;
                has_any = true;
            }
        }
        if !has_any {
            return OptimizerOutcome::Infeasible;
        }
        model = model.with(constraint!(sum == 1.0));
    }

    // Uniqueness: each recipe used at most max_uses times across the week.
    for (recipe_idx, _recipe) in input.candidates.iter().enumerate() {
        let mut sum = Expression::from(0.0);
        let mut has_any = false;
        for (slot_idx, _slot) in input.slots.iter().enumerate() {
            if let Some(&v) = var_index.get(&(slot_idx, recipe_idx)) {
                sum += v;
                has_any = true;
            }
        }
        if has_any {
            model = model.with(constraint!(sum <= max_uses as f64));
        }
    }

    // Per-day macro band constraints.
    for &day in &days {
        for (macro_name, target) in input.daily_targets.as_pairs() {
            let lower = (target * (1.0 - input.macro_band)) as f64;
            let upper = (target * (1.0 + input.macro_band)) as f64;
            let mut sum = Expression::from(0.0);
            let mut has_any = false;
            for (slot_idx, slot) in input.slots.iter().enumerate() {
                if slot.day_index != day {
                    continue;
                }
                for (recipe_idx, recipe) in input.candidates.iter().enumerate() {
                    if let Some(&v) = var_index.get(&(slot_idx, recipe_idx)) {
                        sum += recipe.macro_value(macro_name) as f64 * v;
                        has_any = true;
                    }
                }
            }
            if has_any {
                model = model.with(constraint!(sum.clone() >= lower));
                model = model.with(constraint!(sum <= upper));
            }
        }
    }

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(good_lp::ResolutionError::Infeasible) => return OptimizerOutcome::Infeasible,
        Err(good_lp::ResolutionError::Unbounded) => return OptimizerOutcome::Infeasible,
        Err(_) => return OptimizerOutcome::TimedOut,
    };

    let mut assignments = Vec::new();
    for (slot_idx, slot) in input.slots.iter().enumerate() {
        let mut chosen: Option<&Recipe> = None;
        for (recipe_idx, recipe) in input.candidates.iter().enumerate() {
            if let Some(&v) = var_index.get(&(slot_idx, recipe_idx)) {
                if solution.value(v) > 0.5 {
                    chosen = Some(recipe);
                    break;
                }
            }
        }
        let recipe = match chosen {
            Some(r) => r,
            None => return OptimizerOutcome::Infeasible,
        };
        assignments.push(PlanRecipeAssignment {
            slot: slot.clone(),
            recipe_id: recipe.id.clone(),
            recipe_name: recipe.name.clone(),
            nutrition: MacroTargets {
                kcal: recipe.kcal,
                protein_g: recipe.protein_g,
                carbs_g: recipe.carbs_g,
                fat_g: recipe.fat_g,
            },
            source: crate::domain::AssignmentSource::Db,
        });
    }

    OptimizerOutcome::Solved(assignments)
}
