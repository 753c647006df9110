//! Greedy Fallback Planner: a per-slot scoring heuristic used when the
//! optimizer times out or its solution fails quality grading. Never fails
//! outright — it may leave slots unfilled, which the coordinator hands to
//! the generative backstop.

use crate::domain::{MacroTargets, PlanRecipeAssignment, PlanSlot, Recipe};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

const TOP_N_FOR_VARIETY: usize = 5;

const LIKED_BONUS: f32 = 50.0;
const COMPLETE_DATA_BONUS: f32 = 10.0;
const UNUSED_BONUS: f32 = 15.0;

#[derive(Debug, Clone)]
pub struct GreedyInput<'a> {
    pub slots: &'a [PlanSlot],
    pub candidates: &'a [Recipe],
    pub liked_recipe_ids: &'a HashSet<String>,
    pub disliked_recipe_ids: &'a HashSet<String>,
    pub daily_targets: &'a MacroTargets,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct GreedyOutcome {
    pub assignments: Vec<PlanRecipeAssignment>,
    pub unfilled_slots: Vec<PlanSlot>,
}

/// Walks slots in day/meal-type order, tracking running per-day macro
/// totals so each pick can be scored by how close it keeps the day to
/// target. A recipe already used `allowed_uses` times (1 normally, 2 when
/// the candidate pool is smaller than the slot count) is excluded from
/// consideration entirely, not just penalized. Among the remaining
/// candidates, scores by:
/// - macro proximity: closer to the remaining per-day headroom scores higher,
/// - `+50` if liked,
/// - `+10` if the recipe has complete ingredient/instruction data,
/// - `+15` if not yet used elsewhere in the week (variety),
/// then samples uniformly from the top 5 scorers rather than always taking
/// the single best, so repeated runs with the same seed are deterministic
/// but different seeds produce different weeks.
pub fn plan(input: GreedyInput) -> GreedyOutcome {
    let mut rng = match input.seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s),
        None => rand::rngs::StdRng::from_entropy(),
    };

    let mut ordered_slots: Vec<&PlanSlot> = input.slots.iter().collect();
    ordered_slots.sort_by_key(|s| s.sort_key());

    let allowed_uses: u32 = if input.candidates.len() < input.slots.len() {
        2
    } else {
        1
    };

    let mut used_recipe_ids: HashMap<String, u32> = HashMap::new();
    let mut daily_running: HashMap<u8, MacroTargets> = HashMap::new();
    let mut assignments = Vec::new();
    let mut unfilled_slots = Vec::new();

    for slot in ordered_slots {
        let running = daily_running
            .entry(slot.day_index)
            .or_insert(MacroTargets {
                kcal: 0.0,
                protein_g: 0.0,
                carbs_g: 0.0,
                fat_g: 0.0,
            });

        let mut scored: Vec<(f32, &Recipe)> = input
            .candidates
            .iter()
            .filter(|r| r.suitable_for(slot.meal_type))
            .filter(|r| !input.disliked_recipe_ids.contains(&r.id))
            .filter(|r| used_recipe_ids.get(&r.id).copied().unwrap_or(0) < allowed_uses)
            .map(|r| (score(r, input.liked_recipe_ids, running, input.daily_targets, &used_recipe_ids), r))
            .collect();

        if scored.is_empty() {
            unfilled_slots.push(slot.clone());
            continue;
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        let top_n = &scored[..scored.len().min(TOP_N_FOR_VARIETY)];
        let chosen = top_n
            .choose(&mut rng)
            .map(|(_, r)| *r)
            .expect("top_n is non-empty");

        running.kcal += chosen.kcal;
        running.protein_g += chosen.protein_g;
        running.carbs_g += chosen.carbs_g;
        running.fat_g += chosen.fat_g;
        *used_recipe_ids.entry(chosen.id.clone()).or_insert(0) += 1;

        assignments.push(PlanRecipeAssignment {
            slot: slot.clone(),
            recipe_id: chosen.id.clone(),
            recipe_name: chosen.name.clone(),
            nutrition: MacroTargets {
                kcal: chosen.kcal,
                protein_g: chosen.protein_g,
                carbs_g: chosen.carbs_g,
                fat_g: chosen.fat_g,
            },
            source: crate::domain::AssignmentSource::Db,
        });
    }

    GreedyOutcome {
        assignments,
        unfilled_slots,
    }
}

fn score(
    recipe: &Recipe,
    liked_recipe_ids: &HashSet<String>,
    running_before: &MacroTargets,
    daily_targets: &MacroTargets,
    used_recipe_ids: &HashMap<String, u32>,
) -> f32 {
    let mut total = 0.0;

    for (name, target) in daily_targets.as_pairs() {
        if target <= 0.0 {
            continue;
        }
        let projected = running_before.macro_value(name) + recipe.macro_value(name);
        let deviation = (projected - target).abs() / target;
        total += (1.0 - deviation.min(1.0)) * 25.0;
    }

    if liked_recipe_ids.contains(&recipe.id) {
        total += LIKED_BONUS;
    }
    if recipe.has_ingredients_and_instructions {
        total += COMPLETE_DATA_BONUS;
    }
    if !used_recipe_ids.contains_key(&recipe.id) {
        total += UNUSED_BONUS;
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetTier, Cuisine, MealSlotKind};

    fn recipe(id: &str, kcal: f32, complete: bool) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: format!("Recipe {id}"),
            active: true,
            breakfast_suitable: true,
            lunch_suitable: true,
            dinner_suitable: true,
            snack_suitable: true,
            kcal,
            protein_g: 30.0,
            carbs_g: 40.0,
            fat_g: 10.0,
            dietary_tags: HashSet::new(),
            cuisine: Cuisine::Italian,
            budget_tier: BudgetTier::Medium,
            total_cooking_minutes: 20,
            has_ingredients_and_instructions: complete,
        }
    }

    #[test]
    fn fills_all_slots_when_candidates_available() {
        let slots = vec![
            PlanSlot { day_index: 0, meal_type: MealSlotKind::Breakfast },
            PlanSlot { day_index: 0, meal_type: MealSlotKind::Lunch },
        ];
        let candidates = vec![recipe("a", 500.0, true), recipe("b", 600.0, true)];
        let targets = MacroTargets { kcal: 2000.0, protein_g: 120.0, carbs_g: 200.0, fat_g: 60.0 };
        let outcome = plan(GreedyInput {
            slots: &slots,
            candidates: &candidates,
            liked_recipe_ids: &HashSet::new(),
            disliked_recipe_ids: &HashSet::new(),
            daily_targets: &targets,
            seed: Some(42),
        });
        assert_eq!(outcome.assignments.len(), 2);
        assert!(outcome.unfilled_slots.is_empty());
    }

    #[test]
    fn leaves_slot_unfilled_when_no_suitable_candidate() {
        let slots = vec![PlanSlot { day_index: 0, meal_type: MealSlotKind::Breakfast }];
        let mut r = recipe("a", 500.0, true);
        r.breakfast_suitable = false;
        let targets = MacroTargets { kcal: 2000.0, protein_g: 120.0, carbs_g: 200.0, fat_g: 60.0 };
        let outcome = plan(GreedyInput {
            slots: &slots,
            candidates: &[r],
            liked_recipe_ids: &HashSet::new(),
            disliked_recipe_ids: &HashSet::new(),
            daily_targets: &targets,
            seed: Some(1),
        });
        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.unfilled_slots.len(), 1);
    }

    #[test]
    fn disliked_recipes_are_never_picked() {
        let slots = vec![PlanSlot { day_index: 0, meal_type: MealSlotKind::Breakfast }];
        let candidates = vec![recipe("a", 500.0, true)];
        let disliked: HashSet<String> = ["a".to_string()].into_iter().collect();
        let targets = MacroTargets { kcal: 2000.0, protein_g: 120.0, carbs_g: 200.0, fat_g: 60.0 };
        let outcome = plan(GreedyInput {
            slots: &slots,
            candidates: &candidates,
            liked_recipe_ids: &HashSet::new(),
            disliked_recipe_ids: &disliked,
            daily_targets: &targets,
            seed: Some(1),
        });
        assert!(outcome.assignments.is_empty());
        assert_eq!(outcome.unfilled_slots.len(), 1);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let slots = vec![PlanSlot { day_index: 0, meal_type: MealSlotKind::Breakfast }];
        let candidates: Vec<Recipe> = (0..8).map(|i| recipe(&i.to_string(), 500.0, true)).collect();
        let targets = MacroTargets { kcal: 2000.0, protein_g: 120.0, carbs_g: 200.0, fat_g: 60.0 };
        let run = |seed| {
            plan(GreedyInput {
                slots: &slots,
                candidates: &candidates,
                liked_recipe_ids: &HashSet::new(),
                disliked_recipe_ids: &HashSet::new(),
                daily_targets: &targets,
                seed: Some(seed),
            })
            .assignments[0]
                .recipe_id
                .clone()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn never_exceeds_allowed_uses_with_a_small_pool() {
        let slots: Vec<PlanSlot> = (0..7)
            .flat_map(|day| {
                [MealSlotKind::Breakfast, MealSlotKind::Lunch, MealSlotKind::Dinner]
                    .into_iter()
                    .map(move |meal_type| PlanSlot { day_index: day, meal_type })
            })
            .collect();
        // Only 3 distinct recipes for 21 slots: pool < slot count, so each
        // recipe may be used at most twice.
        let candidates = vec![
            recipe("a", 650.0, true),
            recipe("b", 650.0, true),
            recipe("c", 650.0, true),
        ];
        let targets = MacroTargets { kcal: 2000.0, protein_g: 120.0, carbs_g: 200.0, fat_g: 60.0 };
        let outcome = plan(GreedyInput {
            slots: &slots,
            candidates: &candidates,
            liked_recipe_ids: &HashSet::new(),
            disliked_recipe_ids: &HashSet::new(),
            daily_targets: &targets,
            seed: Some(3),
        });

        let mut counts: std::collections::HashMap<String, u32> = std::collections::HashMap::new();
        for a in &outcome.assignments {
            *counts.entry(a.recipe_id.clone()).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&n| n <= 2), "counts: {counts:?}");
    }
}
