//! Quality grading: scores a completed plan so the coordinator can decide
//! whether to accept it or fall through to the next planner tier.

use crate::domain::{MacroTargets, PlanRecipeAssignment, QualityMetrics};
use std::collections::HashSet;

/// `liked_ratio` is the share of assignments whose recipe is in the user's
/// liked set. `macro_deviation_max` is the worst per-day, per-macro relative
/// deviation from `daily_targets` across the week.
pub fn grade(
    assignments: &[PlanRecipeAssignment],
    liked_recipe_ids: &HashSet<String>,
    daily_targets: &MacroTargets,
) -> QualityMetrics {
    let liked_ratio = if assignments.is_empty() {
        0.0
    } else {
        let liked_count = assignments
            .iter()
            .filter(|a| liked_recipe_ids.contains(&a.recipe_id))
            .count();
        liked_count as f32 / assignments.len() as f32
    };

    let mut daily_totals: std::collections::HashMap<u8, MacroTargets> =
        std::collections::HashMap::new();
    for assignment in assignments {
        let entry = daily_totals
            .entry(assignment.slot.day_index)
            .or_insert(MacroTargets {
                kcal: 0.0,
                protein_g: 0.0,
                carbs_g: 0.0,
                fat_g: 0.0,
            });
        entry.kcal += assignment.nutrition.kcal;
        entry.protein_g += assignment.nutrition.protein_g;
        entry.carbs_g += assignment.nutrition.carbs_g;
        entry.fat_g += assignment.nutrition.fat_g;
    }

    let mut macro_deviation_max: f32 = 0.0;
    for totals in daily_totals.values() {
        for (name, target) in daily_targets.as_pairs() {
            if target <= 0.0 {
                continue;
            }
            let actual = totals.macro_value(name);
            let deviation = (actual - target).abs() / target;
            if deviation > macro_deviation_max {
                macro_deviation_max = deviation;
            }
        }
    }

    QualityMetrics {
        liked_ratio,
        macro_deviation_max,
    }
}

pub fn is_acceptable(metrics: &QualityMetrics, min_liked_ratio: f32, max_macro_deviation: f32) -> bool {
    metrics.liked_ratio >= min_liked_ratio && metrics.macro_deviation_max <= max_macro_deviation
}
