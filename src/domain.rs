//! Core data model: `UserProfile`, `Recipe`, `MacroTargets`, and the plan
//! types assembled by the planners.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Dietary restriction a user may require every assigned recipe to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietaryRestriction {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    Halal,
    Kosher,
    Custom(String),
}

/// Cuisine tag used for variety scoring and recommendation reasons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cuisine {
    Italian,
    Indian,
    Mexican,
    Chinese,
    Japanese,
    French,
    American,
    Mediterranean,
    Thai,
    Korean,
    Vietnamese,
    Greek,
    Spanish,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionGoal {
    Lose,
    Maintain,
    Gain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

/// Immutable per-request input to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f32,
    pub weight_kg: f32,
    pub activity_level: ActivityLevel,
    pub nutrition_goal: NutritionGoal,
    pub meals_per_day: u8,
    pub budget_tier: BudgetTier,
    pub max_cooking_minutes: Option<u32>,
    pub dietary_restrictions: HashSet<DietaryRestriction>,
    pub preferred_cuisines: Vec<Cuisine>,
    pub disliked_recipe_ids: HashSet<String>,
}

impl UserProfile {
    /// `meals_per_day` defaults to 3 when unset upstream.
    pub fn meals_per_day_or_default(&self) -> u8 {
        if self.meals_per_day == 0 {
            3
        } else {
            self.meals_per_day
        }
    }
}

/// Per-day nutrient envelope produced by the Macro Target Oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub kcal: f32,
    pub protein_g: f32,
    pub carbs_g: f32,
    pub fat_g: f32,
}

impl MacroTargets {
    /// Iterate the four macros as `(name, target_value)` pairs, the shape
    /// the optimizer and quality grader both need for per-macro bands.
    pub fn as_pairs(&self) -> [(&'static str, f32); 4] {
        [
            ("kcal", self.kcal),
            ("protein_g", self.protein_g),
            ("carbs_g", self.carbs_g),
            ("fat_g", self.fat_g),
        ]
    }
}

/// A meal-slot kind within a day. Snacks are homogeneous: `Snack(1)`/`Snack(2)`
/// are interchangeable and no test should assert which one a given recipe
/// lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealSlotKind {
    Breakfast,
    Lunch,
    Dinner,
    Snack(u8),
}

impl MealSlotKind {
    pub fn as_str(&self) -> String {
        match self {
            MealSlotKind::Breakfast => "breakfast".to_string(),
            MealSlotKind::Lunch => "lunch".to_string(),
            MealSlotKind::Dinner => "dinner".to_string(),
            MealSlotKind::Snack(_) => "snack".to_string(),
        }
    }

    /// The fixed within-day ordering used to order assignments.
    fn order_key(&self) -> u8 {
        match self {
            MealSlotKind::Breakfast => 0,
            MealSlotKind::Lunch => 1,
            MealSlotKind::Dinner => 2,
            MealSlotKind::Snack(n) => 2 + n,
        }
    }

    /// Build the slot kinds required for a day given the user's `meals_per_day`
    /// (3 => breakfast/lunch/dinner, 4 => + one snack, up to 6 => + two snacks
    /// and a doubled-up main slot collapses to extra snacks).
    pub fn for_meals_per_day(meals_per_day: u8) -> Vec<MealSlotKind> {
        let mut slots = vec![
            MealSlotKind::Breakfast,
            MealSlotKind::Lunch,
            MealSlotKind::Dinner,
        ];
        let extra_snacks = meals_per_day.saturating_sub(3).min(3);
        for i in 1..=extra_snacks {
            slots.push(MealSlotKind::Snack(i));
        }
        slots
    }
}

/// One (day, meal-type) cell to be filled with one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanSlot {
    pub day_index: u8, // 0..6
    pub meal_type: MealSlotKind,
}

impl PlanSlot {
    pub fn sort_key(&self) -> (u8, u8) {
        (self.day_index, self.meal_type.order_key())
    }
}

/// A selectable meal unit. Read-only from the generator's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub breakfast_suitable: bool,
    pub lunch_suitable: bool,
    pub dinner_suitable: bool,
    pub snack_suitable: bool,
    pub kcal: f32,
    pub protein_g: f32,
    pub carbs_g: f32,
    pub fat_g: f32,
    pub dietary_tags: HashSet<DietaryRestriction>,
    pub cuisine: Cuisine,
    pub budget_tier: BudgetTier,
    pub total_cooking_minutes: u32,
    pub has_ingredients_and_instructions: bool,
}

impl Recipe {
    pub fn suitable_for(&self, slot: MealSlotKind) -> bool {
        match slot {
            MealSlotKind::Breakfast => self.breakfast_suitable,
            MealSlotKind::Lunch => self.lunch_suitable,
            MealSlotKind::Dinner => self.dinner_suitable,
            MealSlotKind::Snack(_) => self.snack_suitable,
        }
    }

    pub fn satisfies_restriction(&self, restriction: &DietaryRestriction) -> bool {
        match restriction {
            DietaryRestriction::Custom(_) => self.dietary_tags.contains(restriction),
            other => self.dietary_tags.contains(other),
        }
    }

    pub fn macro_value(&self, name: &str) -> f32 {
        match name {
            "kcal" => self.kcal,
            "protein_g" => self.protein_g,
            "carbs_g" => self.carbs_g,
            "fat_g" => self.fat_g,
            _ => 0.0,
        }
    }
}

/// Binding of a Recipe to a PlanSlot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecipeAssignment {
    pub slot: PlanSlot,
    pub recipe_id: String,
    pub recipe_name: String,
    pub nutrition: MacroTargets,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentSource {
    Db,
    Generated,
}

/// Provenance label on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationSource {
    Optimizer,
    Greedy,
    Generative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReason {
    pub recipe_id: String,
    pub reason: String,
}

/// Full plan result emitted once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub user_id: String,
    pub assignments: Vec<PlanRecipeAssignment>,
    pub generation_source: GenerationSource,
    pub quality: Option<QualityMetrics>,
    pub recommendation_reasons: Vec<RecommendationReason>,
    pub fallback_reason: Option<String>,
    pub targets: MacroTargets,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl WeeklyPlan {
    /// Daily totals, ordered by day index 0..6.
    pub fn daily_totals(&self) -> Vec<(u8, MacroTargets)> {
        let mut totals: Vec<(u8, MacroTargets)> = (0..7)
            .map(|day| {
                let mut sum = MacroTargets {
                    kcal: 0.0,
                    protein_g: 0.0,
                    carbs_g: 0.0,
                    fat_g: 0.0,
                };
                for a in self.assignments.iter().filter(|a| a.slot.day_index == day) {
                    sum.kcal += a.nutrition.kcal;
                    sum.protein_g += a.nutrition.protein_g;
                    sum.carbs_g += a.nutrition.carbs_g;
                    sum.fat_g += a.nutrition.fat_g;
                }
                (day, sum)
            })
            .collect();
        totals.sort_by_key(|(day, _)| *day);
        totals
    }

    /// Recipe ids used in this plan, for next week's historical-exclusion set.
    pub fn recipe_ids(&self) -> HashSet<String> {
        self.assignments.iter().map(|a| a.recipe_id.clone()).collect()
    }
}

/// Quality metrics computed by the quality grader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub liked_ratio: f32,
    pub macro_deviation_max: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meals_per_day_defaults_to_three_slots() {
        let slots = MealSlotKind::for_meals_per_day(3);
        assert_eq!(slots.len(), 3);
        assert!(slots.contains(&MealSlotKind::Breakfast));
        assert!(!slots.iter().any(|s| matches!(s, MealSlotKind::Snack(_))));
    }

    #[test]
    fn meals_per_day_six_adds_three_snacks() {
        let slots = MealSlotKind::for_meals_per_day(6);
        assert_eq!(slots.len(), 6);
        let snack_count = slots
            .iter()
            .filter(|s| matches!(s, MealSlotKind::Snack(_)))
            .count();
        assert_eq!(snack_count, 3);
    }

    #[test]
    fn plan_slot_sort_key_orders_by_day_then_meal_type() {
        let a = PlanSlot {
            day_index: 0,
            meal_type: MealSlotKind::Dinner,
        };
        let b = PlanSlot {
            day_index: 1,
            meal_type: MealSlotKind::Breakfast,
        };
        assert!(a.sort_key() < b.sort_key());
    }
}
