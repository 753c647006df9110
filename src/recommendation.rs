//! Recommendation reason generation. For every assignment, names the single
//! strongest reason it was chosen, in priority order: liked > preferred
//! cuisine match > macro fit. The macro-fit fallback only applies to
//! optimizer-sourced plans, since it is the only tier that actually
//! optimizes for macro fit directly — greedy and generative assignments get
//! no reason at all rather than a manufactured one when they're neither
//! liked nor cuisine-matched.

use crate::domain::{GenerationSource, PlanRecipeAssignment, RecommendationReason, Recipe, UserProfile};
use std::collections::{HashMap, HashSet};

pub fn build_reasons(
    assignments: &[PlanRecipeAssignment],
    recipes_by_id: &HashMap<String, Recipe>,
    profile: &UserProfile,
    liked_recipe_ids: &HashSet<String>,
    source: GenerationSource,
) -> Vec<RecommendationReason> {
    assignments
        .iter()
        .filter_map(|assignment| {
            let reason = recipes_by_id
                .get(&assignment.recipe_id)
                .and_then(|recipe| reason_for(recipe, profile, liked_recipe_ids, source))?;
            Some(RecommendationReason {
                recipe_id: assignment.recipe_id.clone(),
                reason,
            })
        })
        .collect()
}

fn reason_for(
    recipe: &Recipe,
    profile: &UserProfile,
    liked_recipe_ids: &HashSet<String>,
    source: GenerationSource,
) -> Option<String> {
    if liked_recipe_ids.contains(&recipe.id) {
        return Some("one of your liked recipes".to_string());
    }

    if profile.preferred_cuisines.contains(&recipe.cuisine) {
        return Some(format!("matches your preference for {:?} cuisine", recipe.cuisine));
    }

    if source == GenerationSource::Optimizer {
        return Some("fits your macro targets for the day".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ActivityLevel, AssignmentSource, BudgetTier, Cuisine, MacroTargets, MealSlotKind,
        NutritionGoal, PlanSlot, Sex,
    };

    fn profile(preferred: Vec<Cuisine>) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            age: 30,
            sex: Sex::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity_level: ActivityLevel::ModeratelyActive,
            nutrition_goal: NutritionGoal::Maintain,
            meals_per_day: 3,
            budget_tier: BudgetTier::Medium,
            max_cooking_minutes: None,
            dietary_restrictions: HashSet::new(),
            preferred_cuisines: preferred,
            disliked_recipe_ids: HashSet::new(),
        }
    }

    fn recipe(id: &str, cuisine: Cuisine) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: id.to_string(),
            active: true,
            breakfast_suitable: true,
            lunch_suitable: true,
            dinner_suitable: true,
            snack_suitable: true,
            kcal: 500.0,
            protein_g: 30.0,
            carbs_g: 40.0,
            fat_g: 10.0,
            dietary_tags: HashSet::new(),
            cuisine,
            budget_tier: BudgetTier::Medium,
            total_cooking_minutes: 20,
            has_ingredients_and_instructions: true,
        }
    }

    fn assignment(recipe_id: &str) -> PlanRecipeAssignment {
        PlanRecipeAssignment {
            slot: PlanSlot { day_index: 0, meal_type: MealSlotKind::Breakfast },
            recipe_id: recipe_id.to_string(),
            recipe_name: recipe_id.to_string(),
            nutrition: MacroTargets { kcal: 500.0, protein_g: 30.0, carbs_g: 40.0, fat_g: 10.0 },
            source: AssignmentSource::Db,
        }
    }

    #[test]
    fn liked_takes_priority_over_cuisine_match() {
        let r = recipe("a", Cuisine::Italian);
        let mut by_id = HashMap::new();
        by_id.insert("a".to_string(), r);
        let liked: HashSet<String> = ["a".to_string()].into_iter().collect();
        let reasons = build_reasons(
            &[assignment("a")],
            &by_id,
            &profile(vec![Cuisine::Italian]),
            &liked,
            GenerationSource::Optimizer,
        );
        assert!(reasons[0].reason.contains("liked"));
    }

    #[test]
    fn cuisine_match_takes_priority_over_macro_fit() {
        let r = recipe("a", Cuisine::Thai);
        let mut by_id = HashMap::new();
        by_id.insert("a".to_string(), r);
        let reasons = build_reasons(
            &[assignment("a")],
            &by_id,
            &profile(vec![Cuisine::Thai]),
            &HashSet::new(),
            GenerationSource::Greedy,
        );
        assert!(reasons[0].reason.contains("preference"));
    }

    #[test]
    fn falls_back_to_macro_fit_for_optimizer_plans() {
        let r = recipe("a", Cuisine::Greek);
        let mut by_id = HashMap::new();
        by_id.insert("a".to_string(), r);
        let reasons = build_reasons(
            &[assignment("a")],
            &by_id,
            &profile(vec![]),
            &HashSet::new(),
            GenerationSource::Optimizer,
        );
        assert!(reasons[0].reason.contains("macro"));
    }

    #[test]
    fn omits_reason_for_non_optimizer_plans_with_no_liked_or_cuisine_match() {
        let r = recipe("a", Cuisine::Greek);
        let mut by_id = HashMap::new();
        by_id.insert("a".to_string(), r);
        let reasons = build_reasons(
            &[assignment("a")],
            &by_id,
            &profile(vec![]),
            &HashSet::new(),
            GenerationSource::Greedy,
        );
        assert!(reasons.is_empty());
    }

    #[test]
    fn still_surfaces_liked_reason_for_generative_plans() {
        let r = recipe("a", Cuisine::Greek);
        let mut by_id = HashMap::new();
        by_id.insert("a".to_string(), r);
        let liked: HashSet<String> = ["a".to_string()].into_iter().collect();
        let reasons = build_reasons(
            &[assignment("a")],
            &by_id,
            &profile(vec![]),
            &liked,
            GenerationSource::Generative,
        );
        assert!(reasons[0].reason.contains("liked"));
    }
}
