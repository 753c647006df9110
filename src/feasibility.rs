//! Feasibility checking: rejects macro/diet combinations that no realistic
//! recipe set could satisfy, before any catalog query or solve is attempted.

use crate::domain::{DietaryRestriction, MacroTargets, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum FeasibilityVerdict {
    Feasible,
    Impossible(String),
}

/// Minimum realistic protein density (grams of protein per 100 kcal) a diet
/// class can sustain across a day of meals. Restrictive diets have a lower
/// ceiling because whole plant proteins are less calorie-dense than lean
/// animal protein.
fn max_protein_density_per_100_kcal(restrictions: &[DietaryRestriction]) -> f32 {
    let vegan_or_vegetarian = restrictions.iter().any(|r| {
        matches!(
            r,
            DietaryRestriction::Vegan | DietaryRestriction::Vegetarian
        )
    });
    if vegan_or_vegetarian {
        7.0
    } else {
        10.0
    }
}

/// Uses simple bounds: if the protein target implies a protein density
/// higher than any realistic recipe set under the profile's restrictions
/// could deliver within the calorie target, the combination is impossible.
/// Also rejects non-positive calorie targets outright.
pub fn is_feasible(targets: &MacroTargets, profile: &UserProfile) -> FeasibilityVerdict {
    if targets.kcal <= 0.0 {
        return FeasibilityVerdict::Impossible(
            "calorie target must be positive".to_string(),
        );
    }

    let restrictions: Vec<DietaryRestriction> =
        profile.dietary_restrictions.iter().cloned().collect();
    let density_cap = max_protein_density_per_100_kcal(&restrictions);
    let required_density = (targets.protein_g / targets.kcal) * 100.0;

    if required_density > density_cap {
        return FeasibilityVerdict::Impossible(format!(
            "target of {:.0}g protein on {:.0} kcal requires a protein density of {:.1}g/100kcal, \
             which exceeds what recipes compatible with the selected dietary restrictions can sustain \
             (max {:.1}g/100kcal)",
            targets.protein_g, targets.kcal, required_density, density_cap
        ));
    }

    // Calories implied by the macro breakdown alone should roughly match the
    // stated calorie target (protein/carbs = 4 kcal/g, fat = 9 kcal/g);
    // a gross mismatch signals an internally inconsistent or nonsensical target.
    let implied_kcal =
        targets.protein_g * 4.0 + targets.carbs_g * 4.0 + targets.fat_g * 9.0;
    if implied_kcal > 0.0 {
        let deviation = (implied_kcal - targets.kcal).abs() / targets.kcal;
        if deviation > 0.35 {
            return FeasibilityVerdict::Impossible(format!(
                "macro breakdown implies {:.0} kcal but the calorie target is {:.0} kcal \
                 ({:.0}% deviation), which is not internally consistent",
                implied_kcal,
                targets.kcal,
                deviation * 100.0
            ));
        }
    }

    FeasibilityVerdict::Feasible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityLevel, BudgetTier, NutritionGoal, Sex};
    use std::collections::HashSet;

    fn profile_with(restrictions: Vec<DietaryRestriction>) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            age: 30,
            sex: Sex::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            activity_level: ActivityLevel::ModeratelyActive,
            nutrition_goal: NutritionGoal::Lose,
            meals_per_day: 3,
            budget_tier: BudgetTier::Medium,
            max_cooking_minutes: None,
            dietary_restrictions: restrictions.into_iter().collect(),
            preferred_cuisines: vec![],
            disliked_recipe_ids: HashSet::new(),
        }
    }

    #[test]
    fn low_calorie_high_protein_vegan_is_impossible() {
        let profile = profile_with(vec![DietaryRestriction::Vegan]);
        let targets = MacroTargets {
            kcal: 1500.0,
            protein_g: 200.0,
            carbs_g: 100.0,
            fat_g: 40.0,
        };
        assert!(matches!(
            is_feasible(&targets, &profile),
            FeasibilityVerdict::Impossible(_)
        ));
    }

    #[test]
    fn extreme_deficit_high_protein_vegan_is_impossible() {
        let profile = profile_with(vec![DietaryRestriction::Vegan]);
        let targets = MacroTargets {
            kcal: 800.0,
            protein_g: 200.0,
            carbs_g: 50.0,
            fat_g: 20.0,
        };
        assert!(matches!(
            is_feasible(&targets, &profile),
            FeasibilityVerdict::Impossible(_)
        ));
    }

    #[test]
    fn reasonable_target_is_feasible() {
        let profile = profile_with(vec![]);
        let targets = MacroTargets {
            kcal: 2000.0,
            protein_g: 120.0,
            carbs_g: 220.0,
            fat_g: 65.0,
        };
        assert_eq!(is_feasible(&targets, &profile), FeasibilityVerdict::Feasible);
    }

    #[test]
    fn restrictive_but_reasonable_target_is_feasible() {
        let profile = profile_with(vec![
            DietaryRestriction::Vegan,
            DietaryRestriction::GlutenFree,
        ]);
        let targets = MacroTargets {
            kcal: 1800.0,
            protein_g: 120.0,
            carbs_g: 190.0,
            fat_g: 55.0,
        };
        assert_eq!(is_feasible(&targets, &profile), FeasibilityVerdict::Feasible);
    }

    #[test]
    fn non_positive_calorie_target_is_impossible() {
        let profile = profile_with(vec![]);
        let targets = MacroTargets {
            kcal: 0.0,
            protein_g: 50.0,
            carbs_g: 50.0,
            fat_g: 20.0,
        };
        assert!(matches!(
            is_feasible(&targets, &profile),
            FeasibilityVerdict::Impossible(_)
        ));
    }
}
