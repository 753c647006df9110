//! Demo CLI driving the generation coordinator against in-memory fake
//! adapters. Not wired to any real catalog or rating store: it exists so
//! the core library's public surface can be exercised end to end without a
//! database.

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use meal_planning::{
    ActivityLevel, BudgetTier, CatalogPort, GenerationCoordinator, GenerationRequest,
    GenerativeBackstopAdapter, MacroOracleAdapter, MacroTargets, MealPlanError, NutritionGoal,
    PlanRecipeAssignment, PlanSlot, PlanStore, RatingsPort, Recipe, RecipeFilter, Settings, Sex,
    UserProfile, WeeklyPlan,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// mealplan-cli - generate a sample weekly meal plan
#[derive(Parser)]
#[command(name = "mealplan-cli")]
#[command(about = "Generate a personalized weekly meal plan from seed data", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long)]
    config: Option<String>,

    /// User id to generate a plan for
    #[arg(long, default_value = "demo-user")]
    user_id: String,
}

struct InMemoryCatalog {
    recipes: Vec<Recipe>,
}

#[async_trait]
impl CatalogPort for InMemoryCatalog {
    async fn list_recipes(&self, filter: RecipeFilter) -> anyhow::Result<Vec<Recipe>> {
        Ok(self
            .recipes
            .iter()
            .filter(|r| !filter.active_only || r.active)
            .cloned()
            .collect())
    }
}

struct NoHistoryRatings;

#[async_trait]
impl RatingsPort for NoHistoryRatings {
    async fn get_likes(&self, _user_id: &str) -> anyhow::Result<HashSet<String>> {
        Ok(HashSet::new())
    }
    async fn get_dislikes(&self, _user_id: &str) -> anyhow::Result<HashSet<String>> {
        Ok(HashSet::new())
    }
    async fn get_rating_count(&self, _user_id: &str) -> anyhow::Result<u32> {
        Ok(0)
    }
    async fn get_previous_plan_recipes(&self, _user_id: &str) -> anyhow::Result<HashSet<String>> {
        Ok(HashSet::new())
    }
}

struct StdoutPlanStore;

#[async_trait]
impl PlanStore for StdoutPlanStore {
    async fn save_plan(&self, plan: &WeeklyPlan) -> anyhow::Result<()> {
        println!(
            "generated {} assignments for {} via {:?}",
            plan.assignments.len(),
            plan.user_id,
            plan.generation_source
        );
        Ok(())
    }

    async fn log_event(&self, kind: &str, payload: serde_json::Value) {
        tracing::debug!(kind, %payload, "plan event");
    }
}

/// Fixed macro-target stub standing in for the real LLM-backed oracle
/// (`HttpMacroOracle` in `ports.rs`) for offline demo runs.
struct FixedMacroOracle;

#[async_trait]
impl MacroOracleAdapter for FixedMacroOracle {
    async fn derive_targets(&self, _profile: &UserProfile) -> Result<MacroTargets, MealPlanError> {
        Ok(MacroTargets {
            kcal: 2000.0,
            protein_g: 120.0,
            carbs_g: 220.0,
            fat_g: 65.0,
        })
    }
}

struct NullBackstop;

#[async_trait]
impl GenerativeBackstopAdapter for NullBackstop {
    async fn synthesize(
        &self,
        _profile: &UserProfile,
        _targets: &MacroTargets,
        _slots: &[PlanSlot],
    ) -> anyhow::Result<Vec<PlanRecipeAssignment>> {
        Ok(vec![])
    }
}

fn seed_recipes() -> Vec<Recipe> {
    use meal_planning::{BudgetTier as Tier, Cuisine, DietaryRestriction};

    let cuisines = [
        Cuisine::Italian,
        Cuisine::Mexican,
        Cuisine::Japanese,
        Cuisine::Mediterranean,
        Cuisine::Indian,
    ];

    (0..40)
        .map(|i| Recipe {
            id: format!("recipe-{i}"),
            name: format!("Sample Recipe {i}"),
            active: true,
            breakfast_suitable: i % 3 == 0,
            lunch_suitable: i % 3 == 1,
            dinner_suitable: i % 3 == 2 || i % 3 == 1,
            snack_suitable: i % 4 == 0,
            kcal: 450.0 + (i as f32 * 10.0),
            protein_g: 25.0 + (i as f32 * 0.5),
            carbs_g: 45.0 + (i as f32 * 0.8),
            fat_g: 12.0 + (i as f32 * 0.2),
            dietary_tags: HashSet::new(),
            cuisine: cuisines[i % cuisines.len()].clone(),
            budget_tier: match i % 3 {
                0 => Tier::Low,
                1 => Tier::Medium,
                _ => Tier::High,
            },
            total_cooking_minutes: 15 + (i as u32 % 4) * 10,
            has_ingredients_and_instructions: true,
        })
        .map(|mut r| {
            if r.id == "recipe-1" {
                r.dietary_tags.insert(DietaryRestriction::Vegan);
            }
            r
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .try_init()
        .ok();

    let settings = Settings::load(cli.config.as_deref())?;

    let profile = UserProfile {
        user_id: cli.user_id,
        age: 32,
        sex: Sex::Female,
        height_cm: 168.0,
        weight_kg: 62.0,
        activity_level: ActivityLevel::ModeratelyActive,
        nutrition_goal: NutritionGoal::Maintain,
        meals_per_day: 3,
        budget_tier: BudgetTier::Medium,
        max_cooking_minutes: Some(45),
        dietary_restrictions: HashSet::new(),
        preferred_cuisines: vec![],
        disliked_recipe_ids: HashSet::new(),
    };

    let coordinator = GenerationCoordinator::new(
        Arc::new(InMemoryCatalog { recipes: seed_recipes() }),
        Arc::new(NoHistoryRatings),
        Arc::new(StdoutPlanStore),
        Arc::new(FixedMacroOracle),
        Arc::new(NullBackstop),
        settings,
    );

    match coordinator.generate(GenerationRequest::new(profile)).await {
        Ok(plan) => {
            for assignment in &plan.assignments {
                println!(
                    "day {} {}: {}",
                    assignment.slot.day_index,
                    assignment.slot.meal_type.as_str(),
                    assignment.recipe_name
                );
            }
        }
        Err(e) => {
            eprintln!("{}", e.user_facing_message());
            std::process::exit(1);
        }
    }

    Ok(())
}
