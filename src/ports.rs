//! Abstract adapters the generator depends on. These are narrow traits, not
//! storage-technology-specific, so the core stays decoupled from whatever
//! database or HTTP service backs the real catalog and ratings store.

use crate::domain::{MacroTargets, Recipe, UserProfile, WeeklyPlan};
use crate::error::MealPlanError;
use async_trait::async_trait;
use std::collections::HashSet;

/// A filter the catalog query can push down to the catalog read side. Kept
/// intentionally thin: the catalog query performs the dietary/soft-preference
/// logic itself, this only scopes the rows fetched.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub active_only: bool,
}

/// Read-only recipe catalog access.
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn list_recipes(&self, filter: RecipeFilter) -> anyhow::Result<Vec<Recipe>>;
}

/// Rating/history store access.
#[async_trait]
pub trait RatingsPort: Send + Sync {
    async fn get_likes(&self, user_id: &str) -> anyhow::Result<HashSet<String>>;
    async fn get_dislikes(&self, user_id: &str) -> anyhow::Result<HashSet<String>>;
    async fn get_rating_count(&self, user_id: &str) -> anyhow::Result<u32>;
    async fn get_previous_plan_recipes(&self, user_id: &str) -> anyhow::Result<HashSet<String>>;
}

/// Plan persistence and best-effort activity logging.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn save_plan(&self, plan: &WeeklyPlan) -> anyhow::Result<()>;

    /// Best-effort: never blocks the generation pipeline, errors are logged
    /// and swallowed by the caller.
    async fn log_event(&self, kind: &str, payload: serde_json::Value);
}

/// The external LLM service adapter behind the Macro Target Oracle.
/// Intentionally the only non-deterministic external dependency of the core.
#[async_trait]
pub trait MacroOracleAdapter: Send + Sync {
    async fn derive_targets(&self, profile: &UserProfile) -> Result<MacroTargets, MealPlanError>;
}

/// External meal-synthesis service used only when no planner tier produces
/// an acceptable plan.
#[async_trait]
pub trait GenerativeBackstopAdapter: Send + Sync {
    /// Synthesize recipes for exactly the slots named; the coordinator fills
    /// only the unfilled slots rather than re-planning the whole week.
    async fn synthesize(
        &self,
        profile: &UserProfile,
        targets: &MacroTargets,
        slots: &[crate::domain::PlanSlot],
    ) -> anyhow::Result<Vec<crate::domain::PlanRecipeAssignment>>;
}

/// `reqwest`-backed implementation of [`MacroOracleAdapter`]: a thin HTTP
/// client wrapper around a single endpoint.
pub struct HttpMacroOracle {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMacroOracle {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        HttpMacroOracle {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[derive(serde::Serialize)]
struct MacroOracleRequest<'a> {
    age: u32,
    sex: &'a str,
    height_cm: f32,
    weight_kg: f32,
    activity_level: &'a str,
    nutrition_goal: &'a str,
    meals_per_day: u8,
}

#[derive(serde::Deserialize)]
struct MacroOracleResponse {
    kcal: f32,
    protein_g: f32,
    carbs_g: f32,
    fat_g: f32,
}

#[async_trait]
impl MacroOracleAdapter for HttpMacroOracle {
    async fn derive_targets(&self, profile: &UserProfile) -> Result<MacroTargets, MealPlanError> {
        let sex = match profile.sex {
            crate::domain::Sex::Male => "male",
            crate::domain::Sex::Female => "female",
        };
        let activity_level = match profile.activity_level {
            crate::domain::ActivityLevel::Sedentary => "sedentary",
            crate::domain::ActivityLevel::LightlyActive => "lightly_active",
            crate::domain::ActivityLevel::ModeratelyActive => "moderately_active",
            crate::domain::ActivityLevel::VeryActive => "very_active",
            crate::domain::ActivityLevel::ExtraActive => "extra_active",
        };
        let nutrition_goal = match profile.nutrition_goal {
            crate::domain::NutritionGoal::Lose => "lose",
            crate::domain::NutritionGoal::Maintain => "maintain",
            crate::domain::NutritionGoal::Gain => "gain",
        };

        let mut request = self.client.post(&self.endpoint).json(&MacroOracleRequest {
            age: profile.age,
            sex,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            activity_level,
            nutrition_goal,
            meals_per_day: profile.meals_per_day_or_default(),
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MealPlanError::MacroDerivationFailed(format!(
                "oracle returned status {}",
                response.status()
            )));
        }

        let parsed: MacroOracleResponse = response
            .json()
            .await
            .map_err(|e| MealPlanError::MacroDerivationFailed(e.to_string()))?;

        if parsed.kcal <= 0.0 || parsed.protein_g < 0.0 || parsed.carbs_g < 0.0 || parsed.fat_g < 0.0 {
            return Err(MealPlanError::MacroDerivationFailed(
                "oracle returned non-positive or negative macro values".to_string(),
            ));
        }

        Ok(MacroTargets {
            kcal: parsed.kcal,
            protein_g: parsed.protein_g,
            carbs_g: parsed.carbs_g,
            fat_g: parsed.fat_g,
        })
    }
}
