//! Generation Coordinator: drives a single generation request through its
//! stages, enforcing the two time budgets and falling through optimizer ->
//! greedy -> generative backstop as each tier's output fails to clear
//! quality grading. Stage transitions and fallback decisions are logged
//! with `tracing` spans, one per request, with structured fields.

use crate::catalog_query::{self, CandidatePool};
use crate::config::Settings;
use crate::domain::{
    AssignmentSource, GenerationSource, MacroTargets, PlanRecipeAssignment, PlanSlot, Recipe,
    UserProfile, WeeklyPlan,
};
use crate::error::MealPlanError;
use crate::feasibility::{self, FeasibilityVerdict};
use crate::greedy_fallback::{self, GreedyInput};
use crate::optimizer::{self, OptimizerInput, OptimizerOutcome};
use crate::ports::{CatalogPort, GenerativeBackstopAdapter, MacroOracleAdapter, PlanStore, RatingsPort, RecipeFilter};
use crate::quality_grader;
use crate::recommendation;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// Input to a single generation run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub request_id: String,
    pub profile: UserProfile,
}

impl GenerationRequest {
    pub fn new(profile: UserProfile) -> Self {
        GenerationRequest {
            request_id: Uuid::new_v4().to_string(),
            profile,
        }
    }
}

/// Stages a request moves through, exposed for observability and for
/// callers that want to report progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    DerivingTargets,
    QueryingCatalog,
    Optimizing,
    Grading,
    Finalizing,
    Complete,
    Failed,
    Impossible,
}

pub struct GenerationCoordinator {
    catalog: Arc<dyn CatalogPort>,
    ratings: Arc<dyn RatingsPort>,
    plan_store: Arc<dyn PlanStore>,
    macro_oracle: Arc<dyn MacroOracleAdapter>,
    backstop: Arc<dyn GenerativeBackstopAdapter>,
    settings: Settings,
}

impl GenerationCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        ratings: Arc<dyn RatingsPort>,
        plan_store: Arc<dyn PlanStore>,
        macro_oracle: Arc<dyn MacroOracleAdapter>,
        backstop: Arc<dyn GenerativeBackstopAdapter>,
        settings: Settings,
    ) -> Self {
        GenerationCoordinator {
            catalog,
            ratings,
            plan_store,
            macro_oracle,
            backstop,
            settings,
        }
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<WeeklyPlan, MealPlanError> {
        let started = Instant::now();
        let total_budget = Duration::from_secs(self.settings.request.total_time_budget_secs);
        let span = tracing::info_span!(
            "generate_plan",
            user_id = %request.profile.user_id,
            request_id = %request.request_id,
        );
        let _enter = span.enter();

        info!(stage = ?Stage::DerivingTargets, "deriving macro targets");
        let targets = tokio::time::timeout(
            Duration::from_secs(self.settings.request.mto_timeout_secs),
            self.macro_oracle.derive_targets(&request.profile),
        )
        .await
        .map_err(|_| MealPlanError::MacroDerivationFailed("oracle timed out".to_string()))??;

        match feasibility::is_feasible(&targets, &request.profile) {
            FeasibilityVerdict::Impossible(reason) => {
                warn!(stage = ?Stage::Impossible, reason = %reason, "goal combination impossible");
                return Err(MealPlanError::Impossible(reason));
            }
            FeasibilityVerdict::Feasible => {}
        }

        if started.elapsed() > total_budget {
            return Err(MealPlanError::GenerationUnavailable);
        }

        info!(stage = ?Stage::QueryingCatalog, "querying catalog");
        let all_recipes = self
            .catalog
            .list_recipes(RecipeFilter { active_only: true })
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;
        let liked = self
            .ratings
            .get_likes(&request.profile.user_id)
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;
        let dislikes = self
            .ratings
            .get_dislikes(&request.profile.user_id)
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;
        let previous_week = self
            .ratings
            .get_previous_plan_recipes(&request.profile.user_id)
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;
        let rating_count = self
            .ratings
            .get_rating_count(&request.profile.user_id)
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;

        let mut profile = request.profile.clone();
        profile.disliked_recipe_ids.extend(dislikes.iter().cloned());

        let pool: CandidatePool = catalog_query::candidates(
            &all_recipes,
            &profile,
            &previous_week,
            self.settings.catalog.pool_floor,
            self.settings.catalog.pool_cap,
            None,
        );

        if pool.recipes.is_empty() {
            return Err(MealPlanError::NoViableRecipes(pool.coverage.empty_slot_kinds()));
        }

        let slots: Vec<PlanSlot> = (0..7u8)
            .flat_map(|day| {
                crate::domain::MealSlotKind::for_meals_per_day(profile.meals_per_day_or_default())
                    .into_iter()
                    .map(move |meal_type| PlanSlot { day_index: day, meal_type })
            })
            .collect();

        let recipes_by_id: HashMap<String, Recipe> = pool
            .recipes
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();

        let personalization_threshold = self.settings.optimizer.personalization_threshold;
        if rating_count < personalization_threshold {
            info!(
                rating_count,
                personalization_threshold, "rating count below personalization threshold, routing to greedy planner"
            );
        } else {
            info!(stage = ?Stage::Optimizing, rating_count, "running optimizer");
        }
        let (assignments, source, fallback_reason) = self
            .run_fallback_chain(
                &slots,
                &pool.recipes,
                &liked,
                &profile.disliked_recipe_ids,
                &targets,
                &profile,
                started,
                total_budget,
                rating_count,
            )
            .await?;

        if assignments.is_empty() {
            return Err(MealPlanError::GenerationUnavailable);
        }

        info!(stage = ?Stage::Grading, source = ?source, "grading plan");
        let quality = quality_grader::grade(&assignments, &liked, &targets);

        info!(stage = ?Stage::Finalizing, "finalizing plan");
        let recommendation_reasons =
            recommendation::build_reasons(&assignments, &recipes_by_id, &profile, &liked, source);

        let plan = WeeklyPlan {
            user_id: profile.user_id.clone(),
            assignments,
            generation_source: source,
            quality: Some(quality),
            recommendation_reasons,
            fallback_reason,
            targets,
            generated_at: chrono::Utc::now(),
        };

        self.plan_store
            .save_plan(&plan)
            .await
            .map_err(|e| MealPlanError::Internal(e.to_string()))?;
        self.plan_store
            .log_event(
                "weekly_plan_generated",
                serde_json::json!({
                    "user_id": plan.user_id,
                    "request_id": request.request_id,
                    "source": format!("{:?}", plan.generation_source),
                    "elapsed_ms": started.elapsed().as_millis() as u64,
                }),
            )
            .await;

        info!(stage = ?Stage::Complete, elapsed_ms = started.elapsed().as_millis() as u64, "plan complete");
        Ok(plan)
    }

    /// Runs the optimizer, then greedy, then generative backstop in turn,
    /// accepting the first tier whose output clears quality grading or, for
    /// the backstop, whatever it returns (it is the last resort). Hybrid
    /// routing: users with too little rating history to personalize against
    /// skip the optimizer tier entirely and go straight to the greedy
    /// planner, since the optimizer's liked-weighted objective has nothing
    /// meaningful to optimize for without enough ratings.
    #[allow(clippy::too_many_arguments)]
    async fn run_fallback_chain(
        &self,
        slots: &[PlanSlot],
        candidates: &[Recipe],
        liked: &HashSet<String>,
        disliked: &HashSet<String>,
        targets: &MacroTargets,
        profile: &UserProfile,
        started: Instant,
        total_budget: Duration,
        rating_count: u32,
    ) -> Result<(Vec<PlanRecipeAssignment>, GenerationSource, Option<String>), MealPlanError> {
        let personalization_threshold = self.settings.optimizer.personalization_threshold;
        let skip_optimizer = rating_count < personalization_threshold;

        if !skip_optimizer {
            let macro_band = self.settings.optimizer.macro_band;
            let solver_budget = Duration::from_secs(self.settings.optimizer.solver_time_budget_secs);

            // spawn_blocking requires 'static inputs, so the borrowed slices are
            // cloned into owned data before crossing the task boundary.
            let owned_slots = slots.to_vec();
            let owned_candidates = candidates.to_vec();
            let owned_liked = liked.clone();
            let owned_disliked = disliked.clone();
            let owned_targets = *targets;

            let optimizer_result = tokio::time::timeout(
                solver_budget,
                tokio::task::spawn_blocking(move || {
                    optimizer::solve(OptimizerInput {
                        slots: &owned_slots,
                        candidates: &owned_candidates,
                        liked_recipe_ids: &owned_liked,
                        disliked_recipe_ids: &owned_disliked,
                        daily_targets: &owned_targets,
                        macro_band,
                    })
                }),
            )
            .await;

            let optimizer_outcome = match optimizer_result {
                Ok(Ok(outcome)) => Some(outcome),
                Ok(Err(_)) => None,
                Err(_) => {
                    warn!("optimizer exceeded solver time budget, falling back");
                    None
                }
            };

            if let Some(OptimizerOutcome::Solved(assignments)) = optimizer_outcome {
                let quality = quality_grader::grade(&assignments, liked, targets);
                if quality_grader::is_acceptable(
                    &quality,
                    self.settings.quality.min_liked_ratio,
                    self.settings.quality.max_macro_deviation,
                ) {
                    return Ok((assignments, GenerationSource::Optimizer, None));
                }
                warn!("optimizer solution failed quality grading, falling back to greedy");
            } else {
                warn!("optimizer could not find a feasible solution, falling back to greedy");
            }
        } else {
            info!(rating_count, personalization_threshold, "skipping optimizer tier, insufficient rating history");
        }

        if started.elapsed() > total_budget {
            return Err(MealPlanError::GenerationUnavailable);
        }

        let greedy_outcome = greedy_fallback::plan(GreedyInput {
            slots,
            candidates,
            liked_recipe_ids: liked,
            disliked_recipe_ids: disliked,
            daily_targets: targets,
            seed: None,
        });

        if greedy_outcome.unfilled_slots.is_empty() {
            let reason = if skip_optimizer {
                None
            } else {
                Some("optimizer did not produce an acceptable plan".to_string())
            };
            return Ok((greedy_outcome.assignments, GenerationSource::Greedy, reason));
        }

        if started.elapsed() > total_budget {
            if greedy_outcome.assignments.is_empty() {
                return Err(MealPlanError::GenerationUnavailable);
            }
            return Ok((
                greedy_outcome.assignments,
                GenerationSource::Greedy,
                Some("time budget exhausted before the backstop could fill remaining slots".to_string()),
            ));
        }

        warn!(
            unfilled = greedy_outcome.unfilled_slots.len(),
            "greedy left slots unfilled, invoking generative backstop"
        );
        let backstop_budget = Duration::from_secs(self.settings.request.backstop_timeout_secs);
        let synthesized = tokio::time::timeout(
            backstop_budget,
            self.backstop
                .synthesize(profile, targets, &greedy_outcome.unfilled_slots),
        )
        .await;

        let mut assignments = greedy_outcome.assignments;
        match synthesized {
            Ok(Ok(mut generated)) => {
                generated.iter_mut().for_each(|a| a.source = AssignmentSource::Generated);
                assignments.append(&mut generated);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "generative backstop failed");
            }
            Err(_) => {
                warn!("generative backstop timed out");
            }
        }

        if assignments.is_empty() {
            return Err(MealPlanError::GenerationUnavailable);
        }

        Ok((
            assignments,
            GenerationSource::Generative,
            Some("optimizer and greedy planner both fell short; generative backstop filled remaining slots".to_string()),
        ))
    }
}

