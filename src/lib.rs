pub mod catalog_query;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod feasibility;
pub mod greedy_fallback;
pub mod optimizer;
pub mod ports;
pub mod quality_grader;
pub mod recommendation;

pub use catalog_query::{CandidatePool, CoverageReport};
pub use config::Settings;
pub use coordinator::{GenerationCoordinator, GenerationRequest, Stage};
pub use domain::{
    ActivityLevel, AssignmentSource, BudgetTier, Cuisine, DietaryRestriction, GenerationSource,
    MacroTargets, MealSlotKind, NutritionGoal, PlanRecipeAssignment, PlanSlot, QualityMetrics,
    Recipe, RecommendationReason, Sex, UserProfile, WeeklyPlan,
};
pub use error::MealPlanError;
pub use feasibility::FeasibilityVerdict;
pub use ports::{CatalogPort, GenerativeBackstopAdapter, HttpMacroOracle, MacroOracleAdapter, PlanStore, RatingsPort, RecipeFilter};
