//! Error taxonomy for the generator core. A single `thiserror`-derived enum,
//! split between a precise domain error and adapter-level `#[from]` sources.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MealPlanError {
    #[error("macro target derivation failed: {0}")]
    MacroDerivationFailed(String),

    #[error("no viable recipes after hard filters (coverage gap: {0:?})")]
    NoViableRecipes(Vec<String>),

    #[error("goal combination is impossible: {0}")]
    Impossible(String),

    #[error("all generation tiers failed, generation is unavailable")]
    GenerationUnavailable,

    #[error("request was canceled")]
    Canceled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("macro oracle HTTP call failed: {0}")]
    OracleHttp(#[from] reqwest::Error),

    #[error("solver error: {0}")]
    Solver(String),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl MealPlanError {
    /// Only `Impossible` carries actionable detail to the end user;
    /// everything else maps to a generic retry message.
    pub fn user_facing_message(&self) -> String {
        match self {
            MealPlanError::Impossible(reason) => format!("This plan isn't possible: {reason}"),
            _ => "could not generate plan, please retry".to_string(),
        }
    }
}
