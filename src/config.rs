//! Layered configuration for the generator core: file plus environment
//! overrides, tolerating a missing file by falling back to defaults.

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    pub solver_time_budget_secs: u64,
    pub personalization_threshold: u32,
    pub macro_band: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            solver_time_budget_secs: 10,
            personalization_threshold: 10,
            macro_band: 0.10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    pub total_time_budget_secs: u64,
    pub mto_timeout_secs: u64,
    pub backstop_timeout_secs: u64,
    pub slow_warning_after_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        RequestConfig {
            total_time_budget_secs: 15,
            mto_timeout_secs: 8,
            backstop_timeout_secs: 8,
            slow_warning_after_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub pool_floor: usize,
    pub pool_cap: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            pool_floor: 84,
            pool_cap: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QualityConfig {
    pub min_liked_ratio: f32,
    pub max_macro_deviation: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            min_liked_ratio: 0.5,
            max_macro_deviation: 0.20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        MonitoringConfig {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            optimizer: OptimizerConfig::default(),
            request: RequestConfig::default(),
            catalog: CatalogConfig::default(),
            quality: QualityConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Settings {
    /// Load configuration from an optional file plus `MEALPLAN__`-prefixed
    /// environment variables (e.g. `MEALPLAN__OPTIMIZER__MACRO_BAND=0.08`).
    /// A missing config file is not an error: defaults apply.
    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = ConfigLoader::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(false));
        } else {
            builder = builder.add_source(File::with_name("config/default").required(false));
        }

        let built = builder
            .add_source(Environment::with_prefix("MEALPLAN").separator("__"))
            .build()?;

        built
            .try_deserialize()
            .or_else(|_| Ok(Settings::default()))
    }
}
