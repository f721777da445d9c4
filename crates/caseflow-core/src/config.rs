//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! department_limit = 12
//! seed = 7
//!
//! [fields]
//! department = "Service Line"
//!
//! [model_2]
//! jitter = 0.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::{CaseflowError, Result};

/// Names of the record fields the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub department: String,
    pub month: String,
    pub case_mix_index: String,
    pub length_of_stay: String,
    pub severity: String,
    pub revenue: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            department: "Specialty".to_string(),
            month: "Month".to_string(),
            case_mix_index: "CMI Value".to_string(),
            length_of_stay: "LOS".to_string(),
            severity: "Severity".to_string(),
            revenue: "Revenue".to_string(),
        }
    }
}

/// How a derived model is generated from baseline metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Added to baseline accuracy.
    pub accuracy_lift: f64,
    pub accuracy_cap: f64,
    /// Amplitude of uniform accuracy noise in `[0, jitter)`.
    pub jitter: f64,
    /// Multiplier on baseline turnaround.
    pub turnaround_factor: f64,
    /// Multiplier on baseline cost.
    pub cost_factor: f64,
    /// Added to baseline satisfaction.
    pub satisfaction_lift: f64,
    pub satisfaction_cap: f64,
}

impl ModelProfile {
    pub fn model_1() -> Self {
        Self {
            accuracy_lift: 0.08,
            accuracy_cap: 0.98,
            jitter: 0.04,
            turnaround_factor: 0.78,
            cost_factor: 0.82,
            satisfaction_lift: 0.5,
            satisfaction_cap: 4.8,
        }
    }

    pub fn model_2() -> Self {
        Self {
            accuracy_lift: 0.12,
            accuracy_cap: 0.99,
            jitter: 0.05,
            turnaround_factor: 0.68,
            cost_factor: 0.72,
            satisfaction_lift: 0.75,
            satisfaction_cap: 5.0,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        let values = [
            ("accuracy_lift", self.accuracy_lift),
            ("accuracy_cap", self.accuracy_cap),
            ("jitter", self.jitter),
            ("turnaround_factor", self.turnaround_factor),
            ("cost_factor", self.cost_factor),
            ("satisfaction_lift", self.satisfaction_lift),
            ("satisfaction_cap", self.satisfaction_cap),
        ];
        if let Some((key, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CaseflowError::InvalidConfig(format!(
                "{name}.{key} must be finite"
            )));
        }
        if self.jitter < 0.0 {
            return Err(CaseflowError::InvalidConfig(format!(
                "{name}.jitter must not be negative"
            )));
        }
        Ok(())
    }
}

/// Partial [`ModelProfile`] as written in a config file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfilePatch {
    accuracy_lift: Option<f64>,
    accuracy_cap: Option<f64>,
    jitter: Option<f64>,
    turnaround_factor: Option<f64>,
    cost_factor: Option<f64>,
    satisfaction_lift: Option<f64>,
    satisfaction_cap: Option<f64>,
}

impl ProfilePatch {
    fn apply(self, base: ModelProfile) -> ModelProfile {
        ModelProfile {
            accuracy_lift: self.accuracy_lift.unwrap_or(base.accuracy_lift),
            accuracy_cap: self.accuracy_cap.unwrap_or(base.accuracy_cap),
            jitter: self.jitter.unwrap_or(base.jitter),
            turnaround_factor: self.turnaround_factor.unwrap_or(base.turnaround_factor),
            cost_factor: self.cost_factor.unwrap_or(base.cost_factor),
            satisfaction_lift: self.satisfaction_lift.unwrap_or(base.satisfaction_lift),
            satisfaction_cap: self.satisfaction_cap.unwrap_or(base.satisfaction_cap),
        }
    }
}

/// What to report when a department's baseline mean for a KPI is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaselinePolicy {
    /// Improvement is undefined (`None`, serialized as `null`).
    #[default]
    Undefined,
    /// Improvement is reported as 0%.
    Zero,
}

/// Configuration for one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct EngineConfig {
    pub fields: FieldNames,
    /// Maximum number of departments; later ones are dropped.
    pub department_limit: usize,
    /// Number of periods extrapolated past each department's history.
    pub forecast_horizon: usize,
    pub model_1: ModelProfile,
    pub model_2: ModelProfile,
    /// Seed for the jitter generator; entropy when unset.
    pub seed: Option<u64>,
    pub zero_baseline: ZeroBaselinePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fields: FieldNames::default(),
            department_limit: 8,
            forecast_horizon: 6,
            model_1: ModelProfile::model_1(),
            model_2: ModelProfile::model_2(),
            seed: None,
            zero_baseline: ZeroBaselinePolicy::default(),
        }
    }
}

/// On-disk shape of [`EngineConfig`]; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    fields: FieldNames,
    department_limit: Option<usize>,
    forecast_horizon: Option<usize>,
    model_1: ProfilePatch,
    model_2: ProfilePatch,
    seed: Option<u64>,
    zero_baseline: ZeroBaselinePolicy,
}

impl From<ConfigFile> for EngineConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = EngineConfig::default();
        Self {
            fields: file.fields,
            department_limit: file.department_limit.unwrap_or(defaults.department_limit),
            forecast_horizon: file.forecast_horizon.unwrap_or(defaults.forecast_horizon),
            model_1: file.model_1.apply(defaults.model_1),
            model_2: file.model_2.apply(defaults.model_2),
            seed: file.seed,
            zero_baseline: file.zero_baseline,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Apply `CASEFLOW_SEED`, `CASEFLOW_DEPARTMENT_LIMIT` and
    /// `CASEFLOW_FORECAST_HORIZON` when set.
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
            raw.trim().parse().map_err(|_| {
                CaseflowError::InvalidConfig(format!("{key} is not a valid number: {raw}"))
            })
        }

        if let Some(raw) = lookup("CASEFLOW_SEED") {
            self.seed = Some(parse("CASEFLOW_SEED", &raw)?);
        }
        if let Some(raw) = lookup("CASEFLOW_DEPARTMENT_LIMIT") {
            self.department_limit = parse("CASEFLOW_DEPARTMENT_LIMIT", &raw)?;
        }
        if let Some(raw) = lookup("CASEFLOW_FORECAST_HORIZON") {
            self.forecast_horizon = parse("CASEFLOW_FORECAST_HORIZON", &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Pin both jitter amplitudes to zero for reproducible output.
    pub fn without_jitter(mut self) -> Self {
        self.model_1.jitter = 0.0;
        self.model_2.jitter = 0.0;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.department_limit == 0 {
            return Err(CaseflowError::InvalidConfig(
                "department_limit must be at least 1".to_string(),
            ));
        }
        if self.forecast_horizon == 0 {
            return Err(CaseflowError::InvalidConfig(
                "forecast_horizon must be at least 1".to_string(),
            ));
        }
        let fields = &self.fields;
        for (key, name) in [
            ("department", &fields.department),
            ("month", &fields.month),
            ("case_mix_index", &fields.case_mix_index),
            ("length_of_stay", &fields.length_of_stay),
            ("severity", &fields.severity),
            ("revenue", &fields.revenue),
        ] {
            if name.is_empty() {
                return Err(CaseflowError::InvalidConfig(format!(
                    "fields.{key} must not be empty"
                )));
            }
        }
        self.model_1.validate("model_1")?;
        self.model_2.validate("model_2")
    }
}
