//! Analysis configuration.
//!
//! [`AnalysisConfig`] is passed explicitly to the engine for every run; the
//! crate never reads configuration from the environment or global state.

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// Default number of standard deviations beyond which an airport is flagged.
pub const DEFAULT_OUTLIER_STD_DEV_MULTIPLIER: f64 = 2.0;

/// Configuration consumed by the analyzers.
///
/// # Examples
///
/// ```rust
/// use flight_guard::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default()
///     .with_outlier_std_dev_multiplier(3.0)
///     .with_zero_route_airlines(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiplier `k` applied to the standard deviation for outlier bounds
    pub outlier_std_dev_multiplier: f64,
    /// Whether airlines that operate no routes appear in the ranking
    pub include_zero_route_airlines_in_ranking: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_std_dev_multiplier: DEFAULT_OUTLIER_STD_DEV_MULTIPLIER,
            include_zero_route_airlines_in_ranking: true,
        }
    }
}

impl AnalysisConfig {
    /// Sets the outlier multiplier `k`.
    pub fn with_outlier_std_dev_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_std_dev_multiplier = multiplier;
        self
    }

    /// Sets whether zero-route airlines are ranked.
    pub fn with_zero_route_airlines(mut self, include: bool) -> Self {
        self.include_zero_route_airlines_in_ranking = include;
        self
    }

    /// Parses a configuration from JSON, applying defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GuardError::configuration(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration before any analyzer runs.
    pub fn validate(&self) -> Result<()> {
        let k = self.outlier_std_dev_multiplier;
        if !k.is_finite() {
            return Err(GuardError::configuration(format!(
                "outlier_std_dev_multiplier must be finite, got {k}"
            )));
        }
        if k <= 0.0 {
            return Err(GuardError::configuration(format!(
                "outlier_std_dev_multiplier must be greater than 0, got {k}"
            )));
        }
        Ok(())
    }
}
