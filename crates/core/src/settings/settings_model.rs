//! Analysis settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MONEY_SCALE;
use crate::errors::{Error, Result};

/// Largest supported minor-unit scale.
pub const MAX_MONEY_SCALE: u32 = 10;

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_scale() -> u32 {
    DEFAULT_MONEY_SCALE
}

fn default_include_tags() -> bool {
    true
}

/// Knobs of one analysis manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSettings {
    /// Currency every base-denominated amount is expressed in.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Minor units for currencies without reference data.
    #[serde(default = "default_scale")]
    pub default_scale: u32,
    /// Largest difference between reconciled totals still considered equal.
    #[serde(default)]
    pub reconciliation_tolerance: Decimal,
    /// Build tag buckets.
    #[serde(default = "default_include_tags")]
    pub include_tags: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            base_currency: default_base_currency(),
            default_scale: default_scale(),
            reconciliation_tolerance: Decimal::ZERO,
            include_tags: default_include_tags(),
        }
    }
}

impl AnalysisSettings {
    pub fn with_base_currency(base_currency: &str) -> Self {
        AnalysisSettings {
            base_currency: base_currency.to_string(),
            ..Default::default()
        }
    }

    /// Parses and validates settings from JSON. Missing keys take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: AnalysisSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let code = self.base_currency.as_str();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::InvalidConfigValue(format!(
                "baseCurrency must be a three-letter ISO code, got '{}'",
                code
            )));
        }
        if self.default_scale > MAX_MONEY_SCALE {
            return Err(Error::InvalidConfigValue(format!(
                "defaultScale must be at most {}, got {}",
                MAX_MONEY_SCALE, self.default_scale
            )));
        }
        if self.reconciliation_tolerance.is_sign_negative() {
            return Err(Error::InvalidConfigValue(format!(
                "reconciliationTolerance must not be negative, got {}",
                self.reconciliation_tolerance
            )));
        }
        Ok(())
    }
}
