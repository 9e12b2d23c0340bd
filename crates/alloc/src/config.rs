use serde::Deserialize;

use crate::error::AllocError;

// ---------------------------------------------------------------------------
// Engine config
// ---------------------------------------------------------------------------

/// Tunable knobs for aggregation and suggestion. Everything has a default;
/// hosts only ship a TOML file when they need to move a threshold.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// An item counts as fully allocated at this share of its baseline,
    /// in basis points. 9500 = the 95% tolerance band: rounding and minor
    /// scope changes are expected, exact coverage is not.
    #[serde(default = "default_threshold_bps")]
    pub full_allocation_threshold_bps: u32,
    #[serde(default)]
    pub suggestion: SuggestionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionConfig {
    /// Best candidate below this confidence → no suggestion.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,
    #[serde(default = "default_category_weight")]
    pub category_weight: u32,
    #[serde(default = "default_payee_weight")]
    pub payee_weight: u32,
    #[serde(default = "default_amount_weight")]
    pub amount_weight: u32,
}

fn default_threshold_bps() -> u32 {
    9500
}

fn default_min_confidence() -> u8 {
    40
}

fn default_category_weight() -> u32 {
    50
}

fn default_payee_weight() -> u32 {
    30
}

fn default_amount_weight() -> u32 {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            full_allocation_threshold_bps: default_threshold_bps(),
            suggestion: SuggestionConfig::default(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            category_weight: default_category_weight(),
            payee_weight: default_payee_weight(),
            amount_weight: default_amount_weight(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, AllocError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| AllocError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AllocError> {
        if self.full_allocation_threshold_bps == 0
            || self.full_allocation_threshold_bps > 10_000
        {
            return Err(AllocError::ConfigValidation(format!(
                "full_allocation_threshold_bps must be in 1..=10000, got {}",
                self.full_allocation_threshold_bps
            )));
        }

        let s = &self.suggestion;
        if s.min_confidence > 100 {
            return Err(AllocError::ConfigValidation(format!(
                "suggestion.min_confidence must be at most 100, got {}",
                s.min_confidence
            )));
        }

        let weight_sum = s.category_weight + s.payee_weight + s.amount_weight;
        if weight_sum != 100 {
            return Err(AllocError::ConfigValidation(format!(
                "suggestion weights must sum to 100, got {weight_sum}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.full_allocation_threshold_bps, 9500);
        assert_eq!(config.suggestion.min_confidence, 40);
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.full_allocation_threshold_bps, 9500);
        assert_eq!(config.suggestion.category_weight, 50);
    }

    #[test]
    fn parse_overrides() {
        let config = EngineConfig::from_toml(
            r#"
full_allocation_threshold_bps = 9000

[suggestion]
min_confidence = 55
category_weight = 60
payee_weight = 25
amount_weight = 15
"#,
        )
        .unwrap();
        assert_eq!(config.full_allocation_threshold_bps, 9000);
        assert_eq!(config.suggestion.min_confidence, 55);
        assert_eq!(config.suggestion.category_weight, 60);
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let err = EngineConfig::from_toml("full_allocation_threshold_bps = 10001").unwrap_err();
        assert!(err.to_string().contains("1..=10000"));

        let err = EngineConfig::from_toml("full_allocation_threshold_bps = 0").unwrap_err();
        assert!(err.to_string().contains("1..=10000"));
    }

    #[test]
    fn reject_weights_not_summing_to_100() {
        let err = EngineConfig::from_toml(
            r#"
[suggestion]
category_weight = 50
payee_weight = 30
amount_weight = 30
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sum to 100"));
    }

    #[test]
    fn reject_min_confidence_over_100() {
        let err = EngineConfig::from_toml(
            r#"
[suggestion]
min_confidence = 101
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most 100"));
    }
}
