use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Deviation bands for plan-vs-built classification.
///
/// A matched cable within `length_pct` is compliant (subject to the loss
/// check), within `major_pct` a minor deviation, beyond it a major one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToleranceConfig {
    #[serde(default = "default_length_pct")]
    pub length_pct: f64,
    #[serde(default = "default_major_pct")]
    pub major_pct: f64,
    /// Allowed |measured - planned| loss, dB.
    #[serde(default = "default_loss_db")]
    pub loss_db: f64,
}

fn default_length_pct() -> f64 {
    5.0
}

fn default_major_pct() -> f64 {
    10.0
}

fn default_loss_db() -> f64 {
    0.5
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            length_pct: default_length_pct(),
            major_pct: default_major_pct(),
            loss_db: default_loss_db(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToleranceFile {
    #[serde(default)]
    tolerance: ToleranceConfig,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ToleranceConfig {
    /// Parse a `[tolerance]` table. Missing keys (or a missing table) take defaults.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let file: ToleranceFile =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        file.tolerance.validate()?;
        Ok(file.tolerance)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (name, value) in [
            ("length_pct", self.length_pct),
            ("major_pct", self.major_pct),
            ("loss_db", self.loss_db),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::ConfigValidation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.length_pct > self.major_pct {
            return Err(ReconError::ConfigValidation(format!(
                "length_pct ({}) must not exceed major_pct ({})",
                self.length_pct, self.major_pct
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_table() {
        let config = ToleranceConfig::from_toml(
            r#"
[tolerance]
length_pct = 3.0
major_pct = 8.0
loss_db = 0.75
"#,
        )
        .unwrap();
        assert_eq!(config.length_pct, 3.0);
        assert_eq!(config.major_pct, 8.0);
        assert_eq!(config.loss_db, 0.75);
    }

    #[test]
    fn missing_keys_take_defaults() {
        let config = ToleranceConfig::from_toml("[tolerance]\nloss_db = 1.0\n").unwrap();
        assert_eq!(config.length_pct, 5.0);
        assert_eq!(config.major_pct, 10.0);
        assert_eq!(config.loss_db, 1.0);

        assert_eq!(ToleranceConfig::from_toml("").unwrap(), ToleranceConfig::default());
    }

    #[test]
    fn inverted_bands_rejected() {
        let err = ToleranceConfig::from_toml("[tolerance]\nlength_pct = 12.0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
        assert!(err.to_string().contains("major_pct"));
    }

    #[test]
    fn negative_loss_rejected() {
        let err = ToleranceConfig::from_toml("[tolerance]\nloss_db = -0.1\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let err = ToleranceConfig::from_toml("[tolerance]\namount_cents = 5\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn bad_syntax_is_parse_error() {
        let err = ToleranceConfig::from_toml("[tolerance\nlength_pct = ").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
