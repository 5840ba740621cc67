// Analyzer settings
// Loaded from ~/.config/fibernet/settings.json

use std::fs;
use std::path::{Path, PathBuf};

use fibernet_engine::{
    FiberType, LossParameters, OpticalParameters, SegmentEstimator, Wavelength,
};
use fibernet_recon::ToleranceConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Optical defaults
    #[serde(rename = "optical.txPowerDbm")]
    pub tx_power_dbm: f64,

    #[serde(rename = "optical.rxSensitivityDbm")]
    pub rx_sensitivity_dbm: f64,

    #[serde(rename = "optical.wavelength")]
    pub wavelength: Wavelength,

    #[serde(rename = "optical.fiberType")]
    pub fiber_type: FiberType,

    // Loss coefficients
    #[serde(rename = "loss.fiberLossPerKm")]
    pub fiber_loss_per_km: f64,

    #[serde(rename = "loss.spliceLoss")]
    pub splice_loss: f64,

    #[serde(rename = "loss.connectorLoss")]
    pub connector_loss: f64,

    #[serde(rename = "loss.safetyMargin")]
    pub safety_margin: f64,

    // Per-cable estimates when analyzing a whole document
    #[serde(rename = "ingest.connectorLoss")]
    pub ingest_connector_loss: f64,

    #[serde(rename = "ingest.spliceSpacingM")]
    pub splice_spacing_m: f64,

    #[serde(rename = "ingest.minSplices")]
    pub min_splices: u32,

    #[serde(rename = "ingest.connectorsPerCable")]
    pub connectors_per_cable: u32,

    // Plan-vs-built bands
    #[serde(rename = "compare.lengthTolerancePct")]
    pub length_tolerance_pct: f64,

    #[serde(rename = "compare.majorTolerancePct")]
    pub major_tolerance_pct: f64,

    #[serde(rename = "compare.lossToleranceDb")]
    pub loss_tolerance_db: f64,

    // Diagnostics
    #[serde(rename = "log.level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let optical = OpticalParameters::default();
        let loss = LossParameters::default();
        let estimator = SegmentEstimator::default();
        let tolerance = ToleranceConfig::default();
        Self {
            // Optical
            tx_power_dbm: optical.tx_power,
            rx_sensitivity_dbm: optical.rx_sensitivity,
            wavelength: optical.wavelength,
            fiber_type: optical.fiber_type,
            // Loss
            fiber_loss_per_km: loss.fiber_loss_per_km,
            splice_loss: loss.splice_loss,
            connector_loss: loss.connector_loss,
            safety_margin: loss.safety_margin,
            // Ingest
            ingest_connector_loss: 0.25,
            splice_spacing_m: estimator.splice_spacing_m,
            min_splices: estimator.min_splices,
            connectors_per_cable: estimator.connectors_per_cable,
            // Compare
            length_tolerance_pct: tolerance.length_pct,
            major_tolerance_pct: tolerance.major_pct,
            loss_tolerance_db: tolerance.loss_db,
            // Log
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fibernet");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Load an explicit settings file. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&contents).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        fs::write(path, json).map_err(io_err)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("cannot create config directory {}: {e}", parent.display());
                return;
            }
        }

        let default_config = r#"{
    // Transmitter / receiver (dBm)
    "optical.txPowerDbm": 3.0,
    "optical.rxSensitivityDbm": -28.0,
    // "1310nm" or "1550nm"
    "optical.wavelength": "1550nm",
    // "single_mode" or "multi_mode"
    "optical.fiberType": "single_mode",

    // Loss coefficients (dB, fiber loss per km)
    "loss.fiberLossPerKm": 0.35,
    "loss.spliceLoss": 0.1,
    "loss.connectorLoss": 0.5,
    "loss.safetyMargin": 3.0,

    // Per-cable estimates for whole-document analysis
    "ingest.connectorLoss": 0.25,
    "ingest.spliceSpacingM": 2000.0,
    "ingest.minSplices": 2,
    "ingest.connectorsPerCable": 2,

    // Plan-vs-built tolerance bands
    "compare.lengthTolerancePct": 5.0,
    "compare.majorTolerancePct": 10.0,
    "compare.lossToleranceDb": 0.5,

    // error, warn, info, debug, trace (RUST_LOG overrides)
    "log.level": "info"
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("cannot write default settings to {}: {e}", path.display());
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }

    // -----------------------------------------------------------------------
    // Engine views
    // -----------------------------------------------------------------------

    pub fn optical(&self) -> OpticalParameters {
        OpticalParameters {
            tx_power: self.tx_power_dbm,
            rx_sensitivity: self.rx_sensitivity_dbm,
            wavelength: self.wavelength,
            fiber_type: self.fiber_type,
        }
    }

    pub fn loss(&self) -> LossParameters {
        LossParameters {
            fiber_loss_per_km: self.fiber_loss_per_km,
            splice_loss: self.splice_loss,
            connector_loss: self.connector_loss,
            safety_margin: self.safety_margin,
        }
    }

    /// Loss coefficients for whole-document analysis (field connector loss).
    pub fn ingest_loss(&self) -> LossParameters {
        LossParameters {
            connector_loss: self.ingest_connector_loss,
            ..self.loss()
        }
    }

    pub fn estimator(&self) -> SegmentEstimator {
        SegmentEstimator {
            splice_spacing_m: self.splice_spacing_m,
            min_splices: self.min_splices,
            connectors_per_cable: self.connectors_per_cable,
        }
    }

    pub fn tolerance(&self) -> ToleranceConfig {
        ToleranceConfig {
            length_pct: self.length_tolerance_pct,
            major_pct: self.major_tolerance_pct,
            loss_db: self.loss_tolerance_db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let s = Settings::default();
        assert_eq!(s.optical(), OpticalParameters::default());
        assert_eq!(s.loss(), LossParameters::default());
        assert_eq!(s.estimator(), SegmentEstimator::default());
        assert_eq!(s.tolerance(), ToleranceConfig::default());
        assert_eq!(s.ingest_loss().connector_loss, 0.25);
        assert_eq!(s.ingest_loss().splice_loss, 0.1);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn commented_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fibernet").join("settings.json");
        Settings::default().create_default_file(&path);

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            "{\n  // trunk link\n  \"optical.txPowerDbm\": 5.0,\n  \"optical.wavelength\": \"1310nm\"\n}\n",
        )
        .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.tx_power_dbm, 5.0);
        assert_eq!(s.wavelength, Wavelength::Nm1310);
        assert_eq!(s.rx_sensitivity_dbm, -28.0);
        assert_eq!(s.fiber_loss_per_km, 0.35);
    }

    #[test]
    fn save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            splice_loss: 0.05,
            min_splices: 4,
            major_tolerance_pct: 12.5,
            log_level: "debug".into(),
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"loss.spliceLoss\": 0.05"));
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ \"loss.spliceLoss\": \"lots\" }").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
