use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::BudgetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Wavelength {
    #[serde(rename = "1310nm")]
    Nm1310,
    #[default]
    #[serde(rename = "1550nm")]
    Nm1550,
}

impl Wavelength {
    /// Typical G.652 attenuation, dB/km.
    pub fn standard_fiber_loss(&self) -> f64 {
        match self {
            Self::Nm1310 => 0.40,
            Self::Nm1550 => 0.35,
        }
    }

    pub fn nanometers(&self) -> u32 {
        match self {
            Self::Nm1310 => 1310,
            Self::Nm1550 => 1550,
        }
    }
}

impl fmt::Display for Wavelength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}nm", self.nanometers())
    }
}

impl std::str::FromStr for Wavelength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches("nm") {
            "1310" => Ok(Self::Nm1310),
            "1550" => Ok(Self::Nm1550),
            other => Err(format!("unsupported wavelength '{other}' (expected 1310nm or 1550nm)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiberType {
    #[default]
    SingleMode,
    MultiMode,
}

impl fmt::Display for FiberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleMode => write!(f, "single_mode"),
            Self::MultiMode => write!(f, "multi_mode"),
        }
    }
}

impl std::str::FromStr for FiberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single_mode" => Ok(Self::SingleMode),
            "multi_mode" => Ok(Self::MultiMode),
            other => Err(format!("unsupported fiber type '{other}'")),
        }
    }
}

/// Transmitter/receiver pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalParameters {
    /// dBm, [-10, 10].
    pub tx_power: f64,
    /// dBm, [-40, -10].
    pub rx_sensitivity: f64,
    #[serde(default)]
    pub wavelength: Wavelength,
    #[serde(default)]
    pub fiber_type: FiberType,
}

impl OpticalParameters {
    pub const TX_POWER_RANGE: (f64, f64) = (-10.0, 10.0);
    pub const RX_SENSITIVITY_RANGE: (f64, f64) = (-40.0, -10.0);

    pub fn new(tx_power: f64, rx_sensitivity: f64) -> Self {
        Self {
            tx_power,
            rx_sensitivity,
            wavelength: Wavelength::default(),
            fiber_type: FiberType::default(),
        }
    }

    pub fn power_budget(&self) -> f64 {
        self.tx_power - self.rx_sensitivity
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        check_range("tx_power", self.tx_power, Self::TX_POWER_RANGE)?;
        check_range("rx_sensitivity", self.rx_sensitivity, Self::RX_SENSITIVITY_RANGE)
    }
}

impl Default for OpticalParameters {
    /// Typical OLT transmitter into an ONT receiver.
    fn default() -> Self {
        Self::new(3.0, -28.0)
    }
}

/// Per-unit attenuation coefficients, all dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossParameters {
    pub fiber_loss_per_km: f64,
    pub splice_loss: f64,
    pub connector_loss: f64,
    pub safety_margin: f64,
}

impl LossParameters {
    /// Defaults with the fiber coefficient taken from the wavelength.
    pub fn for_wavelength(wavelength: Wavelength) -> Self {
        Self {
            fiber_loss_per_km: wavelength.standard_fiber_loss(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        check_non_negative("fiber_loss_per_km", self.fiber_loss_per_km)?;
        check_non_negative("splice_loss", self.splice_loss)?;
        check_non_negative("connector_loss", self.connector_loss)?;
        check_non_negative("safety_margin", self.safety_margin)
    }
}

impl Default for LossParameters {
    fn default() -> Self {
        Self {
            fiber_loss_per_km: 0.35,
            splice_loss: 0.1,
            connector_loss: 0.5,
            safety_margin: 3.0,
        }
    }
}

/// One computation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSegment {
    pub name: String,
    pub fiber_length_km: f64,
    pub splice_count: u32,
    pub connector_count: u32,
}

impl NetworkSegment {
    pub fn new(name: impl Into<String>, fiber_length_km: f64, splice_count: u32, connector_count: u32) -> Self {
        Self {
            name: name.into(),
            fiber_length_km,
            splice_count,
            connector_count,
        }
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        check_non_negative("fiber_length_km", self.fiber_length_km)
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), BudgetError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(BudgetError::OutOfRange { field, value, min, max })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), BudgetError> {
    // NaN fails this comparison too.
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(BudgetError::Negative { field, value })
    }
}
