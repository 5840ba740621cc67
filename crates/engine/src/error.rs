use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetError {
    /// Value outside its physical operating range.
    OutOfRange { field: &'static str, value: f64, min: f64, max: f64 },
    /// Loss coefficient or length below zero (or not a number).
    Negative { field: &'static str, value: f64 },
}

impl fmt::Display for BudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { field, value, min, max } => {
                write!(f, "{field} = {value} is outside [{min}, {max}]")
            }
            Self::Negative { field, value } => write!(f, "{field} = {value} must be >= 0"),
        }
    }
}

impl std::error::Error for BudgetError {}
