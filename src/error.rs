use std::fmt;

// ---------------------------------------------------------------------------
// Configuration errors (raised before any stepping begins)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Field must be strictly positive and finite.
    NotPositive { field: &'static str, value: f64 },
    /// Field must be zero or positive and finite.
    Negative { field: &'static str, value: f64 },
    /// A `[min, max]` pair where min > max.
    InvertedRange { field: &'static str, min: f64, max: f64 },
    /// Noise distribution could not be built for a sensor channel.
    Noise { sensor: &'static str, std_dev: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotPositive { field, value } => {
                write!(f, "{field} must be positive and finite, got {value}")
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{field} must be non-negative and finite, got {value}")
            }
            ConfigError::InvertedRange { field, min, max } => {
                write!(f, "{field} range is inverted: min {min} > max {max}")
            }
            ConfigError::Noise { sensor, std_dev } => {
                write!(f, "invalid noise std-dev {std_dev} for {sensor}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
