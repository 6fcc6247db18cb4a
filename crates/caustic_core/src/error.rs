//! Configuration errors raised while building a scene.

use thiserror::Error;

/// Errors that can occur while resolving a scene description.
///
/// Everything here is detected at setup time; rendering itself never fails.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown dielectric preset: {0}")]
    UnknownDielectric(String),

    #[error("Unknown metal preset: {0}")]
    UnknownMetal(String),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("Dispersion formula takes at most {max} coefficients, got {got}")]
    TooManyCoefficients { max: usize, got: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Reject a parameter that must be finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

/// Reject a parameter that must be finite and non-negative.
pub(crate) fn require_non_negative(name: &'static str, value: f32) -> ConfigResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}
