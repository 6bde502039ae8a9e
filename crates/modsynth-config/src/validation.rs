//! Range checks for configuration values.

use thiserror::Error;

use crate::SynthConfig;

/// Reasons a configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `sample_rate = 0`.
    #[error("sample_rate must be positive")]
    ZeroSampleRate,

    /// `period_size = 0`.
    #[error("period_size must be positive")]
    ZeroPeriodSize,

    /// The ahead tolerance is not below the behind limit.
    #[error("pacing.ahead_tolerance_ms ({ahead}) must be below pacing.behind_limit_ms ({behind})")]
    PacingOrder {
        /// Ahead tolerance in milliseconds.
        ahead: u64,
        /// Behind limit in milliseconds.
        behind: u64,
    },

    /// Multiple validation errors.
    #[error("{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Checks every field and reports all problems at once.
pub fn validate_config(config: &SynthConfig) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    if config.sample_rate == 0 {
        errors.push(ValidationError::ZeroSampleRate);
    }
    if config.period_size == 0 {
        errors.push(ValidationError::ZeroPeriodSize);
    }
    let pacing = &config.pacing;
    if pacing.ahead_tolerance_ms >= pacing.behind_limit_ms {
        errors.push(ValidationError::PacingOrder {
            ahead: pacing.ahead_tolerance_ms,
            behind: pacing.behind_limit_ms,
        });
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
