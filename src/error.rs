//! Error types for aermon.
//!
//! Errors are strongly typed using thiserror and split by where they are
//! raised: validation failures happen at a call boundary before anything is
//! mutated, materialization failures happen when a monitor's stream is read.

use thiserror::Error;

/// Validation errors raised before any state is touched.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Type mismatch: expected a Monitor or an EventStream, found {found}")]
    TypeMismatch {
        found: String,
    },

    #[error("Population '{population}' has no synapse group '{synapse}'")]
    UnknownSynapse {
        population: String,
        synapse: String,
    },

    #[error("Time bin {value} must be finite and > 0")]
    InvalidTimeBin {
        value: f64,
    },

    #[error("Time bin {time_bin} over a span of {span} needs more than {max_bins} bins")]
    TooManyBins {
        time_bin: f64,
        span: f64,
        max_bins: usize,
    },

    #[error("Invalid interval: start ({start}) and stop ({stop}) must be finite")]
    InvalidInterval {
        start: f64,
        stop: f64,
    },

    #[error("Monitor index {index} is out of bounds (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors raised while turning raw capture data into an event stream.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum MaterializationError {
    #[error("Monitor '{monitor}' is unready: no capture data was ever populated")]
    Unready {
        monitor: String,
    },

    #[error("Monitor '{monitor}' received a malformed capture: {reason}")]
    MalformedCapture {
        monitor: String,
        reason: String,
    },
}

/// Top-level error type for aermon.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum AerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Materialization error: {0}")]
    Materialization(#[from] MaterializationError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl AerError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a materialization error.
    #[must_use]
    pub const fn is_materialization(&self) -> bool {
        matches!(self, Self::Materialization(_))
    }

    /// Returns true if a stream was read before any capture was populated.
    #[must_use]
    pub const fn is_unready(&self) -> bool {
        matches!(self, Self::Materialization(MaterializationError::Unready { .. }))
    }

    /// Returns true if this is a type mismatch raised on import.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::TypeMismatch { .. }))
    }
}

/// Result type alias for aermon operations.
pub type AerResult<T> = Result<T, AerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_message() {
        let err = ValidationError::TypeMismatch {
            found: "alloc::string::String".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Type mismatch"));
        assert!(msg.contains("String"));
    }

    #[test]
    fn test_unready_message() {
        let err = MaterializationError::Unready {
            monitor: "exc".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("exc"));
        assert!(msg.contains("unready"));
    }

    #[test]
    fn test_aer_error_from_validation() {
        let err: AerError = ValidationError::InvalidTimeBin { value: 0.0 }.into();
        assert!(err.is_validation());
        assert!(!err.is_materialization());
        assert!(!err.is_type_mismatch());
    }

    #[test]
    fn test_aer_error_from_materialization() {
        let err: AerError = MaterializationError::Unready {
            monitor: "m".to_string(),
        }
        .into();
        assert!(err.is_materialization());
        assert!(err.is_unready());

        let err: AerError = MaterializationError::MalformedCapture {
            monitor: "m".to_string(),
            reason: "columns differ".to_string(),
        }
        .into();
        assert!(err.is_materialization());
        assert!(!err.is_unready());
    }

    #[test]
    fn test_aer_error_internal() {
        let err = AerError::internal("unexpected state");
        let msg = format!("{err}");
        assert!(msg.contains("unexpected state"));
        assert!(!err.is_validation());
    }
}
