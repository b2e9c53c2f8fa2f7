use crate::kernel::{ConfigError, ExecInvariantViolation};
use core::{error, fmt};

#[cfg(feature = "alloc")]
use alloc::string::ToString;

/// Errors raised by the lapped transform entry points.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// An argument passed into a function was invalid.
    #[cfg(feature = "alloc")]
    InvalidArg {
        /// The invalid arg
        arg: alloc::string::String,
        /// Explaining why arg is invalid.
        reason: alloc::string::String,
    },
    /// An argument passed into a function was invalid.
    #[cfg(not(feature = "alloc"))]
    InvalidArg,
    /// Execution was attempted with a violated kernel invariant.
    #[cfg(feature = "alloc")]
    ExecInvariantViolation {
        /// Why execution could not proceed.
        reason: alloc::string::String,
    },
    /// Execution was attempted with a violated kernel invariant.
    #[cfg(not(feature = "alloc"))]
    ExecInvariantViolation,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "alloc")]
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            #[cfg(not(feature = "alloc"))]
            Error::InvalidArg => write!(f, "Invalid argument."),
            #[cfg(feature = "alloc")]
            Error::ExecInvariantViolation { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            #[cfg(not(feature = "alloc"))]
            Error::ExecInvariantViolation => write!(f, "Execution invariant violation."),
        }
    }
}

impl error::Error for Error {}

#[cfg(feature = "alloc")]
impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::EmptyInput { arg } => Error::InvalidArg {
                arg: arg.to_string(),
                reason: "input was empty".to_string(),
            },
            ConfigError::InvalidArgument { arg, reason } => Error::InvalidArg {
                arg: arg.to_string(),
                reason: reason.to_string(),
            },
            ConfigError::NonContiguous { arg } => Error::InvalidArg {
                arg: arg.to_string(),
                reason: "argument is not contiguous in memory".to_string(),
            },
            ConfigError::LengthMismatch { arg, expected, got } => Error::InvalidArg {
                arg: arg.to_string(),
                reason: alloc::format!("expected length {expected}, got {got}"),
            },
        }
    }
}

#[cfg(not(feature = "alloc"))]
impl From<ConfigError> for Error {
    fn from(_: ConfigError) -> Self {
        Error::InvalidArg
    }
}

#[cfg(feature = "alloc")]
impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::Config(err) => Error::from(err),
            other => Error::ExecInvariantViolation {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(not(feature = "alloc"))]
impl From<ExecInvariantViolation> for Error {
    fn from(_: ExecInvariantViolation) -> Self {
        Error::ExecInvariantViolation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_to_invalid_arg() {
        let err = Error::from(ConfigError::InvalidArgument {
            arg: "framelength",
            reason: "framelength must be a positive even integer",
        });
        assert!(matches!(err, Error::InvalidArg { .. }));
    }

    #[test]
    fn invariant_violations_keep_their_reason() {
        let err = Error::from(ExecInvariantViolation::InvalidState {
            reason: "spectrogram must contain at least one frame",
        });
        match err {
            Error::ExecInvariantViolation { reason } => {
                assert!(reason.contains("at least one frame"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
