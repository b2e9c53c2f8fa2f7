//! Core MDCT-family transform kernels.
//!
//! Two interchangeable implementations of [`crate::traits::Cmdct1D`] live
//! here: [`FftCmdctKernel`] computes the transform through a pre/post-twiddled
//! FFT, [`DirectCmdctKernel`] through direct summation. They agree to
//! floating-point tolerance and can be mixed freely, forward from one and
//! inverse from the other.

#[cfg(feature = "alloc")]
use crate::kernel::{ConfigError, ExecInvariantViolation};
#[cfg(feature = "alloc")]
use nalgebra::Complex;

#[cfg(feature = "alloc")]
mod direct;
#[cfg(feature = "std")]
mod fft;

#[cfg(feature = "alloc")]
pub use direct::*;
#[cfg(feature = "std")]
pub use fft::*;

/// Frequency stacking convention.
///
/// Oddly-stacked transforms place `framelength/2` bins at half-integer
/// frequencies; evenly-stacked transforms place `framelength/2 + 1` bins at
/// integer frequencies, with half-width DC and Nyquist edge bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    /// Bins offset by 0.5; `framelength/2` coefficients.
    Odd,
    /// Bins on integer frequencies; `framelength/2 + 1` coefficients.
    Even,
}

impl Stacking {
    /// Coefficient count per frame for the given framelength.
    pub fn bins(self, framelength: usize) -> usize {
        match self {
            Stacking::Odd => framelength / 2,
            Stacking::Even => framelength / 2 + 1,
        }
    }

    /// Frequency offset applied to the bin index in the transform kernel.
    #[cfg(feature = "alloc")]
    pub(crate) fn offset(self) -> f64 {
        match self {
            Stacking::Odd => 0.5,
            Stacking::Even => 0.0,
        }
    }
}

/// Shared constructor validation for transform kernel configs.
#[cfg(feature = "alloc")]
pub(crate) fn validate_framelength(framelength: usize) -> Result<(), ConfigError> {
    if framelength == 0 || framelength % 2 != 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "framelength",
            reason: "framelength must be a positive even integer",
        });
    }
    Ok(())
}

/// Shared argument validation for the forward transform.
#[cfg(feature = "alloc")]
pub(crate) fn check_forward_shape(
    framelength: usize,
    bins: usize,
    frame: &[f64],
    out: &[Complex<f64>],
) -> Result<(), ExecInvariantViolation> {
    if frame.len() != framelength {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "frame",
            expected: framelength,
            got: frame.len(),
        });
    }
    if out.len() != bins {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: bins,
            got: out.len(),
        });
    }
    Ok(())
}

/// Shared argument validation for the inverse transform.
///
/// Evenly-stacked inverses structurally require an odd coefficient count:
/// the conjugate-mirrored length-`2N` spectrum only closes when `N` is even.
#[cfg(feature = "alloc")]
pub(crate) fn check_inverse_shape(
    framelength: usize,
    bins: usize,
    stacking: Stacking,
    coefficients: &[Complex<f64>],
    out: &[f64],
) -> Result<(), ExecInvariantViolation> {
    if coefficients.len() != bins {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "coefficients",
            expected: bins,
            got: coefficients.len(),
        });
    }
    if matches!(stacking, Stacking::Even) && coefficients.len() % 2 == 0 {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "evenly-stacked inverse requires an odd number of coefficients",
        });
    }
    if out.len() != framelength {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: framelength,
            got: out.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacking_bin_counts() {
        assert_eq!(Stacking::Odd.bins(1024), 512);
        assert_eq!(Stacking::Even.bins(1024), 513);
    }

    #[test]
    fn framelength_must_be_positive_and_even() {
        assert!(validate_framelength(1024).is_ok());
        assert!(validate_framelength(0).is_err());
        assert!(validate_framelength(7).is_err());
    }
}
