//! Direct-summation reference kernel.
//!
//! O(N^2) evaluation of the same transform the FFT kernel computes, kept as
//! an independent implementation for numerical cross-validation. Outputs
//! agree with [`super::FftCmdctKernel`] to floating-point tolerance, not
//! bit-exactly.

use super::{check_forward_shape, check_inverse_shape, validate_framelength, Stacking};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::traits::Cmdct1D;
use core::f64::consts::PI;
use nalgebra::Complex;

/// Constructor config for [`DirectCmdctKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectCmdctConfig {
    /// Frame length `2N`; must be a positive even integer.
    pub framelength: usize,
    /// Frequency stacking convention.
    pub stacking: Stacking,
}

/// Direct-summation complex MDCT kernel.
///
/// Forward: `X[k] = sqrt(1/N) * sum_n x[n] * exp(-i pi (n + n0)(k + offset) / N)`
/// with `n0 = (N + 1) / 2`, evenly-stacked edge bins scaled by `sqrt(0.5)`.
///
/// Inverse: `x[n] = Re(sqrt(1/N) * sum_k X[k] * exp(i pi (n + n0)(k + offset) / N))`.
/// The FFT inverse rescales evenly-stacked edge coefficients by `sqrt(2)`
/// because they enter its mirrored length-2N spectrum once while interior
/// bins enter twice; summing the `N + 1` coefficients directly counts every
/// bin once, so here the edges are scaled by `sqrt(0.5)` instead. Both forms
/// reduce to the same linear map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectCmdctKernel {
    framelength: usize,
    stacking: Stacking,
}

impl KernelLifecycle for DirectCmdctKernel {
    type Config = DirectCmdctConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_framelength(config.framelength)?;
        Ok(Self {
            framelength: config.framelength,
            stacking: config.stacking,
        })
    }
}

impl Cmdct1D for DirectCmdctKernel {
    fn framelength(&self) -> usize {
        self.framelength
    }

    fn stacking(&self) -> Stacking {
        self.stacking
    }

    fn cmdct_into<I, O>(&self, frame: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized,
    {
        let frame = frame.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        check_forward_shape(self.framelength, self.bins(), frame, out)?;

        let n = (self.framelength / 2) as f64;
        let n0 = (n + 1.0) / 2.0;
        let offset = self.stacking.offset();
        let scale = (1.0 / n).sqrt();

        for (k, dst) in out.iter_mut().enumerate() {
            let freq = k as f64 + offset;
            let mut acc = Complex::new(0.0, 0.0);
            for (i, &v) in frame.iter().enumerate() {
                let phase = -PI * (i as f64 + n0) * freq / n;
                acc += Complex::from_polar(v, phase);
            }
            *dst = acc * scale;
        }

        if matches!(self.stacking, Stacking::Even) {
            let edge = 0.5f64.sqrt();
            out[0] = out[0] * edge;
            let last = out.len() - 1;
            out[last] = out[last] * edge;
        }
        Ok(())
    }

    fn icmdct_into<I, O>(&self, coefficients: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let coefficients = coefficients
            .read_slice()
            .map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        check_inverse_shape(self.framelength, self.bins(), self.stacking, coefficients, out)?;

        let n = (self.framelength / 2) as f64;
        let n0 = (n + 1.0) / 2.0;
        let offset = self.stacking.offset();
        let scale = (1.0 / n).sqrt();
        let edge = 0.5f64.sqrt();
        let last = coefficients.len() - 1;

        for (i, dst) in out.iter_mut().enumerate() {
            let time = i as f64 + n0;
            let mut acc = Complex::new(0.0, 0.0);
            for (k, &c) in coefficients.iter().enumerate() {
                let mut c = c;
                if matches!(self.stacking, Stacking::Even) && (k == 0 || k == last) {
                    c = c * edge;
                }
                let phase = PI * time * (k as f64 + offset) / n;
                acc += c * Complex::from_polar(1.0, phase);
            }
            *dst = acc.re * scale;
        }
        Ok(())
    }
}
