//! Analysis/synthesis window generation.
//!
//! The lapped transforms need windows satisfying the Princen-Bradley
//! condition `w[n]^2 + w[n + M/2]^2 == 1` for alias cancellation at 50%
//! overlap. Two generators qualify: the raised-cosine window (the default)
//! and the Kaiser-Bessel derived window.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::special::Bessel;
use crate::traits::WindowGenerate;
use alloc::vec::Vec;
use num_traits::{Float, FloatConst};

/// Raised-cosine window `w[n] = sin(pi * (n + 0.5) / m)`.
pub fn cosine<F>(m: usize) -> Vec<F>
where
    F: Float + FloatConst,
{
    let len = F::from(m).unwrap();
    let half = F::from(0.5).unwrap();
    (0..m)
        .map(|n| (F::PI() * (F::from(n).unwrap() + half) / len).sin())
        .collect()
}

/// Symmetric Kaiser window with shape parameter `beta`.
pub fn kaiser<F>(m: usize, beta: F) -> Vec<F>
where
    F: Float + Bessel,
{
    if m == 0 {
        return Vec::new();
    }
    if m == 1 {
        return vec![F::one()];
    }
    let span = F::from(m - 1).unwrap();
    let two = F::from(2.0).unwrap();
    let denom = beta.i0();
    (0..m)
        .map(|n| {
            let ratio = two * F::from(n).unwrap() / span - F::one();
            (beta * (F::one() - ratio * ratio).sqrt()).i0() / denom
        })
        .collect()
}

/// Kaiser-Bessel derived window, normalized to fulfil the Princen-Bradley
/// condition.
///
/// A half-length Kaiser window of `m/2 + 1` taps is summed cumulatively; the
/// square roots of the first `m/2` partial sums over the total form the first
/// half, mirrored into the second. That construction makes
/// `w[n]^2 + w[n + m/2]^2 == 1` exact up to rounding.
///
/// Returns an empty window for `m < 1` and a single `1.0` for the degenerate
/// `m == 1`; any other odd `m` fails with [`ConfigError::InvalidArgument`]
/// because the window is only defined for an even number of taps.
pub fn kaiser_derived<F>(m: usize, beta: F) -> Result<Vec<F>, ConfigError>
where
    F: Float + Bessel,
{
    if m < 1 {
        return Ok(Vec::new());
    }
    if m == 1 {
        return Ok(vec![F::one()]);
    }
    if m % 2 != 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "m",
            reason: "Kaiser-Bessel derived windows are only defined for an even number of taps",
        });
    }

    let half = m / 2;
    let kaiserw = kaiser(half + 1, beta);

    let mut csum = Vec::with_capacity(half + 1);
    let mut acc = F::zero();
    for &v in &kaiserw {
        acc = acc + v;
        csum.push(acc);
    }
    let total = csum[half];

    let mut w = vec![F::zero(); m];
    for n in 0..half {
        w[n] = (csum[n] / total).sqrt();
        w[m - 1 - n] = w[n];
    }
    Ok(w)
}

/// Window selection for the framing engine.
///
/// This is the configuration-record form of a window argument: a named
/// generator, a fixed coefficient array, or no windowing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowSpec {
    /// Apply no window (rectangular). Breaks perfect reconstruction.
    Disabled,
    /// Raised-cosine window, the default.
    Cosine,
    /// Kaiser-Bessel derived window with shape parameter `beta`.
    KaiserDerived {
        /// Kaiser shape parameter.
        beta: f64,
    },
    /// Caller-provided coefficients; length must match the framelength.
    Fixed(Vec<f64>),
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec::Cosine
    }
}

impl WindowSpec {
    /// Resolve to concrete coefficients for the given framelength.
    pub fn build(&self, framelength: usize) -> Result<Option<Vec<f64>>, ConfigError> {
        match self {
            WindowSpec::Disabled => Ok(None),
            WindowSpec::Cosine => Ok(Some(cosine(framelength))),
            WindowSpec::KaiserDerived { beta } => Ok(Some(kaiser_derived(framelength, *beta)?)),
            WindowSpec::Fixed(w) => {
                if w.len() != framelength {
                    return Err(ConfigError::LengthMismatch {
                        arg: "window",
                        expected: framelength,
                        got: w.len(),
                    });
                }
                Ok(Some(w.clone()))
            }
        }
    }
}

/// Constructor config for [`WindowKernel`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    /// Window family and parameters.
    pub window: WindowSpec,
    /// Output length.
    pub nx: usize,
}

/// Trait-first window generation kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowKernel {
    window: WindowSpec,
    nx: usize,
}

impl KernelLifecycle for WindowKernel {
    type Config = WindowConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.nx == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "nx",
                reason: "window length must be greater than 0",
            });
        }
        if matches!(config.window, WindowSpec::KaiserDerived { .. })
            && config.nx > 1
            && config.nx % 2 != 0
        {
            return Err(ConfigError::InvalidArgument {
                arg: "nx",
                reason: "Kaiser-Bessel derived windows are only defined for an even number of taps",
            });
        }
        if let WindowSpec::Fixed(w) = &config.window {
            if w.len() != config.nx {
                return Err(ConfigError::LengthMismatch {
                    arg: "window",
                    expected: config.nx,
                    got: w.len(),
                });
            }
        }
        Ok(Self {
            window: config.window,
            nx: config.nx,
        })
    }
}

impl WindowGenerate<f64> for WindowKernel {
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let generated = self.run_alloc()?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != generated.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: generated.len(),
                got: out_slice.len(),
            });
        }
        out_slice.copy_from_slice(&generated);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        match self.window.build(self.nx)? {
            Some(w) => Ok(w),
            None => Ok(vec![1.0; self.nx]),
        }
    }
}
