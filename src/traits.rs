//! Trait interfaces for transform, window and framing capabilities.
//!
//! [`Cmdct1D`] is the strategy seam between the framing engine and the two
//! transform kernels: implementors provide the complex forward/inverse pair,
//! and every real transform of the family is derived from it here, so the
//! sign and scale conventions live in exactly one place.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::transform::Stacking;
use nalgebra::Complex;

#[cfg(feature = "alloc")]
use core::f64::consts::SQRT_2;

#[cfg(feature = "alloc")]
use crate::frame::Spectrogram;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Complex MDCT/MCLT capability with the derived real transform family.
pub trait Cmdct1D {
    /// Frame length `2N` this kernel was constructed for.
    fn framelength(&self) -> usize;

    /// Frequency stacking convention of this kernel.
    fn stacking(&self) -> Stacking;

    /// Coefficient count per frame.
    fn bins(&self) -> usize {
        self.stacking().bins(self.framelength())
    }

    /// Run the forward complex transform into a caller-provided buffer.
    fn cmdct_into<I, O>(&self, frame: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized;

    /// Run the inverse complex transform into a caller-provided buffer.
    fn icmdct_into<I, O>(&self, coefficients: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<f64> + ?Sized;

    /// Run the forward complex transform and allocate output.
    #[cfg(feature = "alloc")]
    fn cmdct<I>(&self, frame: &I) -> Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let mut out = vec![Complex::new(0.0, 0.0); self.bins()];
        self.cmdct_into(frame, &mut out)?;
        Ok(out)
    }

    /// Run the inverse complex transform and allocate output.
    #[cfg(feature = "alloc")]
    fn icmdct<I>(&self, coefficients: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
    {
        let mut out = vec![0.0; self.framelength()];
        self.icmdct_into(coefficients, &mut out)?;
        Ok(out)
    }

    /// MDCT, derived as `Re(cmdct(x)) * sqrt(2)`.
    #[cfg(feature = "alloc")]
    fn mdct<I>(&self, frame: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        Ok(self.cmdct(frame)?.iter().map(|c| c.re * SQRT_2).collect())
    }

    /// MDST, derived as `-Im(cmdct(x)) * sqrt(2)`.
    ///
    /// The leading minus sign pairs this with [`Cmdct1D::imdst`]; flipping it
    /// on one side only breaks the orthogonal mdct/mdst pair.
    #[cfg(feature = "alloc")]
    fn mdst<I>(&self, frame: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        Ok(self.cmdct(frame)?.iter().map(|c| -c.im * SQRT_2).collect())
    }

    /// Inverse MDCT, derived as `icmdct(X) * sqrt(2)` with `X` lifted onto
    /// the real axis.
    #[cfg(feature = "alloc")]
    fn imdct<I>(&self, coefficients: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let coefficients = coefficients
            .read_slice()
            .map_err(ExecInvariantViolation::from)?;
        let lifted: Vec<Complex<f64>> = coefficients
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        let mut out = self.icmdct(&lifted)?;
        for v in &mut out {
            *v *= SQRT_2;
        }
        Ok(out)
    }

    /// Inverse MDST, derived as `-icmdct(i * X) * sqrt(2)`.
    ///
    /// Multiplying the coefficients by `i` turns the cosine kernel of the
    /// inverse into the sine kernel.
    #[cfg(feature = "alloc")]
    fn imdst<I>(&self, coefficients: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let coefficients = coefficients
            .read_slice()
            .map_err(ExecInvariantViolation::from)?;
        let lifted: Vec<Complex<f64>> = coefficients
            .iter()
            .map(|&v| Complex::new(0.0, v))
            .collect();
        let mut out = self.icmdct(&lifted)?;
        for v in &mut out {
            *v *= -SQRT_2;
        }
        Ok(out)
    }
}

/// Window generation capability.
#[cfg(feature = "alloc")]
pub trait WindowGenerate<T> {
    /// Run window generation into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Run window generation and allocate output samples.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// Window generation capability in no-alloc mode.
#[cfg(not(feature = "alloc"))]
pub trait WindowGenerate<T> {}

/// Per-frame analysis/synthesis contract the framing engine delegates to.
///
/// The engine is transform-agnostic: anything satisfying this contract can be
/// framed and overlap-added, which is how the evenly-stacked lapped mode
/// cycles between two transforms.
#[cfg(feature = "alloc")]
pub trait FrameTransform {
    /// Coefficient type produced per frame.
    type Coeff: Copy;

    /// Frame length consumed by [`FrameTransform::analyze`].
    fn framelength(&self) -> usize;

    /// Coefficient count produced by [`FrameTransform::analyze`].
    fn bins(&self) -> usize;

    /// Transform one windowed time-domain frame into coefficients.
    fn analyze(&self, frame: &[f64]) -> Result<Vec<Self::Coeff>, ExecInvariantViolation>;

    /// Transform one coefficient row back into a time-domain frame.
    fn synthesize(&self, coefficients: &[Self::Coeff]) -> Result<Vec<f64>, ExecInvariantViolation>;
}

/// Lapped forward transform capability.
#[cfg(feature = "alloc")]
pub trait Spectrogram1D {
    /// Spectrogram representation produced by the kernel.
    type Output;

    /// Run the lapped forward transform into a caller-provided output.
    fn run_into<I>(&self, input: &I, out: &mut Self::Output) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;

    /// Run the lapped forward transform and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Lapped inverse transform (overlap-add) capability.
#[cfg(feature = "alloc")]
pub trait Ispectrogram1D<C> {
    /// Run overlap-add reconstruction into a caller-provided output buffer.
    fn run_into<O>(
        &self,
        spectrogram: &Spectrogram<C>,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized;

    /// Run overlap-add reconstruction and allocate output.
    fn run_alloc(&self, spectrogram: &Spectrogram<C>) -> Result<Vec<f64>, ExecInvariantViolation>;
}
