//! FFT-backed transform kernel.

use super::{check_forward_shape, check_inverse_shape, validate_framelength, Stacking};
use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::traits::Cmdct1D;
use core::f64::consts::PI;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Constructor config for [`FftCmdctKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftCmdctConfig {
    /// Frame length `2N`; must be a positive even integer.
    pub framelength: usize,
    /// Frequency stacking convention.
    pub stacking: Stacking,
}

/// FFT-backed complex MDCT kernel.
///
/// Forward: pre-twiddle `exp(-i pi n / 2N)` (oddly-stacked only), length-`2N`
/// FFT, post-twiddle `exp(-i pi n0 (k + offset) / N)` with `n0 = (N + 1) / 2`,
/// scale `sqrt(1/N)`. Evenly-stacked edge bins are scaled by `sqrt(0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftCmdctKernel {
    framelength: usize,
    stacking: Stacking,
}

impl KernelLifecycle for FftCmdctKernel {
    type Config = FftCmdctConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_framelength(config.framelength)?;
        Ok(Self {
            framelength: config.framelength,
            stacking: config.stacking,
        })
    }
}

impl Cmdct1D for FftCmdctKernel {
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

        let len = self.framelength;
        let n = (len / 2) as f64;
        let n0 = (n + 1.0) / 2.0;

        let mut buf: Vec<Complex<f64>> = match self.stacking {
            Stacking::Odd => frame
                .iter()
                .enumerate()
                .map(|(i, &v)| Complex::from_polar(v, -PI * i as f64 / len as f64))
                .collect(),
            Stacking::Even => frame.iter().map(|&v| Complex::new(v, 0.0)).collect(),
        };

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(len).process(&mut buf);

        let offset = self.stacking.offset();
        let scale = (1.0 / n).sqrt();
        for (k, dst) in out.iter_mut().enumerate() {
            *dst = buf[k] * Complex::from_polar(scale, -PI * n0 * (k as f64 + offset) / n);
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

        let len = self.framelength;
        let half = len / 2;
        let n = half as f64;
        let n0 = (n + 1.0) / 2.0;

        // Mirror into the full conjugate-negated length-2N spectrum. Evenly
        // stacked edge bins enter the spectrum once instead of twice, so they
        // are rescaled by sqrt(2) first.
        let mut buf = vec![Complex::new(0.0, 0.0); len];
        match self.stacking {
            Stacking::Odd => {
                buf[..half].copy_from_slice(coefficients);
                for j in 0..half {
                    buf[half + j] = -coefficients[half - 1 - j].conj();
                }
            }
            Stacking::Even => {
                let edge = 2.0f64.sqrt();
                buf[0] = coefficients[0] * edge;
                buf[1..half].copy_from_slice(&coefficients[1..half]);
                buf[half] = coefficients[half] * edge;
                for k in 1..half {
                    buf[len - k] = -coefficients[k].conj();
                }
            }
        }

        for (k, v) in buf.iter_mut().enumerate() {
            *v *= Complex::from_polar(1.0, PI * n0 * k as f64 / n);
        }

        // rustfft leaves the inverse unnormalized; fold 1/2N into the final
        // sqrt(N) scale.
        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_inverse(len).process(&mut buf);
        let scale = n.sqrt() / len as f64;

        match self.stacking {
            Stacking::Odd => {
                for (i, dst) in out.iter_mut().enumerate() {
                    let post = Complex::from_polar(1.0, PI * (i as f64 + n0) / len as f64);
                    *dst = (buf[i] * post).re * scale;
                }
            }
            Stacking::Even => {
                for (i, dst) in out.iter_mut().enumerate() {
                    *dst = buf[i].re * scale;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn test_frame(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 44100.0;
                (2.0 * PI * 997.0 * t).sin() + 0.25 * (2.0 * PI * 4903.0 * t).cos()
            })
            .collect()
    }

    #[test]
    fn constructor_rejects_odd_and_zero_framelengths() {
        for framelength in [0, 3, 1023] {
            assert!(FftCmdctKernel::try_new(FftCmdctConfig {
                framelength,
                stacking: Stacking::Odd,
            })
            .is_err());
        }
    }

    #[test]
    fn bin_counts_follow_stacking() {
        let odd = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 256,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let even = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 256,
            stacking: Stacking::Even,
        })
        .expect("valid config");
        assert_eq!(odd.cmdct(&test_frame(256)).expect("forward").len(), 128);
        assert_eq!(even.cmdct(&test_frame(256)).expect("forward").len(), 129);
    }

    #[test]
    fn forward_rejects_mismatched_frame_length() {
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 256,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let err = kernel.cmdct(&test_frame(128)).expect_err("length mismatch");
        assert!(matches!(
            err,
            ExecInvariantViolation::LengthMismatch { arg: "frame", .. }
        ));
    }

    #[test]
    fn cmdct_output_is_genuinely_complex() {
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 256,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let spectrum = kernel.cmdct(&test_frame(256)).expect("forward");
        assert!(spectrum.iter().any(|c| c.im.abs() > 1e-6));
    }

    #[test]
    fn mdct_and_mdst_are_projections_of_cmdct() {
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 256,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let frame = test_frame(256);
        let spectrum = kernel.cmdct(&frame).expect("forward");
        let re = kernel.mdct(&frame).expect("mdct");
        let im = kernel.mdst(&frame).expect("mdst");
        let sqrt2 = 2.0f64.sqrt();
        for k in 0..spectrum.len() {
            assert_abs_diff_eq!(re[k], spectrum[k].re * sqrt2, epsilon = 1e-12);
            assert_abs_diff_eq!(im[k], -spectrum[k].im * sqrt2, epsilon = 1e-12);
        }
    }

    #[test]
    fn odd_stacked_complex_round_trip() {
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 512,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let frame = test_frame(512);
        let spectrum = kernel.cmdct(&frame).expect("forward");
        let back = kernel.icmdct(&spectrum).expect("inverse");
        for (a, b) in frame.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn even_stacked_complex_round_trip() {
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 512,
            stacking: Stacking::Even,
        })
        .expect("valid config");
        let frame = test_frame(512);
        let spectrum = kernel.cmdct(&frame).expect("forward");
        assert_eq!(spectrum.len(), 257);
        let back = kernel.icmdct(&spectrum).expect("inverse");
        for (a, b) in frame.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn even_stacked_inverse_rejects_even_coefficient_counts() {
        // framelength 514 puts 258 evenly-stacked bins on the frame; the
        // mirrored spectrum cannot close, so the inverse must refuse.
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 514,
            stacking: Stacking::Even,
        })
        .expect("valid config");
        let coefficients = vec![Complex::new(1.0, 0.0); 258];
        let err = kernel.icmdct(&coefficients).expect_err("even count");
        assert!(matches!(err, ExecInvariantViolation::InvalidState { .. }));
    }

    #[test]
    fn mdct_pseudo_inverse_projection_identity() {
        // A single mdct frame aliases in the time domain, so imdct(mdct(x))
        // is not x; exact recovery needs windowed overlap-add. The basis
        // orthogonality still fixes mdct(imdct(X)) == 2 X.
        let kernel = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 64,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let frame = test_frame(64);
        let spectrum = kernel.mdct(&frame).expect("forward");
        let back = kernel.imdct(&spectrum).expect("inverse");
        let again = kernel.mdct(&back).expect("re-forward");
        for (a, b) in again.iter().zip(spectrum.iter()) {
            assert_abs_diff_eq!(a, &(2.0 * b), epsilon = 1e-9);
        }
    }
}
