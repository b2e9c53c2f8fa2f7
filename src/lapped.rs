//! Convenience façade binding the transform kernels to the framing engine.
//!
//! The named entry points (`mdct`/`imdct`, `mdst`/`imdst`, `cmdct`/`icmdct`,
//! aliased `mclt`/`imclt`) run the FFT kernel with the defaults of
//! [`TransformOptions`]; the `*_with` variants accept any [`Cmdct1D`] kernel
//! so the fast and reference implementations can be mixed per call. Pure
//! delegation, no independent logic.

use crate::error::Error;
use crate::frame::{
    ispectrogram_with, spectrogram_with, CmdctFrames, FrameSettings, RealFrames, Spectrogram,
};
use crate::kernel::{ConfigError, KernelLifecycle};
use crate::traits::Cmdct1D;
use crate::transform::{FftCmdctConfig, FftCmdctKernel, Stacking};
use crate::windows::WindowSpec;
use alloc::string::ToString;
use alloc::vec::Vec;
use nalgebra::Complex;
use ndarray::Array2;

/// Configuration record for the lapped transform entry points.
///
/// `hopsize` overrides the `framelength / overlap` default when set;
/// `outlength` is only consulted by inverse calls given explicit options
/// (the metadata-inferred path recovers it from the forward call).
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOptions {
    /// Frame length in samples; a positive even integer.
    pub framelength: usize,
    /// Explicit stride between frames; `None` resolves to
    /// `framelength / overlap`.
    pub hopsize: Option<usize>,
    /// Overlap factor; the default of 2 gives 50% overlap.
    pub overlap: usize,
    /// Center the first and last windows on the signal boundaries.
    pub centered: bool,
    /// Analysis/synthesis window.
    pub window: WindowSpec,
    /// Extra zero padding, in multiples of `framelength`.
    pub padding: usize,
    /// Crop inverse output to this length.
    pub outlength: Option<usize>,
    /// Frequency stacking convention.
    pub stacking: Stacking,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            framelength: 1024,
            hopsize: None,
            overlap: 2,
            centered: true,
            window: WindowSpec::Cosine,
            padding: 0,
            outlength: None,
            stacking: Stacking::Odd,
        }
    }
}

impl TransformOptions {
    /// Resolve into engine settings.
    pub fn settings(&self) -> Result<FrameSettings, Error> {
        if self.overlap == 0 {
            return Err(Error::from(ConfigError::InvalidArgument {
                arg: "overlap",
                reason: "overlap must be greater than 0",
            }));
        }
        Ok(FrameSettings {
            framelength: self.framelength,
            hopsize: self.hopsize.unwrap_or(self.framelength / self.overlap),
            centered: self.centered,
            padding: self.padding,
            window: self.window.clone(),
            stacking: self.stacking,
            outlength: self.outlength,
        })
    }
}

fn default_kernel(settings: &FrameSettings) -> Result<FftCmdctKernel, Error> {
    Ok(FftCmdctKernel::try_new(FftCmdctConfig {
        framelength: settings.framelength,
        stacking: settings.stacking,
    })?)
}

fn check_kernel<K>(settings: &FrameSettings, kernel: &K) -> Result<(), Error>
where
    K: Cmdct1D,
{
    if kernel.framelength() != settings.framelength {
        return Err(Error::InvalidArg {
            arg: "kernel".to_string(),
            reason: format!(
                "kernel framelength {} does not match configured framelength {}",
                kernel.framelength(),
                settings.framelength
            ),
        });
    }
    if kernel.stacking() != settings.stacking {
        return Err(Error::InvalidArg {
            arg: "kernel".to_string(),
            reason: "kernel stacking does not match configured stacking".to_string(),
        });
    }
    Ok(())
}

fn inverse_settings(
    attached: &FrameSettings,
    options: Option<&TransformOptions>,
) -> Result<FrameSettings, Error> {
    match options {
        Some(options) => options.settings(),
        None => Ok(attached.clone()),
    }
}

/// Forward frame list for the cosine-first real transforms: oddly stacked
/// frames all use the MDCT; evenly stacked frames alternate MDCT and MDST.
fn mdct_frames<'a, K>(settings: &FrameSettings, kernel: &'a K) -> Vec<RealFrames<'a, K>>
where
    K: Cmdct1D,
{
    match settings.stacking {
        Stacking::Odd => vec![RealFrames::Mdct(kernel)],
        Stacking::Even => vec![RealFrames::Mdct(kernel), RealFrames::Mdst(kernel)],
    }
}

/// Forward frame list for the sine-first real transforms.
fn mdst_frames<'a, K>(settings: &FrameSettings, kernel: &'a K) -> Vec<RealFrames<'a, K>>
where
    K: Cmdct1D,
{
    match settings.stacking {
        Stacking::Odd => vec![RealFrames::Mdst(kernel)],
        Stacking::Even => vec![RealFrames::Mdst(kernel), RealFrames::Mdct(kernel)],
    }
}

/// Lapped MDCT of the input signal.
pub fn mdct(x: &[f64], options: &TransformOptions) -> Result<Spectrogram<f64>, Error> {
    let settings = options.settings()?;
    mdct_with(x, options, &default_kernel(&settings)?)
}

/// Lapped MDCT with an explicit transform kernel.
pub fn mdct_with<K>(
    x: &[f64],
    options: &TransformOptions,
    kernel: &K,
) -> Result<Spectrogram<f64>, Error>
where
    K: Cmdct1D,
{
    let settings = options.settings()?;
    check_kernel(&settings, kernel)?;
    Ok(spectrogram_with(x, &settings, mdct_frames(&settings, kernel))?)
}

/// Lapped inverse MDCT. With `None` options the framing parameters are
/// inferred from the spectrogram metadata.
pub fn imdct(
    spectrogram: &Spectrogram<f64>,
    options: Option<&TransformOptions>,
) -> Result<Vec<f64>, Error> {
    let settings = inverse_settings(&spectrogram.settings, options)?;
    imdct_with(spectrogram, options, &default_kernel(&settings)?)
}

/// Lapped inverse MDCT with an explicit transform kernel.
pub fn imdct_with<K>(
    spectrogram: &Spectrogram<f64>,
    options: Option<&TransformOptions>,
    kernel: &K,
) -> Result<Vec<f64>, Error>
where
    K: Cmdct1D,
{
    let settings = inverse_settings(&spectrogram.settings, options)?;
    check_kernel(&settings, kernel)?;
    Ok(ispectrogram_with(
        spectrogram,
        &settings,
        mdct_frames(&settings, kernel),
    )?)
}

/// Lapped MDST of the input signal.
pub fn mdst(x: &[f64], options: &TransformOptions) -> Result<Spectrogram<f64>, Error> {
    let settings = options.settings()?;
    mdst_with(x, options, &default_kernel(&settings)?)
}

/// Lapped MDST with an explicit transform kernel.
pub fn mdst_with<K>(
    x: &[f64],
    options: &TransformOptions,
    kernel: &K,
) -> Result<Spectrogram<f64>, Error>
where
    K: Cmdct1D,
{
    let settings = options.settings()?;
    check_kernel(&settings, kernel)?;
    Ok(spectrogram_with(x, &settings, mdst_frames(&settings, kernel))?)
}

/// Lapped inverse MDST. With `None` options the framing parameters are
/// inferred from the spectrogram metadata.
pub fn imdst(
    spectrogram: &Spectrogram<f64>,
    options: Option<&TransformOptions>,
) -> Result<Vec<f64>, Error> {
    let settings = inverse_settings(&spectrogram.settings, options)?;
    imdst_with(spectrogram, options, &default_kernel(&settings)?)
}

/// Lapped inverse MDST with an explicit transform kernel.
pub fn imdst_with<K>(
    spectrogram: &Spectrogram<f64>,
    options: Option<&TransformOptions>,
    kernel: &K,
) -> Result<Vec<f64>, Error>
where
    K: Cmdct1D,
{
    let settings = inverse_settings(&spectrogram.settings, options)?;
    check_kernel(&settings, kernel)?;
    Ok(ispectrogram_with(
        spectrogram,
        &settings,
        mdst_frames(&settings, kernel),
    )?)
}

/// Lapped complex MDCT/MCLT of the input signal.
pub fn cmdct(x: &[f64], options: &TransformOptions) -> Result<Spectrogram<Complex<f64>>, Error> {
    let settings = options.settings()?;
    cmdct_with(x, options, &default_kernel(&settings)?)
}

/// Lapped complex MDCT/MCLT with an explicit transform kernel.
pub fn cmdct_with<K>(
    x: &[f64],
    options: &TransformOptions,
    kernel: &K,
) -> Result<Spectrogram<Complex<f64>>, Error>
where
    K: Cmdct1D,
{
    let settings = options.settings()?;
    check_kernel(&settings, kernel)?;
    Ok(spectrogram_with(x, &settings, vec![CmdctFrames(kernel)])?)
}

/// Lapped inverse complex MDCT/MCLT. With `None` options the framing
/// parameters are inferred from the spectrogram metadata.
pub fn icmdct(
    spectrogram: &Spectrogram<Complex<f64>>,
    options: Option<&TransformOptions>,
) -> Result<Vec<f64>, Error> {
    let settings = inverse_settings(&spectrogram.settings, options)?;
    icmdct_with(spectrogram, options, &default_kernel(&settings)?)
}

/// Lapped inverse complex MDCT/MCLT with an explicit transform kernel.
pub fn icmdct_with<K>(
    spectrogram: &Spectrogram<Complex<f64>>,
    options: Option<&TransformOptions>,
    kernel: &K,
) -> Result<Vec<f64>, Error>
where
    K: Cmdct1D,
{
    let settings = inverse_settings(&spectrogram.settings, options)?;
    check_kernel(&settings, kernel)?;
    Ok(ispectrogram_with(
        spectrogram,
        &settings,
        vec![CmdctFrames(kernel)],
    )?)
}

/// Alias for [`cmdct`].
pub fn mclt(x: &[f64], options: &TransformOptions) -> Result<Spectrogram<Complex<f64>>, Error> {
    cmdct(x, options)
}

/// Alias for [`icmdct`].
pub fn imclt(
    spectrogram: &Spectrogram<Complex<f64>>,
    options: Option<&TransformOptions>,
) -> Result<Vec<f64>, Error> {
    icmdct(spectrogram, options)
}

fn assemble_channels(channels: Vec<Vec<f64>>) -> Result<Array2<f64>, Error> {
    let len = channels[0].len();
    if channels.iter().any(|c| c.len() != len) {
        return Err(Error::InvalidArg {
            arg: "spectrograms".to_string(),
            reason: "channels reconstruct to differing lengths".to_string(),
        });
    }
    Ok(Array2::from_shape_fn((len, channels.len()), |(i, c)| {
        channels[c][i]
    }))
}

/// Lapped MDCT per channel of a (samples x channels) array.
pub fn mdct_channels(
    x: &Array2<f64>,
    options: &TransformOptions,
) -> Result<Vec<Spectrogram<f64>>, Error> {
    x.columns()
        .into_iter()
        .map(|column| mdct(&column.to_vec(), options))
        .collect()
}

/// Lapped inverse MDCT per channel, reassembled into a (samples x channels)
/// array.
pub fn imdct_channels(
    spectrograms: &[Spectrogram<f64>],
    options: Option<&TransformOptions>,
) -> Result<Array2<f64>, Error> {
    if spectrograms.is_empty() {
        return Err(Error::from(ConfigError::EmptyInput {
            arg: "spectrograms",
        }));
    }
    let mut channels = Vec::with_capacity(spectrograms.len());
    for spectrogram in spectrograms {
        channels.push(imdct(spectrogram, options)?);
    }
    assemble_channels(channels)
}

/// Lapped complex MDCT/MCLT per channel of a (samples x channels) array.
pub fn cmdct_channels(
    x: &Array2<f64>,
    options: &TransformOptions,
) -> Result<Vec<Spectrogram<Complex<f64>>>, Error> {
    x.columns()
        .into_iter()
        .map(|column| cmdct(&column.to_vec(), options))
        .collect()
}

/// Lapped inverse complex MDCT/MCLT per channel, reassembled into a
/// (samples x channels) array.
pub fn icmdct_channels(
    spectrograms: &[Spectrogram<Complex<f64>>],
    options: Option<&TransformOptions>,
) -> Result<Array2<f64>, Error> {
    if spectrograms.is_empty() {
        return Err(Error::from(ConfigError::EmptyInput {
            arg: "spectrograms",
        }));
    }
    let mut channels = Vec::with_capacity(spectrograms.len());
    for spectrogram in spectrograms {
        channels.push(icmdct(spectrogram, options)?);
    }
    assemble_channels(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{DirectCmdctConfig, DirectCmdctKernel};
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;

    fn sine(len: usize, freq: f64) -> Vec<f64> {
        (0..len)
            .map(|i| (i as f64 / 44100.0 * freq * 2.0 * PI).sin())
            .collect()
    }

    fn assert_close(a: &[f64], b: &[f64], epsilon: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = epsilon);
        }
    }

    #[test]
    fn default_options_match_documentation() {
        let options = TransformOptions::default();
        assert_eq!(options.framelength, 1024);
        assert_eq!(options.hopsize, None);
        assert_eq!(options.overlap, 2);
        assert!(options.centered);
        assert_eq!(options.window, WindowSpec::Cosine);
        assert_eq!(options.padding, 0);
        assert_eq!(options.outlength, None);
        assert_eq!(options.stacking, Stacking::Odd);

        let settings = options.settings().expect("resolvable");
        assert_eq!(settings.hopsize, 512);
    }

    #[test]
    fn sine_reconstruction_through_default_mdct() {
        // 1000 Hz at 44100 Hz, 5 * 1024 samples.
        let x = sine(5 * 1024, 1000.0);
        let options = TransformOptions::default();
        let spectrogram = mdct(&x, &options).expect("forward");
        assert_eq!(spectrogram.bins(), 512);
        let y = imdct(&spectrogram, None).expect("inverse");
        assert_close(&x, &y, 1e-9);
    }

    #[test]
    fn all_kernel_combinations_reconstruct() {
        let x = sine(5 * 1024, 100.0);
        let options = TransformOptions::default();
        let fast = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 1024,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let reference = DirectCmdctKernel::try_new(DirectCmdctConfig {
            framelength: 1024,
            stacking: Stacking::Odd,
        })
        .expect("valid config");

        let spec_fast = mdct_with(&x, &options, &fast).expect("fast forward");
        let spec_reference = mdct_with(&x, &options, &reference).expect("reference forward");
        for (a, b) in spec_fast.frames.iter().zip(spec_reference.frames.iter()) {
            assert_close(a, b, 1e-9);
        }

        for spectrogram in [&spec_fast, &spec_reference] {
            assert_close(
                &x,
                &imdct_with(spectrogram, None, &fast).expect("fast inverse"),
                1e-9,
            );
            assert_close(
                &x,
                &imdct_with(spectrogram, None, &reference).expect("reference inverse"),
                1e-9,
            );
        }
    }

    #[test]
    fn mdst_round_trip() {
        let x = sine(5 * 1024, 1000.0);
        let options = TransformOptions::default();
        let spectrogram = mdst(&x, &options).expect("forward");
        let y = imdst(&spectrogram, None).expect("inverse");
        assert_close(&x, &y, 1e-9);
    }

    #[test]
    fn complex_round_trip_and_alias() {
        let x = sine(5 * 1024, 1000.0);
        let options = TransformOptions::default();
        let a = cmdct(&x, &options).expect("cmdct");
        let b = mclt(&x, &options).expect("mclt");
        assert_eq!(a, b);
        let y = imclt(&a, None).expect("imclt");
        assert_close(&x, &y, 1e-9);
    }

    #[test]
    fn evenly_stacked_round_trip() {
        let x = sine(5 * 1024, 440.0);
        let options = TransformOptions {
            stacking: Stacking::Even,
            ..TransformOptions::default()
        };
        let spectrogram = mdct(&x, &options).expect("forward");
        assert_eq!(spectrogram.bins(), 513);
        let y = imdct(&spectrogram, None).expect("inverse");
        assert_close(&x, &y, 1e-9);

        let spectrogram = mdst(&x, &options).expect("forward");
        let y = imdst(&spectrogram, None).expect("inverse");
        assert_close(&x, &y, 1e-9);
    }

    #[test]
    fn kaiser_derived_window_round_trip() {
        let x = sine(5 * 1024, 1000.0);
        let options = TransformOptions {
            window: WindowSpec::KaiserDerived { beta: 4.0 },
            ..TransformOptions::default()
        };
        let spectrogram = mdct(&x, &options).expect("forward");
        let y = imdct(&spectrogram, None).expect("inverse");
        assert_close(&x, &y, 1e-9);
    }

    #[test]
    fn explicit_options_override_metadata() {
        let x = sine(3 * 256, 1000.0);
        let options = TransformOptions {
            framelength: 256,
            ..TransformOptions::default()
        };
        let spectrogram = mdct(&x, &options).expect("forward");

        // Explicit inverse options drop the recorded outlength and keep the
        // trailing padding instead.
        let inverse_options = TransformOptions {
            framelength: 256,
            outlength: None,
            ..TransformOptions::default()
        };
        let y = imdct(&spectrogram, Some(&inverse_options)).expect("inverse");
        assert!(y.len() >= x.len());
        assert_close(&x, &y[..x.len()], 1e-9);
    }

    #[test]
    fn kernel_mismatch_is_rejected() {
        let x = sine(1024, 1000.0);
        let options = TransformOptions::default();
        let wrong = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 512,
            stacking: Stacking::Odd,
        })
        .expect("valid config");
        let err = mdct_with(&x, &options, &wrong).expect_err("framelength mismatch");
        assert!(matches!(err, Error::InvalidArg { .. }));

        let wrong_stacking = FftCmdctKernel::try_new(FftCmdctConfig {
            framelength: 1024,
            stacking: Stacking::Even,
        })
        .expect("valid config");
        let err = mdct_with(&x, &options, &wrong_stacking).expect_err("stacking mismatch");
        assert!(matches!(err, Error::InvalidArg { .. }));
    }

    #[test]
    fn zero_overlap_is_rejected() {
        let options = TransformOptions {
            overlap: 0,
            hopsize: None,
            ..TransformOptions::default()
        };
        assert!(options.settings().is_err());
    }

    #[test]
    fn multichannel_round_trip() {
        let left = sine(3 * 1024, 1000.0);
        let right = sine(3 * 1024, 300.0);
        let x = Array2::from_shape_fn((left.len(), 2), |(i, c)| {
            if c == 0 {
                left[i]
            } else {
                right[i]
            }
        });
        let options = TransformOptions::default();
        let spectrograms = mdct_channels(&x, &options).expect("forward");
        assert_eq!(spectrograms.len(), 2);
        let y = imdct_channels(&spectrograms, None).expect("inverse");
        assert_eq!(y.dim(), x.dim());
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }
}
