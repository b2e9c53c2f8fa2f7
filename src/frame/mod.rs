//! Lapped framing and weighted overlap-add reconstruction.
//!
//! The engine slides fixed-length windowed frames across a signal, hands each
//! frame to a [`FrameTransform`] and collects the coefficient rows into a
//! [`Spectrogram`]; the inverse direction synthesizes each row, windows it
//! again and accumulates it back at the frame's stride offset. The engine is
//! transform-agnostic and cycles through the list of transforms it is given,
//! which is how the evenly-stacked lapped mode alternates between MDCT and
//! MDST frames.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D};
use crate::traits::{Cmdct1D, FrameTransform, Ispectrogram1D, Spectrogram1D};
use crate::transform::Stacking;
use crate::windows::WindowSpec;
use alloc::vec::Vec;
use nalgebra::Complex;

/// Resolved framing parameters, attached to every forward result so the
/// inverse can run without the caller re-specifying them.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSettings {
    /// Frame length in samples; a positive even integer.
    pub framelength: usize,
    /// Stride between consecutive frames.
    pub hopsize: usize,
    /// Whether the signal was padded with `framelength/2` zeros on both ends
    /// so the first and last windows center on the signal boundaries.
    pub centered: bool,
    /// Extra zero padding appended to the signal, in multiples of
    /// `framelength`.
    pub padding: usize,
    /// Window applied on analysis and synthesis.
    pub window: WindowSpec,
    /// Frequency stacking the coefficient rows were produced with. The
    /// engine itself is transform-agnostic; this is carried as metadata so
    /// an inverse call can reconstruct the matching kernel.
    pub stacking: Stacking,
    /// Original signal length; the inverse crops its output to this.
    pub outlength: Option<usize>,
}

impl FrameSettings {
    /// Whether this configuration reconstructs perfectly: 50% overlap and a
    /// window satisfying the Princen-Bradley condition.
    pub fn perfect_reconstruction(&self) -> bool {
        if self.hopsize * 2 != self.framelength {
            return false;
        }
        match self.window.build(self.framelength) {
            Ok(Some(w)) => {
                let hop = self.hopsize;
                w[..hop]
                    .iter()
                    .zip(&w[hop..])
                    .all(|(a, b)| (a * a + b * b - 1.0).abs() < 1e-8)
            }
            _ => false,
        }
    }
}

/// Frames-major lapped transform output: `frames[i][k]` is bin `k` of frame
/// `i`, with the framing parameters attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram<C> {
    /// Coefficient rows, one per frame.
    pub frames: Vec<Vec<C>>,
    /// Parameters the forward call resolved and used.
    pub settings: FrameSettings,
}

impl<C> Spectrogram<C> {
    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of coefficient bins per frame.
    pub fn bins(&self) -> usize {
        self.frames.first().map(Vec::len).unwrap_or(0)
    }
}

/// [`FrameTransform`] adapter taking a real-valued (MDCT or MDST) view of a
/// [`Cmdct1D`] kernel.
///
/// Both views share one variant type so the engine can cycle them: the
/// evenly-stacked lapped mode passes `[Mdct, Mdst]` and consecutive frames
/// alternate, which restores the alias cancellation a single evenly-stacked
/// transform cannot provide at 50% overlap.
#[derive(Debug, Clone, Copy)]
pub enum RealFrames<'a, K> {
    /// Modified discrete cosine view.
    Mdct(&'a K),
    /// Modified discrete sine view.
    Mdst(&'a K),
}

impl<K> RealFrames<'_, K> {
    fn kernel(&self) -> &K {
        match self {
            RealFrames::Mdct(k) | RealFrames::Mdst(k) => k,
        }
    }
}

impl<K> FrameTransform for RealFrames<'_, K>
where
    K: Cmdct1D,
{
    type Coeff = f64;

    fn framelength(&self) -> usize {
        self.kernel().framelength()
    }

    fn bins(&self) -> usize {
        self.kernel().bins()
    }

    fn analyze(&self, frame: &[f64]) -> Result<Vec<f64>, ExecInvariantViolation> {
        match self {
            RealFrames::Mdct(k) => k.mdct(frame),
            RealFrames::Mdst(k) => k.mdst(frame),
        }
    }

    fn synthesize(&self, coefficients: &[f64]) -> Result<Vec<f64>, ExecInvariantViolation> {
        match self {
            RealFrames::Mdct(k) => k.imdct(coefficients),
            RealFrames::Mdst(k) => k.imdst(coefficients),
        }
    }
}

/// [`FrameTransform`] adapter exposing the complex transform of a
/// [`Cmdct1D`] kernel.
#[derive(Debug, Clone, Copy)]
pub struct CmdctFrames<'a, K>(pub &'a K);

impl<K> FrameTransform for CmdctFrames<'_, K>
where
    K: Cmdct1D,
{
    type Coeff = Complex<f64>;

    fn framelength(&self) -> usize {
        self.0.framelength()
    }

    fn bins(&self) -> usize {
        self.0.bins()
    }

    fn analyze(&self, frame: &[f64]) -> Result<Vec<Complex<f64>>, ExecInvariantViolation> {
        self.0.cmdct(frame)
    }

    fn synthesize(&self, coefficients: &[Complex<f64>]) -> Result<Vec<f64>, ExecInvariantViolation> {
        self.0.icmdct(coefficients)
    }
}

fn validate_settings(settings: &FrameSettings) -> Result<(), ConfigError> {
    if settings.framelength == 0 || settings.framelength % 2 != 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "framelength",
            reason: "framelength must be a positive even integer",
        });
    }
    if settings.hopsize == 0 || settings.hopsize > settings.framelength {
        return Err(ConfigError::InvalidArgument {
            arg: "hopsize",
            reason: "hopsize must be in 1..=framelength",
        });
    }
    // Resolve the window once so bad window configs fail at construction.
    settings.window.build(settings.framelength)?;
    Ok(())
}

fn validate_transforms<T>(settings: &FrameSettings, transforms: &[T]) -> Result<(), ConfigError>
where
    T: FrameTransform,
{
    if transforms.is_empty() {
        return Err(ConfigError::EmptyInput { arg: "transforms" });
    }
    for t in transforms {
        if t.framelength() != settings.framelength {
            return Err(ConfigError::LengthMismatch {
                arg: "transforms",
                expected: settings.framelength,
                got: t.framelength(),
            });
        }
    }
    Ok(())
}

fn warn_non_reconstruction(settings: &FrameSettings) {
    if settings.perfect_reconstruction() {
        return;
    }
    #[cfg(feature = "log")]
    log::warn!(
        "framing parameters cannot reconstruct perfectly: hopsize {} of framelength {} with window {:?}",
        settings.hopsize,
        settings.framelength,
        settings.window,
    );
}

/// Pad the signal for framing: centering zeros around the signal, `padding`
/// framelengths of zeros behind, then enough to land the last frame on the
/// hop grid.
fn padded_signal(x: &[f64], settings: &FrameSettings) -> Vec<f64> {
    let framelength = settings.framelength;
    let mut data = Vec::with_capacity(x.len() + 2 * framelength);
    if settings.centered {
        data.resize(framelength / 2, 0.0);
    }
    data.extend_from_slice(x);
    if settings.centered {
        data.resize(data.len() + framelength / 2, 0.0);
    }
    if settings.padding > 0 {
        data.resize(data.len() + settings.padding * framelength, 0.0);
    }
    if data.len() < framelength {
        data.resize(framelength, 0.0);
    }
    let rem = (data.len() - framelength) % settings.hopsize;
    if rem != 0 {
        data.resize(data.len() + settings.hopsize - rem, 0.0);
    }
    data
}

fn spectrogram_impl<T>(
    x: &[f64],
    settings: &FrameSettings,
    transforms: &[T],
) -> Result<Spectrogram<T::Coeff>, ExecInvariantViolation>
where
    T: FrameTransform,
{
    warn_non_reconstruction(settings);
    let window = settings
        .window
        .build(settings.framelength)
        .map_err(ExecInvariantViolation::from)?;

    let data = padded_signal(x, settings);
    let n_frames = (data.len() - settings.framelength) / settings.hopsize + 1;

    let mut frames = Vec::with_capacity(n_frames);
    let mut buf = vec![0.0; settings.framelength];
    for i in 0..n_frames {
        let start = i * settings.hopsize;
        let segment = &data[start..start + settings.framelength];
        match &window {
            Some(w) => {
                for (dst, (&s, &wv)) in buf.iter_mut().zip(segment.iter().zip(w.iter())) {
                    *dst = s * wv;
                }
            }
            None => buf.copy_from_slice(segment),
        }
        frames.push(transforms[i % transforms.len()].analyze(&buf)?);
    }

    let mut settings = settings.clone();
    settings.outlength = Some(x.len());
    Ok(Spectrogram { frames, settings })
}

fn validate_rows<C>(frames: &[Vec<C>], bins: usize) -> Result<usize, ExecInvariantViolation> {
    if frames.is_empty() {
        return Err(ExecInvariantViolation::InvalidState {
            reason: "spectrogram must contain at least one frame",
        });
    }
    for row in frames {
        if row.len() != bins {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "frames",
                expected: bins,
                got: row.len(),
            });
        }
    }
    Ok(frames.len())
}

fn ispectrogram_impl<T>(
    frames: &[Vec<T::Coeff>],
    settings: &FrameSettings,
    transforms: &[T],
) -> Result<Vec<f64>, ExecInvariantViolation>
where
    T: FrameTransform,
{
    let n_frames = validate_rows(frames, transforms[0].bins())?;
    warn_non_reconstruction(settings);
    let window = settings
        .window
        .build(settings.framelength)
        .map_err(ExecInvariantViolation::from)?;

    let hop = settings.hopsize;
    let full = settings.framelength + hop * (n_frames - 1);
    let mut acc = vec![0.0; full];

    for (i, row) in frames.iter().enumerate() {
        let frame = transforms[i % transforms.len()].synthesize(row)?;
        let offset = i * hop;
        match &window {
            Some(w) => {
                for (j, (&v, &wv)) in frame.iter().zip(w.iter()).enumerate() {
                    acc[offset + j] += v * wv;
                }
            }
            None => {
                for (j, &v) in frame.iter().enumerate() {
                    acc[offset + j] += v;
                }
            }
        }
    }

    let start = if settings.centered {
        settings.framelength / 2
    } else {
        0
    };
    let tail = &acc[start..];
    match settings.outlength {
        Some(outlength) => {
            if outlength > tail.len() {
                return Err(ExecInvariantViolation::InvalidState {
                    reason: "outlength exceeds the reconstructed signal",
                });
            }
            Ok(tail[..outlength].to_vec())
        }
        None => Ok(tail.to_vec()),
    }
}

/// Constructor config for [`SpectrogramKernel`].
#[derive(Debug, Clone)]
pub struct SpectrogramConfig<T> {
    /// Framing parameters.
    pub settings: FrameSettings,
    /// Per-frame transforms, cycled frame by frame.
    pub transforms: Vec<T>,
}

/// Trait-first lapped forward kernel.
#[derive(Debug, Clone)]
pub struct SpectrogramKernel<T> {
    settings: FrameSettings,
    transforms: Vec<T>,
}

impl<T> KernelLifecycle for SpectrogramKernel<T>
where
    T: FrameTransform,
{
    type Config = SpectrogramConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_settings(&config.settings)?;
        validate_transforms(&config.settings, &config.transforms)?;
        Ok(Self {
            settings: config.settings,
            transforms: config.transforms,
        })
    }
}

impl<T> Spectrogram1D for SpectrogramKernel<T>
where
    T: FrameTransform,
{
    type Output = Spectrogram<T::Coeff>;

    fn run_into<I>(&self, input: &I, out: &mut Self::Output) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        *out = self.run_alloc(input)?;
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Self::Output, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        if input.is_empty() {
            return Err(ExecInvariantViolation::InvalidState {
                reason: "lapped transform input must be non-empty",
            });
        }
        spectrogram_impl(input, &self.settings, &self.transforms)
    }
}

/// Constructor config for [`IspectrogramKernel`].
#[derive(Debug, Clone)]
pub struct IspectrogramConfig<T> {
    /// Framing parameters.
    pub settings: FrameSettings,
    /// Per-frame transforms, cycled frame by frame.
    pub transforms: Vec<T>,
}

/// Trait-first overlap-add inverse kernel.
#[derive(Debug, Clone)]
pub struct IspectrogramKernel<T> {
    settings: FrameSettings,
    transforms: Vec<T>,
}

impl<T> IspectrogramKernel<T>
where
    T: FrameTransform,
{
    fn expected_len(&self, n_frames: usize) -> usize {
        let full = self.settings.framelength + self.settings.hopsize * (n_frames - 1);
        let start = if self.settings.centered {
            self.settings.framelength / 2
        } else {
            0
        };
        match self.settings.outlength {
            Some(outlength) => outlength,
            None => full - start,
        }
    }
}

impl<T> KernelLifecycle for IspectrogramKernel<T>
where
    T: FrameTransform,
{
    type Config = IspectrogramConfig<T>;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_settings(&config.settings)?;
        validate_transforms(&config.settings, &config.transforms)?;
        Ok(Self {
            settings: config.settings,
            transforms: config.transforms,
        })
    }
}

impl<T> Ispectrogram1D<T::Coeff> for IspectrogramKernel<T>
where
    T: FrameTransform,
{
    fn run_into<O>(
        &self,
        spectrogram: &Spectrogram<T::Coeff>,
        out: &mut O,
    ) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let n_frames = validate_rows(&spectrogram.frames, self.transforms[0].bins())?;
        let expected = self.expected_len(n_frames);
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out_slice.len() != expected {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected,
                got: out_slice.len(),
            });
        }
        let y = ispectrogram_impl(&spectrogram.frames, &self.settings, &self.transforms)?;
        out_slice.copy_from_slice(&y);
        Ok(())
    }

    fn run_alloc(
        &self,
        spectrogram: &Spectrogram<T::Coeff>,
    ) -> Result<Vec<f64>, ExecInvariantViolation> {
        ispectrogram_impl(&spectrogram.frames, &self.settings, &self.transforms)
    }
}

/// Frame a signal with the given settings and per-frame transforms.
pub fn spectrogram_with<T>(
    x: &[f64],
    settings: &FrameSettings,
    transforms: Vec<T>,
) -> Result<Spectrogram<T::Coeff>, ExecInvariantViolation>
where
    T: FrameTransform,
{
    let kernel = SpectrogramKernel::try_new(SpectrogramConfig {
        settings: settings.clone(),
        transforms,
    })?;
    kernel.run_alloc(x)
}

/// Reconstruct a signal from coefficient frames by weighted overlap-add.
pub fn ispectrogram_with<T>(
    spectrogram: &Spectrogram<T::Coeff>,
    settings: &FrameSettings,
    transforms: Vec<T>,
) -> Result<Vec<f64>, ExecInvariantViolation>
where
    T: FrameTransform,
{
    let kernel = IspectrogramKernel::try_new(IspectrogramConfig {
        settings: settings.clone(),
        transforms,
    })?;
    kernel.run_alloc(spectrogram)
}
