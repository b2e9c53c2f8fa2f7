//! Lapped MDCT, MDST and complex MDCT/MCLT transforms.
//!
//! The crate is layered the way the math is layered:
//!
//! - [`transform`] holds the per-frame kernels behind the
//!   [`traits::Cmdct1D`] strategy trait: an FFT-backed implementation and a
//!   direct-summation reference implementation that agree to floating-point
//!   tolerance.
//! - [`frame`] turns per-frame transforms into lapped ones: windowed framing
//!   on the way in, weighted overlap-add on the way out, with perfect
//!   reconstruction at 50% overlap under a Princen-Bradley window.
//! - [`windows`] generates those windows (raised-cosine and Kaiser-Bessel
//!   derived).
//! - The crate root re-exports the named entry points `mdct`/`imdct`,
//!   `mdst`/`imdst`, `cmdct`/`icmdct` and the `mclt`/`imclt` aliases.
//!
//! ```
//! use mdct::{imdct, mdct, TransformOptions};
//!
//! let signal: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.01).sin()).collect();
//! let options = TransformOptions {
//!     framelength: 512,
//!     ..TransformOptions::default()
//! };
//! let spectrogram = mdct(&signal, &options)?;
//! let restored = imdct(&spectrogram, None)?;
//! assert_eq!(restored.len(), signal.len());
//! # Ok::<(), mdct::Error>(())
//! ```
//!
//! Built with `default-features = false` and `alloc`, the reference kernel,
//! windows and framing engine remain available without `std`; the FFT kernel
//! and the façade require `std`.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

#[cfg(feature = "alloc")]
#[macro_use]
extern crate alloc;

pub mod error;
pub mod kernel;
pub mod special;
pub mod traits;
pub mod transform;

#[cfg(feature = "alloc")]
pub mod frame;
#[cfg(feature = "alloc")]
pub mod windows;

#[cfg(feature = "std")]
mod lapped;

pub use error::Error;
#[cfg(feature = "std")]
pub use lapped::*;
