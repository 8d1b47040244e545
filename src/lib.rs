//! Harmonic/percussive audio separation for Rust.
//!
//! Skiffle splits a monaural recording into a harmonic layer (sustained,
//! pitched content) and a percussive layer (transient, broadband content)
//! by complementary diffusion on the range-compressed magnitude
//! spectrogram, after Ono, Miyamoto, Le Roux, Kameoka & Sagayama (2008):
//! harmonic energy is smoothed along time, percussive energy along
//! frequency, and each time-frequency cell's energy is conserved between
//! the two throughout.
//!
//! # Quick Start
//!
//! ```rust
//! use skiffle::hpss::{separate_waveform, HpssConfig};
//! use skiffle::{evaluate, io};
//!
//! // A chord plus a click train, 1 second at 8 kHz.
//! let mut y = io::tone(440.0, 8000, 1.0);
//! let clicks = io::clicks(&[0.25, 0.5, 0.75], 8000, Some(y.len()), 0.02, 1500.0);
//! for (s, c) in y.iter_mut().zip(clicks.iter()) {
//!     *s = 0.5 * *s + 0.3 * c;
//! }
//!
//! let (harmonic, percussive) =
//!     separate_waveform(&y, 1024, 512, &HpssConfig::default()).unwrap();
//! let quality = evaluate::snr(&y, &harmonic, &percussive).unwrap();
//! println!("separation SNR: {quality}");
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`hpss`] | The separation core: range compression, diffusion, binarization, reconstruction |
//! | [`spectrum`] | STFT/ISTFT and dB conversions |
//! | [`evaluate`] | Separation-quality metric (SNR) |
//! | [`io`] | WAV load/save, mono mixdown, resampling, signal generators |
//! | [`files`] | Deterministic output naming from the parameter tuple |
//! | [`fft`] | Cached FFT plans |
//! | [`window`] | Analysis windows |
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Invalid configuration is rejected
//! before any array work; degenerate-but-well-defined settings (such as a
//! diffusion balance outside (0, 1)) are accepted with a `log` warning.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `display` | PPM spectrogram rendering and the three-panel separation figure |
//! | `parallel` | Row-parallel diffusion rounds and frame-parallel STFT via rayon |
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`.

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod evaluate;
pub mod fft;
pub mod files;
pub mod hpss;
pub mod io;
pub mod spectrum;
pub mod window;

#[cfg(feature = "display")]
pub mod display;
