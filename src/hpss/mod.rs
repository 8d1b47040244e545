//! Harmonic/percussive separation by complementary diffusion.
//!
//! The algorithm (Ono et al., 2008) range-compresses the magnitude
//! spectrogram into a weight array, splits it evenly into harmonic and
//! percussive energies, then runs a fixed number of synchronous update
//! rounds that smooth harmonic energy along time and percussive energy
//! along frequency while conserving their sum per cell. The final soft
//! split is binarized and expanded back into two complex spectra that
//! reuse the mixture phase.

mod binarize;
mod compress;
mod diffusion;
mod reconstruct;

pub use binarize::binarize;
pub use compress::range_compress;
pub use diffusion::Diffusion;
pub use reconstruct::reconstruct;

use crate::spectrum::{self, StftConfig};
use ndarray::Array2;
use num_complex::Complex32;

/// Parameters controlling the diffusion separation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HpssConfig {
    /// Balance between time smoothing of harmonic energy and frequency
    /// smoothing of percussive energy.
    pub alpha: f32,
    /// Range-compression exponent; the weight array is `|S|^(2·gamma)`.
    pub gamma: f32,
    /// Number of diffusion rounds. Zero is valid and binarizes the
    /// initial even split directly.
    pub k_max: usize,
}

impl Default for HpssConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            gamma: 0.3,
            k_max: 50,
        }
    }
}

impl HpssConfig {
    /// Check the parameters before any array work.
    ///
    /// A non-positive `gamma` is fatal. `alpha` outside (0, 1) keeps the
    /// arithmetic well-defined but voids the diffusion interpretation, so
    /// it only draws a warning.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(crate::Error::InvalidParameter {
                name: "gamma",
                value: self.gamma.to_string(),
                reason: "must be a finite value > 0".to_string(),
            });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            log::warn!(
                "alpha = {} lies outside (0, 1); the update no longer behaves as diffusion",
                self.alpha
            );
        }
        Ok(())
    }
}

/// Result of a separation run.
#[derive(Debug, Clone)]
pub struct Separation {
    /// Hard-assigned harmonic spectrum carrying the mixture phase.
    pub harmonic: Array2<Complex32>,
    /// Hard-assigned percussive spectrum carrying the mixture phase.
    pub percussive: Array2<Complex32>,
    /// Soft harmonic energy before binarization, kept for visualization.
    pub harmonic_energy: Array2<f32>,
    /// Soft percussive energy before binarization.
    pub percussive_energy: Array2<f32>,
}

/// Separate a complex spectrogram into harmonic and percussive spectra.
///
/// Runs the full core pipeline: range compression, `k_max` diffusion
/// rounds, binarization, reconstruction. The input spectrogram is left
/// untouched; its phase is reused for both outputs.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use num_complex::Complex32;
/// use skiffle::hpss::{separate, HpssConfig};
///
/// let stft = Array2::from_elem((5, 8), Complex32::new(0.3, 0.0));
/// let sep = separate(&stft, &HpssConfig::default()).unwrap();
/// assert_eq!(sep.harmonic.dim(), (5, 8));
/// ```
pub fn separate(stft: &Array2<Complex32>, config: &HpssConfig) -> crate::Result<Separation> {
    config.validate()?;

    let w = range_compress(stft, config.gamma)?;
    let mut diffusion = Diffusion::new(w, config.alpha);
    diffusion.run(config.k_max);
    let (mut h, mut p, w) = diffusion.into_energies();

    let harmonic_energy = h.clone();
    let percussive_energy = p.clone();

    binarize(&mut h, &mut p, &w);
    let (harmonic, percussive) = reconstruct(&h, &p, stft, config.gamma)?;

    Ok(Separation {
        harmonic,
        percussive,
        harmonic_energy,
        percussive_energy,
    })
}

/// Waveform-in/waveform-out separation.
///
/// Computes the STFT, separates, and inverts both components back to the
/// input's exact length. Returns `(harmonic, percussive)` waveforms.
pub fn separate_waveform(
    y: &[f32],
    n_fft: usize,
    hop_length: usize,
    config: &HpssConfig,
) -> crate::Result<(Vec<f32>, Vec<f32>)> {
    let stft_config = StftConfig {
        n_fft,
        hop_length,
        window: crate::window::hann(n_fft),
        center: true,
    };
    let stft = spectrum::stft(y, &stft_config)?;
    let sep = separate(&stft, config)?;
    let harmonic = spectrum::istft(&sep.harmonic, &stft_config, Some(y.len()))?;
    let percussive = spectrum::istft(&sep.percussive, &stft_config, Some(y.len()))?;
    Ok((harmonic, percussive))
}
