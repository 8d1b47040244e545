use std::fmt;

/// Separation quality relative to the original mixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Snr {
    /// Ratio of signal power to residual power, in decibels.
    Decibels(f32),
    /// The components sum back to the original exactly (zero residual).
    Perfect,
}

impl fmt::Display for Snr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snr::Decibels(db) => write!(f, "{db:.2} dB"),
            Snr::Perfect => write!(f, "perfect reconstruction"),
        }
    }
}

/// Signal-to-noise ratio of a separation:
/// `10·log10(Σx² / Σ(x − h − p)²)`.
///
/// The residual is whatever the two reconstructed components fail to
/// explain of the original. A residual of exactly zero is reported as
/// [`Snr::Perfect`] rather than treated as a division failure.
///
/// # Errors
/// The three waveforms must have equal lengths.
pub fn snr(original: &[f32], harmonic: &[f32], percussive: &[f32]) -> crate::Result<Snr> {
    if harmonic.len() != original.len() || percussive.len() != original.len() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("three waveforms of length {}", original.len()),
            got: format!(
                "harmonic {}, percussive {}",
                harmonic.len(),
                percussive.len()
            ),
        });
    }

    let mut signal = 0.0f64;
    let mut residual = 0.0f64;
    for i in 0..original.len() {
        let x = original[i] as f64;
        let r = x - harmonic[i] as f64 - percussive[i] as f64;
        signal += x * x;
        residual += r * r;
    }

    if residual == 0.0 {
        return Ok(Snr::Perfect);
    }
    Ok(Snr::Decibels((10.0 * (signal / residual).log10()) as f32))
}
