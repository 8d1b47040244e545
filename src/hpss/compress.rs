use ndarray::Array2;
use num_complex::Complex32;

/// Range-compress a complex spectrogram into a non-negative weight array.
///
/// `W[f, t] = |S[f, t]|^(2·gamma)`, computed as `norm_sqr(S)^gamma`. A
/// zero-magnitude bin stays zero for any positive exponent.
///
/// # Errors
/// Rejects a non-positive or non-finite `gamma` before touching the
/// array.
pub fn range_compress(stft: &Array2<Complex32>, gamma: f32) -> crate::Result<Array2<f32>> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "gamma",
            value: gamma.to_string(),
            reason: "must be a finite value > 0".to_string(),
        });
    }
    Ok(stft.mapv(|v| v.norm_sqr().powf(gamma)))
}
