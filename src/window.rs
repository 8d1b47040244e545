/// Compute a periodic Hann (raised cosine) window.
///
/// This is the analysis window used throughout the separation pipeline;
/// at half-overlap its squared sum is constant, which makes the
/// overlap-add synthesis in [`crate::spectrum::istft`] exact.
pub fn hann(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Compute a periodic Hamming window.
pub fn hamming(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}
