use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Cached FFT plans for spectrogram analysis and synthesis.
///
/// The forward direction is a real-to-complex transform (spectrogram
/// analysis always starts from real samples) returning the non-redundant
/// half spectrum; the inverse is a full complex transform fed with a
/// conjugate-symmetric buffer by [`crate::spectrum::istft`].
///
/// # Example
/// ```
/// use skiffle::fft::FftPlan;
///
/// let plan = FftPlan::new(512);
/// let spectrum = plan.forward(&vec![1.0f32; 512]);
/// assert_eq!(spectrum.len(), 257); // 512/2 + 1
/// ```
pub struct FftPlan {
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    len: usize,
}

impl FftPlan {
    /// Create plans for a given transform size.
    pub fn new(len: usize) -> Self {
        let forward = RealFftPlanner::<f32>::new().plan_fft_forward(len);
        let inverse = FftPlanner::new().plan_fft_inverse(len);
        Self {
            forward,
            inverse,
            len,
        }
    }

    /// Transform size the plans were built for.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward real FFT.
    ///
    /// Input shorter than the transform size is zero-padded; the result
    /// holds the `len/2 + 1` non-redundant bins.
    pub fn forward(&self, time: &[f32]) -> Vec<Complex32> {
        let mut input = time.to_vec();
        input.resize(self.len, 0.0);
        let mut output = self.forward.make_output_vec();
        let _ = self.forward.process(&mut input, &mut output);
        output
    }

    /// Inverse complex FFT in place, scaled by `1/len`.
    pub fn inverse(&self, buffer: &mut [Complex32]) {
        self.inverse.process(buffer);
        let scale = 1.0 / self.len as f32;
        for v in buffer.iter_mut() {
            *v *= scale;
        }
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_bin_count() {
        let plan = FftPlan::new(16);
        let spectrum = plan.forward(&[0.0; 16]);
        assert_eq!(spectrum.len(), 9);
    }

    #[test]
    fn dc_signal_lands_in_bin_zero() {
        let plan = FftPlan::new(8);
        let spectrum = plan.forward(&[1.0; 8]);
        assert_relative_eq!(spectrum[0].re, 8.0, epsilon = 1e-4);
        for bin in &spectrum[1..] {
            assert_relative_eq!(bin.norm(), 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn inverse_scales_by_len() {
        let plan = FftPlan::new(4);
        // Spectrum of a constant 1.0 signal.
        let mut buffer = vec![Complex32::new(0.0, 0.0); 4];
        buffer[0] = Complex32::new(4.0, 0.0);
        plan.inverse(&mut buffer);
        for v in &buffer {
            assert_relative_eq!(v.re, 1.0, epsilon = 1e-5);
            assert_relative_eq!(v.im, 0.0, epsilon = 1e-5);
        }
    }
}
