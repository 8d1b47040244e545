use ndarray::{Array2, Zip};
use num_complex::Complex32;

/// Rebuild complex spectra from hard-assigned energies.
///
/// Both outputs reuse the mixture phase unchanged; the magnitudes undo
/// the range compression through the `1/(2·gamma)` power:
///
/// `spec[f, t] = exp(i·arg(S[f, t])) · E[f, t]^(1/(2·gamma))`
///
/// A zero energy stays zero for any positive exponent. Non-finite
/// magnitudes (overflow from exponentiating extreme energies) are zeroed
/// and reported once per component as a numeric-overflow warning instead
/// of being propagated into the inverse transform.
///
/// # Errors
/// Rejects a non-positive or non-finite `gamma`.
///
/// # Panics
/// Panics if the energy arrays disagree with the spectrogram shape
/// (a construction bug).
pub fn reconstruct(
    h: &Array2<f32>,
    p: &Array2<f32>,
    stft: &Array2<Complex32>,
    gamma: f32,
) -> crate::Result<(Array2<Complex32>, Array2<Complex32>)> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "gamma",
            value: gamma.to_string(),
            reason: "must be a finite value > 0".to_string(),
        });
    }
    assert_eq!(h.dim(), stft.dim(), "energy/spectrogram shape mismatch");
    assert_eq!(p.dim(), stft.dim(), "energy/spectrogram shape mismatch");

    let exponent = 1.0 / (2.0 * gamma);
    let harmonic = expand(h, stft, exponent, "harmonic");
    let percussive = expand(p, stft, exponent, "percussive");
    Ok((harmonic, percussive))
}

fn expand(
    energy: &Array2<f32>,
    stft: &Array2<Complex32>,
    exponent: f32,
    component: &str,
) -> Array2<Complex32> {
    let mut overflowed = 0usize;
    let mut out = Array2::<Complex32>::zeros(stft.raw_dim());

    Zip::from(&mut out)
        .and(energy)
        .and(stft)
        .for_each(|out, &e, &s| {
            let mut magnitude = e.powf(exponent);
            if !magnitude.is_finite() {
                overflowed += 1;
                magnitude = 0.0;
            }
            *out = Complex32::from_polar(magnitude, s.arg());
        });

    if overflowed > 0 {
        log::warn!(
            "numeric overflow in {component} reconstruction: {overflowed} bins zeroed"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn phase_is_reused_unchanged() {
        let mut s = Array2::<Complex32>::zeros((1, 1));
        s[(0, 0)] = Complex32::from_polar(2.0, 1.2);
        let h = Array2::from_elem((1, 1), 9.0);
        let p = Array2::from_elem((1, 1), 0.0);

        // gamma = 0.5 makes the exponent 1, so |out| == H.
        let (hs, ps) = reconstruct(&h, &p, &s, 0.5).unwrap();
        assert_relative_eq!(hs[(0, 0)].norm(), 9.0, epsilon = 1e-5);
        assert_relative_eq!(hs[(0, 0)].arg(), 1.2, epsilon = 1e-5);
        assert_relative_eq!(ps[(0, 0)].norm(), 0.0);
    }

    #[test]
    fn compression_roundtrip_recovers_magnitude() {
        // |S|^(2g) expanded by 1/(2g) gives back |S|.
        let gamma = 0.3f32;
        let mut s = Array2::<Complex32>::zeros((1, 2));
        s[(0, 0)] = Complex32::new(0.0, 5.0);
        s[(0, 1)] = Complex32::new(-2.0, 0.0);
        let w = crate::hpss::range_compress(&s, gamma).unwrap();
        let zeros = Array2::from_elem((1, 2), 0.0);

        let (hs, _) = reconstruct(&w, &zeros, &s, gamma).unwrap();
        assert_relative_eq!(hs[(0, 0)].norm(), 5.0, epsilon = 1e-3);
        assert_relative_eq!(hs[(0, 1)].norm(), 2.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_energy_stays_zero() {
        let mut s = Array2::<Complex32>::zeros((1, 1));
        s[(0, 0)] = Complex32::new(1.0, 1.0);
        let zeros = Array2::from_elem((1, 1), 0.0);
        let (hs, ps) = reconstruct(&zeros, &zeros, &s, 0.3).unwrap();
        assert_eq!(hs[(0, 0)], Complex32::new(0.0, 0.0));
        assert_eq!(ps[(0, 0)], Complex32::new(0.0, 0.0));
    }

    #[test]
    fn components_sum_back_to_the_mixture() {
        // After binarization each cell's energy is W or 0, so the two
        // expanded magnitudes sum to |S| cell by cell and the spectra sum
        // to S for any gamma.
        let gamma = 0.4f32;
        let mut s = Array2::<Complex32>::zeros((2, 2));
        s[(0, 0)] = Complex32::from_polar(3.0, 0.7);
        s[(0, 1)] = Complex32::from_polar(0.5, -2.1);
        s[(1, 0)] = Complex32::from_polar(4.0, 3.0);
        let w = crate::hpss::range_compress(&s, gamma).unwrap();

        let mut h = w.clone();
        let mut p = Array2::from_elem((2, 2), 0.0);
        // Send one cell to percussive.
        p[(0, 1)] = w[(0, 1)];
        h[(0, 1)] = 0.0;

        let (hs, ps) = reconstruct(&h, &p, &s, gamma).unwrap();
        for (idx, &sv) in s.indexed_iter() {
            let sum = hs[idx] + ps[idx];
            assert_relative_eq!(sum.re, sv.re, epsilon = 1e-3);
            assert_relative_eq!(sum.im, sv.im, epsilon = 1e-3);
        }
    }

    #[test]
    fn invalid_gamma_is_rejected() {
        let s = Array2::<Complex32>::zeros((1, 1));
        let e = Array2::from_elem((1, 1), 0.0);
        assert!(reconstruct(&e, &e, &s, 0.0).is_err());
        assert!(reconstruct(&e, &e, &s, f32::INFINITY).is_err());
    }

    #[test]
    fn overflow_is_zeroed_not_propagated() {
        let mut s = Array2::<Complex32>::zeros((1, 1));
        s[(0, 0)] = Complex32::new(1.0, 0.0);
        // A huge energy with a large expansion exponent overflows f32.
        let e = Array2::from_elem((1, 1), 1e30f32);
        let zeros = Array2::from_elem((1, 1), 0.0);
        let (hs, _) = reconstruct(&e, &zeros, &s, 0.01).unwrap();
        assert!(hs[(0, 0)].norm().is_finite());
        assert_eq!(hs[(0, 0)], Complex32::new(0.0, 0.0));
    }
}
