use ndarray::{Array2, Zip};

/// Hard-assign each cell's energy wholly to one component.
///
/// Cells where the harmonic share fell below the percussive one go
/// entirely percussive (`H = 0, P = W`); every other cell, including an
/// exact tie, goes entirely harmonic (`H = W, P = 0`). The
/// harmonic-favoring tie-break is specified behavior, kept from the
/// original comparison with no claim of optimality.
///
/// Applying the pass to an already-binarized pair is a no-op.
///
/// # Panics
/// Panics if the three arrays disagree in shape. They are constructed
/// from a single spectrogram, so a mismatch is a construction bug, not a
/// recoverable input error.
pub fn binarize(h: &mut Array2<f32>, p: &mut Array2<f32>, w: &Array2<f32>) {
    assert_eq!(h.dim(), p.dim(), "harmonic/percussive shape mismatch");
    assert_eq!(h.dim(), w.dim(), "energy/weight shape mismatch");

    Zip::from(h).and(p).and(w).for_each(|h, p, &w| {
        if *h < *p {
            *h = 0.0;
            *p = w;
        } else {
            *h = w;
            *p = 0.0;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_total() {
        let w = Array2::from_shape_vec((2, 2), vec![4.0, 6.0, 2.0, 8.0]).unwrap();
        let mut h = Array2::from_shape_vec((2, 2), vec![3.0, 1.0, 1.5, 0.0]).unwrap();
        let mut p = &w - &h;
        binarize(&mut h, &mut p, &w);

        for ((idx, &h), &w) in h.indexed_iter().zip(w.iter()) {
            assert!(h == 0.0 || h == w, "cell {idx:?} not hard-assigned");
            assert_eq!(h + p[idx], w);
        }
        // H > P wins, H < P loses.
        assert_eq!(h[(0, 0)], 4.0);
        assert_eq!(h[(0, 1)], 0.0);
        assert_eq!(h[(1, 1)], 0.0);
    }

    #[test]
    fn tie_goes_to_harmonic() {
        let w = Array2::from_elem((1, 2), 6.0);
        let mut h = Array2::from_elem((1, 2), 3.0);
        let mut p = Array2::from_elem((1, 2), 3.0);
        binarize(&mut h, &mut p, &w);
        assert_eq!(h[(0, 0)], 6.0);
        assert_eq!(p[(0, 0)], 0.0);
    }

    #[test]
    fn idempotent() {
        let w = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 0.0]).unwrap();
        let mut h = Array2::from_shape_vec((2, 3), vec![0.6, 0.9, 1.6, 1.9, 2.6, 0.0]).unwrap();
        let mut p = &w - &h;
        binarize(&mut h, &mut p, &w);
        let (h_once, p_once) = (h.clone(), p.clone());
        binarize(&mut h, &mut p, &w);
        assert_eq!(h, h_once);
        assert_eq!(p, p_once);
    }

    #[test]
    fn zero_weight_cell_stays_zero_in_both() {
        // W = 0 forces H = P = 0; the tie-break assigns it harmonic,
        // which is still zero.
        let w = Array2::from_elem((1, 1), 0.0);
        let mut h = Array2::from_elem((1, 1), 0.0);
        let mut p = Array2::from_elem((1, 1), 0.0);
        binarize(&mut h, &mut p, &w);
        assert_eq!(h[(0, 0)], 0.0);
        assert_eq!(p[(0, 0)], 0.0);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn shape_disagreement_is_fatal() {
        let w = Array2::from_elem((2, 2), 1.0);
        let mut h = Array2::from_elem((2, 3), 0.5);
        let mut p = Array2::from_elem((2, 3), 0.5);
        binarize(&mut h, &mut p, &w);
    }
}
