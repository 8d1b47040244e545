use ndarray::{Array2, Zip};
use std::time::Instant;

/// Complementary-diffusion state over one spectrogram.
///
/// Owns the harmonic energy `H`, the percussive energy `P`, and the weight
/// array `W` for the whole round loop; nothing else can observe the
/// energies until the loop hands them back. Two invariants hold at every
/// round boundary by construction:
///
/// - conservation: `H[f, t] + P[f, t] == W[f, t]`
/// - bounds: `0 <= H[f, t] <= W[f, t]`
///
/// Each round reads only the pre-round snapshot of both energies and
/// writes into a scratch buffer that is swapped in afterwards, so neighbor
/// reads never observe values updated within the same round; an in-place
/// sweep would compute a different recurrence.
pub struct Diffusion {
    h: Array2<f32>,
    p: Array2<f32>,
    w: Array2<f32>,
    scratch: Array2<f32>,
    alpha: f32,
}

/// One row of the next harmonic array, from the pre-round snapshot.
///
/// The harmonic Laplacian runs along the time axis and the percussive one
/// along the frequency axis. Both wrap circularly: the neighbor before
/// index 0 is the last index, not zero padding.
fn update_row(
    f: usize,
    h: &Array2<f32>,
    p: &Array2<f32>,
    w: &Array2<f32>,
    alpha: f32,
) -> Vec<f32> {
    let (n_freq, n_frames) = h.dim();
    let f_prev = if f == 0 { n_freq - 1 } else { f - 1 };
    let f_next = if f + 1 == n_freq { 0 } else { f + 1 };

    let mut row = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        let t_prev = if t == 0 { n_frames - 1 } else { t - 1 };
        let t_next = if t + 1 == n_frames { 0 } else { t + 1 };

        let curve_h = h[(f, t_prev)] - 2.0 * h[(f, t)] + h[(f, t_next)];
        let curve_p = p[(f_prev, t)] - 2.0 * p[(f, t)] + p[(f_next, t)];
        let delta = 0.25 * (alpha * curve_h - (1.0 - alpha) * curve_p);

        row.push((h[(f, t)] + delta).clamp(0.0, w[(f, t)]));
    }
    row
}

impl Diffusion {
    /// Start from the even split `H = P = 0.5·W`.
    pub fn new(w: Array2<f32>, alpha: f32) -> Self {
        let h = w.mapv(|v| 0.5 * v);
        let p = h.clone();
        let scratch = Array2::zeros(w.raw_dim());
        Self {
            h,
            p,
            w,
            scratch,
            alpha,
        }
    }

    /// One synchronous update round.
    ///
    /// The updated harmonic energy is clamped to `[0, W]` and the
    /// percussive energy is then derived as `W - H`, which keeps both
    /// invariants exact. Within the round every cell depends only on the
    /// pre-round snapshot, so rows are independent; under the `parallel`
    /// feature they are computed with rayon. The full new array is
    /// materialized before this method returns, which is the barrier the
    /// circular-wrap reads of the next round rely on.
    pub fn step(&mut self) {
        let (n_freq, _) = self.h.dim();

        let rows: Vec<Vec<f32>> = {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                (0..n_freq)
                    .into_par_iter()
                    .map(|f| update_row(f, &self.h, &self.p, &self.w, self.alpha))
                    .collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                (0..n_freq)
                    .map(|f| update_row(f, &self.h, &self.p, &self.w, self.alpha))
                    .collect()
            }
        };

        for (f, row) in rows.iter().enumerate() {
            for (t, &v) in row.iter().enumerate() {
                self.scratch[(f, t)] = v;
            }
        }
        std::mem::swap(&mut self.h, &mut self.scratch);

        Zip::from(&mut self.p)
            .and(&self.w)
            .and(&self.h)
            .for_each(|p, &w, &h| *p = w - h);
    }

    /// Run exactly `k_max` strictly sequential rounds.
    ///
    /// `k_max == 0` is valid and leaves the initial even split untouched.
    pub fn run(&mut self, k_max: usize) {
        let start = Instant::now();
        for _ in 0..k_max {
            self.step();
        }
        log::debug!(
            "{} diffusion rounds over {} cells took {:?}",
            k_max,
            self.h.len(),
            start.elapsed()
        );
    }

    pub fn harmonic(&self) -> &Array2<f32> {
        &self.h
    }

    pub fn percussive(&self) -> &Array2<f32> {
        &self.p
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    /// Hand the energies and weights back once the loop is done.
    pub fn into_energies(self) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
        (self.h, self.p, self.w)
    }
}
