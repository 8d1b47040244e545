use crate::fft::FftPlan;
use crate::window;
use ndarray::Array2;
use num_complex::Complex32;

/// STFT analysis/synthesis parameters.
///
/// The same configuration must be used for the forward and inverse
/// transforms of one pipeline run.
#[derive(Debug, Clone)]
pub struct StftConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub window: Vec<f32>,
    /// Center each frame on its sample, reflect-padding the signal edges.
    pub center: bool,
}

impl StftConfig {
    /// Configuration used by the separation pipeline: a periodic Hann
    /// window at half-overlap.
    pub fn for_separation(n_fft: usize) -> Self {
        Self {
            n_fft,
            hop_length: n_fft / 2,
            window: window::hann(n_fft),
            center: true,
        }
    }
}

impl Default for StftConfig {
    fn default() -> Self {
        Self::for_separation(1024)
    }
}

fn check_sizes(config: &StftConfig) -> crate::Result<()> {
    if config.n_fft == 0 {
        return Err(crate::Error::InvalidSize {
            name: "n_fft",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.window.len() != config.n_fft {
        return Err(crate::Error::InvalidSize {
            name: "window",
            value: config.window.len(),
            reason: "window length must equal n_fft",
        });
    }
    Ok(())
}

fn reflect_index(mut idx: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len as isize - 1;
    while idx < 0 || idx > last {
        if idx < 0 {
            idx = -idx;
        }
        if idx > last {
            idx = 2 * last - idx;
        }
    }
    idx as usize
}

fn pad_reflect(y: &[f32], pad: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(y.len() + 2 * pad);
    for i in 0..y.len() + 2 * pad {
        let src = i as isize - pad as isize;
        out.push(y[reflect_index(src, y.len())]);
    }
    out
}

fn analyze_frame(
    frame: usize,
    padded: &[f32],
    window: &[f32],
    fft: &FftPlan,
    hop_length: usize,
    n_fft: usize,
) -> Vec<Complex32> {
    let start = frame * hop_length;
    let mut buffer = vec![0.0f32; n_fft];
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample = padded.get(start + i).copied().unwrap_or(0.0) * window[i];
    }
    fft.forward(&buffer)
}

/// Compute the Short-Time Fourier Transform.
///
/// Returns a complex matrix of shape `(n_fft/2 + 1, n_frames)` with
/// frequency on the first axis and time on the second.
///
/// # Errors
/// Returns an error for empty or non-finite audio, or a zero
/// `n_fft`/`hop_length`.
pub fn stft(y: &[f32], config: &StftConfig) -> crate::Result<Array2<Complex32>> {
    crate::io::valid_audio(y)?;
    check_sizes(config)?;

    let padded = if config.center {
        pad_reflect(y, config.n_fft / 2)
    } else {
        y.to_vec()
    };
    let n_frames = if padded.len() < config.n_fft {
        0
    } else {
        (padded.len() - config.n_fft) / config.hop_length + 1
    };
    let n_freq = config.n_fft / 2 + 1;
    let fft = FftPlan::new(config.n_fft);

    let frames: Vec<Vec<Complex32>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..n_frames)
                .into_par_iter()
                .map(|frame| {
                    analyze_frame(
                        frame,
                        &padded,
                        &config.window,
                        &fft,
                        config.hop_length,
                        config.n_fft,
                    )
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..n_frames)
                .map(|frame| {
                    analyze_frame(
                        frame,
                        &padded,
                        &config.window,
                        &fft,
                        config.hop_length,
                        config.n_fft,
                    )
                })
                .collect()
        }
    };

    let mut matrix = Array2::<Complex32>::zeros((n_freq, n_frames));
    for (t, frame) in frames.iter().enumerate() {
        for (f, &bin) in frame.iter().enumerate() {
            matrix[(f, t)] = bin;
        }
    }
    Ok(matrix)
}

/// Reconstruct a time-domain signal from an STFT matrix by overlap-add.
///
/// The synthesis applies the analysis window again and divides by the
/// accumulated squared window, so any window/hop pair that covers the
/// signal reconstructs it exactly up to float roundoff. When `length` is
/// given, the output is truncated or zero-padded to exactly that many
/// samples; this is where the trim/pad policy for exact-length
/// reconstruction lives.
///
/// # Errors
/// Returns an error if the matrix is empty or the hop length is zero.
pub fn istft(
    matrix: &Array2<Complex32>,
    config: &StftConfig,
    length: Option<usize>,
) -> crate::Result<Vec<f32>> {
    let (n_freq, n_frames) = matrix.dim();
    if n_freq == 0 || n_frames == 0 {
        return Err(crate::Error::InvalidSize {
            name: "matrix",
            value: 0,
            reason: "STFT matrix must be non-empty",
        });
    }
    if config.hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be > 0",
        });
    }

    let n_fft = (n_freq - 1) * 2;
    if config.window.len() != n_fft {
        return Err(crate::Error::InvalidSize {
            name: "window",
            value: config.window.len(),
            reason: "window length must match the matrix's transform size",
        });
    }
    let fft = FftPlan::new(n_fft);

    let mut y = vec![0.0f32; (n_frames - 1) * config.hop_length + n_fft];
    let mut window_sums = vec![0.0f32; y.len()];

    for t in 0..n_frames {
        let start = t * config.hop_length;
        let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];
        for f in 0..n_freq {
            buffer[f] = matrix[(f, t)];
        }
        for f in 1..n_freq - 1 {
            buffer[n_fft - f] = matrix[(f, t)].conj();
        }
        fft.inverse(&mut buffer);

        for i in 0..n_fft {
            let w = config.window[i];
            y[start + i] += buffer[i].re * w;
            window_sums[start + i] += w * w;
        }
    }

    for (sample, &norm) in y.iter_mut().zip(window_sums.iter()) {
        if norm > 1e-8 {
            *sample /= norm;
        }
    }

    let mut out = if config.center {
        let pad = n_fft / 2;
        if y.len() > 2 * pad {
            y[pad..y.len() - pad].to_vec()
        } else {
            y
        }
    } else {
        y
    };

    if let Some(len) = length {
        out.resize(len, 0.0);
    }
    Ok(out)
}

/// Split a complex STFT matrix into magnitude and unit-phasor phase.
///
/// Zero-magnitude bins get a zero phasor.
pub fn magphase(matrix: &Array2<Complex32>) -> (Array2<f32>, Array2<Complex32>) {
    let mut magnitude = Array2::<f32>::zeros(matrix.raw_dim());
    let mut phase = Array2::<Complex32>::zeros(matrix.raw_dim());
    for ((idx, &v), mag) in matrix.indexed_iter().zip(magnitude.iter_mut()) {
        let m = v.norm();
        *mag = m;
        if m > 0.0 {
            phase[idx] = v / m;
        }
    }
    (magnitude, phase)
}

/// Convert a power spectrogram to dB: `10 * log10(S / ref)`.
///
/// Values below `amin` are floored before the log; with `top_db`, the
/// result is clipped to `max - top_db`.
pub fn power_to_db(
    power: &Array2<f32>,
    ref_power: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 10.0 * ref_power.max(amin).log10();
    let mut db = power.mapv(|p| 10.0 * p.max(amin).log10() - log_ref);
    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        db.mapv_inplace(|v| v.max(max_db - top));
    }
    db
}

/// Convert an amplitude spectrogram to dB: `20 * log10(S / ref)`.
pub fn amplitude_to_db(
    amplitude: &Array2<f32>,
    ref_amplitude: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 20.0 * ref_amplitude.max(amin).log10();
    let mut db = amplitude.mapv(|a| 20.0 * a.max(amin).log10() - log_ref);
    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        db.mapv_inplace(|v| v.max(max_db - top));
    }
    db
}
