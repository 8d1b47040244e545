use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use ndarray::Array2;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;

/// Reject empty or non-finite input before any transform work.
pub fn valid_audio(y: &[f32]) -> crate::Result<()> {
    if y.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }
    if !y.iter().all(|v| v.is_finite()) {
        return Err(crate::Error::NonFiniteAudio);
    }
    Ok(())
}

/// Load a WAV file into a channel-major array.
///
/// Integer samples are scaled to [-1.0, 1.0]; 32-bit float files are
/// passed through. Returns the data as `(channels, frames)` together with
/// the file's sample rate.
pub fn load_wav<P: AsRef<Path>>(path: P) -> crate::Result<(Array2<f32>, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let mut samples: Vec<f32> = Vec::new();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for s in reader.samples::<f32>() {
                samples.push(s?);
            }
        }
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            for s in reader.samples::<i16>() {
                samples.push(s? as f32 / scale);
            }
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            for s in reader.samples::<i32>() {
                samples.push(s? as f32 / scale);
            }
        }
    }

    let frames = samples.len() / channels;
    let mut data = Array2::<f32>::zeros((channels, frames));
    for frame in 0..frames {
        for ch in 0..channels {
            data[(ch, frame)] = samples[frame * channels + ch];
        }
    }
    Ok((data, spec.sample_rate))
}

/// Load a WAV file as a mono signal, optionally resampled.
///
/// Multi-channel input is mixed down by averaging. This is the entry
/// point the separation pipeline uses.
pub fn load_mono<P: AsRef<Path>>(path: P, target_sr: Option<u32>) -> crate::Result<(Vec<f32>, u32)> {
    let (data, sr) = load_wav(path)?;
    let mono = to_mono(&data);
    match target_sr {
        Some(target) if target != sr => Ok((resample(&mono, sr, target)?, target)),
        _ => Ok((mono, sr)),
    }
}

/// Mix a channel-major array down to a single mono signal by averaging.
pub fn to_mono(data: &Array2<f32>) -> Vec<f32> {
    let (channels, frames) = data.dim();
    if channels == 0 {
        return Vec::new();
    }
    let scale = 1.0 / channels as f32;
    (0..frames)
        .map(|frame| (0..channels).map(|ch| data[(ch, frame)]).sum::<f32>() * scale)
        .collect()
}

/// Resample a mono signal with a windowed-sinc interpolator.
pub fn resample(y: &[f32], src_sr: u32, dst_sr: u32) -> crate::Result<Vec<f32>> {
    if src_sr == dst_sr {
        return Ok(y.to_vec());
    }
    if y.is_empty() {
        return Ok(Vec::new());
    }

    let gcd = gcd_u32(src_sr, dst_sr);
    let ratio = (dst_sr / gcd) as f64 / (src_sr / gcd) as f64;

    let chunk_size = 1024usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| crate::Error::Resample(e.to_string()))?;

    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < y.len() {
        let end = (offset + chunk_size).min(y.len());
        let mut buf = vec![0.0f32; chunk_size];
        buf[..end - offset].copy_from_slice(&y[offset..end]);

        let chunk_out = resampler
            .process(&[buf], None)
            .map_err(|e| crate::Error::Resample(e.to_string()))?;
        out.extend_from_slice(&chunk_out[0]);
        offset = end;
    }

    let expected = ((y.len() as f64) * (dst_sr as f64) / (src_sr as f64)).round() as usize;
    out.truncate(expected);
    Ok(out)
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Save a mono signal as a 16-bit PCM WAV file.
///
/// Samples are clipped to [-1.0, 1.0] before quantization.
pub fn save_wav<P: AsRef<Path>>(path: P, y: &[f32], sample_rate: u32) -> crate::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in y {
        let s = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Generate a click train: short exponentially-decaying bursts at the
/// given times, summed into a signal of `length` samples.
pub fn clicks(
    times: &[f32],
    sr: u32,
    length: Option<usize>,
    click_duration: f32,
    click_freq: f32,
) -> Vec<f32> {
    let len = length.unwrap_or_else(|| {
        times.iter().fold(0.0f32, |a, &b| a.max(b)).ceil() as usize * sr as usize
    });
    let mut y = vec![0.0f32; len];

    let click_samples = (click_duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * click_freq / sr as f32;

    for &time in times {
        let start = (time * sr as f32) as usize;
        if start >= len {
            continue;
        }
        for i in 0..click_samples {
            let idx = start + i;
            if idx >= len {
                break;
            }
            let t = i as f32;
            let envelope = (-t / (click_samples as f32 * 0.1)).exp();
            y[idx] += envelope * (angular_freq * t).sin();
        }
    }
    y
}
