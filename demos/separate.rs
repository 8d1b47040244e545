//! Full separation pipeline on a synthetic mixture.
//!
//! Builds a chord plus a click train, separates it into harmonic and
//! percussive layers, reports the reconstruction SNR, and writes the two
//! component WAVs next to a nominal source name. With the `display`
//! feature enabled it also writes the three-panel spectrogram figure.

use log::info;
use skiffle::hpss::{separate, HpssConfig};
use skiffle::spectrum::{self, StftConfig};
use skiffle::{evaluate, files, io};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let sr = 22050u32;
    let duration = 4.0;

    info!("Generating synthetic mixture ({duration} s at {sr} Hz)");

    // Harmonic bed: a C major chord.
    let c4 = io::tone(261.63, sr, duration);
    let e4 = io::tone(329.63, sr, duration);
    let g4 = io::tone(392.00, sr, duration);
    let chord: Vec<f32> = c4
        .iter()
        .zip(e4.iter())
        .zip(g4.iter())
        .map(|((c, e), g)| (c + e + g) / 3.0 * 0.5)
        .collect();

    // Percussive layer: clicks on a sixteenth-note grid.
    let click_times: Vec<f32> = (0..16).map(|i| i as f32 * 0.25).collect();
    let percussion = io::clicks(&click_times, sr, Some(chord.len()), 0.02, 800.0);

    let mixture: Vec<f32> = chord
        .iter()
        .zip(percussion.iter())
        .map(|(h, p)| h + p * 0.3)
        .collect();

    let config = HpssConfig::default();
    let stft_config = StftConfig::for_separation(1024);

    info!(
        "Separating with alpha = {}, gamma = {}, k_max = {}",
        config.alpha, config.gamma, config.k_max
    );

    let stft = spectrum::stft(&mixture, &stft_config)?;
    info!(
        "STFT: {} bins x {} frames",
        stft.shape()[0],
        stft.shape()[1]
    );

    let separation = separate(&stft, &config)?;

    let harmonic = spectrum::istft(&separation.harmonic, &stft_config, Some(mixture.len()))?;
    let percussive = spectrum::istft(&separation.percussive, &stft_config, Some(mixture.len()))?;

    let h_energy: f32 = harmonic.iter().map(|v| v * v).sum();
    let p_energy: f32 = percussive.iter().map(|v| v * v).sum();
    let total = h_energy + p_energy;
    info!(
        "Energy split: harmonic {:.1}%, percussive {:.1}%",
        h_energy / total * 100.0,
        p_energy / total * 100.0
    );

    let quality = evaluate::snr(&mixture, &harmonic, &percussive)?;
    info!("Separation SNR: {quality}");

    let source = Path::new("mixture.wav");
    let h_path = files::component_path(source, &config, files::Component::Harmonic);
    let p_path = files::component_path(source, &config, files::Component::Percussive);
    io::save_wav(&h_path, &harmonic, sr)?;
    io::save_wav(&p_path, &percussive, sr)?;
    info!("Wrote {} and {}", h_path.display(), p_path.display());

    #[cfg(feature = "display")]
    {
        let (magnitude, _) = spectrum::magphase(&stft);
        skiffle::display::separation_panels(
            "separation.ppm",
            &magnitude,
            &separation.harmonic_energy,
            &separation.percussive_energy,
            skiffle::display::ColorMap::Viridis,
        )?;
        info!("Wrote separation.ppm");
    }

    Ok(())
}
