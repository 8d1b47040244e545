//! Spectrogram visualization for separation results.
//!
//! Renders log-magnitude spectrograms to PPM images. Enable with the
//! `display` feature:
//!
//! ```toml
//! [dependencies]
//! skiffle = { version = "0.1", features = ["display"] }
//! ```

use crate::spectrum;
use ndarray::Array2;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Dynamic range of the rendered images, in dB below the reference.
const TOP_DB: f32 = 80.0;

/// Color map for spectrogram rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    /// Viridis (perceptually uniform, colorblind-friendly)
    Viridis,
    /// Magma (perceptually uniform, dark background)
    Magma,
    /// Grayscale
    Grayscale,
}

impl ColorMap {
    /// Convert a normalized value in [0, 1] to RGB.
    pub fn to_rgb(&self, value: f32) -> (u8, u8, u8) {
        let v = value.clamp(0.0, 1.0);
        match self {
            ColorMap::Viridis => viridis(v),
            ColorMap::Magma => magma(v),
            ColorMap::Grayscale => {
                let g = (v * 255.0) as u8;
                (g, g, g)
            }
        }
    }
}

impl FromStr for ColorMap {
    type Err = ();

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "viridis" => Ok(ColorMap::Viridis),
            "magma" => Ok(ColorMap::Magma),
            "grayscale" | "gray" | "grey" => Ok(ColorMap::Grayscale),
            _ => Err(()),
        }
    }
}

/// Polynomial approximation of the viridis colormap.
fn viridis(t: f32) -> (u8, u8, u8) {
    let r = (0.267004 + t * (0.003991 + t * (1.096452 + t * (-2.146305 + t * 1.167419))))
        .clamp(0.0, 1.0);
    let g = (0.004874 + t * (1.015861 + t * (-0.107203 + t * (-0.449175 + t * 0.539506))))
        .clamp(0.0, 1.0);
    let b = (0.329415 + t * (1.421511 + t * (-2.482568 + t * (1.871714 + t * (-0.140092)))))
        .clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Polynomial approximation of the magma colormap.
fn magma(t: f32) -> (u8, u8, u8) {
    let r = (0.001462 + t * (0.169823 + t * (2.240361 + t * (-1.106994)))).clamp(0.0, 1.0);
    let g = (0.000466 + t * (0.100897 + t * (0.699060 + t * (0.203185)))).clamp(0.0, 1.0);
    let b = (0.013866 + t * (0.563622 + t * (-0.543021 + t * (0.966020)))).clamp(0.0, 1.0);
    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// An RGB raster produced from a spectrogram.
#[derive(Debug, Clone)]
pub struct Image {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

/// Render a magnitude spectrogram as an RGB image.
///
/// Magnitudes are converted to dB relative to `ref_magnitude`, floored at
/// 80 dB below it, and mapped through the colormap with low frequencies
/// at the bottom of the image.
pub fn render(magnitude: &Array2<f32>, ref_magnitude: f32, colormap: ColorMap) -> Image {
    let db = spectrum::amplitude_to_db(magnitude, ref_magnitude, 1e-10, None);
    let (n_freq, n_frames) = db.dim();

    let mut pixels = vec![0u8; n_freq * n_frames * 3];
    for row in 0..n_freq {
        let f = n_freq - 1 - row;
        for t in 0..n_frames {
            let v = (db[(f, t)] + TOP_DB) / TOP_DB;
            let (r, g, b) = colormap.to_rgb(v);
            let at = (row * n_frames + t) * 3;
            pixels[at] = r;
            pixels[at + 1] = g;
            pixels[at + 2] = b;
        }
    }
    Image {
        pixels,
        width: n_frames,
        height: n_freq,
    }
}

/// Write an RGB image as a binary PPM file.
pub fn save_ppm<P: AsRef<Path>>(path: P, image: &Image) -> crate::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write!(file, "P6\n{} {}\n255\n", image.width, image.height)?;
    file.write_all(&image.pixels)?;
    Ok(())
}

/// Write the stacked original/harmonic/percussive figure.
///
/// All three panels share the mixture's peak magnitude as the dB
/// reference, so the components are directly comparable. The harmonic and
/// percussive panels are normally the soft pre-binarization energies from
/// [`crate::hpss::Separation`].
///
/// # Panics
/// Panics if the three spectrograms disagree in shape.
pub fn separation_panels<P: AsRef<Path>>(
    path: P,
    original: &Array2<f32>,
    harmonic: &Array2<f32>,
    percussive: &Array2<f32>,
    colormap: ColorMap,
) -> crate::Result<()> {
    assert_eq!(original.dim(), harmonic.dim(), "panel shape mismatch");
    assert_eq!(original.dim(), percussive.dim(), "panel shape mismatch");

    let ref_magnitude = original.iter().fold(0.0f32, |m, &v| m.max(v));
    let panels = [original, harmonic, percussive].map(|s| render(s, ref_magnitude, colormap));

    let width = panels[0].width;
    let divider = 2usize;
    let height = panels.iter().map(|p| p.height).sum::<usize>() + divider * 2;

    let mut pixels = Vec::with_capacity(width * height * 3);
    for (i, panel) in panels.iter().enumerate() {
        if i > 0 {
            pixels.extend(std::iter::repeat_n(0u8, width * divider * 3));
        }
        pixels.extend_from_slice(&panel.pixels);
    }

    save_ppm(
        path,
        &Image {
            pixels,
            width,
            height,
        },
    )
}
