// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Spectrogram computation and rendering.
//!
//! Power spectra of Hann-windowed frames, displayed in decibels with a
//! viridis-like colormap.

use image::{Rgba, RgbaImage};
use rustfft::{num_complex::Complex, FftPlanner};

pub const DEFAULT_WINDOW_SIZE: usize = 256;
pub const DEFAULT_OVERLAP: usize = 128;

/// Widest raster handed to the GUI; longer recordings are max-pooled.
pub const MAX_IMAGE_COLUMNS: usize = 4096;

/// Dynamic range shown below the loudest bin.
const DB_RANGE: f32 = 80.0;

#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// `power[frame][bin]`
    pub power: Vec<Vec<f32>>,
    /// Frame centres in seconds.
    pub times: Vec<f64>,
    /// Bin frequencies in Hz, 0 to Nyquist.
    pub frequencies: Vec<f64>,
    /// Length of the analysed signal in seconds.
    pub duration: f64,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.power.len()
    }

    pub fn bin_count(&self) -> usize {
        self.frequencies.len()
    }

    pub fn max_frequency(&self) -> f64 {
        self.frequencies.last().copied().unwrap_or(0.0)
    }

    /// Seconds covered by the raster, from the left edge of the first
    /// column to the right edge of the last. A single zero-padded frame
    /// covers the whole signal.
    pub fn time_extent(&self) -> (f64, f64) {
        match (self.times.as_slice(), self.times.last()) {
            ([first, second, ..], Some(last)) => {
                let half_step = (second - first) / 2.0;
                ((first - half_step).max(0.0), last + half_step)
            }
            _ => (0.0, self.duration),
        }
    }
}

/// Compute the one-sided power spectrogram of `samples`.
///
/// `overlap` is clamped below `window_size`. A signal shorter than one
/// window is zero-padded to a single frame.
pub fn compute(samples: &[f32], sample_rate: u32, window_size: usize, overlap: usize) -> Spectrogram {
    let window_size = window_size.max(2);
    let hop = window_size - overlap.min(window_size - 1);
    let bins = window_size / 2 + 1;
    let rate = sample_rate.max(1) as f64;

    let window: Vec<f32> = (0..window_size)
        .map(|i| {
            let phase = std::f32::consts::TAU * i as f32 / window_size as f32;
            0.5 - 0.5 * phase.cos()
        })
        .collect();
    let window_power: f32 = window.iter().map(|w| w * w).sum();

    let frame_count = if samples.len() <= window_size {
        1
    } else {
        (samples.len() - window_size) / hop + 1
    };

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(window_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); window_size];

    let mut power = Vec::with_capacity(frame_count);
    let mut times = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let offset = frame * hop;
        for (i, slot) in buffer.iter_mut().enumerate() {
            let sample = samples.get(offset + i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * window[i], 0.0);
        }
        fft.process(&mut buffer);

        let column: Vec<f32> = buffer[..bins]
            .iter()
            .enumerate()
            .map(|(bin, value)| {
                let scale = if bin == 0 || bin == window_size / 2 { 1.0 } else { 2.0 };
                scale * value.norm_sqr() / (window_power * rate as f32)
            })
            .collect();
        power.push(column);
        times.push((offset as f64 + window_size as f64 / 2.0) / rate);
    }

    let frequencies = (0..bins).map(|bin| bin as f64 * rate / window_size as f64).collect();

    Spectrogram {
        power,
        times,
        frequencies,
        duration: samples.len() as f64 / rate,
    }
}

/// Render to an RGBA raster: time on x, frequency on y (high at the top).
pub fn render(spectrogram: &Spectrogram, max_columns: usize) -> RgbaImage {
    let frames = spectrogram.frame_count().max(1);
    let bins = spectrogram.bin_count().max(1);
    let columns = frames.min(max_columns.max(1));

    let db: Vec<Vec<f32>> = spectrogram
        .power
        .iter()
        .map(|column| column.iter().map(|p| 10.0 * (p.max(1e-20)).log10()).collect())
        .collect();
    let peak = db
        .iter()
        .flat_map(|column| column.iter().copied())
        .fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - DB_RANGE;

    let mut image = RgbaImage::new(columns as u32, bins as u32);
    for x in 0..columns {
        let first = x * frames / columns;
        let last = ((x + 1) * frames / columns).max(first + 1).min(frames);
        for bin in 0..bins {
            let value = db
                .get(first..last)
                .into_iter()
                .flatten()
                .filter_map(|column| column.get(bin).copied())
                .fold(f32::NEG_INFINITY, f32::max);
            let level = if peak.is_finite() && value.is_finite() {
                ((value - floor) / DB_RANGE).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let y = (bins - 1 - bin) as u32;
            image.put_pixel(x as u32, y, viridis(level));
        }
    }
    image
}

/// Viridis colormap approximated by linear interpolation between stops.
pub fn viridis(level: f32) -> Rgba<u8> {
    const STOPS: [[f32; 3]; 9] = [
        [68.0, 1.0, 84.0],
        [71.0, 44.0, 122.0],
        [59.0, 81.0, 139.0],
        [44.0, 113.0, 142.0],
        [33.0, 144.0, 141.0],
        [39.0, 173.0, 129.0],
        [92.0, 200.0, 99.0],
        [170.0, 220.0, 50.0],
        [253.0, 231.0, 37.0],
    ];
    let scaled = level.clamp(0.0, 1.0) * (STOPS.len() - 1) as f32;
    let index = (scaled.floor() as usize).min(STOPS.len() - 2);
    let t = scaled - index as f32;
    let (a, b) = (STOPS[index], STOPS[index + 1]);
    let mix = |i: usize| (a[i] + (b[i] - a[i]) * t).round() as u8;
    Rgba([mix(0), mix(1), mix(2), 255])
}
