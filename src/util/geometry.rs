// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between horizontal pixel positions on the plot and
//! times in seconds within the visible window.

/// Convert a pixel offset from the plot's left edge to a time in seconds.
pub fn pixel_to_time(pixel_x: f64, width: f64, start: f64, end: f64) -> f64 {
    if width <= 0.0 {
        return start;
    }
    start + (pixel_x / width) * (end - start)
}

/// Convert a time in seconds to a pixel offset from the plot's left edge.
pub fn time_to_pixel(time: f64, width: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if span <= 0.0 {
        return 0.0;
    }
    (time - start) / span * width
}

/// Texture coordinate range showing `[start, end)` of a raster whose
/// columns cover `extent` seconds.
pub fn visible_uv(start: f64, end: f64, extent: (f64, f64)) -> (f32, f32) {
    let (first, last) = extent;
    let width = last - first;
    if width <= 0.0 {
        return (0.0, 1.0);
    }
    (
        ((start - first) / width).clamp(0.0, 1.0) as f32,
        ((end - first) / width).clamp(0.0, 1.0) as f32,
    )
}

/// Spacing between axis ticks giving roughly `target_ticks` ticks over `span`.
pub fn tick_step(span: f64, target_ticks: usize) -> f64 {
    if span <= 0.0 || target_ticks == 0 {
        return 1.0;
    }
    let raw = span / target_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|m| m * magnitude)
        .find(|candidate| *candidate >= raw)
        .unwrap_or(10.0 * magnitude)
}
