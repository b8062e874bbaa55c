// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Classification of clicks on the spectrogram's time axis.

use std::ops::RangeInclusive;

/// Clicks closer than this to the cursor mark (in seconds) hit the mark.
/// Not scaled by zoom.
pub const CLICK_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickAction {
    /// Outside the plotted axis.
    Ignored,
    /// No mark yet: place one here.
    PlaceMark(f64),
    /// Click on the mark: start or stop playback from it.
    TogglePlayback,
    /// Click away from the mark: move it here.
    MoveMark(f64),
}

/// Decide what a click at time `x` means, without side effects.
pub fn classify_click(
    x: f64,
    axis: RangeInclusive<f64>,
    cursor: Option<f64>,
    tolerance: f64,
) -> ClickAction {
    if !x.is_finite() || !axis.contains(&x) {
        return ClickAction::Ignored;
    }
    match cursor {
        None => ClickAction::PlaceMark(x),
        Some(mark) if (x - mark).abs() < tolerance => ClickAction::TogglePlayback,
        Some(_) => ClickAction::MoveMark(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_click_places_mark() {
        assert_eq!(classify_click(1.25, 0.0..=4.0, None, CLICK_TOLERANCE), ClickAction::PlaceMark(1.25));
    }

    #[test]
    fn test_click_near_mark_toggles() {
        let action = classify_click(2.3, 0.0..=4.0, Some(2.0), CLICK_TOLERANCE);
        assert_eq!(action, ClickAction::TogglePlayback);
        let action = classify_click(1.6, 0.0..=4.0, Some(2.0), CLICK_TOLERANCE);
        assert_eq!(action, ClickAction::TogglePlayback);
    }

    #[test]
    fn test_tolerance_boundary_moves_mark() {
        let action = classify_click(2.5, 0.0..=4.0, Some(2.0), CLICK_TOLERANCE);
        assert_eq!(action, ClickAction::MoveMark(2.5));
        let action = classify_click(3.9, 0.0..=4.0, Some(0.1), CLICK_TOLERANCE);
        assert_eq!(action, ClickAction::MoveMark(3.9));
    }

    #[test]
    fn test_click_outside_axis_ignored() {
        assert_eq!(classify_click(4.5, 1.0..=4.0, Some(4.2), CLICK_TOLERANCE), ClickAction::Ignored);
        assert_eq!(classify_click(0.5, 1.0..=4.0, None, CLICK_TOLERANCE), ClickAction::Ignored);
        assert_eq!(classify_click(f64::NAN, 0.0..=4.0, None, CLICK_TOLERANCE), ClickAction::Ignored);
    }
}
