// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zoomable, pannable time window over a recording.
//!
//! The window is `[start, end)` in seconds over a recording of known
//! duration. Zoom is the ratio of the requested span to the full
//! duration; `1.0` shows the whole recording.

/// Zoom-in stops before the visible span would drop to this ratio.
pub const MIN_ZOOM: f64 = 0.1;

/// Fraction of the visible span moved by one shift.
pub const SHIFT_FRACTION: f64 = 0.25;

/// Pan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Visible time range and zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportModel {
    start: f64,
    end: f64,
    zoom: f64,
    duration: f64,
}

impl Default for ViewportModel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ViewportModel {
    pub fn new(duration: f64) -> Self {
        let mut viewport = Self {
            start: 0.0,
            end: 1.0,
            zoom: 1.0,
            duration: 1.0,
        };
        viewport.reset(duration);
        viewport
    }

    /// Show the full recording.
    pub fn reset(&mut self, duration: f64) {
        // A zero-length window would break start < end.
        let duration = if duration > 0.0 { duration } else { f64::EPSILON };
        self.duration = duration;
        self.start = 0.0;
        self.end = duration;
        self.zoom = 1.0;
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Halve the visible span around the current midpoint.
    /// Returns false when the zoom floor has been reached.
    pub fn zoom_in(&mut self) -> bool {
        let zoom = self.zoom / 2.0;
        if zoom <= MIN_ZOOM {
            return false;
        }
        self.apply_zoom(zoom);
        true
    }

    /// Double the visible span around the current midpoint, capped at
    /// the full duration. Returns false when already fully zoomed out.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom >= 1.0 {
            return false;
        }
        self.apply_zoom((self.zoom * 2.0).min(1.0));
        true
    }

    fn apply_zoom(&mut self, zoom: f64) {
        let center = self.midpoint();
        let span = (self.duration * zoom).min(self.duration);
        self.zoom = zoom;
        self.place(center - span / 2.0, span);
    }

    /// Position a window of `span` seconds starting at `start`, clamped
    /// into `[0, duration]`.
    fn place(&mut self, start: f64, span: f64) {
        let mut start = start.max(0.0);
        let mut end = start + span;
        if end > self.duration {
            end = self.duration;
            start = (end - span).max(0.0);
        }
        self.start = start;
        self.end = end;
    }

    /// Move the window by a quarter of its span. Returns false when the
    /// window already touches the boundary in that direction.
    pub fn shift(&mut self, direction: Direction) -> bool {
        let span = self.span();
        let delta = span * SHIFT_FRACTION;
        match direction {
            Direction::Left => {
                if self.start <= 0.0 {
                    return false;
                }
                self.place(self.start - delta, span);
            }
            Direction::Right => {
                if self.end >= self.duration {
                    return false;
                }
                self.place(self.start + delta, span);
            }
        }
        true
    }

    /// Auto-scroll so that `time` sits at the midpoint once it has moved
    /// past it. Scrolling stops once the window reaches the recording
    /// end; the last step clamps `end` and may shrink the window.
    pub fn recenter_on(&mut self, time: f64) -> bool {
        let overshoot = time - self.midpoint();
        if overshoot <= 0.0 || self.end >= self.duration {
            return false;
        }
        let start = self.start + overshoot;
        let end = (self.end + overshoot).min(self.duration);
        if start >= end {
            return false;
        }
        self.start = start;
        self.end = end;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(v: &ViewportModel) {
        assert!(v.start() >= 0.0, "start {} < 0", v.start());
        assert!(v.start() < v.end(), "start {} >= end {}", v.start(), v.end());
        assert!(v.end() <= v.duration() + 1e-9, "end {} > duration", v.end());
    }

    #[test]
    fn test_reset_shows_full_duration() {
        let mut v = ViewportModel::new(4.0);
        v.zoom_in();
        v.reset(2.0);
        assert_eq!((v.start(), v.end(), v.zoom()), (0.0, 2.0, 1.0));
    }

    #[test]
    fn test_zoom_in_halves_span_around_midpoint() {
        let mut v = ViewportModel::new(8.0);
        assert!(v.zoom_in());
        assert_eq!((v.start(), v.end(), v.zoom()), (2.0, 6.0, 0.5));
        assert!(v.zoom_in());
        assert_eq!((v.start(), v.end()), (3.0, 5.0));
    }

    #[test]
    fn test_zoom_in_floor_is_idempotent() {
        let mut v = ViewportModel::new(8.0);
        while v.zoom_in() {}
        let floor = v;
        assert!(floor.zoom() > MIN_ZOOM);
        for _ in 0..5 {
            assert!(!v.zoom_in());
            assert_eq!(v, floor);
        }
    }

    #[test]
    fn test_zoom_out_ceiling_is_idempotent() {
        let mut v = ViewportModel::new(8.0);
        let full = v;
        for _ in 0..3 {
            assert!(!v.zoom_out());
            assert_eq!(v, full);
        }
    }

    #[test]
    fn test_zoom_out_near_edge_is_clamped() {
        let mut v = ViewportModel::new(8.0);
        v.zoom_in();
        v.zoom_in();
        while v.shift(Direction::Right) {}
        assert_eq!(v.end(), 8.0);
        v.zoom_out();
        assert_eq!((v.start(), v.end()), (4.0, 8.0));
        v.zoom_out();
        assert_eq!((v.start(), v.end(), v.zoom()), (0.0, 8.0, 1.0));
    }

    #[test]
    fn test_shift_moves_quarter_span_and_stops_at_bounds() {
        let mut v = ViewportModel::new(8.0);
        v.zoom_in(); // [2, 6)
        assert!(v.shift(Direction::Left));
        assert_eq!((v.start(), v.end()), (1.0, 5.0));
        assert!(v.shift(Direction::Left));
        assert_eq!((v.start(), v.end()), (0.0, 4.0));
        assert!(!v.shift(Direction::Left));
        assert_eq!((v.start(), v.end()), (0.0, 4.0));
    }

    #[test]
    fn test_shift_at_full_zoom_is_noop() {
        let mut v = ViewportModel::new(3.0);
        assert!(!v.shift(Direction::Left));
        assert!(!v.shift(Direction::Right));
        assert_eq!((v.start(), v.end()), (0.0, 3.0));
    }

    #[test]
    fn test_invariant_holds_under_operation_sequences() {
        let ops: [fn(&mut ViewportModel) -> bool; 4] = [
            ViewportModel::zoom_in,
            ViewportModel::zoom_out,
            |v| v.shift(Direction::Left),
            |v| v.shift(Direction::Right),
        ];
        for duration in [0.5, 1.0, 3.0, 17.3] {
            let mut v = ViewportModel::new(duration);
            // Deterministic pseudo-random walk over the operations.
            let mut seed: u32 = 12345;
            for _ in 0..500 {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                let op = ops[(seed >> 16) as usize % ops.len()];
                op(&mut v);
                assert_valid(&v);
                assert!((v.span() - v.duration() * v.zoom()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_recenter_only_after_midpoint() {
        let mut v = ViewportModel::new(10.0);
        v.zoom_in(); // [2.5, 7.5)
        v.shift(Direction::Left);
        v.shift(Direction::Left);
        v.shift(Direction::Left); // [0, 5)
        assert!(!v.recenter_on(2.0));
        assert_eq!((v.start(), v.end()), (0.0, 5.0));
        assert!(v.recenter_on(3.0));
        assert_eq!((v.start(), v.end()), (0.5, 5.5));
        assert_eq!(v.midpoint(), 3.0);
    }

    #[test]
    fn test_recenter_clamps_at_recording_end() {
        let mut v = ViewportModel::new(10.0);
        v.zoom_in(); // [2.5, 7.5)
        assert!(v.recenter_on(9.0));
        assert_eq!(v.end(), 10.0);
        assert_eq!(v.start(), 6.5);
        assert_valid(&v);
        // Window is at the end: no further scrolling.
        assert!(!v.recenter_on(9.9));
        assert_eq!((v.start(), v.end()), (6.5, 10.0));
    }

    #[test]
    fn test_recenter_never_scrolls_full_view() {
        let mut v = ViewportModel::new(4.0);
        assert!(!v.recenter_on(3.0));
        assert_eq!((v.start(), v.end()), (0.0, 4.0));
    }
}
