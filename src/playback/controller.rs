// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Start/stop/seek of the audio device and the playback position clock.
//!
//! The device runs on its own once started and is only ever polled. The
//! visible position is derived from the wall clock: while playing it is
//! `start_position + (now - start_wall_time)`.

use crate::audio::backend::{AudioBackend, AudioClip, HandleStatus, PlaybackHandle};
use crate::error::Result;
use crate::models::recording::Recording;
use crate::playback::clock::ClockSource;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// Seconds into the recording where playback began, or the resting
    /// position while stopped.
    pub start_position: f64,
    pub start_wall_time: Option<Instant>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            start_position: 0.0,
            start_wall_time: None,
        }
    }
}

pub struct PlaybackController<B: AudioBackend, C: ClockSource> {
    backend: B,
    clock: C,
    handle: Option<B::Handle>,
    state: PlaybackState,
    duration: f64,
}

impl<B: AudioBackend, C: ClockSource> PlaybackController<B, C> {
    pub fn new(backend: B, clock: C) -> Self {
        Self {
            backend,
            clock,
            handle: None,
            state: PlaybackState::default(),
            duration: 0.0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start playing `recording` from `from` seconds, or from the resting
    /// position when `from` is `None`. Returns the actual start offset.
    pub fn play(&mut self, recording: &Recording, from: Option<f64>) -> Result<f64> {
        self.stop();
        self.duration = recording.duration();

        let mut offset = from.unwrap_or(self.state.start_position).max(0.0);
        if offset >= self.duration {
            offset = 0.0;
        }

        let clip = AudioClip {
            samples: recording.samples().clone(),
            channels: recording.channels(),
            sample_rate: recording.sample_rate(),
            start_frame: recording.frame_at(offset),
        };
        self.state.start_position = offset;

        let handle = self.backend.play(clip)?;
        self.handle = Some(handle);
        self.state.is_playing = true;
        self.state.start_wall_time = Some(self.clock.now());
        log::info!("Playing {} from {:.2}s", recording.path().display(), offset);
        Ok(offset)
    }

    /// Halt output. The position reached becomes the resting position.
    /// A clip the device already finished settles as a natural end.
    pub fn stop(&mut self) {
        if !self.is_playing() {
            return;
        }
        let position = self.elapsed_position(self.clock.now());
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
        log::info!("Stopped at {:.2}s", position);
        self.state.start_position = position;
        self.state.is_playing = false;
        self.state.start_wall_time = None;
    }

    /// Stop and set the resting position, as when the user picks a new
    /// seek point.
    pub fn seek(&mut self, position: f64) {
        self.stop();
        self.state.start_position = position.max(0.0);
    }

    /// Forget everything about the previous recording.
    pub fn reset(&mut self, duration: f64) {
        self.stop();
        self.state = PlaybackState::default();
        self.duration = duration;
    }

    /// Whether audio is audible right now. The device is authoritative:
    /// when it has finished on its own the state is settled here.
    pub fn is_playing(&mut self) -> bool {
        if !self.state.is_playing {
            return false;
        }
        if self.handle.as_ref().map_or(false, |h| h.is_playing()) {
            return true;
        }
        self.settle();
        false
    }

    fn settle(&mut self) {
        let position = self.elapsed_position(self.clock.now());
        let status = self
            .handle
            .take()
            .map_or(HandleStatus::Failed, |handle| handle.status());
        self.state.is_playing = false;
        self.state.start_wall_time = None;
        // The device drains its buffer ahead of the wall clock, so an
        // exhausted clip rewinds even when the position is short of the end.
        self.state.start_position = match status {
            HandleStatus::Exhausted => 0.0,
            _ => position,
        };
        log::debug!(
            "Playback ended ({:?}), resting at {:.2}s",
            status,
            self.state.start_position
        );
    }

    /// Position at `now`: advancing while playing, frozen otherwise.
    pub fn elapsed_position(&self, now: Instant) -> f64 {
        match (self.state.is_playing, self.state.start_wall_time) {
            (true, Some(started)) => {
                let elapsed = now.saturating_duration_since(started).as_secs_f64();
                (self.state.start_position + elapsed).min(self.duration)
            }
            _ => self.state.start_position,
        }
    }
}
