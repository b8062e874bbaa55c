// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio output backends.
//!
//! The playback core only needs "start this clip" and "is it still
//! audible"; the cpal implementation maps the clip onto the default
//! output device's channel layout and sample rate.

use crate::error::{AnnotatorError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Samples to play, starting at `start_frame`.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Arc<Vec<f32>>,
    pub channels: u16,
    pub sample_rate: u32,
    pub start_frame: usize,
}

/// Where a started clip is at, as last reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleStatus {
    Playing,
    /// Every sample of the clip has been handed to the device.
    Exhausted,
    /// The output stream reported an error.
    Failed,
    /// Stopped on request.
    Stopped,
}

impl HandleStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => HandleStatus::Playing,
            1 => HandleStatus::Exhausted,
            2 => HandleStatus::Failed,
            _ => HandleStatus::Stopped,
        }
    }
}

pub trait PlaybackHandle {
    fn stop(&mut self);
    /// Polled; the device may finish on its own.
    fn status(&self) -> HandleStatus;

    fn is_playing(&self) -> bool {
        self.status() == HandleStatus::Playing
    }
}

pub trait AudioBackend {
    type Handle: PlaybackHandle;

    fn play(&mut self, clip: AudioClip) -> Result<Self::Handle>;
}

/// Plays through the system's default output device.
#[derive(Debug, Default)]
pub struct CpalBackend;

pub struct CpalHandle {
    stream: cpal::Stream,
    status: Arc<AtomicU8>,
}

/// Record the first way a stream ended; later reports are ignored.
fn end_stream(status: &AtomicU8, end: HandleStatus) {
    let _ = status.compare_exchange(
        HandleStatus::Playing as u8,
        end as u8,
        Ordering::SeqCst,
        Ordering::SeqCst,
    );
}

impl PlaybackHandle for CpalHandle {
    fn stop(&mut self) {
        if let Err(e) = self.stream.pause() {
            log::debug!("Pausing output stream failed: {}", e);
        }
        end_stream(&self.status, HandleStatus::Stopped);
    }

    fn status(&self) -> HandleStatus {
        HandleStatus::from_u8(self.status.load(Ordering::SeqCst))
    }
}

impl AudioBackend for CpalBackend {
    type Handle = CpalHandle;

    fn play(&mut self, clip: AudioClip) -> Result<CpalHandle> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AnnotatorError::Playback("no output device available".to_string()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| AnnotatorError::Playback(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let status = Arc::new(AtomicU8::new(HandleStatus::Playing as u8));
        let source = ClipSource::new(clip, config.channels, config.sample_rate.0);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, source, status.clone()),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, source, status.clone()),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, source, status.clone()),
            other => {
                return Err(AnnotatorError::Playback(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }
        .map_err(|e| AnnotatorError::Playback(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AnnotatorError::Playback(e.to_string()))?;

        Ok(CpalHandle { stream, status })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut source: ClipSource,
    status: Arc<AtomicU8>,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let output_channels = config.channels as usize;
    let data_status = status.clone();
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(output_channels) {
                for (channel, out) in frame.iter_mut().enumerate() {
                    *out = T::from_sample(source.sample(channel));
                }
                source.advance();
            }
            if source.is_exhausted() {
                end_stream(&data_status, HandleStatus::Exhausted);
            }
        },
        move |err| {
            log::error!("Output stream error: {}", err);
            end_stream(&status, HandleStatus::Failed);
        },
        None,
    )
}

/// Reads a clip at the device rate with linear interpolation.
struct ClipSource {
    samples: Arc<Vec<f32>>,
    channels: usize,
    output_channels: usize,
    frames: usize,
    position: f64,
    step: f64,
}

impl ClipSource {
    fn new(clip: AudioClip, output_channels: u16, output_rate: u32) -> Self {
        let channels = clip.channels.max(1) as usize;
        let frames = clip.samples.len() / channels;
        Self {
            samples: clip.samples,
            channels,
            output_channels: output_channels.max(1) as usize,
            frames,
            position: clip.start_frame.min(frames) as f64,
            step: clip.sample_rate as f64 / output_rate.max(1) as f64,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.position >= self.frames as f64
    }

    fn sample(&self, output_channel: usize) -> f32 {
        if self.is_exhausted() {
            return 0.0;
        }
        // Mono feeds every output; extra output channels repeat the last input.
        let channel = if self.channels == 1 {
            0
        } else {
            output_channel.min(self.channels - 1)
        };
        let index = self.position.floor() as usize;
        let fraction = (self.position - index as f64) as f32;
        let current = self.samples[index * self.channels + channel];
        let next = if index + 1 < self.frames {
            self.samples[(index + 1) * self.channels + channel]
        } else {
            current
        };
        current + (next - current) * fraction
    }

    fn advance(&mut self) {
        self.position += self.step;
    }
}

impl std::fmt::Debug for ClipSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipSource")
            .field("channels", &self.channels)
            .field("output_channels", &self.output_channels)
            .field("position", &self.position)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Backend that records requested clips and never touches a device.
    #[derive(Debug, Clone, Default)]
    pub struct MockBackend {
        pub started: Rc<RefCell<Vec<usize>>>,
        pub current: Rc<RefCell<Option<Rc<Cell<HandleStatus>>>>>,
        pub fail: Rc<Cell<bool>>,
    }

    impl MockBackend {
        /// Simulate the device reaching the end of the clip.
        pub fn finish(&self) {
            self.end(HandleStatus::Exhausted);
        }

        /// Simulate the output stream failing mid-clip.
        pub fn break_stream(&self) {
            self.end(HandleStatus::Failed);
        }

        fn end(&self, status: HandleStatus) {
            if let Some(current) = self.current.borrow().as_ref() {
                current.set(status);
            }
        }
    }

    #[derive(Debug)]
    pub struct MockHandle {
        status: Rc<Cell<HandleStatus>>,
    }

    impl PlaybackHandle for MockHandle {
        fn stop(&mut self) {
            if self.status.get() == HandleStatus::Playing {
                self.status.set(HandleStatus::Stopped);
            }
        }

        fn status(&self) -> HandleStatus {
            self.status.get()
        }
    }

    impl AudioBackend for MockBackend {
        type Handle = MockHandle;

        fn play(&mut self, clip: AudioClip) -> Result<MockHandle> {
            if self.fail.get() {
                return Err(AnnotatorError::Playback("mock device unavailable".to_string()));
            }
            self.started.borrow_mut().push(clip.start_frame);
            let status = Rc::new(Cell::new(HandleStatus::Playing));
            *self.current.borrow_mut() = Some(status.clone());
            Ok(MockHandle { status })
        }
    }
}
