// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session.
//!
//! Owns the viewport, playback, cursor mark, file queue and annotation
//! store for one annotator, and applies every user operation to them.
//! Seeking, zooming, panning and switching files stop playback first, so
//! there is at most one playback session and one cursor-sync chain.

use crate::audio::backend::AudioBackend;
use crate::error::{AnnotatorError, Result};
use crate::models::{
    annotation::AnnotationStore,
    queue::{FileQueue, Navigation, QueueSummary},
    recording::Recording,
    viewport::{Direction, ViewportModel},
};
use crate::playback::{
    click::{classify_click, ClickAction, CLICK_TOLERANCE},
    clock::ClockSource,
    controller::PlaybackController,
    sync::{PlaybackSyncLoop, SyncStep},
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub struct Session<B: AudioBackend, C: ClockSource> {
    store: AnnotationStore,
    queue: FileQueue,
    viewport: ViewportModel,
    playback: PlaybackController<B, C>,
    sync: PlaybackSyncLoop,
    /// Seek point or live playback position, in seconds.
    cursor: Option<f64>,
    recording: Option<Recording>,
}

impl<B: AudioBackend, C: ClockSource> Session<B, C> {
    pub fn new(store: AnnotationStore, backend: B, clock: C, sync_period: Duration) -> Self {
        Self {
            store,
            queue: FileQueue::default(),
            viewport: ViewportModel::default(),
            playback: PlaybackController::new(backend, clock),
            sync: PlaybackSyncLoop::new(sync_period),
            cursor: None,
            recording: None,
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn queue(&self) -> &FileQueue {
        &self.queue
    }

    pub fn viewport(&self) -> &ViewportModel {
        &self.viewport
    }

    pub fn cursor(&self) -> Option<f64> {
        self.cursor
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    pub fn is_playing(&mut self) -> bool {
        self.playback.is_playing()
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.queue.current()
    }

    /// Saved transcript of the current file, empty if none.
    pub fn current_transcript(&self) -> String {
        self.current_file()
            .map(|path| self.store.get(&path.to_string_lossy()).to_string())
            .unwrap_or_default()
    }

    // ---- Files ----

    /// Discover recordings under `folder` and skip already annotated ones.
    /// On failure the previous queue is kept.
    pub fn open_folder(&mut self, folder: &Path) -> Result<QueueSummary> {
        self.stop_playback();
        let mut queue = FileQueue::build(folder)?;
        let summary = queue.filter_remaining(&self.store);
        log::info!(
            "Opened {}: {} found, {} already annotated",
            folder.display(),
            summary.found,
            summary.already_annotated
        );
        self.queue = queue;
        self.recording = None;
        self.cursor = None;
        Ok(summary)
    }

    /// Point the store at a different table file and load it.
    pub fn retarget_store(&mut self, path: PathBuf) -> Result<()> {
        self.store = AnnotationStore::load(path)?;
        Ok(())
    }

    /// Make a decoded recording active. Ignored if the queue has moved
    /// to another file since decoding started.
    pub fn attach_recording(&mut self, recording: Recording) -> bool {
        if self.current_file() != Some(recording.path()) {
            log::debug!("Discarding stale decode of {}", recording.path().display());
            return false;
        }
        self.stop_playback();
        self.cursor = None;
        self.viewport.reset(recording.duration());
        self.playback.reset(recording.duration());
        self.recording = Some(recording);
        true
    }

    /// Drop the active recording after a failed decode. The viewport is
    /// left as it was.
    pub fn detach_recording(&mut self) {
        self.stop_playback();
        self.cursor = None;
        self.recording = None;
    }

    /// Save `text` (trimmed) as the transcript of the current file.
    pub fn submit(&mut self, text: &str) -> Result<()> {
        let path = self.current_file().ok_or(AnnotatorError::NoRecording)?;
        let key = path.to_string_lossy().into_owned();
        self.store.upsert(&key, text.trim())
    }

    /// Save the current transcript, then move to the next file. A failed
    /// save leaves the queue where it was.
    pub fn advance(&mut self, text: &str) -> Result<Navigation> {
        self.stop_playback();
        self.submit(text)?;
        let navigation = self.queue.advance();
        self.after_navigation(navigation);
        Ok(navigation)
    }

    /// Move to the previous file without saving.
    pub fn retreat(&mut self) -> Navigation {
        self.stop_playback();
        let navigation = self.queue.retreat();
        self.after_navigation(navigation);
        navigation
    }

    fn after_navigation(&mut self, navigation: Navigation) {
        match navigation {
            Navigation::Moved(index) => {
                self.recording = None;
                self.cursor = None;
                log::info!("Moved to file {} of {}", index + 1, self.queue.remaining().len());
            }
            Navigation::AtLast => log::info!("No more files in the folder"),
            Navigation::AtFirst => log::info!("Already at the first file"),
            Navigation::Empty => log::info!("No files left to annotate"),
        }
    }

    // ---- Playback ----

    /// Play the active recording from `from`, or from the resting position.
    pub fn play(&mut self, from: Option<f64>) -> Result<f64> {
        let recording = self.recording.as_ref().ok_or(AnnotatorError::NoRecording)?;
        self.sync.cancel();
        let offset = self.playback.play(recording, from)?;
        let now = self.playback.clock().now();
        self.sync.start(now);
        self.cursor = Some(offset);
        Ok(offset)
    }

    /// Stop audio and end the sync chain. The cursor mark goes with a
    /// running session; a seek point placed while stopped stays.
    pub fn stop_playback(&mut self) {
        let active = self.playback.is_playing() || self.sync.next_due().is_some();
        self.playback.stop();
        self.sync.cancel();
        if active {
            self.cursor = None;
        }
    }

    pub fn toggle_playback(&mut self) -> Result<()> {
        if self.playback.is_playing() {
            self.stop_playback();
        } else {
            self.play(None)?;
        }
        Ok(())
    }

    /// Route a click at time `x` on the plotted axis.
    pub fn click(&mut self, x: f64) -> Result<ClickAction> {
        let axis = self.viewport.start()..=self.viewport.end();
        let action = classify_click(x, axis, self.cursor, CLICK_TOLERANCE);
        match action {
            ClickAction::Ignored => {}
            ClickAction::PlaceMark(time) => {
                self.playback.seek(time);
                self.cursor = Some(time);
            }
            ClickAction::TogglePlayback => {
                if self.playback.is_playing() {
                    self.stop_playback();
                } else {
                    let mark = self.cursor;
                    self.play(mark)?;
                }
            }
            ClickAction::MoveMark(time) => {
                self.stop_playback();
                self.playback.seek(time);
                self.cursor = Some(time);
            }
        }
        Ok(action)
    }

    /// Run the cursor-sync tick if one is due.
    pub fn sync_tick(&mut self) -> SyncStep {
        let now = self.playback.clock().now();
        let Some(ticket) = self.sync.take_due(now) else {
            return SyncStep::Idle;
        };
        if !self.sync.is_current(&ticket) {
            return SyncStep::Idle;
        }

        if self.playback.is_playing() {
            let position = self.playback.elapsed_position(now);
            self.cursor = Some(position);
            if position > self.viewport.midpoint() {
                self.viewport.recenter_on(position);
            }
            self.sync.rearm(ticket, now);
            SyncStep::Advanced(position)
        } else {
            self.cursor = None;
            log::debug!("Cursor sync chain {} finished", ticket.generation);
            SyncStep::Finished
        }
    }

    pub fn next_sync_due(&self) -> Option<Instant> {
        self.sync.next_due()
    }

    // ---- Viewport ----

    pub fn zoom_in(&mut self) -> bool {
        self.stop_playback();
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.stop_playback();
        self.viewport.zoom_out()
    }

    pub fn shift(&mut self, direction: Direction) -> bool {
        self.stop_playback();
        self.viewport.shift(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::testing::MockBackend;
    use crate::io::media;
    use crate::io::media::tests::write_wav;
    use crate::playback::clock::testing::ManualClock;
    use crate::playback::sync::DEFAULT_SYNC_PERIOD;
    use std::fs;

    const RATE: u32 = 8000;

    struct Fixture {
        dir: tempfile::TempDir,
        backend: MockBackend,
        clock: ManualClock,
        session: Session<MockBackend, ManualClock>,
    }

    impl Fixture {
        fn new(files: &[(&str, f64)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let audio = dir.path().join("audio");
            fs::create_dir(&audio).unwrap();
            for (name, seconds) in files {
                write_wav(&audio.join(name), *seconds, RATE);
            }
            let store = AnnotationStore::load(dir.path().join("transcriptions.csv")).unwrap();
            let backend = MockBackend::default();
            let clock = ManualClock::new();
            let session = Session::new(store, backend.clone(), clock.clone(), DEFAULT_SYNC_PERIOD);
            Self {
                dir,
                backend,
                clock,
                session,
            }
        }

        fn audio(&self) -> PathBuf {
            self.dir.path().join("audio")
        }

        fn open(&mut self) -> QueueSummary {
            let audio = self.audio();
            let summary = self.session.open_folder(&audio).unwrap();
            self.load().unwrap();
            summary
        }

        /// Decode the current file synchronously, as the app's loader does.
        fn load(&mut self) -> Result<()> {
            let path = self.session.current_file().map(Path::to_path_buf).unwrap();
            match media::load_recording(&path) {
                Ok(recording) => {
                    assert!(self.session.attach_recording(recording));
                    Ok(())
                }
                Err(e) => {
                    self.session.detach_recording();
                    Err(e)
                }
            }
        }

        fn tick_after(&mut self, seconds: f64) -> SyncStep {
            self.clock.advance(seconds);
            self.session.sync_tick()
        }
    }

    fn view(session: &Session<MockBackend, ManualClock>) -> (f64, f64, f64) {
        let v = session.viewport();
        (v.start(), v.end(), v.zoom())
    }

    #[test]
    fn test_submit_and_advance_end_to_end() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 2.0), ("c.wav", 3.0)]);
        let summary = fx.open();
        assert_eq!(summary, QueueSummary { found: 3, already_annotated: 0 });
        let audio = fx.audio();
        assert_eq!(
            fx.session.queue().remaining(),
            &[audio.join("a.wav"), audio.join("b.wav"), audio.join("c.wav")]
        );
        assert_eq!(fx.session.queue().current_index(), 0);
        assert_eq!(view(&fx.session), (0.0, 1.0, 1.0));

        fx.session.submit("hello").unwrap();
        let records = fx.session.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, audio.join("a.wav").to_string_lossy());
        assert_eq!(records[0].transcription, "hello");

        assert_eq!(fx.session.advance("hello").unwrap(), Navigation::Moved(1));
        assert_eq!(fx.session.store().len(), 1);
        assert!(fx.session.recording().is_none());
        fx.load().unwrap();
        assert_eq!(view(&fx.session), (0.0, 2.0, 1.0));
        assert_eq!(fx.session.current_transcript(), "");
    }

    #[test]
    fn test_reopen_skips_annotated_files() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 1.0)]);
        fx.open();
        fx.session.submit("  spaced out  ").unwrap();
        assert_eq!(fx.session.current_transcript(), "spaced out");

        let summary = fx.open();
        assert_eq!(summary, QueueSummary { found: 2, already_annotated: 1 });
        assert_eq!(fx.session.current_file(), Some(fx.audio().join("b.wav").as_path()));
    }

    #[test]
    fn test_advance_at_last_file_still_saves() {
        let mut fx = Fixture::new(&[("a.wav", 1.0)]);
        fx.open();
        assert_eq!(fx.session.advance("only").unwrap(), Navigation::AtLast);
        assert_eq!(fx.session.queue().current_index(), 0);
        assert_eq!(fx.session.current_transcript(), "only");
        assert!(fx.session.recording().is_some());
    }

    #[test]
    fn test_failed_save_blocks_advance() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 1.0)]);
        fx.open();
        let unwritable = fx.dir.path().join("missing").join("t.csv");
        fx.session.retarget_store(unwritable).unwrap();
        assert!(matches!(fx.session.advance("x"), Err(AnnotatorError::Persist { .. })));
        assert_eq!(fx.session.queue().current_index(), 0);
        assert!(fx.session.store().is_empty());
    }

    #[test]
    fn test_retreat_does_not_save() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 1.0)]);
        fx.open();
        assert_eq!(fx.session.retreat(), Navigation::AtFirst);
        fx.session.advance("first").unwrap();
        assert_eq!(fx.session.retreat(), Navigation::Moved(0));
        assert_eq!(fx.session.store().len(), 1);
    }

    #[test]
    fn test_empty_folder_keeps_queue_empty() {
        let mut fx = Fixture::new(&[]);
        let audio = fx.audio();
        assert!(matches!(fx.session.open_folder(&audio), Err(AnnotatorError::NoAudioFiles(_))));
        assert!(fx.session.current_file().is_none());
        assert!(matches!(fx.session.submit("x"), Err(AnnotatorError::NoRecording)));
    }

    #[test]
    fn test_decode_failure_keeps_file_selected() {
        let mut fx = Fixture::new(&[("a.wav", 2.0)]);
        fs::write(fx.audio().join("b.wav"), b"garbage").unwrap();
        fx.open();
        fx.session.zoom_in();
        let before = view(&fx.session);

        fx.session.advance("a").unwrap();
        assert!(matches!(fx.load(), Err(AnnotatorError::Decode { .. })));
        assert_eq!(fx.session.queue().current_index(), 1);
        assert!(fx.session.recording().is_none());
        assert_eq!(view(&fx.session), before);
        assert!(matches!(fx.session.play(None), Err(AnnotatorError::NoRecording)));
    }

    #[test]
    fn test_sync_moves_cursor_and_auto_scrolls() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();
        fx.session.zoom_in(); // [1, 3)
        fx.session.shift(Direction::Left);
        fx.session.shift(Direction::Left); // [0, 2)
        assert_eq!(view(&fx.session), (0.0, 2.0, 0.5));

        fx.session.play(Some(0.0)).unwrap();
        assert_eq!(fx.session.sync_tick(), SyncStep::Advanced(0.0));
        assert_eq!(fx.session.cursor(), Some(0.0));

        // Not yet due.
        fx.clock.advance(0.01);
        assert_eq!(fx.session.sync_tick(), SyncStep::Idle);

        let SyncStep::Advanced(t) = fx.tick_after(0.49) else {
            panic!("expected the cursor to advance");
        };
        assert!((t - 0.5).abs() < 1e-6);
        assert_eq!(view(&fx.session), (0.0, 2.0, 0.5));

        let SyncStep::Advanced(t) = fx.tick_after(1.0) else {
            panic!("expected the cursor to advance");
        };
        assert!((t - 1.5).abs() < 1e-6);
        let v = fx.session.viewport();
        assert!((v.midpoint() - 1.5).abs() < 1e-6);
        assert!((v.span() - 2.0).abs() < 1e-6);

        fx.backend.finish();
        assert_eq!(fx.tick_after(0.05), SyncStep::Finished);
        assert_eq!(fx.session.cursor(), None);
        assert!(fx.session.next_sync_due().is_none());
        assert_eq!(fx.tick_after(0.05), SyncStep::Idle);
    }

    #[test]
    fn test_replay_keeps_single_chain() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();
        fx.session.play(Some(0.0)).unwrap();
        fx.session.play(Some(2.0)).unwrap();
        assert_eq!(fx.backend.started.borrow().as_slice(), &[0, 2 * RATE as usize]);
        assert_eq!(fx.session.sync_tick(), SyncStep::Advanced(2.0));
        assert_eq!(fx.session.sync_tick(), SyncStep::Idle);
    }

    #[test]
    fn test_click_place_toggle_and_move() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();

        assert_eq!(fx.session.click(1.0).unwrap(), ClickAction::PlaceMark(1.0));
        assert_eq!(fx.session.cursor(), Some(1.0));
        assert!(!fx.session.is_playing());
        assert!(fx.backend.started.borrow().is_empty());

        assert_eq!(fx.session.click(1.2).unwrap(), ClickAction::TogglePlayback);
        assert!(fx.session.is_playing());
        assert_eq!(fx.backend.started.borrow().as_slice(), &[RATE as usize]);

        fx.clock.advance(1.0);
        fx.session.sync_tick();
        assert_eq!(fx.session.cursor(), Some(2.0));

        // Away from the mark while playing: stop and move the seek point.
        assert_eq!(fx.session.click(3.5).unwrap(), ClickAction::MoveMark(3.5));
        assert!(!fx.session.is_playing());
        assert_eq!(fx.session.cursor(), Some(3.5));

        assert_eq!(fx.session.click(3.3).unwrap(), ClickAction::TogglePlayback);
        assert!(fx.session.is_playing());
        assert_eq!(fx.backend.started.borrow().last(), Some(&(RATE as usize * 7 / 2)));

        assert_eq!(fx.session.click(3.4).unwrap(), ClickAction::TogglePlayback);
        assert!(!fx.session.is_playing());
        assert_eq!(fx.session.cursor(), None);
    }

    #[test]
    fn test_seek_point_survives_zoom_and_pan() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();
        assert_eq!(fx.session.click(1.0).unwrap(), ClickAction::PlaceMark(1.0));
        assert!(fx.session.zoom_in()); // [1, 3)
        assert_eq!(fx.session.cursor(), Some(1.0));
        assert!(fx.session.shift(Direction::Left));
        assert_eq!(fx.session.cursor(), Some(1.0));

        assert_eq!(fx.session.click(1.2).unwrap(), ClickAction::TogglePlayback);
        assert!(fx.session.is_playing());
        assert_eq!(fx.backend.started.borrow().as_slice(), &[RATE as usize]);
    }

    #[test]
    fn test_seek_point_cleared_on_file_change() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 1.0)]);
        fx.open();
        fx.session.click(0.5).unwrap();
        fx.session.advance("a").unwrap();
        assert_eq!(fx.session.cursor(), None);
    }

    #[test]
    fn test_natural_end_lets_next_play_start_over() {
        let mut fx = Fixture::new(&[("a.wav", 2.0)]);
        fx.open();
        fx.session.play(Some(0.0)).unwrap();
        fx.clock.advance(1.98);
        fx.backend.finish();
        assert_eq!(fx.session.sync_tick(), SyncStep::Finished);
        assert_eq!(fx.session.cursor(), None);
        assert_eq!(fx.session.play(None).unwrap(), 0.0);
    }

    #[test]
    fn test_click_outside_view_is_ignored() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();
        fx.session.zoom_in(); // [1, 3)
        assert_eq!(fx.session.click(0.5).unwrap(), ClickAction::Ignored);
        assert_eq!(fx.session.cursor(), None);
    }

    #[test]
    fn test_zoom_stops_playback() {
        let mut fx = Fixture::new(&[("a.wav", 4.0)]);
        fx.open();
        fx.session.play(None).unwrap();
        fx.clock.advance(1.0);
        assert!(fx.session.zoom_in());
        assert!(!fx.session.is_playing());
        assert_eq!(fx.session.cursor(), None);
        assert!(fx.session.next_sync_due().is_none());

        // Resumes where the zoom stopped it.
        let resumed = fx.session.play(None).unwrap();
        assert!((resumed - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_device_failure_ends_quietly() {
        let mut fx = Fixture::new(&[("a.wav", 1.0)]);
        fx.open();
        fx.backend.fail.set(true);
        assert!(matches!(fx.session.play(None), Err(AnnotatorError::Playback(_))));
        assert!(!fx.session.is_playing());
        assert!(fx.session.next_sync_due().is_none());
        assert_eq!(fx.session.sync_tick(), SyncStep::Idle);
    }

    #[test]
    fn test_stale_decode_is_discarded() {
        let mut fx = Fixture::new(&[("a.wav", 1.0), ("b.wav", 2.0)]);
        fx.open();
        let first = media::load_recording(&fx.audio().join("a.wav")).unwrap();
        fx.session.advance("").unwrap();
        assert!(!fx.session.attach_recording(first));
        assert!(fx.session.recording().is_none());
    }
}
