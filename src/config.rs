// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read from a JSON file shaped like:
//!
//! ```json
//! {
//!   "ButtonsParams": { "Height": 32, "Width": 120 },
//!   "TranscriptionFile": { "TranscriptionFile": "transcriptions.csv" }
//! }
//! ```
//!
//! `Spectrogram` and `Playback` sections are optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config_app.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppConfig {
    #[serde(default)]
    pub buttons_params: ButtonsParams,
    #[serde(default)]
    pub transcription_file: TranscriptionFile,
    #[serde(default)]
    pub spectrogram: SpectrogramParams,
    #[serde(default)]
    pub playback: PlaybackParams,
}

/// Size of the navigation buttons, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ButtonsParams {
    pub height: f32,
    pub width: f32,
}

impl Default for ButtonsParams {
    fn default() -> Self {
        Self {
            height: 32.0,
            width: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionFile {
    pub transcription_file: PathBuf,
}

impl Default for TranscriptionFile {
    fn default() -> Self {
        Self {
            transcription_file: PathBuf::from("transcriptions.csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpectrogramParams {
    pub window_size: usize,
    pub overlap: usize,
}

impl Default for SpectrogramParams {
    fn default() -> Self {
        Self {
            window_size: crate::audio::spectrogram::DEFAULT_WINDOW_SIZE,
            overlap: crate::audio::spectrogram::DEFAULT_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlaybackParams {
    /// Start playing each file when it is selected via Next.
    pub auto_play: bool,
    pub sync_period_ms: u64,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            auto_play: true,
            sync_period_ms: 50,
        }
    }
}

impl PlaybackParams {
    pub fn sync_period(&self) -> Duration {
        Duration::from_millis(self.sync_period_ms.max(1))
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn table_path(&self) -> &Path {
        &self.transcription_file.transcription_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{
            "ButtonsParams": {"Height": 2, "Width": 15},
            "TranscriptionFile": {"TranscriptionFile": "out/annotations.csv"}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.buttons_params, ButtonsParams { height: 2.0, width: 15.0 });
        assert_eq!(config.table_path(), Path::new("out/annotations.csv"));
        assert_eq!(config.spectrogram, SpectrogramParams::default());
        assert!(config.playback.auto_play);
    }

    #[test]
    fn test_parse_optional_sections() {
        let json = r#"{
            "Spectrogram": {"WindowSize": 512},
            "Playback": {"AutoPlay": false, "SyncPeriodMs": 20}
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.spectrogram.window_size, 512);
        assert_eq!(config.spectrogram.overlap, 128);
        assert!(!config.playback.auto_play);
        assert_eq!(config.playback.sync_period(), Duration::from_millis(20));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config_app.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_app.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
