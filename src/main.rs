// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Speech Annotator
//!
//! A desktop application for stepping through a folder of speech
//! recordings, viewing and playing each one against its spectrogram, and
//! saving a transcript per file to a shared pipe-delimited table.

mod app;
mod audio;
mod config;
mod error;
mod io;
mod models;
mod playback;
mod session;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use clap::Parser;
use config::AppConfig;
use models::annotation::AnnotationStore;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Annotation table, overriding the configured one
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Folder of recordings to open on startup
    #[arg(short, long)]
    folder: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let mut config = AppConfig::load(&args.config)?;
    if let Some(table) = args.table {
        config.transcription_file.transcription_file = table;
    }

    let store = AnnotationStore::load(config.table_path().to_path_buf())
        .context("loading the annotation table")?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Speech Transcription Tool"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Speech Transcription Tool",
        options,
        Box::new(move |_cc| Ok(Box::new(AnnotatorApp::new(config, store, args.folder)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
