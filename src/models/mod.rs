// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for recordings, the viewport, transcripts and the file queue.

pub mod annotation;
pub mod queue;
pub mod recording;
pub mod viewport;
