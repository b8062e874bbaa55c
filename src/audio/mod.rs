// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Audio output and time-frequency analysis.

pub mod backend;
pub mod spectrogram;
