// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback control, cursor synchronization and click routing.

pub mod click;
pub mod clock;
pub mod controller;
pub mod sync;
