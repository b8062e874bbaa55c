// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for recordings and the annotation table.

pub mod media;
pub mod serialization;
