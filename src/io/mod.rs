// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, the output folder and settings.

pub mod media;
pub mod output;
pub mod serialization;
