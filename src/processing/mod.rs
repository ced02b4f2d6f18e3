// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image processing: background removal, rotation, cropping and the worker
//! that runs the slow parts off the UI thread.

pub mod background;
pub mod crop;
pub mod rotation;
pub mod segmentation;
pub mod task;
