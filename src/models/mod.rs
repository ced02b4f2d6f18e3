// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: crop rectangle, session image and wizard stages.

pub mod crop;
pub mod session;
pub mod wizard;
