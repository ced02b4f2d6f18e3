// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background work off the UI thread.
//!
//! One task runs at a time. The worker never touches UI state: it sends its
//! result through a channel and pokes the UI to repaint, and the UI picks the
//! result up on its next frame.

use crate::io::{media, output::OutputDir};
use crate::models::session::SourceImage;
use crate::processing::background::BackgroundRemover;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// Runs at most one background task and hands its result to the UI thread.
pub struct TaskRunner<T> {
    receiver: Option<Receiver<Result<T, String>>>,
}

impl<T> Default for TaskRunner<T> {
    fn default() -> Self {
        Self { receiver: None }
    }
}

impl<T: Send + 'static> TaskRunner<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a task is in flight.
    pub fn is_busy(&self) -> bool {
        self.receiver.is_some()
    }

    /// Spawn `work` on a worker thread. `notify` runs on the worker after the
    /// result has been sent. Fails if a task is already running.
    pub fn start<W, N>(&mut self, work: W, notify: N) -> Result<()>
    where
        W: FnOnce() -> Result<T> + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        if self.is_busy() {
            bail!("a background task is already running");
        }

        let (sender, receiver) = channel();
        std::thread::Builder::new()
            .name("dreamstack-worker".to_string())
            .spawn(move || {
                let result = work().map_err(|e| format!("{:#}", e));
                let _ = sender.send(result);
                notify();
            })?;

        self.receiver = Some(receiver);
        Ok(())
    }

    /// Take the finished result, if any. Never blocks.
    pub fn poll(&mut self) -> Option<Result<T, String>> {
        let receiver = self.receiver.as_ref()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err("the background task stopped unexpectedly".to_string())
            }
        };
        self.receiver = None;
        Some(result)
    }
}

/// Everything the worker needs to remove a background.
pub struct RemovalJob {
    pub input: PathBuf,
    pub max_size: (u32, u32),
    pub output: OutputDir,
    pub remover: Arc<dyn BackgroundRemover>,
}

impl RemovalJob {
    /// Decode, shrink, remove the background and save `<stem>_no_bg.png`.
    pub fn run(self) -> Result<SourceImage> {
        let stem = crate::io::output::output_stem(&self.input);
        log::info!(
            "Removing background from {} with the {} engine",
            self.input.display(),
            self.remover.name()
        );

        let decoded = media::load_image(&self.input)?;
        let (max_w, max_h) = self.max_size;
        let resized = media::thumbnail(decoded, max_w, max_h);
        let removed = self.remover.remove(&resized)?;

        let no_bg_path = self.output.no_bg_path(&stem);
        media::save_png(&removed, &no_bg_path)?;

        Ok(SourceImage::new(self.input, stem, no_bg_path, removed))
    }
}
