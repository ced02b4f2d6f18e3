// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wizard stages and transitions.
//!
//! The flow is upload → background removal → rotate → crop → done. Each
//! stage owns exactly the state it needs and `Stage::next` is a pure
//! transition; rendering lives elsewhere.

use crate::models::crop::{CropRectangle, CropRegion};
use crate::models::session::SourceImage;
use std::path::PathBuf;

/// What a successful crop produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCrop {
    pub image_path: PathBuf,
    pub record_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Where the wizard is.
#[derive(Debug, Clone, Default)]
pub enum Stage {
    #[default]
    Idle,
    Processing {
        input: PathBuf,
    },
    Rotating {
        image: SourceImage,
    },
    Cropping {
        image: SourceImage,
        crop: CropRectangle,
        /// Why the last save attempt failed, if it did.
        error: Option<String>,
    },
    Done {
        saved: SavedCrop,
    },
    Failed {
        message: String,
    },
}

/// Inputs that move the wizard.
#[derive(Debug)]
pub enum Event {
    /// The user picked a photo.
    Upload(PathBuf),
    /// The worker finished background removal.
    RemovalFinished(Result<SourceImage, String>),
    /// Rotate the preview by this many degrees.
    Rotate(f64),
    /// Leave the rotate screen for the crop screen.
    ConfirmRotation,
    /// Return from the crop screen to the rotate screen.
    Back,
    /// Saving the crop finished.
    CropSaved(Result<SavedCrop, String>),
    /// Start again from the upload button.
    Restart,
}

/// Whether an event changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

/// Settings a freshly opened crop screen starts from.
#[derive(Debug, Clone, Copy)]
pub struct CropDefaults {
    pub region: CropRegion,
    pub handle_thickness: f64,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Processing { .. } => "processing",
            Stage::Rotating { .. } => "rotating",
            Stage::Cropping { .. } => "cropping",
            Stage::Done { .. } => "done",
            Stage::Failed { .. } => "failed",
        }
    }

    /// Apply `event` and return the next stage. Events that make no sense in
    /// the current stage leave it untouched.
    pub fn next(self, event: Event, defaults: &CropDefaults) -> (Stage, Outcome) {
        use Outcome::{Applied, Ignored};

        match (self, event) {
            (Stage::Idle | Stage::Done { .. } | Stage::Failed { .. }, Event::Upload(input)) => {
                (Stage::Processing { input }, Applied)
            }
            (Stage::Processing { .. }, Event::RemovalFinished(Ok(image))) => {
                (Stage::Rotating { image }, Applied)
            }
            (Stage::Processing { .. }, Event::RemovalFinished(Err(message))) => {
                (Stage::Failed { message }, Applied)
            }
            (Stage::Rotating { mut image }, Event::Rotate(degrees)) => {
                image.rotate_by(degrees);
                (Stage::Rotating { image }, Applied)
            }
            (Stage::Rotating { image }, Event::ConfirmRotation) => {
                let crop = CropRectangle::new(defaults.region, defaults.handle_thickness);
                (
                    Stage::Cropping {
                        image,
                        crop,
                        error: None,
                    },
                    Applied,
                )
            }
            (Stage::Cropping { image, .. }, Event::Back) => (Stage::Rotating { image }, Applied),
            (Stage::Cropping { .. }, Event::CropSaved(Ok(saved))) => {
                (Stage::Done { saved }, Applied)
            }
            (Stage::Cropping { image, crop, .. }, Event::CropSaved(Err(message))) => (
                Stage::Cropping {
                    image,
                    crop,
                    error: Some(message),
                },
                Applied,
            ),
            (Stage::Done { .. } | Stage::Failed { .. }, Event::Restart) => (Stage::Idle, Applied),
            (stage, _) => (stage, Ignored),
        }
    }
}

/// The wizard: current stage plus what new crop screens start from.
#[derive(Debug)]
pub struct Wizard {
    stage: Stage,
    defaults: CropDefaults,
}

impl Wizard {
    pub fn new(defaults: CropDefaults) -> Self {
        Self {
            stage: Stage::Idle,
            defaults,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Feed an event through the transition function.
    pub fn handle(&mut self, event: Event) -> Outcome {
        let event_name = format!("{:?}", EventKind::of(&event));
        let from = self.stage.name();

        let (next, outcome) = std::mem::take(&mut self.stage).next(event, &self.defaults);
        self.stage = next;

        match outcome {
            Outcome::Applied if from != self.stage.name() => {
                log::info!("Wizard: {} -> {} ({})", from, self.stage.name(), event_name);
            }
            Outcome::Applied => {}
            Outcome::Ignored => {
                log::warn!("Wizard: ignored {} while {}", event_name, from);
            }
        }
        outcome
    }
}

/// Event name without its payload, for logs.
#[derive(Debug)]
enum EventKind {
    Upload,
    RemovalFinished,
    Rotate,
    ConfirmRotation,
    Back,
    CropSaved,
    Restart,
}

impl EventKind {
    fn of(event: &Event) -> Self {
        match event {
            Event::Upload(_) => EventKind::Upload,
            Event::RemovalFinished(_) => EventKind::RemovalFinished,
            Event::Rotate(_) => EventKind::Rotate,
            Event::ConfirmRotation => EventKind::ConfirmRotation,
            Event::Back => EventKind::Back,
            Event::CropSaved(_) => EventKind::CropSaved,
            Event::Restart => EventKind::Restart,
        }
    }
}
