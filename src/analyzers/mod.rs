// src/analyzers/mod.rs
//! Per-exercise form rules. Each analyzer is stateless; frame-to-frame
//! continuity travels in the `AnalyzerState` the caller hands back in.

mod hinge;
mod press;
mod push_up;
mod squat;

pub use hinge::HingeAnalyzer;
pub use press::PressAnalyzer;
pub use push_up::PushUpAnalyzer;
pub use squat::SquatAnalyzer;

use crate::error::{CoachError, Result};
use crate::exercise::ExerciseKind;
use crate::geometry::{self, Point};
use crate::landmarks::{BodyPart, LandmarkFrame};

/// Resolved points for a frame whose required roles were already checked.
pub(crate) struct Joints<'a> {
    frame: &'a LandmarkFrame,
    kind: ExerciseKind,
}

impl<'a> Joints<'a> {
    pub fn new(frame: &'a LandmarkFrame, kind: ExerciseKind) -> Self {
        Self { frame, kind }
    }

    pub fn at(&self, part: BodyPart) -> Result<Point> {
        self.frame
            .point(part)
            .ok_or_else(|| CoachError::MissingLandmarks {
                exercise: self.kind.display_name().to_string(),
                parts: vec![part],
            })
    }

    pub fn mid(&self, left: BodyPart, right: BodyPart) -> Result<Point> {
        Ok(geometry::midpoint(&self.at(left)?, &self.at(right)?))
    }

    pub fn angle(&self, a: BodyPart, vertex: BodyPart, c: BodyPart) -> Result<f64> {
        Ok(geometry::angle_degrees(&self.at(a)?, &self.at(vertex)?, &self.at(c)?))
    }

    pub fn span(&self, left: BodyPart, right: BodyPart) -> Result<f64> {
        Ok(geometry::distance(&self.at(left)?, &self.at(right)?))
    }
}
