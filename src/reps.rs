// src/reps.rs
use crate::analysis::{AnalysisResult, Phase};
use crate::exercise::ExerciseKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const GREAT_REP_SCORE: u8 = 85;
pub const GOOD_REP_SCORE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepGrade {
    Great,
    Good,
    Poor,
}

impl RepGrade {
    pub fn from_score(score: u8) -> Self {
        if score >= GREAT_REP_SCORE {
            RepGrade::Great
        } else if score >= GOOD_REP_SCORE {
            RepGrade::Good
        } else {
            RepGrade::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepGrade::Great => "Great rep!",
            RepGrade::Good => "Good rep",
            RepGrade::Poor => "Focus on form",
        }
    }
}

/// Fired once per completion edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepEvent {
    pub rep_count: u32,
    pub score: u8,
    pub grade: RepGrade,
}

/// Phase state machine for one tracked exercise.
///
/// A new phase is accepted once it has been seen on `min_stable_frames`
/// consecutive scored frames; with the default of 1 every change is taken
/// immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepetitionCounter {
    exercise: ExerciseKind,
    last_phase: Phase,
    rep_count: u32,
    min_stable_frames: u32,
    pending_phase: Phase,
    pending_frames: u32,
}

impl RepetitionCounter {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self::with_stability(exercise, 1)
    }

    pub fn with_stability(exercise: ExerciseKind, min_stable_frames: u32) -> Self {
        Self {
            exercise,
            last_phase: Phase::Unknown,
            rep_count: 0,
            min_stable_frames: min_stable_frames.max(1),
            pending_phase: Phase::Unknown,
            pending_frames: 0,
        }
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn last_phase(&self) -> Phase {
        self.last_phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn min_stable_frames(&self) -> u32 {
        self.min_stable_frames
    }

    /// Feeds one analysis result; returns the event when it completes a rep.
    pub fn observe(&mut self, result: &AnalysisResult) -> Option<RepEvent> {
        let phase = result.phase;
        // Rejected frames carry no movement information.
        if phase == Phase::Unknown {
            return None;
        }

        if phase == self.last_phase {
            self.pending_phase = Phase::Unknown;
            self.pending_frames = 0;
            return None;
        }

        if phase == self.pending_phase {
            self.pending_frames += 1;
        } else {
            self.pending_phase = phase;
            self.pending_frames = 1;
        }
        if self.pending_frames < self.min_stable_frames {
            debug!(exercise = %self.exercise, ?phase, frames = self.pending_frames, "phase change pending");
            return None;
        }

        let previous = std::mem::replace(&mut self.last_phase, phase);
        self.pending_phase = Phase::Unknown;
        self.pending_frames = 0;

        if self.exercise.completion_edge() != Some((previous, phase)) {
            return None;
        }

        self.rep_count += 1;
        let event = RepEvent {
            rep_count: self.rep_count,
            score: result.score,
            grade: RepGrade::from_score(result.score),
        };
        info!(
            exercise = %self.exercise,
            reps = event.rep_count,
            score = event.score,
            "{}",
            event.grade.label()
        );
        Some(event)
    }

    pub fn reset(&mut self) {
        *self = Self::with_stability(self.exercise, self.min_stable_frames);
    }
}
