// src/exercise.rs
use crate::analysis::{AnalysisResult, AnalyzerState, Phase};
use crate::analyzers::{HingeAnalyzer, PressAnalyzer, PushUpAnalyzer, SquatAnalyzer};
use crate::error::{CoachError, Result};
use crate::landmarks::{BodyPart, LandmarkFrame};
use crate::quality;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Exercise families the engine can judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    PushUp,
    Squat,
    Press,
    HingeLift,
}

// Catalog names (already normalized) mapped onto the family that analyzes them.
static ALIASES: Lazy<HashMap<&'static str, ExerciseKind>> = Lazy::new(|| {
    use ExerciseKind::*;

    HashMap::from([
        ("push up", PushUp),
        ("push ups", PushUp),
        ("pushup", PushUp),
        ("pushups", PushUp),
        ("squat", Squat),
        ("squats", Squat),
        ("squat (barbell)", Squat),
        ("barbell squat", Squat),
        ("press", Press),
        ("overhead press", Press),
        ("shoulder press", Press),
        ("dumbbell shoulder press", Press),
        ("dumbbell press", Press),
        ("bench press", Press),
        ("bench press (barbell)", Press),
        ("incline bench press (barbell)", Press),
        ("dumbbell bench press", Press),
        ("close grip bench press", Press),
        ("deadlift", HingeLift),
        ("deadlifts", HingeLift),
        ("romanian deadlift", HingeLift),
        ("hinge", HingeLift),
        ("hip hinge", HingeLift),
    ])
});

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 4] = [
        ExerciseKind::PushUp,
        ExerciseKind::Squat,
        ExerciseKind::Press,
        ExerciseKind::HingeLift,
    ];

    /// Maps a free-text exercise name onto a supported family.
    pub fn from_name(name: &str) -> Result<Self> {
        ALIASES
            .get(normalize(name).as_str())
            .copied()
            .ok_or_else(|| CoachError::UnsupportedExercise(name.to_string()))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::PushUp => "Push-up",
            ExerciseKind::Squat => "Squat",
            ExerciseKind::Press => "Press",
            ExerciseKind::HingeLift => "Deadlift",
        }
    }

    pub fn coaching_tip(self) -> &'static str {
        match self {
            ExerciseKind::PushUp => {
                "Keep your body straight and lower until chest nearly touches ground"
            }
            ExerciseKind::Squat => {
                "Keep feet shoulder-width apart, go down until hips are below knees"
            }
            ExerciseKind::Press => "Keep elbows under wrists, press dumbbells directly overhead",
            ExerciseKind::HingeLift => "Keep back straight, push hips back, lift with your legs",
        }
    }

    /// The `(from, to)` phase change that finishes one repetition.
    pub fn completion_edge(self) -> Option<(Phase, Phase)> {
        match self {
            ExerciseKind::PushUp => Some((Phase::Down, Phase::Up)),
            ExerciseKind::Squat => Some((Phase::Squatting, Phase::Standing)),
            ExerciseKind::Press => Some((Phase::Lowered, Phase::Extended)),
            ExerciseKind::HingeLift => None,
        }
    }

    pub fn required_parts(self) -> &'static [BodyPart] {
        self.analyzer().required_parts()
    }

    pub fn analyzer(self) -> &'static dyn ExerciseAnalyzer {
        match self {
            ExerciseKind::PushUp => &PushUpAnalyzer,
            ExerciseKind::Squat => &SquatAnalyzer,
            ExerciseKind::Press => &PressAnalyzer,
            ExerciseKind::HingeLift => &HingeAnalyzer,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One form judge per exercise family.
pub trait ExerciseAnalyzer: Send + Sync {
    fn kind(&self) -> ExerciseKind;

    /// Roles the rule set reads, critical landmarks included.
    fn required_parts(&self) -> &'static [BodyPart];

    /// Scores a frame that already passed the quality gate.
    fn score_form(
        &self,
        frame: &LandmarkFrame,
        prior: Option<&AnalyzerState>,
        quality: f64,
    ) -> Result<AnalysisResult>;

    /// Full per-frame analysis: precondition check, quality gate, rules.
    fn analyze(&self, frame: &LandmarkFrame, prior: Option<&AnalyzerState>) -> Result<AnalysisResult> {
        let missing = frame.missing_parts(self.required_parts());
        if !missing.is_empty() {
            return Err(CoachError::MissingLandmarks {
                exercise: self.kind().display_name().to_string(),
                parts: missing,
            });
        }

        if let Some(rejected) = quality::check(Some(frame), prior) {
            return Ok(rejected);
        }

        self.score_form(frame, prior, quality::pose_quality(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_resolve() {
        assert_eq!(ExerciseKind::from_name("Push-ups").unwrap(), ExerciseKind::PushUp);
        assert_eq!(ExerciseKind::from_name("Squat (Barbell)").unwrap(), ExerciseKind::Squat);
        assert_eq!(ExerciseKind::from_name("Dumbbell Shoulder Press").unwrap(), ExerciseKind::Press);
        assert_eq!(ExerciseKind::from_name("Close-Grip Bench Press").unwrap(), ExerciseKind::Press);
        assert_eq!(ExerciseKind::from_name("  romanian   DEADLIFT ").unwrap(), ExerciseKind::HingeLift);
        assert_eq!(ExerciseKind::from_name("push_up").unwrap(), ExerciseKind::PushUp);
    }

    #[test]
    fn test_lookalike_names_are_unsupported() {
        for name in ["Leg Press", "Dumbbell Flyes", "Dumbbell Curls", "Plank", ""] {
            match ExerciseKind::from_name(name) {
                Err(CoachError::UnsupportedExercise(n)) => assert_eq!(n, name),
                other => panic!("{name:?} resolved to {other:?}"),
            }
        }
    }

    #[test]
    fn test_completion_edges() {
        assert_eq!(ExerciseKind::PushUp.completion_edge(), Some((Phase::Down, Phase::Up)));
        assert_eq!(ExerciseKind::HingeLift.completion_edge(), None);
    }

    #[test]
    fn test_every_kind_requires_critical_parts() {
        for kind in ExerciseKind::ALL {
            assert_eq!(kind.analyzer().kind(), kind);
            for part in quality::CRITICAL_PARTS {
                assert!(kind.required_parts().contains(&part), "{kind} lacks {part:?}");
            }
        }
    }

    #[test]
    fn test_missing_roles_fail_fast() {
        let frame = LandmarkFrame::new(0.9);
        match ExerciseKind::Squat.analyzer().analyze(&frame, None) {
            Err(CoachError::MissingLandmarks { parts, .. }) => {
                assert_eq!(parts.len(), ExerciseKind::Squat.required_parts().len())
            }
            other => panic!("expected MissingLandmarks, got {other:?}"),
        }
    }
}
