// src/error.rs
use crate::exercise::ExerciseKind;
use crate::landmarks::BodyPart;
use thiserror::Error;

/// Failures the engine refuses to score.
///
/// Low-confidence frames and frames with no detected person are not errors:
/// they come back as ordinary `AnalysisResult`s with `status = error`.
#[derive(Error, Debug)]
pub enum CoachError {
    #[error("frame for {exercise} is missing required landmarks: {parts:?}")]
    MissingLandmarks {
        exercise: String,
        parts: Vec<BodyPart>,
    },

    #[error("unsupported exercise: {0:?}")]
    UnsupportedExercise(String),

    #[error("repetition counter tracks {counter}, not {exercise}")]
    CounterMismatch {
        exercise: ExerciseKind,
        counter: ExerciseKind,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("replay error: {0}")]
    Replay(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CoachError>;
