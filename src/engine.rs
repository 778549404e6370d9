// src/engine.rs
//! Stateless entry points keyed by exercise name. Callers own every piece of
//! carried state and pass it back in on the next frame.

use crate::analysis::{AnalysisResult, AnalyzerState};
use crate::error::{CoachError, Result};
use crate::exercise::ExerciseKind;
use crate::landmarks::LandmarkFrame;
use crate::quality;
use crate::reps::{RepEvent, RepetitionCounter};
use crate::session::SessionStats;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepTracking {
    pub counter: RepetitionCounter,
    pub repetition_completed: bool,
    pub event: Option<RepEvent>,
}

pub fn analyze(
    exercise_name: &str,
    frame: &LandmarkFrame,
    prior: Option<&AnalyzerState>,
) -> Result<AnalysisResult> {
    ExerciseKind::from_name(exercise_name)?
        .analyzer()
        .analyze(frame, prior)
}

/// Like [`analyze`], with `None` standing for "no person detected".
pub fn analyze_detection(
    exercise_name: &str,
    detection: Option<&LandmarkFrame>,
    prior: Option<&AnalyzerState>,
) -> Result<AnalysisResult> {
    match detection {
        Some(frame) => analyze(exercise_name, frame, prior),
        None => {
            ExerciseKind::from_name(exercise_name)?;
            Ok(quality::rejected(0.0, prior))
        }
    }
}

pub fn track_repetition(
    exercise_name: &str,
    result: &AnalysisResult,
    prior: &RepetitionCounter,
) -> Result<RepTracking> {
    let exercise = ExerciseKind::from_name(exercise_name)?;
    if prior.exercise() != exercise {
        return Err(CoachError::CounterMismatch {
            exercise,
            counter: prior.exercise(),
        });
    }

    let mut counter = prior.clone();
    let event = counter.observe(result);
    Ok(RepTracking {
        counter,
        repetition_completed: event.is_some(),
        event,
    })
}

/// Folds one result (and the rep it completed, if any) into the aggregate.
pub fn update_session_stats(
    exercise_name: &str,
    result: &AnalysisResult,
    repetition: Option<&RepEvent>,
    prior: &SessionStats,
) -> Result<SessionStats> {
    ExerciseKind::from_name(exercise_name)?;

    let mut stats = *prior;
    stats.record_result(result);
    if let Some(event) = repetition {
        stats.record_repetition(event);
    }
    Ok(stats)
}

pub fn reset_session(exercise_name: &str) -> Result<(RepetitionCounter, SessionStats)> {
    let exercise = ExerciseKind::from_name(exercise_name)?;
    Ok((RepetitionCounter::new(exercise), SessionStats::default()))
}
