// src/lib.rs
//! Exercise form analysis over 2D pose landmarks: per-frame scoring,
//! repetition counting and session aggregation.

pub mod analysis;
pub mod analyzers;
pub mod config;
pub mod engine;
pub mod error;
pub mod exercise;
pub mod geometry;
pub mod landmarks;
pub mod pump;
pub mod quality;
pub mod replay;
pub mod reps;
pub mod session;

pub use analysis::{AnalysisResult, AnalyzerState, FormStatus, Phase};
pub use config::{CoachConfig, PumpConfig};
pub use engine::{
    analyze, analyze_detection, reset_session, track_repetition, update_session_stats, RepTracking,
};
pub use error::{CoachError, Result};
pub use exercise::{ExerciseAnalyzer, ExerciseKind};
pub use landmarks::{BodyPart, KeypointLayout, Landmark, LandmarkFrame};
pub use pump::{spawn_detection, FramePump, FrameUpdate, PoseDetector};
pub use replay::ReplaySource;
pub use reps::{RepEvent, RepGrade, RepetitionCounter};
pub use session::{Coach, CoachSession, FrameOutcome, SessionStats, SessionSummary};
