// src/session.rs
use crate::analysis::{AnalysisResult, AnalyzerState};
use crate::config::CoachConfig;
use crate::error::Result;
use crate::exercise::ExerciseKind;
use crate::landmarks::LandmarkFrame;
use crate::quality;
use crate::reps::{RepEvent, RepetitionCounter};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Running score figures for one exercise session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub best_score: u8,
    /// Halving running average: `avg = (avg + score) / 2`, seeded at 0.
    pub average_score: f64,
    pub total_reps: u32,
}

impl SessionStats {
    pub fn record_result(&mut self, result: &AnalysisResult) {
        self.best_score = self.best_score.max(result.score);
        self.average_score = (self.average_score + f64::from(result.score)) / 2.0;
    }

    pub fn record_repetition(&mut self, event: &RepEvent) {
        self.total_reps = event.rep_count;
    }
}

/// Everything one processed frame produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutcome {
    pub result: AnalysisResult,
    pub repetition: Option<RepEvent>,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub name: String,
    pub exercise: ExerciseKind,
    pub started_at: DateTime<Local>,
    pub duration_secs: f64,
    pub frames_processed: u64,
    #[serde(flatten)]
    pub stats: SessionStats,
}

/// Caller-owned tracking state for one exercise: carried analyzer state,
/// repetition counter and score aggregate.
#[derive(Debug, Clone)]
pub struct CoachSession {
    id: Uuid,
    name: String,
    exercise: ExerciseKind,
    started_at: DateTime<Local>,
    frames_processed: u64,
    state: Option<AnalyzerState>,
    counter: RepetitionCounter,
    stats: SessionStats,
}

impl CoachSession {
    pub fn new(exercise: ExerciseKind, config: &CoachConfig, session_name: Option<String>) -> Self {
        let name = session_name.unwrap_or_else(|| {
            format!("session_{}", Local::now().format("%Y%m%d_%H%M%S"))
        });
        let session = Self {
            id: Uuid::new_v4(),
            name,
            exercise,
            started_at: Local::now(),
            frames_processed: 0,
            state: None,
            counter: RepetitionCounter::with_stability(exercise, config.min_stable_frames),
            stats: SessionStats::default(),
        };
        info!(
            id = %session.id,
            exercise = %exercise,
            tip = exercise.coaching_tip(),
            "session started"
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn state(&self) -> Option<&AnalyzerState> {
        self.state.as_ref()
    }

    pub fn counter(&self) -> &RepetitionCounter {
        &self.counter
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Runs one detection through gate, analyzer, rep tracker and aggregator.
    ///
    /// `None` means the detector saw nobody. A frame missing required roles
    /// is returned as an error and leaves the session untouched.
    pub fn process(&mut self, detection: Option<&LandmarkFrame>) -> Result<FrameOutcome> {
        let result = match detection {
            Some(frame) => self.exercise.analyzer().analyze(frame, self.state.as_ref())?,
            None => {
                debug!(exercise = %self.exercise, "no person detected");
                quality::rejected(0.0, self.state.as_ref())
            }
        };

        self.frames_processed += 1;
        self.state = result.state.clone();
        self.stats.record_result(&result);
        let repetition = self.counter.observe(&result);
        if let Some(event) = &repetition {
            self.stats.record_repetition(event);
        }

        debug!(
            exercise = %self.exercise,
            score = result.score,
            phase = ?result.phase,
            status = ?result.status,
            "frame analyzed"
        );

        Ok(FrameOutcome {
            result,
            repetition,
            stats: self.stats,
        })
    }

    pub fn reset(&mut self) {
        self.state = None;
        self.counter.reset();
        self.stats = SessionStats::default();
        info!(id = %self.id, exercise = %self.exercise, "session reset");
    }

    pub fn summary(&self) -> SessionSummary {
        let elapsed = Local::now().signed_duration_since(self.started_at);
        SessionSummary {
            id: self.id,
            name: self.name.clone(),
            exercise: self.exercise,
            started_at: self.started_at,
            duration_secs: elapsed.num_milliseconds() as f64 / 1000.0,
            frames_processed: self.frames_processed,
            stats: self.stats,
        }
    }
}

/// Independent sessions keyed by the exercise name the caller tracks.
#[derive(Debug, Default)]
pub struct Coach {
    config: CoachConfig,
    sessions: HashMap<String, CoachSession>,
}

impl Coach {
    pub fn new(config: CoachConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    /// Starts (or restarts) tracking for `exercise_name`.
    pub fn start(&mut self, exercise_name: &str) -> Result<&CoachSession> {
        let exercise = ExerciseKind::from_name(exercise_name)?;
        let session = CoachSession::new(exercise, &self.config, None);
        let slot = match self.sessions.entry(exercise_name.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(session);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(session),
        };
        Ok(slot)
    }

    /// Processes a frame, starting the session on first use.
    pub fn process(
        &mut self,
        exercise_name: &str,
        detection: Option<&LandmarkFrame>,
    ) -> Result<FrameOutcome> {
        let session = match self.sessions.entry(exercise_name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let exercise = ExerciseKind::from_name(exercise_name)?;
                entry.insert(CoachSession::new(exercise, &self.config, None))
            }
        };
        session.process(detection)
    }

    pub fn stop(&mut self, exercise_name: &str) -> Option<SessionSummary> {
        let session = self.sessions.remove(exercise_name)?;
        let summary = session.summary();
        info!(
            id = %summary.id,
            exercise = %summary.exercise,
            reps = summary.stats.total_reps,
            best = summary.stats.best_score,
            "session stopped"
        );
        Some(summary)
    }

    /// Returns false when nothing is tracked under `exercise_name`.
    pub fn reset(&mut self, exercise_name: &str) -> bool {
        match self.sessions.get_mut(exercise_name) {
            Some(session) => {
                session.reset();
                true
            }
            None => false,
        }
    }

    pub fn session(&self, exercise_name: &str) -> Option<&CoachSession> {
        self.sessions.get(exercise_name)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }
}
