// src/analysis.rs
use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    Error,
    Warning,
    Good,
    Excellent,
    Perfect,
}

impl FormStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            95..=u8::MAX => FormStatus::Perfect,
            85..=94 => FormStatus::Excellent,
            75..=84 => FormStatus::Good,
            60..=74 => FormStatus::Warning,
            _ => FormStatus::Error,
        }
    }
}

/// Movement phase derived from joint angles.
///
/// Each exercise family only ever produces its own subset; `Unknown` is the
/// phase of a frame that could not be analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Unknown,
    // push-up
    Up,
    Down,
    Transition,
    // squat
    Standing,
    Squatting,
    // press
    Extended,
    Lowered,
    // hinge lift
    Lifting,
}

/// Scalars carried from one frame to the next for continuity checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerState {
    pub shoulder_mid: Point,
    pub hip_mid: Point,
    pub knee_mid: Option<Point>,
    pub ankle_mid: Option<Point>,
    pub avg_elbow_angle: Option<f64>,
}

impl AnalyzerState {
    pub fn new(shoulder_mid: Point, hip_mid: Point) -> Self {
        Self {
            shoulder_mid,
            hip_mid,
            knee_mid: None,
            ankle_mid: None,
            avg_elbow_angle: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: FormStatus,
    pub message: String,
    pub details: String,
    pub mistakes: Vec<String>,
    pub score: u8,
    pub phase: Phase,
    pub confidence: f64,
    pub metrics: BTreeMap<String, f64>,
    pub state: Option<AnalyzerState>,
}

impl AnalysisResult {
    pub fn is_scored(&self) -> bool {
        self.phase != Phase::Unknown
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Status-band wording for one exercise family.
pub(crate) struct Messages {
    pub perfect: &'static str,
    pub excellent: &'static str,
    pub good: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub clean: &'static str,
}

impl Messages {
    fn for_status(&self, status: FormStatus) -> &'static str {
        match status {
            FormStatus::Perfect => self.perfect,
            FormStatus::Excellent => self.excellent,
            FormStatus::Good => self.good,
            FormStatus::Warning => self.warning,
            FormStatus::Error => self.error,
        }
    }
}

/// Deduction ledger shared by every analyzer: start at 100, subtract a fixed
/// weight per violated rule and record why.
#[derive(Debug, Clone)]
pub(crate) struct FormScore {
    score: i32,
    mistakes: Vec<String>,
    forced_error: bool,
    metrics: BTreeMap<String, f64>,
}

impl FormScore {
    pub fn new() -> Self {
        Self {
            score: 100,
            mistakes: Vec::new(),
            forced_error: false,
            metrics: BTreeMap::new(),
        }
    }

    pub fn penalize(&mut self, weight: i32, mistake: &str) {
        self.score -= weight;
        self.mistakes.push(mistake.to_string());
    }

    /// Marks the frame as unsafe; status becomes `Error` whatever the total.
    pub fn force_error(&mut self) {
        self.forced_error = true;
    }

    pub fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    pub fn finish(
        self,
        messages: &Messages,
        phase: Phase,
        confidence: f64,
        state: AnalyzerState,
    ) -> AnalysisResult {
        let score = self.score.clamp(0, 100) as u8;
        let status = if self.forced_error {
            FormStatus::Error
        } else {
            FormStatus::from_score(score)
        };
        let details = if self.mistakes.is_empty() {
            messages.clean.to_string()
        } else {
            self.mistakes.join(", ")
        };

        AnalysisResult {
            status,
            message: messages.for_status(status).to_string(),
            details,
            mistakes: self.mistakes,
            score,
            phase,
            confidence: confidence.clamp(0.0, 1.0),
            metrics: self.metrics,
            state: Some(state),
        }
    }
}
