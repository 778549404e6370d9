// src/analyzers/press.rs
use super::Joints;
use crate::analysis::{AnalysisResult, AnalyzerState, FormScore, Messages, Phase};
use crate::error::Result;
use crate::exercise::{ExerciseAnalyzer, ExerciseKind};
use crate::landmarks::{BodyPart, LandmarkFrame};

pub const EXTENDED_ELBOW_ANGLE: f64 = 150.0;
pub const LOWERED_ELBOW_ANGLE: f64 = 90.0;

pub const ARM_ASYMMETRY_TOLERANCE: f64 = 15.0;
pub const ARM_ASYMMETRY_WEIGHT: i32 = 15;

pub const SHOULDER_LEVEL_TOLERANCE: f64 = 0.05;
pub const SHOULDER_LEVEL_WEIGHT: i32 = 20;

pub const ELBOW_UNDER_WRIST_TOLERANCE: f64 = 0.06;
pub const ELBOW_UNDER_WRIST_WEIGHT: i32 = 20;

/// Optimal horizontal elbow offset, as a fraction of shoulder width.
pub const OPTIMAL_FLARE_RATIO: f64 = 0.3;
pub const MAX_FLARE_FACTOR: f64 = 1.5;
pub const ELBOW_FLARE_WEIGHT: i32 = 15;

pub const CORE_LEAN_TOLERANCE: f64 = 0.08;
pub const CORE_LEAN_WEIGHT: i32 = 15;

const MESSAGES: Messages = Messages {
    perfect: "Perfect Press Form!",
    excellent: "Excellent Press!",
    good: "Good press - minor adjustments",
    warning: "Form needs improvement",
    error: "Poor press form",
    clean: "Perfect press technique!",
};

const REQUIRED: [BodyPart; 8] = [
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftHip,
    BodyPart::RightHip,
];

pub fn phase_for(avg_elbow_angle: f64) -> Phase {
    if avg_elbow_angle > EXTENDED_ELBOW_ANGLE {
        Phase::Extended
    } else if avg_elbow_angle < LOWERED_ELBOW_ANGLE {
        Phase::Lowered
    } else {
        Phase::Transition
    }
}

pub struct PressAnalyzer;

impl ExerciseAnalyzer for PressAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Press
    }

    fn required_parts(&self) -> &'static [BodyPart] {
        &REQUIRED
    }

    fn score_form(
        &self,
        frame: &LandmarkFrame,
        _prior: Option<&AnalyzerState>,
        quality: f64,
    ) -> Result<AnalysisResult> {
        use BodyPart::*;

        let joints = Joints::new(frame, self.kind());
        let mut form = FormScore::new();

        let left_elbow_angle = joints.angle(LeftShoulder, LeftElbow, LeftWrist)?;
        let right_elbow_angle = joints.angle(RightShoulder, RightElbow, RightWrist)?;
        let avg_elbow_angle = (left_elbow_angle + right_elbow_angle) / 2.0;

        let asymmetry = (left_elbow_angle - right_elbow_angle).abs();
        if asymmetry > ARM_ASYMMETRY_TOLERANCE {
            form.penalize(ARM_ASYMMETRY_WEIGHT, "Keep both arms moving symmetrically");
        }

        let phase = phase_for(avg_elbow_angle);

        let left_shoulder = joints.at(LeftShoulder)?;
        let right_shoulder = joints.at(RightShoulder)?;
        let shoulder_mid = joints.mid(LeftShoulder, RightShoulder)?;

        let shoulder_tilt = (left_shoulder.y - right_shoulder.y).abs();
        if shoulder_tilt > SHOULDER_LEVEL_TOLERANCE {
            form.penalize(SHOULDER_LEVEL_WEIGHT, "Keep shoulders level and stable");
        }

        let left_elbow = joints.at(LeftElbow)?;
        let right_elbow = joints.at(RightElbow)?;

        if phase == Phase::Lowered {
            let left_offset = (left_elbow.x - joints.at(LeftWrist)?.x).abs();
            let right_offset = (right_elbow.x - joints.at(RightWrist)?.x).abs();
            if left_offset > ELBOW_UNDER_WRIST_TOLERANCE || right_offset > ELBOW_UNDER_WRIST_TOLERANCE {
                form.penalize(ELBOW_UNDER_WRIST_WEIGHT, "Keep elbows directly under wrists");
            }
        }

        let shoulder_width = joints.span(LeftShoulder, RightShoulder)?;
        let flare_limit = shoulder_width * OPTIMAL_FLARE_RATIO * MAX_FLARE_FACTOR;
        let left_flare = (left_elbow.x - left_shoulder.x).abs();
        let right_flare = (right_elbow.x - right_shoulder.x).abs();
        if left_flare > flare_limit || right_flare > flare_limit {
            form.penalize(ELBOW_FLARE_WEIGHT, "Don't flare elbows too wide");
        }

        let hip_mid = joints.mid(LeftHip, RightHip)?;
        let core_lean = (shoulder_mid.x - hip_mid.x).abs();
        if core_lean > CORE_LEAN_TOLERANCE {
            form.penalize(CORE_LEAN_WEIGHT, "Maintain neutral spine - avoid excessive lean");
        }

        form.metric("symmetry", (100.0 - asymmetry * 4.0).max(0.0));
        form.metric("shoulder_stability", (100.0 - shoulder_tilt * 400.0).max(0.0));
        form.metric("elbow_angle", avg_elbow_angle);
        form.metric("core_stability", (100.0 - core_lean * 300.0).max(0.0));

        let state = AnalyzerState {
            avg_elbow_angle: Some(avg_elbow_angle),
            ..AnalyzerState::new(shoulder_mid, hip_mid)
        };

        Ok(form.finish(&MESSAGES, phase, quality, state))
    }
}
