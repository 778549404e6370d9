// src/analyzers/squat.rs
use super::Joints;
use crate::analysis::{AnalysisResult, AnalyzerState, FormScore, Messages, Phase};
use crate::error::Result;
use crate::exercise::{ExerciseAnalyzer, ExerciseKind};
use crate::geometry::{self, ratio, Point};
use crate::landmarks::{BodyPart, LandmarkFrame};

pub const SQUATTING_KNEE_ANGLE: f64 = 110.0;

/// Hips this far above the knees still count as "almost deep enough".
pub const SHALLOW_DEPTH_MARGIN: f64 = 0.03;
pub const SHALLOW_DEPTH_WEIGHT: i32 = 10;
pub const DEPTH_WEIGHT: i32 = 25;

pub const KNEE_OVER_ANKLE_TOLERANCE: f64 = 0.08;
pub const KNEE_OVER_ANKLE_WEIGHT: i32 = 20;

pub const KNEE_VALGUS_RATIO: f64 = 0.8;
pub const KNEE_VALGUS_WEIGHT: i32 = 15;

pub const TORSO_LEAN_TOLERANCE: f64 = 0.1;
pub const TORSO_LEAN_WEIGHT: i32 = 20;

/// Length of the vertical reference segment drawn above the shoulders.
pub const SPINE_REFERENCE_LENGTH: f64 = 0.1;
pub const MIN_SPINE_ANGLE: f64 = 160.0;
/// Upper edge of the accepted band. `angle_degrees` folds into [0, 180], so
/// only the lower bound can trip.
pub const MAX_SPINE_ANGLE: f64 = 200.0;
pub const SPINE_WEIGHT: i32 = 15;

pub const MIN_STANCE_RATIO: f64 = 0.8;
pub const MAX_STANCE_RATIO: f64 = 1.8;
pub const NARROW_STANCE_WEIGHT: i32 = 12;
pub const WIDE_STANCE_WEIGHT: i32 = 8;

const MESSAGES: Messages = Messages {
    perfect: "Perfect Squat Form!",
    excellent: "Excellent Squat!",
    good: "Good squat - minor tweaks needed",
    warning: "Form needs work",
    error: "Poor squat form",
    clean: "Perfect squat technique!",
};

const REQUIRED: [BodyPart; 12] = [
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftHip,
    BodyPart::RightHip,
    BodyPart::LeftKnee,
    BodyPart::RightKnee,
    BodyPart::LeftAnkle,
    BodyPart::RightAnkle,
];

pub fn phase_for(avg_knee_angle: f64) -> Phase {
    if avg_knee_angle < SQUATTING_KNEE_ANGLE {
        Phase::Squatting
    } else {
        Phase::Standing
    }
}

pub struct SquatAnalyzer;

impl ExerciseAnalyzer for SquatAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Squat
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

        let hip_mid = joints.mid(LeftHip, RightHip)?;
        let knee_mid = joints.mid(LeftKnee, RightKnee)?;
        let shoulder_mid = joints.mid(LeftShoulder, RightShoulder)?;

        let left_knee_angle = joints.angle(LeftHip, LeftKnee, LeftAnkle)?;
        let right_knee_angle = joints.angle(RightHip, RightKnee, RightAnkle)?;
        let avg_knee_angle = (left_knee_angle + right_knee_angle) / 2.0;
        let phase = phase_for(avg_knee_angle);

        // Frame y grows downward, so hips above the knees have the smaller y.
        let mut depth = 100.0;
        if phase == Phase::Squatting {
            let overshoot = knee_mid.y - hip_mid.y;
            if overshoot > SHALLOW_DEPTH_MARGIN {
                depth = 60.0;
                form.penalize(DEPTH_WEIGHT, "Go deeper - hips should go below knees");
            } else if overshoot > 0.0 {
                depth = 85.0;
                form.penalize(SHALLOW_DEPTH_WEIGHT, "Go slightly deeper for full range");
            }
        }

        let left_knee_drift = (joints.at(LeftKnee)?.x - joints.at(LeftAnkle)?.x).abs();
        let right_knee_drift = (joints.at(RightKnee)?.x - joints.at(RightAnkle)?.x).abs();
        if left_knee_drift > KNEE_OVER_ANKLE_TOLERANCE || right_knee_drift > KNEE_OVER_ANKLE_TOLERANCE {
            form.penalize(KNEE_OVER_ANKLE_WEIGHT, "Keep knees aligned over your toes");
        }

        let knee_width = joints.span(LeftKnee, RightKnee)?;
        let ankle_width = joints.span(LeftAnkle, RightAnkle)?;
        if knee_width < ankle_width * KNEE_VALGUS_RATIO {
            form.penalize(KNEE_VALGUS_WEIGHT, "Don't let your knees cave inward");
        }

        let torso_lean = (shoulder_mid.x - hip_mid.x).abs();
        if torso_lean > TORSO_LEAN_TOLERANCE {
            form.penalize(TORSO_LEAN_WEIGHT, "Keep your chest up - don't lean forward too much");
        }

        let vertical = Point::new(shoulder_mid.x, shoulder_mid.y - SPINE_REFERENCE_LENGTH);
        let spine_angle = geometry::angle_degrees(&vertical, &shoulder_mid, &hip_mid);
        if !(MIN_SPINE_ANGLE..=MAX_SPINE_ANGLE).contains(&spine_angle) {
            form.penalize(SPINE_WEIGHT, "Maintain neutral spine position");
        }

        let shoulder_width = joints.span(LeftShoulder, RightShoulder)?;
        if ankle_width < shoulder_width * MIN_STANCE_RATIO {
            form.penalize(NARROW_STANCE_WEIGHT, "Widen your stance to shoulder-width");
        } else if ankle_width > shoulder_width * MAX_STANCE_RATIO {
            form.penalize(WIDE_STANCE_WEIGHT, "Narrow your stance slightly");
        }

        form.metric("knee_angle", avg_knee_angle);
        form.metric("depth", depth);
        form.metric(
            "knee_alignment",
            (100.0 - (left_knee_drift + right_knee_drift) * 500.0).max(0.0),
        );
        form.metric("back_posture", (100.0 - torso_lean * 200.0).max(0.0));
        form.metric("spine_angle", spine_angle);
        form.metric("stance_width", ratio(ankle_width, shoulder_width));

        let state = AnalyzerState {
            knee_mid: Some(knee_mid),
            ..AnalyzerState::new(shoulder_mid, hip_mid)
        };

        Ok(form.finish(&MESSAGES, phase, quality, state))
    }
}
