// src/analyzers/push_up.rs
use super::Joints;
use crate::analysis::{AnalysisResult, AnalyzerState, FormScore, Messages, Phase};
use crate::error::Result;
use crate::exercise::{ExerciseAnalyzer, ExerciseKind};
use crate::geometry::{self, ratio};
use crate::landmarks::{BodyPart, LandmarkFrame};

pub const UP_ELBOW_ANGLE: f64 = 150.0;
pub const DOWN_ELBOW_ANGLE: f64 = 90.0;

pub const BODY_LINE_TOLERANCE: f64 = 0.08;
pub const BODY_LINE_WEIGHT: i32 = 25;

/// Expected hip height as a fraction of the shoulder-to-ankle drop.
pub const HIP_LINE_FRACTION: f64 = 0.6;
pub const HIP_TOLERANCE: f64 = 0.05;
pub const HIP_WEIGHT: i32 = 20;

pub const MIN_HAND_WIDTH_RATIO: f64 = 0.8;
pub const MAX_HAND_WIDTH_RATIO: f64 = 1.6;
pub const HAND_WIDTH_WEIGHT: i32 = 15;

pub const DEPTH_TOLERANCE: f64 = 0.05;
pub const DEPTH_WEIGHT: i32 = 20;

pub const ELBOW_FLARE_RATIO: f64 = 0.4;
pub const ELBOW_FLARE_WEIGHT: i32 = 15;

pub const NECK_TOLERANCE: f64 = 0.08;
pub const NECK_WEIGHT: i32 = 10;

pub const SWAY_TOLERANCE: f64 = 0.03;
pub const SWAY_WEIGHT: i32 = 10;

const MESSAGES: Messages = Messages {
    perfect: "Perfect Push-up Form!",
    excellent: "Excellent Push-up!",
    good: "Good Form - Minor adjustments",
    warning: "Form needs improvement",
    error: "Poor form - focus on basics",
    clean: "Perfect technique!",
};

const REQUIRED: [BodyPart; 11] = [
    BodyPart::Nose,
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftHip,
    BodyPart::RightHip,
    BodyPart::LeftAnkle,
    BodyPart::RightAnkle,
];

pub fn phase_for(avg_elbow_angle: f64) -> Phase {
    if avg_elbow_angle > UP_ELBOW_ANGLE {
        Phase::Up
    } else if avg_elbow_angle < DOWN_ELBOW_ANGLE {
        Phase::Down
    } else {
        Phase::Transition
    }
}

pub struct PushUpAnalyzer;

impl ExerciseAnalyzer for PushUpAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::PushUp
    }

    fn required_parts(&self) -> &'static [BodyPart] {
        &REQUIRED
    }

    fn score_form(
        &self,
        frame: &LandmarkFrame,
        prior: Option<&AnalyzerState>,
        quality: f64,
    ) -> Result<AnalysisResult> {
        use BodyPart::*;

        let joints = Joints::new(frame, self.kind());
        let mut form = FormScore::new();

        let shoulder_mid = joints.mid(LeftShoulder, RightShoulder)?;
        let hip_mid = joints.mid(LeftHip, RightHip)?;
        let ankle_mid = joints.mid(LeftAnkle, RightAnkle)?;

        // Body line: shoulders and hips at the same height relative to the feet.
        let body_line_deviation =
            ((shoulder_mid.y - ankle_mid.y) - (hip_mid.y - ankle_mid.y)).abs();
        if body_line_deviation > BODY_LINE_TOLERANCE {
            form.penalize(BODY_LINE_WEIGHT, "Keep your body in a straight line");
        }

        let expected_hip_y = shoulder_mid.y + (ankle_mid.y - shoulder_mid.y) * HIP_LINE_FRACTION;
        if hip_mid.y > expected_hip_y + HIP_TOLERANCE {
            form.penalize(HIP_WEIGHT, "Don't let your hips sag down");
        }
        if hip_mid.y < expected_hip_y - HIP_TOLERANCE {
            form.penalize(HIP_WEIGHT, "Lower your hips - don't pike up");
        }

        let hand_width = joints.span(LeftWrist, RightWrist)?;
        let shoulder_width = joints.span(LeftShoulder, RightShoulder)?;
        if hand_width < shoulder_width * MIN_HAND_WIDTH_RATIO {
            form.penalize(HAND_WIDTH_WEIGHT, "Hands too close - widen your grip");
        } else if hand_width > shoulder_width * MAX_HAND_WIDTH_RATIO {
            form.penalize(HAND_WIDTH_WEIGHT, "Hands too wide - bring them closer");
        }

        let left_elbow_angle = joints.angle(LeftShoulder, LeftElbow, LeftWrist)?;
        let right_elbow_angle = joints.angle(RightShoulder, RightElbow, RightWrist)?;
        let avg_elbow_angle = (left_elbow_angle + right_elbow_angle) / 2.0;
        let phase = phase_for(avg_elbow_angle);

        let mut depth = 100.0;
        if phase == Phase::Down {
            // Hands rest on the floor, so shoulders held high sit at a smaller y.
            let hand_y = (joints.at(LeftWrist)?.y + joints.at(RightWrist)?.y) / 2.0;
            if hand_y - shoulder_mid.y > DEPTH_TOLERANCE {
                form.penalize(DEPTH_WEIGHT, "Go lower - chest should nearly touch the ground");
                depth = 60.0;
            }
        }

        let left_flare = (joints.at(LeftElbow)?.x - joints.at(LeftShoulder)?.x).abs();
        let right_flare = (joints.at(RightElbow)?.x - joints.at(RightShoulder)?.x).abs();
        if (left_flare + right_flare) / 2.0 > shoulder_width * ELBOW_FLARE_RATIO {
            form.penalize(ELBOW_FLARE_WEIGHT, "Keep elbows closer to your body");
        }

        if (joints.at(Nose)?.y - shoulder_mid.y).abs() > NECK_TOLERANCE {
            form.penalize(NECK_WEIGHT, "Keep your head in neutral position");
        }

        if let Some(prior) = prior {
            let sway = geometry::distance(&shoulder_mid, &prior.shoulder_mid);
            if sway > SWAY_TOLERANCE && phase != Phase::Transition {
                form.penalize(SWAY_WEIGHT, "Maintain stability - reduce swaying");
            }
        }

        form.metric("body_alignment", 100.0 - body_line_deviation * 500.0);
        form.metric("arm_position", ratio(hand_width, shoulder_width));
        form.metric("elbow_angle", avg_elbow_angle);
        form.metric("depth", depth);

        let state = AnalyzerState {
            ankle_mid: Some(ankle_mid),
            avg_elbow_angle: Some(avg_elbow_angle),
            ..AnalyzerState::new(shoulder_mid, hip_mid)
        };

        Ok(form.finish(&MESSAGES, phase, quality, state))
    }
}
