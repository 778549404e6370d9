// src/analyzers/hinge.rs
use super::Joints;
use crate::analysis::{AnalysisResult, AnalyzerState, FormScore, Messages, Phase};
use crate::error::Result;
use crate::exercise::{ExerciseAnalyzer, ExerciseKind};
use crate::geometry::{self, ratio};
use crate::landmarks::{BodyPart, LandmarkFrame};

/// Below this nose-shoulder-hip angle the back is rounded enough to stop the lift.
pub const ROUNDED_SPINE_ANGLE: f64 = 160.0;
pub const ROUNDED_SPINE_WEIGHT: i32 = 35;
pub const NEUTRAL_SPINE_ANGLE: f64 = 170.0;
pub const SLIGHT_ROUNDING_WEIGHT: i32 = 20;

pub const EXPECTED_TORSO_LENGTH: f64 = 0.3;
pub const MIN_TORSO_RATIO: f64 = 0.8;
pub const HIP_HINGE_WEIGHT: i32 = 25;

pub const MIN_HIP_SETBACK: f64 = 0.05;
pub const HIP_SETBACK_WEIGHT: i32 = 20;

pub const KNEE_DRIFT_TOLERANCE: f64 = 0.1;
pub const KNEE_DRIFT_WEIGHT: i32 = 15;

pub const LOAD_DRIFT_TOLERANCE: f64 = 0.15;
pub const LOAD_DRIFT_WEIGHT: i32 = 10;

const MESSAGES: Messages = Messages {
    perfect: "Perfect Deadlift Form!",
    excellent: "Excellent Deadlift!",
    good: "Good deadlift technique",
    warning: "Check your form",
    error: "STOP - Poor deadlift form",
    clean: "Perfect deadlift technique!",
};

const REQUIRED: [BodyPart; BodyPart::COUNT] = BodyPart::ALL;

pub struct HingeAnalyzer;

impl ExerciseAnalyzer for HingeAnalyzer {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::HingeLift
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

        let shoulder_mid = joints.mid(LeftShoulder, RightShoulder)?;
        let hip_mid = joints.mid(LeftHip, RightHip)?;
        let knee_mid = joints.mid(LeftKnee, RightKnee)?;
        let ankle_mid = joints.mid(LeftAnkle, RightAnkle)?;

        // Most severe first so the rounding warning leads the list.
        let spine_angle = geometry::angle_degrees(&joints.at(Nose)?, &shoulder_mid, &hip_mid);
        if spine_angle < ROUNDED_SPINE_ANGLE {
            form.penalize(ROUNDED_SPINE_WEIGHT, "CRITICAL: Keep your back straight - avoid rounding");
            form.force_error();
        } else if spine_angle < NEUTRAL_SPINE_ANGLE {
            form.penalize(SLIGHT_ROUNDING_WEIGHT, "Maintain neutral spine - slight rounding detected");
        }

        let torso_length = geometry::distance(&hip_mid, &shoulder_mid);
        if torso_length < EXPECTED_TORSO_LENGTH * MIN_TORSO_RATIO {
            form.penalize(HIP_HINGE_WEIGHT, "Push your hips back more - emphasize hip hinge");
        }

        if (hip_mid.x - ankle_mid.x).abs() < MIN_HIP_SETBACK {
            form.penalize(HIP_SETBACK_WEIGHT, "Hips should move back, not straight down");
        }

        if knee_mid.x > ankle_mid.x + KNEE_DRIFT_TOLERANCE {
            form.penalize(KNEE_DRIFT_WEIGHT, "Don't let knees drift forward - sit back more");
        }

        if (shoulder_mid.x - ankle_mid.x).abs() > LOAD_DRIFT_TOLERANCE {
            form.penalize(LOAD_DRIFT_WEIGHT, "Keep the weight close to your body");
        }

        form.metric("spine_angle", spine_angle);
        form.metric("back_neutrality", (100.0 - (180.0 - spine_angle) * 5.0).max(0.0));
        form.metric("hip_hinge", ratio(torso_length, EXPECTED_TORSO_LENGTH) * 100.0);
        form.metric(
            "knee_position",
            (100.0 - (knee_mid.x - ankle_mid.x).abs() * 500.0).max(0.0),
        );

        let state = AnalyzerState {
            knee_mid: Some(knee_mid),
            ankle_mid: Some(ankle_mid),
            ..AnalyzerState::new(shoulder_mid, hip_mid)
        };

        Ok(form.finish(&MESSAGES, Phase::Lifting, quality, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FormStatus;
    use crate::analyzers::fixtures::FrameBuilder;

    const SHOULDER: (f64, f64) = (0.62, 0.38);
    const HIP: (f64, f64) = (0.40, 0.55);

    // Head placed so nose-shoulder-hip forms `angle` degrees.
    fn head_at(angle: f64) -> (f64, f64) {
        let toward_hip = (HIP.1 - SHOULDER.1).atan2(HIP.0 - SHOULDER.0);
        let direction = toward_hip - angle.to_radians();
        (SHOULDER.0 + 0.1 * direction.cos(), SHOULDER.1 + 0.1 * direction.sin())
    }

    // Side view facing +x, hips pushed back behind the feet.
    fn hinge(spine_angle: f64) -> FrameBuilder {
        FrameBuilder::new()
            .at(BodyPart::Nose, head_at(spine_angle))
            .at(BodyPart::LeftShoulder, (SHOULDER.0 - 0.01, SHOULDER.1))
            .at(BodyPart::RightShoulder, (SHOULDER.0 + 0.01, SHOULDER.1))
            .at(BodyPart::LeftElbow, (0.61, 0.52))
            .at(BodyPart::RightElbow, (0.63, 0.52))
            .at(BodyPart::LeftWrist, (0.60, 0.66))
            .at(BodyPart::RightWrist, (0.62, 0.66))
            .at(BodyPart::LeftHip, (HIP.0 - 0.01, HIP.1))
            .at(BodyPart::RightHip, (HIP.0 + 0.01, HIP.1))
            .at(BodyPart::LeftKnee, (0.54, 0.72))
            .at(BodyPart::RightKnee, (0.56, 0.72))
            .at(BodyPart::LeftAnkle, (0.49, 0.90))
            .at(BodyPart::RightAnkle, (0.51, 0.90))
    }

    #[test]
    fn test_clean_hinge() {
        let result = HingeAnalyzer.analyze(&hinge(178.0).build(), None).unwrap();

        assert_eq!(result.phase, Phase::Lifting);
        assert_eq!(result.score, 100);
        assert!(result.mistakes.is_empty());
        assert!((result.metric("spine_angle").unwrap() - 178.0).abs() < 1e-6);
    }

    #[test]
    fn test_rounded_back_is_critical() {
        let result = HingeAnalyzer.analyze(&hinge(150.0).build(), None).unwrap();

        assert!(result.score <= 65);
        assert_eq!(result.status, FormStatus::Error);
        assert!(result.mistakes[0].starts_with("CRITICAL"));
    }

    #[test]
    fn test_slight_rounding_is_not_forced_to_error() {
        let result = HingeAnalyzer.analyze(&hinge(165.0).build(), None).unwrap();

        assert_eq!(result.score, 80);
        assert_eq!(result.status, FormStatus::Good);
        assert_eq!(
            result.mistakes,
            vec!["Maintain neutral spine - slight rounding detected".to_string()]
        );
    }

    #[test]
    fn test_short_torso_means_too_little_hinge() {
        // Hips slid up the same torso line, so the spine angle is unchanged.
        let frame = hinge(178.0)
            .at(BodyPart::LeftHip, (0.434, 0.516))
            .at(BodyPart::RightHip, (0.454, 0.516))
            .build();
        let result = HingeAnalyzer.analyze(&frame, None).unwrap();

        assert_eq!(
            result.mistakes,
            vec!["Push your hips back more - emphasize hip hinge".to_string()]
        );
        assert_eq!(result.score, 75);
    }

    #[test]
    fn test_load_drifting_from_the_feet() {
        let frame = hinge(178.0)
            .at(BodyPart::LeftAnkle, (0.45, 0.90))
            .at(BodyPart::RightAnkle, (0.47, 0.90))
            .build();
        let result = HingeAnalyzer.analyze(&frame, None).unwrap();

        assert_eq!(result.mistakes, vec!["Keep the weight close to your body".to_string()]);
        assert_eq!(result.score, 90);
        assert_eq!(result.status, FormStatus::Excellent);
    }

    #[test]
    fn test_squatting_the_lift() {
        let frame = hinge(178.0)
            .at(BodyPart::LeftHip, (0.49, 0.62))
            .at(BodyPart::RightHip, (0.51, 0.62))
            .at(BodyPart::LeftKnee, (0.64, 0.72))
            .at(BodyPart::RightKnee, (0.66, 0.72))
            .build();
        let result = HingeAnalyzer.analyze(&frame, None).unwrap();

        assert!(result.mistakes.contains(&"Hips should move back, not straight down".to_string()));
        assert!(result
            .mistakes
            .contains(&"Don't let knees drift forward - sit back more".to_string()));
    }

    #[test]
    fn test_prior_state_is_ignored() {
        let frame = hinge(178.0).build();
        let fresh = HingeAnalyzer.analyze(&frame, None).unwrap();
        let carried = HingeAnalyzer.analyze(&frame, fresh.state.as_ref()).unwrap();

        assert_eq!(fresh, carried);
    }
}
