// src/quality.rs
use crate::analysis::{AnalysisResult, AnalyzerState, FormStatus, Phase};
use crate::landmarks::{BodyPart, LandmarkFrame};
use std::collections::BTreeMap;

/// Landmarks whose reliability decides whether a frame is scored at all.
pub const CRITICAL_PARTS: [BodyPart; 8] = [
    BodyPart::LeftShoulder,
    BodyPart::RightShoulder,
    BodyPart::LeftElbow,
    BodyPart::RightElbow,
    BodyPart::LeftWrist,
    BodyPart::RightWrist,
    BodyPart::LeftHip,
    BodyPart::RightHip,
];

pub const MIN_LANDMARK_CONFIDENCE: f64 = 0.5;
pub const MIN_POSE_QUALITY: f64 = 0.7;
pub const POOR_DETECTION: &str = "Poor pose detection";

/// Share of critical landmarks detected with usable confidence.
pub fn pose_quality(frame: &LandmarkFrame) -> f64 {
    let reliable = CRITICAL_PARTS
        .iter()
        .filter(|part| {
            frame
                .get(**part)
                .map_or(false, |landmark| landmark.is_confident(MIN_LANDMARK_CONFIDENCE))
        })
        .count();

    reliable as f64 / CRITICAL_PARTS.len() as f64
}

/// Returns the short-circuit result when the frame is too unreliable to score.
///
/// A missing frame (no person detected) counts as quality 0.
pub fn check(
    frame: Option<&LandmarkFrame>,
    prior: Option<&AnalyzerState>,
) -> Option<AnalysisResult> {
    let quality = frame.map_or(0.0, pose_quality);
    if quality < MIN_POSE_QUALITY {
        tracing::debug!(quality, "frame rejected by quality gate");
        Some(rejected(quality, prior))
    } else {
        None
    }
}

/// Error result for an unreliable frame; the prior analyzer state is carried over.
pub fn rejected(quality: f64, prior: Option<&AnalyzerState>) -> AnalysisResult {
    AnalysisResult {
        status: FormStatus::Error,
        message: "Please position yourself clearly in the camera".to_string(),
        details: "Ensure good lighting and full body visibility".to_string(),
        mistakes: vec![POOR_DETECTION.to_string()],
        score: 0,
        phase: Phase::Unknown,
        confidence: quality.clamp(0.0, 1.0),
        metrics: BTreeMap::new(),
        state: prior.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::landmarks::Landmark;

    fn frame_with_reliable(count: usize) -> LandmarkFrame {
        let mut frame = LandmarkFrame::new(0.8);
        for (i, part) in CRITICAL_PARTS.iter().enumerate() {
            let confidence = if i < count { 0.9 } else { 0.2 };
            frame.insert(*part, Landmark::new(i as u32, 0.5, 0.5, confidence));
        }
        frame
    }

    #[test]
    fn test_quality_counts_reliable_critical_points() {
        assert_eq!(pose_quality(&frame_with_reliable(8)), 1.0);
        assert_eq!(pose_quality(&frame_with_reliable(6)), 0.75);
        assert_eq!(pose_quality(&frame_with_reliable(0)), 0.0);
    }

    #[test]
    fn test_threshold_is_inclusive_per_point() {
        let mut frame = frame_with_reliable(8);
        frame.insert(BodyPart::LeftHip, Landmark::new(11, 0.5, 0.5, 0.5));
        assert_eq!(pose_quality(&frame), 1.0);
    }

    #[test]
    fn test_six_of_eight_passes() {
        assert!(check(Some(&frame_with_reliable(6)), None).is_none());
    }

    #[test]
    fn test_five_of_eight_short_circuits() {
        let result = check(Some(&frame_with_reliable(5)), None).expect("gate should reject");

        assert_eq!(result.status, FormStatus::Error);
        assert_eq!(result.score, 0);
        assert_eq!(result.mistakes, vec![POOR_DETECTION.to_string()]);
        assert_eq!(result.phase, Phase::Unknown);
        assert!((result.confidence - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_no_detection_is_quality_zero_and_keeps_state() {
        let prior = AnalyzerState::new(Point::new(0.4, 0.3), Point::new(0.4, 0.6));
        let result = check(None, Some(&prior)).expect("gate should reject");

        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.state, Some(prior));
    }
}
