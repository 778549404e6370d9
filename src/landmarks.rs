// src/landmarks.rs
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// A single detected anatomical point, normalized to the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl Landmark {
    pub fn new(id: u32, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            id,
            x,
            y,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// Anatomical roles the analyzers reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    pub const COUNT: usize = 13;

    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Nose,
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

    fn slot(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftShoulder => "left_shoulder",
            BodyPart::RightShoulder => "right_shoulder",
            BodyPart::LeftElbow => "left_elbow",
            BodyPart::RightElbow => "right_elbow",
            BodyPart::LeftWrist => "left_wrist",
            BodyPart::RightWrist => "right_wrist",
            BodyPart::LeftHip => "left_hip",
            BodyPart::RightHip => "right_hip",
            BodyPart::LeftKnee => "left_knee",
            BodyPart::RightKnee => "right_knee",
            BodyPart::LeftAnkle => "left_ankle",
            BodyPart::RightAnkle => "right_ankle",
        }
    }
}

/// Keypoint numbering used by the upstream detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointLayout {
    /// 17-point COCO ordering (PoseNet, MoveNet).
    #[default]
    Coco17,
    /// 33-point MediaPipe Pose ordering.
    MediaPipe33,
}

impl KeypointLayout {
    pub fn id_for(self, part: BodyPart) -> u32 {
        match self {
            KeypointLayout::Coco17 => match part {
                BodyPart::Nose => 0,
                BodyPart::LeftShoulder => 5,
                BodyPart::RightShoulder => 6,
                BodyPart::LeftElbow => 7,
                BodyPart::RightElbow => 8,
                BodyPart::LeftWrist => 9,
                BodyPart::RightWrist => 10,
                BodyPart::LeftHip => 11,
                BodyPart::RightHip => 12,
                BodyPart::LeftKnee => 13,
                BodyPart::RightKnee => 14,
                BodyPart::LeftAnkle => 15,
                BodyPart::RightAnkle => 16,
            },
            KeypointLayout::MediaPipe33 => match part {
                BodyPart::Nose => 0,
                BodyPart::LeftShoulder => 11,
                BodyPart::RightShoulder => 12,
                BodyPart::LeftElbow => 13,
                BodyPart::RightElbow => 14,
                BodyPart::LeftWrist => 15,
                BodyPart::RightWrist => 16,
                BodyPart::LeftHip => 23,
                BodyPart::RightHip => 24,
                BodyPart::LeftKnee => 25,
                BodyPart::RightKnee => 26,
                BodyPart::LeftAnkle => 27,
                BodyPart::RightAnkle => 28,
            },
        }
    }

    pub fn part_for(self, id: u32) -> Option<BodyPart> {
        BodyPart::ALL
            .iter()
            .copied()
            .find(|part| self.id_for(*part) == id)
    }
}

/// One instant of detector output, indexed by anatomical role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    landmarks: [Option<Landmark>; BodyPart::COUNT],
    pub frame_confidence: f64,
}

impl LandmarkFrame {
    pub fn new(frame_confidence: f64) -> Self {
        Self {
            landmarks: [None; BodyPart::COUNT],
            frame_confidence: frame_confidence.clamp(0.0, 1.0),
        }
    }

    /// Builds a frame from raw detector keypoints.
    ///
    /// Ids the layout does not know are dropped. Without an explicit frame
    /// confidence the mean keypoint confidence is used.
    pub fn from_keypoints(
        layout: KeypointLayout,
        keypoints: &[Landmark],
        frame_confidence: Option<f64>,
    ) -> Self {
        let frame_confidence = frame_confidence.unwrap_or_else(|| {
            if keypoints.is_empty() {
                0.0
            } else {
                keypoints.iter().map(|k| k.confidence).sum::<f64>() / keypoints.len() as f64
            }
        });

        let mut frame = Self::new(frame_confidence);
        for keypoint in keypoints {
            if let Some(part) = layout.part_for(keypoint.id) {
                frame.insert(part, *keypoint);
            }
        }
        frame
    }

    pub fn insert(&mut self, part: BodyPart, landmark: Landmark) {
        self.landmarks[part.slot()] = Some(landmark);
    }

    pub fn with(mut self, part: BodyPart, landmark: Landmark) -> Self {
        self.insert(part, landmark);
        self
    }

    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks[part.slot()].as_ref()
    }

    pub fn point(&self, part: BodyPart) -> Option<Point> {
        self.get(part).map(Landmark::position)
    }

    pub fn missing_parts(&self, parts: &[BodyPart]) -> Vec<BodyPart> {
        parts
            .iter()
            .copied()
            .filter(|part| self.get(*part).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.landmarks.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_round_trip_every_part() {
        for layout in [KeypointLayout::Coco17, KeypointLayout::MediaPipe33] {
            for part in BodyPart::ALL {
                assert_eq!(layout.part_for(layout.id_for(part)), Some(part));
            }
        }
    }

    #[test]
    fn test_from_keypoints_maps_ids_and_skips_unknown() {
        let keypoints = vec![
            Landmark::new(0, 0.5, 0.1, 0.9),
            Landmark::new(1, 0.4, 0.1, 0.9), // left eye, not tracked
            Landmark::new(5, 0.4, 0.3, 0.6),
        ];
        let frame = LandmarkFrame::from_keypoints(KeypointLayout::Coco17, &keypoints, None);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get(BodyPart::LeftShoulder).map(|l| l.id), Some(5));
        assert!((frame.frame_confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_media_pipe_ids() {
        let keypoints = vec![Landmark::new(23, 0.4, 0.6, 0.9)];
        let frame = LandmarkFrame::from_keypoints(KeypointLayout::MediaPipe33, &keypoints, Some(0.7));

        assert!(frame.get(BodyPart::LeftHip).is_some());
        assert_eq!(frame.frame_confidence, 0.7);
    }

    #[test]
    fn test_missing_parts_lists_absent_roles() {
        let frame = LandmarkFrame::new(1.0).with(BodyPart::Nose, Landmark::new(0, 0.5, 0.1, 1.0));
        let missing = frame.missing_parts(&[BodyPart::Nose, BodyPart::LeftKnee, BodyPart::RightKnee]);
        assert_eq!(missing, vec![BodyPart::LeftKnee, BodyPart::RightKnee]);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let landmark = Landmark::new(0, 0.1, 0.1, 1.7);
        assert_eq!(landmark.confidence, 1.0);
        assert!(landmark.is_confident(0.5));
    }
}
