// src/replay.rs
use crate::error::{CoachError, Result};
use crate::landmarks::{KeypointLayout, Landmark, LandmarkFrame};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One keypoint row of a long-format recording.
#[derive(Debug, Deserialize)]
struct KeypointRecord {
    frame: u64,
    keypoint: u32,
    x: f64,
    y: f64,
    score: f64,
}

/// Recorded detections played back in frame order.
///
/// Frame indices with no rows between the first and last recorded frame are
/// yielded as `None`, the same as a live detector that saw nobody. Gaps are
/// produced on demand, so sparse recordings with far-apart indices stay small.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: BTreeMap<u64, LandmarkFrame>,
    next: u64,
    last: u64,
    finished: bool,
}

impl ReplaySource {
    pub fn from_path<P: AsRef<Path>>(path: P, layout: KeypointLayout) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opening recording");
        Self::from_reader(file, layout)
    }

    pub fn from_reader<R: Read>(reader: R, layout: KeypointLayout) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut grouped: BTreeMap<u64, Vec<Landmark>> = BTreeMap::new();

        for (row, record) in reader.deserialize::<KeypointRecord>().enumerate() {
            let record = record?;
            if !(record.x.is_finite() && record.y.is_finite() && record.score.is_finite()) {
                return Err(CoachError::Replay(format!(
                    "row {} (frame {}) has a non-finite value",
                    row + 1,
                    record.frame
                )));
            }
            grouped
                .entry(record.frame)
                .or_default()
                .push(Landmark::new(record.keypoint, record.x, record.y, record.score));
        }

        let (first, last) = match (grouped.keys().next(), grouped.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(CoachError::Replay("recording contains no keypoints".into())),
        };

        let frames: BTreeMap<u64, LandmarkFrame> = grouped
            .into_iter()
            .map(|(index, keypoints)| {
                (index, LandmarkFrame::from_keypoints(layout, &keypoints, None))
            })
            .collect();
        debug!(recorded = frames.len(), first, last, "recording loaded");

        Ok(Self {
            frames,
            next: first,
            last,
            finished: false,
        })
    }
}

impl Iterator for ReplaySource {
    type Item = Option<LandmarkFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let index = self.next;
        if index == self.last {
            self.finished = true;
        } else {
            self.next += 1;
        }
        Some(self.frames.remove(&index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        match usize::try_from(self.last - self.next)
            .ok()
            .and_then(|n| n.checked_add(1))
        {
            Some(remaining) => (remaining, Some(remaining)),
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::BodyPart;

    const RECORDING: &str = "\
frame,keypoint,x,y,score
3,5,0.40,0.50,0.9
3,6,0.50,0.50,0.8
3,99,0.10,0.10,0.9
5,11,0.70,0.50,0.6
";

    #[test]
    fn test_gaps_become_missing_detections() {
        let frames: Vec<_> = ReplaySource::from_reader(RECORDING.as_bytes(), KeypointLayout::Coco17)
            .unwrap()
            .collect();

        assert_eq!(frames.len(), 3);
        assert!(frames[1].is_none());

        let first = frames[0].as_ref().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.point(BodyPart::RightShoulder).unwrap().x, 0.50);
        assert!((first.frame_confidence - (0.9 + 0.8 + 0.9) / 3.0).abs() < 1e-9);

        let last = frames[2].as_ref().unwrap();
        assert!(last.get(BodyPart::LeftHip).is_some());
    }

    #[test]
    fn test_distant_frame_indices_are_walked_lazily() {
        let data = "frame,keypoint,x,y,score\n0,5,0.40,0.50,0.9\n10000000000,5,0.40,0.50,0.9\n";
        let mut source = ReplaySource::from_reader(data.as_bytes(), KeypointLayout::Coco17).unwrap();

        assert_eq!(source.size_hint().1, usize::try_from(10_000_000_001u64).ok());
        assert!(source.next().flatten().is_some());
        assert!(source.next().unwrap().is_none());
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_source_ends_after_last_frame() {
        let mut source = ReplaySource::from_reader(RECORDING.as_bytes(), KeypointLayout::Coco17).unwrap();

        assert_eq!(source.size_hint(), (3, Some(3)));
        assert_eq!(source.by_ref().count(), 3);
        assert_eq!(source.size_hint(), (0, Some(0)));
        assert!(source.next().is_none());
    }

    #[test]
    fn test_layout_changes_role_mapping() {
        let mut source = ReplaySource::from_reader(RECORDING.as_bytes(), KeypointLayout::MediaPipe33).unwrap();
        let first = source.next().flatten().unwrap();

        // MediaPipe ids 5 and 6 are face points.
        assert!(first.is_empty());
    }

    #[test]
    fn test_empty_recording_is_an_error() {
        let result = ReplaySource::from_reader("frame,keypoint,x,y,score\n".as_bytes(), KeypointLayout::Coco17);
        assert!(matches!(result, Err(CoachError::Replay(_))));
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let data = "frame,keypoint,x,y,score\n0,5,abc,0.5,0.9\n";
        let result = ReplaySource::from_reader(data.as_bytes(), KeypointLayout::Coco17);
        assert!(matches!(result, Err(CoachError::Csv(_))));
    }
}
