// src/pump.rs
use crate::config::PumpConfig;
use crate::landmarks::LandmarkFrame;
use crate::session::{CoachSession, FrameOutcome};
use image::DynamicImage;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Upstream pose model. `Ok(None)` means nobody was found in the image.
pub trait PoseDetector: Send + 'static {
    fn detect_frame(&mut self, image: &DynamicImage) -> anyhow::Result<Option<LandmarkFrame>>;
}

/// Runs the detector on a blocking thread, one image at a time.
///
/// Detector failures are logged and delivered as "no detection" so the
/// analysis side sees the same frame cadence as the camera.
pub fn spawn_detection<D: PoseDetector>(
    mut detector: D,
    mut images: mpsc::Receiver<DynamicImage>,
    config: &PumpConfig,
) -> (mpsc::Receiver<Option<LandmarkFrame>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity);

    let handle = tokio::task::spawn_blocking(move || {
        while let Some(image) = images.blocking_recv() {
            let detection = match detector.detect_frame(&image) {
                Ok(detection) => detection,
                Err(e) => {
                    warn!("Pose detection failed: {:#}", e);
                    None
                }
            };
            if tx.blocking_send(detection).is_err() {
                debug!("detection receiver dropped");
                break;
            }
        }
    });

    (rx, handle)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameUpdate {
    Analyzed { frame: u64, outcome: FrameOutcome },
    Rejected { frame: u64, reason: String },
}

/// Feeds detections through one session strictly in arrival order.
pub struct FramePump {
    session: CoachSession,
    frames: u64,
}

impl FramePump {
    pub fn new(session: CoachSession) -> Self {
        Self { session, frames: 0 }
    }

    /// Consumes detections until the sender closes or nobody listens for
    /// updates, then hands the session back.
    pub async fn run(
        mut self,
        mut detections: mpsc::Receiver<Option<LandmarkFrame>>,
        updates: mpsc::Sender<FrameUpdate>,
    ) -> CoachSession {
        while let Some(detection) = detections.recv().await {
            let frame = self.frames;
            self.frames += 1;

            let update = match self.session.process(detection.as_ref()) {
                Ok(outcome) => FrameUpdate::Analyzed { frame, outcome },
                Err(e) => {
                    warn!(frame, error = %e, "frame rejected");
                    FrameUpdate::Rejected {
                        frame,
                        reason: e.to_string(),
                    }
                }
            };

            if updates.send(update).await.is_err() {
                debug!("update receiver dropped");
                break;
            }
        }

        debug!(frames = self.frames, "frame pump finished");
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FormStatus;
    use crate::analyzers::fixtures::plank;
    use crate::config::CoachConfig;
    use crate::exercise::ExerciseKind;
    use std::collections::VecDeque;

    struct ScriptedDetector {
        script: VecDeque<anyhow::Result<Option<LandmarkFrame>>>,
    }

    impl PoseDetector for ScriptedDetector {
        fn detect_frame(&mut self, _image: &DynamicImage) -> anyhow::Result<Option<LandmarkFrame>> {
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    fn push_up_session() -> CoachSession {
        CoachSession::new(ExerciseKind::PushUp, &CoachConfig::default(), None)
    }

    async fn collect(mut rx: mpsc::Receiver<FrameUpdate>) -> Vec<FrameUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_detector_errors_become_missing_detections() {
        let detector = ScriptedDetector {
            script: VecDeque::from(vec![
                Ok(Some(plank(170.0).build())),
                Ok(Some(plank(80.0).build())),
                Err(anyhow::anyhow!("inference backend unavailable")),
                Ok(Some(plank(170.0).build())),
            ]),
        };

        let (image_tx, image_rx) = mpsc::channel(8);
        let (detections, detector_task) = spawn_detection(detector, image_rx, &PumpConfig::default());
        let (update_tx, update_rx) = mpsc::channel(8);
        let pump = tokio::spawn(FramePump::new(push_up_session()).run(detections, update_tx));

        for _ in 0..4 {
            image_tx.send(DynamicImage::new_rgb8(4, 4)).await.unwrap();
        }
        drop(image_tx);

        let updates = collect(update_rx).await;
        let session = pump.await.unwrap();
        detector_task.await.unwrap();

        assert_eq!(updates.len(), 4);
        match &updates[2] {
            FrameUpdate::Analyzed { frame, outcome } => {
                assert_eq!(*frame, 2);
                assert_eq!(outcome.result.status, FormStatus::Error);
                assert_eq!(outcome.result.score, 0);
            }
            other => panic!("unexpected update {other:?}"),
        }
        match &updates[3] {
            FrameUpdate::Analyzed { outcome, .. } => {
                assert_eq!(outcome.repetition.map(|r| r.rep_count), Some(1))
            }
            other => panic!("unexpected update {other:?}"),
        }
        assert_eq!(session.counter().rep_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_stop_the_pump() {
        let (tx, rx) = mpsc::channel(4);
        let (update_tx, update_rx) = mpsc::channel(4);
        let pump = tokio::spawn(FramePump::new(push_up_session()).run(rx, update_tx));

        tx.send(Some(LandmarkFrame::new(0.9))).await.unwrap();
        tx.send(Some(plank(170.0).build())).await.unwrap();
        drop(tx);

        let updates = collect(update_rx).await;
        let session = pump.await.unwrap();

        assert!(matches!(updates[0], FrameUpdate::Rejected { frame: 0, .. }));
        assert!(matches!(updates[1], FrameUpdate::Analyzed { frame: 1, .. }));
        assert_eq!(session.summary().frames_processed, 1);
    }

    #[tokio::test]
    async fn test_pump_stops_when_updates_are_dropped() {
        let (tx, rx) = mpsc::channel(4);
        let (update_tx, update_rx) = mpsc::channel(1);
        drop(update_rx);

        tx.send(None).await.unwrap();
        tx.send(None).await.unwrap();
        let session = FramePump::new(push_up_session()).run(rx, update_tx).await;

        assert_eq!(session.summary().frames_processed, 1);
    }
}
