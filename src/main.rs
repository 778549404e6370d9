// src/main.rs
use anyhow::{bail, Context, Result};
use form_coach::{CoachConfig, CoachSession, ExerciseKind, FramePump, FrameUpdate, ReplaySource};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (exercise_name, recording, config_path) = match args.as_slice() {
        [exercise, recording] => (exercise, PathBuf::from(recording), None),
        [exercise, recording, config] => {
            (exercise, PathBuf::from(recording), Some(PathBuf::from(config)))
        }
        _ => bail!("usage: form_coach <exercise> <recording.csv> [config.json]"),
    };

    let config = CoachConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;
    let exercise = ExerciseKind::from_name(exercise_name)?;
    let source = ReplaySource::from_path(&recording, config.keypoint_layout)
        .with_context(|| format!("Failed to read recording {}", recording.display()))?;

    let (detection_tx, detection_rx) = mpsc::channel(config.pump.channel_capacity);
    let (update_tx, mut update_rx) = mpsc::channel(config.pump.channel_capacity);

    let session = CoachSession::new(exercise, &config, None);
    let pump = tokio::spawn(FramePump::new(session).run(detection_rx, update_tx));
    let feeder = tokio::spawn(async move {
        for detection in source {
            if detection_tx.send(detection).await.is_err() {
                break;
            }
        }
    });

    let mut rejected = 0usize;
    while let Some(update) = update_rx.recv().await {
        match update {
            FrameUpdate::Analyzed { outcome, .. } => {
                if let Some(rep) = outcome.repetition {
                    eprintln!("Rep {}: score {} - {}", rep.rep_count, rep.score, rep.grade.label());
                }
            }
            FrameUpdate::Rejected { .. } => rejected += 1,
        }
    }

    feeder.await?;
    let session = pump.await?;
    if rejected > 0 {
        tracing::warn!(rejected, "frames were missing required landmarks");
    }

    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}
