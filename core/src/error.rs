use crate::types::TrackId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Track '{track_id}' has a zero-duration task catalog")]
    ZeroDurationCatalog { track_id: TrackId },

    #[error("Task '{task_id}' in track '{track_id}' scaled to a non-positive duration")]
    NonPositiveDuration { track_id: TrackId, task_id: String },

    #[error("Track '{track_id}' has an unusable completion ratio: {ratio}")]
    InvalidRatio { track_id: TrackId, ratio: f64 },

    #[error("No completion ratio configured for track '{track_id}'")]
    MissingRatio { track_id: TrackId },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
