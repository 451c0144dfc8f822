use thiserror::Error;

/// Failures that can surface before or around a decision run.
///
/// Workflow faults (lookup miss, sensor timeout, hardware fault) never appear
/// here: they are handled inside the workflow and reported through the
/// decision record.
#[derive(Debug, Error)]
pub enum IrrigatorError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid profile for field #{field_id}: {reason}")]
    InvalidProfile { field_id: u32, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
