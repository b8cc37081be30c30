use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unterminated async region: end marker for action '{action_id}' not found")]
    UnterminatedRegion { action_id: String },

    #[error("invalid report name '{0}': must start with an alphanumeric and contain only alphanumerics, dots, underscores or hyphens")]
    InvalidName(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("could not replace report file '{path}': {source}")]
    Replace {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
