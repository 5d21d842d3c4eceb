use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathCostError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Missing configuration: {0} is required but not set")]
    MissingConfiguration(&'static str),
    #[error("No elevation data at row {row}, col {col}")]
    NoData { row: usize, col: usize },
    #[error("Landform classification cancelled")]
    Cancelled,
    #[error("Unsupported configuration version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PathCostError>;

impl PathCostError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
