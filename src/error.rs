use thiserror::Error;

/// Failure reported by a scanner or matcher collaborator.
///
/// `code` is the vendor status code; `0` is reserved for "ok" by every SDK
/// we have seen, so collaborators never report it as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {code})")]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why a capture-and-extract sequence produced no template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureFailure {
    /// No scanner was attached at startup, or the session has been shut down.
    #[error("no scanner attached")]
    NoDevice,

    #[error("image capture failed: {0}")]
    DeviceCapture(DriverError),

    #[error("reading the image buffer failed: {0}")]
    BufferRead(DriverError),

    #[error("template extraction failed: {0}")]
    Extraction(String),
}

impl CaptureFailure {
    /// Stable short name of the failing stage, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            CaptureFailure::NoDevice => "enumerate",
            CaptureFailure::DeviceCapture(_) => "capture",
            CaptureFailure::BufferRead(_) => "buffer_read",
            CaptureFailure::Extraction(_) => "extract",
        }
    }
}

/// Why two templates could not be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("engine error {0}")]
    EngineError(i32),
}
