use thiserror::Error;

/// Failures surfaced to the page through the RPC bridge.
///
/// Missing model files never show up here: they are recovered with fallback
/// geometry inside the loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("a scene is already active")]
    AlreadyActive,
    #[error("no active scene")]
    NoActiveScene,
    #[error("operation already in progress: {0}")]
    OperationPending(&'static str),
    #[error("operation cancelled by dispose")]
    Cancelled,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SceneError {
    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            SceneError::SurfaceUnavailable(_) => -32001,
            SceneError::AlreadyActive => -32002,
            SceneError::NoActiveScene => -32003,
            SceneError::OperationPending(_) => -32004,
            SceneError::Cancelled => -32005,
            SceneError::InvalidInput(_) => -32602,
        }
    }
}
