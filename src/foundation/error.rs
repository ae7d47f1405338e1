/// Crate-wide result alias.
pub type StageResult<T> = Result<T, StageError>;

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external generation pipeline failed.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Frame plan execution failed.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(String),

    /// IO or decode failure with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    /// Build a [`StageError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StageError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StageError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure of the external creation call or of turning its artifact into pixels.
///
/// Caught at the orchestrator boundary; the affected sprite is removed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider reported a failure.
    #[error("provider failed: {0}")]
    Service(String),
    /// The provider answered without any usable artifact.
    #[error("provider returned no artifact")]
    NoArtifact,
    /// The artifact bytes could not be decoded as an image.
    #[error("artifact could not be decoded: {0}")]
    Decode(String),
    /// An inline artifact was not a valid base64 data URL.
    #[error("malformed data url: {0}")]
    DataUrl(String),
}

impl GenerationError {
    /// Build a [`GenerationError::Service`].
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }
}

/// Failure of the remix-suggestion call. Never fatal.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("remix suggestions unavailable: {0}")]
pub struct SuggestionError(pub String);

impl SuggestionError {
    /// Build a suggestion error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Pixel-level access to a decoded raster was not possible.
///
/// Recovered inside the matting engine; callers only see it through logs.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MattingFailure {
    /// The raster has no pixels.
    #[error("raster is empty ({width}x{height})")]
    Empty {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// The pixel buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize {
        /// Expected byte count (`width * height * 4`).
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
