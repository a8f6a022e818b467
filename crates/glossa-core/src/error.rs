use thiserror::Error;

/// Top-level error type for the Glossa system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for GlossaError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GlossaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hotkey error: {0}")]
    Hotkey(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Input injection error: {0}")]
    Inject(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Input-monitoring permission denied")]
    PermissionDenied,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for GlossaError {
    fn from(err: toml::de::Error) -> Self {
        GlossaError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GlossaError {
    fn from(err: toml::ser::Error) -> Self {
        GlossaError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GlossaError {
    fn from(err: serde_json::Error) -> Self {
        GlossaError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Glossa operations.
pub type Result<T> = std::result::Result<T, GlossaError>;
