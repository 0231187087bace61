//! Error types for kview.

use thiserror::Error;

/// Failures that disable a single viewport or feature.
///
/// None of these are fatal to the application as a whole: the renderer logs
/// them and carries on with whatever still works.
#[derive(Error, Debug)]
pub enum ViewError {
    /// A front end could not find the element backing a viewport.
    #[error("viewport '{0}' is missing")]
    MissingViewport(String),

    /// The render target for a viewport could not be created.
    #[error("rendering context unavailable for viewport '{view}': {reason}")]
    ContextUnavailable { view: String, reason: String },

    /// A shading program rejected its parameters.
    #[error("{program} program failed to compile: {log}")]
    ShaderCompile { program: &'static str, log: String },

    /// Writing to the clipboard failed.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    /// A numeric field held something that is not a finite number.
    #[error("invalid value '{input}' for {control}")]
    InvalidInput { control: &'static str, input: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for kview operations.
pub type Result<T> = std::result::Result<T, ViewError>;
