//! Error types for the conversion pipeline

use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can occur while interpreting raw message bytes
#[derive(Error, Debug)]
pub enum ParseError {
    /// No bytes were supplied
    #[error("Message is empty")]
    Empty,

    /// Failed to parse the email structure
    #[error("Failed to parse email structure: {0}")]
    Structure(String),
}

/// Errors raised by the rendering engine boundary
#[derive(Error, Debug)]
pub enum RenderError {
    /// Engine binary missing or misconfigured (detected at startup)
    #[error("Rendering engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Engine process could not be started or fed
    #[error("Failed to run rendering engine: {0}")]
    Spawn(#[from] std::io::Error),

    /// Engine ran but did not produce a document
    #[error("Rendering engine failed ({status}): {stderr}")]
    EngineFailed { status: ExitStatus, stderr: String },

    /// Engine output is not a PDF byte stream
    #[error("Rendering engine produced invalid output: {0}")]
    InvalidOutput(String),

    /// Engine was still running at the deadline and has been killed
    #[error("Rendering engine did not finish before the deadline")]
    TimedOut,
}

/// Errors from the end-to-end conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for message parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;
