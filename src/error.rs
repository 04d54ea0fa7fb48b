//! Error handling module for the image mirror
//!
//! Errors are split into two classes. Soft errors (`Inspect`, `PlatformSync`) are
//! absorbed where they happen: the affected image or platform entry is skipped and the
//! run continues. Every other variant is fatal and travels up to `main`, which is the
//! only place the process terminates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Manifest inspect failed for {reference}: {message}")]
    Inspect { reference: String, message: String },

    #[error("Manifest list for {reference} could not be parsed: {message}")]
    ManifestParse { reference: String, message: String },

    #[error("Sync of {reference} ({platform}) failed: {message}")]
    PlatformSync {
        reference: String,
        platform: String,
        message: String,
    },

    #[error("Manifest list assembly failed for {list}: {message}")]
    Assembly { list: String, message: String },

    #[error("No image was mirrored successfully, nothing to restore")]
    EmptyResult,

    #[error("Command error: {0}")]
    Command(String),

    #[error("Mirror task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MirrorError {
    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MirrorError::Inspect { .. } | MirrorError::PlatformSync { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
