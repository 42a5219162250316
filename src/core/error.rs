//! Custom error types for the application.
//!
//! Provides structured error handling for each domain:
//!
//! - [`EngineError`] - Failures reported by the emulation engine's filesystem and write primitives
//! - [`ArchiveError`] - Archive container, I/O, destination and settings snapshot errors
//! - [`SettingsError`] - Persisted settings store operations

use thiserror::Error;

/// Engine filesystem and write-primitive errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Path does not exist in the virtual filesystem
    #[error("no such file or directory: {0}")]
    NotFound(String),
    /// Directory listing failed
    #[error("failed to list {path}: {message}")]
    ListFailed { path: String, message: String },
    /// Reading a file failed
    #[error("failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },
    /// Writing or uploading a file failed
    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
    /// Unlinking a file failed
    #[error("failed to remove {path}: {message}")]
    RemoveFailed { path: String, message: String },
    /// Engine module is not loaded or lacks a primitive
    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Settings store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Persisted store not available.
    #[error("settings storage not available")]
    StorageUnavailable,
    /// Failed to persist a key.
    #[error("failed to save setting {0}")]
    SaveFailed(String),
}

/// Archive interchange errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The destination rejected a chunk of archive bytes
    #[error("failed to write archive: {0}")]
    Sink(String),
}
