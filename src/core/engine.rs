//! Ports onto the emulation engine and the settings store.
//!
//! The engine is an opaque module owning a single virtual filesystem. Its
//! filesystem calls are synchronous; its per-category write entry points
//! complete asynchronously so the engine can buffer internally. The core
//! only talks to the engine through these traits, which keeps it testable
//! against an in-memory fake.

#![allow(async_fn_in_trait)]

use std::collections::BTreeMap;

use super::error::{EngineError, SettingsError};
use crate::models::NamedFile;

// =============================================================================
// Filesystem Ports
// =============================================================================

/// Directory listing and node-mode lookup.
pub trait DirectoryLister {
    /// Raw directory entry names, including any `.`/`..` pseudo-entries.
    fn list_dir(&self, path: &str) -> Result<Vec<String>, EngineError>;

    /// Whether `path` is a directory.
    fn is_dir(&self, path: &str) -> Result<bool, EngineError>;
}

/// File content and metadata reads.
pub trait FileReader {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, EngineError>;

    /// Modification time in milliseconds since the Unix epoch.
    fn modified_time(&self, path: &str) -> Result<u64, EngineError>;
}

pub trait FileRemover {
    fn unlink(&self, path: &str) -> Result<(), EngineError>;
}

// =============================================================================
// Write Ports
// =============================================================================

/// Per-category write entry points.
///
/// Every upload stores the file under the engine's mount for that category,
/// overwriting any file with the same name.
pub trait EngineWriter {
    /// Directory of the autosave mount.
    fn autosave_dir(&self) -> String;

    async fn upload_rom(&self, file: NamedFile) -> Result<(), EngineError>;

    /// Battery saves and slot-indexed save states share one entry point.
    async fn upload_save(&self, file: NamedFile) -> Result<(), EngineError>;

    async fn upload_cheats(&self, file: NamedFile) -> Result<(), EngineError>;

    async fn upload_patch(&self, file: NamedFile) -> Result<(), EngineError>;

    async fn upload_screenshot(&self, file: NamedFile) -> Result<(), EngineError>;

    /// Raw write of an autosave state to `path`, bypassing the save pipeline.
    async fn write_autosave(&self, path: &str, bytes: Vec<u8>) -> Result<(), EngineError>;
}

/// Save state snapshots of the running program.
pub trait SaveStateEngine {
    fn save_state(&self, slot: u32) -> bool;
    fn load_state(&self, slot: u32) -> bool;
}

// =============================================================================
// Settings Repository
// =============================================================================

/// Persisted key/value settings of the application.
pub trait SettingsRepository {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Every persisted entry.
    fn get_all(&self) -> BTreeMap<String, String>;

    /// Overwrite the given keys; keys not in `entries` are left untouched.
    fn set_all(&self, entries: &BTreeMap<String, String>) -> Result<(), SettingsError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}
