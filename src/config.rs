//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name used in log prefixes.
pub const APP_NAME: &str = "gbaweb";

// =============================================================================
// Filesystem Configuration
// =============================================================================

/// Directory self/parent pseudo-entries returned by the engine's `readdir`.
pub const FS_IGNORE_PATHS: &[&str] = &[".", ".."];

/// Default engine mount layout.
pub mod mounts {
    /// Shared data root for every per-category mount.
    pub const ROOT: &str = "/data";
    /// Separate mount holding autosave states.
    pub const AUTOSAVE: &str = "/autosave";
}

// =============================================================================
// Archive Configuration
// =============================================================================

/// Archive import/export settings.
pub mod archive {
    /// Reserved entry holding the settings snapshot.
    pub const SETTINGS_ENTRY: &str = "local-storage.json";
    /// Default file name prefix for exported archives.
    pub const EXPORT_PREFIX: &str = "gbajs-files";
    /// Deflate compression level for every entry.
    pub const COMPRESSION_LEVEL: i64 = 6;
    /// Accepted upload extensions for archive import.
    pub const ACCEPTED_EXTENSIONS: &[&str] = &[".zip"];
    /// MIME type for exported archives.
    pub const MIME_TYPE: &str = "application/zip";
}

// =============================================================================
// Cheats Configuration
// =============================================================================

/// Cheat-list file settings.
pub mod cheats {
    /// Extension of per-program cheat files.
    pub const FILE_EXTENSION: &str = ".cheats";
    /// Header key carrying the cheat count.
    pub const COUNT_KEY: &str = "cheats";
}

// =============================================================================
// Save State Configuration
// =============================================================================

/// Save state naming.
pub mod save_states {
    /// Extension prefix preceding the slot number (`game.ss3`).
    pub const SLOT_EXTENSION: &str = ".ss";
    /// Highest slot offered by the slot picker.
    pub const MAX_SLOT: u32 = 99;
}

// =============================================================================
// Settings Store Keys
// =============================================================================

/// Keys used in the persisted settings store.
pub mod storage_keys {
    /// Map of program name to its currently selected save state slot.
    pub const SAVE_STATE_SLOTS: &str = "currentSaveStateSlots";
}
