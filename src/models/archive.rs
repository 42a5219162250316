use std::fmt;

use super::FileCategory;

// =============================================================================
// Export
// =============================================================================

/// Outcome of an archive export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Relative paths written to the archive, in write order
    pub files: Vec<String>,
    /// Paths left out because they were empty or unreadable
    pub skipped: Vec<String>,
    /// Number of keys in the embedded settings snapshot
    pub settings_keys: usize,
}

// =============================================================================
// Import
// =============================================================================

/// Why an archive entry was not imported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory entries carry no content
    Directory,
    /// Entry could not be read out of the archive
    Unreadable(String),
    /// Path still contains a parent-traversal segment after normalization
    UnsafePath,
    /// File name matches no category
    Unclassified,
    /// The engine rejected the write
    WriteFailed(String),
    /// Settings snapshot could not be decoded
    InvalidSettings(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory entry"),
            Self::Unreadable(msg) => write!(f, "unreadable entry: {}", msg),
            Self::UnsafePath => write!(f, "unsafe path"),
            Self::Unclassified => write!(f, "no supported write path"),
            Self::WriteFailed(msg) => write!(f, "write failed: {}", msg),
            Self::InvalidSettings(msg) => write!(f, "invalid settings snapshot: {}", msg),
        }
    }
}

/// An archive entry that was skipped, with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: SkipReason,
}

/// Per-entry results of an archive import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Entries handed to the engine, with the category they were routed to
    pub written: Vec<(String, FileCategory)>,
    /// Keys restored from the settings snapshot
    pub settings_keys: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl ImportReport {
    /// Number of entries written with the given category.
    pub fn count(&self, category: FileCategory) -> usize {
        self.written.iter().filter(|(_, c)| *c == category).count()
    }

    /// Skipped entries that were not plain directory markers.
    pub fn warnings(&self) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped
            .iter()
            .filter(|entry| entry.reason != SkipReason::Directory)
    }
}
