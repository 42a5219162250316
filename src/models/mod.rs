//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`FileNode`], [`FileTree`], [`NamedFile`] - Virtual filesystem representation
//! - [`FilePaths`] - Engine mount layout
//! - [`FileCategory`] - Closed set of upload categories
//! - [`ParsedCheat`], [`CheatsFile`] - Cheat lists
//! - [`ExportSummary`], [`ImportReport`] - Archive interchange results

mod archive;
mod category;
mod cheats;
mod filesystem;
mod mount;

pub use archive::{ExportSummary, ImportReport, SkipReason, SkippedEntry};
pub use category::{FileCategory, UnknownCategory};
pub use cheats::{CheatsFile, ParsedCheat};
pub use filesystem::{FileNode, FileTree, NamedFile};
pub use mount::FilePaths;
