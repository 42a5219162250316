//! Whole-filesystem backup archives.
//!
//! An archive is a zip of every file in the engine's filesystem, stored under
//! its path without the leading slash, plus a `local-storage.json` entry with
//! the settings snapshot. Import routes each entry back through the upload
//! dispatcher by file name, so files land in the mount their category owns
//! regardless of where they sat in the archive.

mod export;
mod import;

pub use export::{
    archive_name, export_archive, export_to_sink, export_to_vec, file_options, ArchiveSink,
};
pub use import::{apply_settings_snapshot, import_archive};
