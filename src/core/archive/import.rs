use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use futures::future::join_all;
use zip::ZipArchive;

use crate::config::archive::SETTINGS_ENTRY;
use crate::core::dispatcher::dispatch;
use crate::core::engine::{EngineWriter, SettingsRepository};
use crate::core::error::ArchiveError;
use crate::models::{FileCategory, ImportReport, NamedFile, SkipReason, SkippedEntry};
use crate::utils::{log, path};

/// An archive member read into memory.
struct RawEntry {
    name: String,
    is_dir: bool,
    bytes: Result<Vec<u8>, String>,
}

enum EntryOutcome {
    Written(String, FileCategory),
    Settings(usize),
    Skipped(SkippedEntry),
}

fn skipped(path: impl Into<String>, reason: SkipReason) -> EntryOutcome {
    EntryOutcome::Skipped(SkippedEntry {
        path: path.into(),
        reason,
    })
}

fn read_entries(bytes: &[u8]) -> Result<Vec<RawEntry>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = match archive.by_index(index) {
            Ok(mut file) => {
                let is_dir = file.is_dir();
                let mut content = Vec::new();
                let bytes = if is_dir {
                    Ok(content)
                } else {
                    file.read_to_end(&mut content)
                        .map(|_| content)
                        .map_err(|e| e.to_string())
                };
                RawEntry {
                    name: file.name().to_string(),
                    is_dir,
                    bytes,
                }
            }
            Err(e) => RawEntry {
                name: format!("#{}", index),
                is_dir: false,
                bytes: Err(e.to_string()),
            },
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Overwrite the keys present in a settings snapshot.
///
/// Keys missing from the snapshot keep their current values. Non-string
/// values are stored in their JSON text form.
pub fn apply_settings_snapshot<S: SettingsRepository + ?Sized>(
    settings: &S,
    json: &[u8],
) -> Result<usize, String> {
    let snapshot: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(json).map_err(|e| e.to_string())?;

    let entries: BTreeMap<String, String> = snapshot
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect();

    settings.set_all(&entries).map_err(|e| e.to_string())?;
    Ok(entries.len())
}

async fn import_entry<W, S>(writer: &W, settings: &S, entry: RawEntry) -> EntryOutcome
where
    W: EngineWriter + ?Sized,
    S: SettingsRepository + ?Sized,
{
    if entry.is_dir {
        return skipped(entry.name, SkipReason::Directory);
    }

    let normalized = path::normalize_entry_path(&entry.name);
    if path::has_parent_traversal(&normalized) {
        log::warn(&format!("Skipping unsafe path in archive: {}", normalized));
        return skipped(normalized, SkipReason::UnsafePath);
    }

    let bytes = match entry.bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn(&format!("Skipping unreadable archive entry {}: {}", normalized, e));
            return skipped(normalized, SkipReason::Unreadable(e));
        }
    };

    if normalized == SETTINGS_ENTRY {
        return match apply_settings_snapshot(settings, &bytes) {
            Ok(count) => EntryOutcome::Settings(count),
            Err(e) => {
                log::warn(&format!("Failed to restore settings: {}", e));
                skipped(normalized, SkipReason::InvalidSettings(e))
            }
        };
    }

    let name = path::file_name(&normalized);
    if name.is_empty() {
        return skipped(normalized, SkipReason::Directory);
    }

    match dispatch(writer, NamedFile::new(name, bytes), None).await {
        Ok(Some(category)) => EntryOutcome::Written(normalized, category),
        Ok(None) => skipped(normalized, SkipReason::Unclassified),
        Err(e) => {
            log::warn(&format!("Failed to import {}: {}", normalized, e));
            skipped(normalized, SkipReason::WriteFailed(e.to_string()))
        }
    }
}

/// Import an archive produced by [`export_archive`](super::export_archive).
///
/// Every entry is processed concurrently and independently: an unsafe,
/// unclassifiable or failing entry is recorded in the report and never
/// stops the others. Only an unreadable container is an error. When two
/// entries target the same destination the last write to complete wins.
pub async fn import_archive<W, S>(
    writer: &W,
    settings: &S,
    bytes: &[u8],
) -> Result<ImportReport, ArchiveError>
where
    W: EngineWriter + ?Sized,
    S: SettingsRepository + ?Sized,
{
    let entries = read_entries(bytes)?;
    let outcomes = join_all(
        entries
            .into_iter()
            .map(|entry| import_entry(writer, settings, entry)),
    )
    .await;

    let mut report = ImportReport::default();
    for outcome in outcomes {
        match outcome {
            EntryOutcome::Written(path, category) => report.written.push((path, category)),
            EntryOutcome::Settings(count) => report.settings_keys += count,
            EntryOutcome::Skipped(entry) => report.skipped.push(entry),
        }
    }

    log::info(&format!(
        "imported {} files, {} settings, {} skipped",
        report.written.len(),
        report.settings_keys,
        report.warnings().count()
    ));
    Ok(report)
}
