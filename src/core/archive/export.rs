use std::cell::RefCell;
use std::io::{self, Cursor, Seek, Write};
use std::rc::Rc;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::archive::{COMPRESSION_LEVEL, SETTINGS_ENTRY};
use crate::core::engine::{DirectoryLister, FileReader, SettingsRepository};
use crate::core::error::ArchiveError;
use crate::core::tree::build_file_tree;
use crate::models::{ExportSummary, FilePaths};
use crate::utils::{log, path};

/// Entry options shared by every archive member.
pub fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
}

/// Export archive file name for a timestamp.
///
/// `iso_timestamp` is an ISO-8601 string such as `2024-05-01T12:34:56.789Z`;
/// it is cut to whole seconds and its separators become hyphens:
/// `gbajs-files-2024-05-01-12-34-56.zip`.
pub fn archive_name(prefix: &str, iso_timestamp: &str) -> String {
    let stamp: String = iso_timestamp
        .chars()
        .take(19)
        .map(|c| match c {
            'T' => '-',
            c if c.is_ascii_alphanumeric() => c,
            _ => '-',
        })
        .collect();
    format!("{}-{}.zip", prefix, stamp)
}

// =============================================================================
// Shared Steps
// =============================================================================

/// Archive paths of every file, in tree order.
fn archive_paths<F: DirectoryLister + ?Sized>(fs: &F, paths: &FilePaths) -> Vec<String> {
    build_file_tree(fs, paths)
        .flatten_files()
        .iter()
        .map(|file_path| path::strip_leading_slashes(file_path).to_string())
        .collect()
}

/// Content of one file, or `None` (recorded as skipped) if empty or unreadable.
fn read_entry<F: FileReader + ?Sized>(
    fs: &F,
    relative: &str,
    summary: &mut ExportSummary,
) -> Option<Vec<u8>> {
    match fs.read_file(&format!("/{}", relative)) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => {
            log::debug(&format!("skipping empty file {}", relative));
            summary.skipped.push(relative.to_string());
            None
        }
        Err(e) => {
            log::debug(&format!("skipping unreadable file {}: {}", relative, e));
            summary.skipped.push(relative.to_string());
            None
        }
    }
}

fn write_settings<S, W>(
    zip: &mut ZipWriter<W>,
    settings: &S,
    summary: &mut ExportSummary,
) -> Result<(), ArchiveError>
where
    S: SettingsRepository + ?Sized,
    W: Write + Seek,
{
    let snapshot = settings.get_all();
    zip.start_file(SETTINGS_ENTRY, file_options())?;
    zip.write_all(serde_json::to_string(&snapshot)?.as_bytes())?;
    summary.settings_keys = snapshot.len();
    Ok(())
}

fn log_summary(summary: &ExportSummary) {
    log::info(&format!(
        "exported {} files and {} settings",
        summary.files.len(),
        summary.settings_keys
    ));
}

// =============================================================================
// Seekable Writer
// =============================================================================

/// Write the whole virtual filesystem plus the settings snapshot into `writer`.
///
/// Files are read one at a time. Empty or unreadable files are left out.
/// Returns the finished writer.
pub fn export_archive<F, S, W>(
    fs: &F,
    paths: &FilePaths,
    settings: &S,
    writer: W,
) -> Result<(W, ExportSummary), ArchiveError>
where
    F: DirectoryLister + FileReader + ?Sized,
    S: SettingsRepository + ?Sized,
    W: Write + Seek,
{
    let mut zip = ZipWriter::new(writer);
    let mut summary = ExportSummary::default();

    for relative in archive_paths(fs, paths) {
        if let Some(bytes) = read_entry(fs, &relative, &mut summary) {
            zip.start_file(relative.as_str(), file_options())?;
            zip.write_all(&bytes)?;
            summary.files.push(relative);
        }
    }

    write_settings(&mut zip, settings, &mut summary)?;
    let writer = zip.finish()?;
    log_summary(&summary);
    Ok((writer, summary))
}

/// Assemble the archive in memory.
pub fn export_to_vec<F, S>(
    fs: &F,
    paths: &FilePaths,
    settings: &S,
) -> Result<(Vec<u8>, ExportSummary), ArchiveError>
where
    F: DirectoryLister + FileReader + ?Sized,
    S: SettingsRepository + ?Sized,
{
    let (cursor, summary) = export_archive(fs, paths, settings, Cursor::new(Vec::new()))?;
    Ok((cursor.into_inner(), summary))
}

// =============================================================================
// Streaming Sink
// =============================================================================

/// Destination that receives archive bytes in order, chunk by chunk.
#[allow(async_fn_in_trait)]
pub trait ArchiveSink {
    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), ArchiveError>;
}

impl ArchiveSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), ArchiveError> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}

/// Write target of the zip encoder, drained into the sink between entries.
#[derive(Clone, Default)]
struct PendingBytes(Rc<RefCell<Vec<u8>>>);

impl PendingBytes {
    async fn drain_into<K: ArchiveSink + ?Sized>(&self, sink: &mut K) -> Result<(), ArchiveError> {
        let chunk = std::mem::take(&mut *self.0.borrow_mut());
        if chunk.is_empty() {
            return Ok(());
        }
        sink.write_chunk(chunk).await
    }
}

impl Write for PendingBytes {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stream the archive into `sink` without assembling it in memory.
///
/// Bytes produced so far are handed to the sink after every file, so at most
/// one file's content and its pending compressed output are buffered. Entry
/// layout and skipping rules are the same as [`export_archive`].
pub async fn export_to_sink<F, S, K>(
    fs: &F,
    paths: &FilePaths,
    settings: &S,
    sink: &mut K,
) -> Result<ExportSummary, ArchiveError>
where
    F: DirectoryLister + FileReader + ?Sized,
    S: SettingsRepository + ?Sized,
    K: ArchiveSink + ?Sized,
{
    let pending = PendingBytes::default();
    let mut zip = ZipWriter::new_stream(pending.clone());
    let mut summary = ExportSummary::default();

    for relative in archive_paths(fs, paths) {
        if let Some(bytes) = read_entry(fs, &relative, &mut summary) {
            zip.start_file(relative.as_str(), file_options())?;
            zip.write_all(&bytes)?;
            summary.files.push(relative);
            pending.drain_into(sink).await?;
        }
    }

    write_settings(&mut zip, settings, &mut summary)?;
    zip.finish()?;
    pending.drain_into(sink).await?;
    log_summary(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::memory::{MemoryEngine, MemorySettings};
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::io::Read;
    use zip::ZipArchive;

    /// Reader that counts file reads, shared with the sink below.
    struct CountingFs<'a> {
        engine: &'a MemoryEngine,
        reads: Rc<Cell<usize>>,
    }

    impl DirectoryLister for CountingFs<'_> {
        fn list_dir(&self, dir: &str) -> Result<Vec<String>, EngineError> {
            self.engine.list_dir(dir)
        }

        fn is_dir(&self, node: &str) -> Result<bool, EngineError> {
            self.engine.is_dir(node)
        }
    }

    impl FileReader for CountingFs<'_> {
        fn read_file(&self, file_path: &str) -> Result<Vec<u8>, EngineError> {
            self.reads.set(self.reads.get() + 1);
            self.engine.read_file(file_path)
        }

        fn modified_time(&self, file_path: &str) -> Result<u64, EngineError> {
            self.engine.modified_time(file_path)
        }
    }

    /// Sink recording each chunk with the number of files read before it.
    struct RecordingSink {
        reads: Rc<Cell<usize>>,
        chunks: Vec<(usize, Vec<u8>)>,
    }

    impl ArchiveSink for RecordingSink {
        async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), ArchiveError> {
            self.chunks.push((self.reads.get(), chunk));
            Ok(())
        }
    }

    struct RejectingSink;

    impl ArchiveSink for RejectingSink {
        async fn write_chunk(&mut self, _chunk: Vec<u8>) -> Result<(), ArchiveError> {
            Err(ArchiveError::Sink("disk full".to_string()))
        }
    }

    fn three_file_engine() -> MemoryEngine {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/data/games/a.gba", &[1u8; 2048]);
        engine.insert_file("/data/saves/a.sav", &[2u8; 512]);
        engine.insert_file("/autosave/a_auto.ss", &[3u8; 256]);
        engine
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(
            archive_name("gbajs-files", "2024-05-01T12:34:56.789Z"),
            "gbajs-files-2024-05-01-12-34-56.zip"
        );
    }

    #[test]
    fn test_export_strips_leading_slashes() {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/data/games/a.gba", b"rom");
        engine.insert_file("/autosave/a_auto.ss", b"auto");
        let settings = MemorySettings::new();

        let (bytes, summary) = export_to_vec(&engine, engine.paths(), &settings).unwrap();
        let mut names = entry_names(&bytes);
        names.sort();

        assert_eq!(
            names,
            vec!["autosave/a_auto.ss", "data/games/a.gba", "local-storage.json"]
        );
        assert!(names.iter().all(|n| !n.starts_with('/')));
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_export_skips_empty_files() {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/data/saves/empty.sav", b"");
        engine.insert_file("/data/saves/full.sav", b"x");

        let (bytes, summary) =
            export_to_vec(&engine, engine.paths(), &MemorySettings::new()).unwrap();

        assert_eq!(summary.skipped, vec!["data/saves/empty.sav"]);
        assert!(!entry_names(&bytes).contains(&"data/saves/empty.sav".to_string()));
    }

    #[test]
    fn test_export_embeds_settings_snapshot() {
        let engine = MemoryEngine::new(FilePaths::default());
        let settings = MemorySettings::with_entries([("volume", "75"), ("theme", "dark")]);

        let (bytes, summary) = export_to_vec(&engine, engine.paths(), &settings).unwrap();
        assert_eq!(summary.settings_keys, 2);

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut json = String::new();
        archive
            .by_name(SETTINGS_ENTRY)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["volume"], "75");
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn test_export_uses_deflate() {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/data/games/a.gba", &[0u8; 4096]);

        let (bytes, _) = export_to_vec(&engine, engine.paths(), &MemorySettings::new()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_name("data/games/a.gba").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        assert!(entry.compressed_size() < entry.size());
    }

    #[test]
    fn test_stream_hands_over_bytes_before_reading_everything() {
        let engine = three_file_engine();
        let reads = Rc::new(Cell::new(0));
        let fs = CountingFs {
            engine: &engine,
            reads: Rc::clone(&reads),
        };
        let mut sink = RecordingSink {
            reads: Rc::clone(&reads),
            chunks: Vec::new(),
        };

        let summary =
            block_on(export_to_sink(&fs, engine.paths(), &MemorySettings::new(), &mut sink))
                .unwrap();

        assert_eq!(summary.files.len(), 3);
        assert_eq!(reads.get(), 3);
        assert!(sink.chunks.len() > 1);
        assert_eq!(sink.chunks[0].0, 1);
        assert!(sink.chunks.iter().all(|(_, chunk)| !chunk.is_empty()));
    }

    #[test]
    fn test_streamed_archive_matches_in_memory_archive() {
        let engine = three_file_engine();
        let settings = MemorySettings::with_entries([("volume", "75")]);

        let mut streamed = Vec::new();
        let summary =
            block_on(export_to_sink(&engine, engine.paths(), &settings, &mut streamed)).unwrap();
        let (buffered, buffered_summary) =
            export_to_vec(&engine, engine.paths(), &settings).unwrap();

        assert_eq!(summary, buffered_summary);
        assert_eq!(entry_names(&streamed), entry_names(&buffered));

        let mut archive = ZipArchive::new(Cursor::new(streamed)).unwrap();
        let mut rom = Vec::new();
        archive
            .by_name("data/games/a.gba")
            .unwrap()
            .read_to_end(&mut rom)
            .unwrap();
        assert_eq!(rom, vec![1u8; 2048]);
    }

    #[test]
    fn test_stream_stops_on_sink_error() {
        let engine = three_file_engine();
        let result = block_on(export_to_sink(
            &engine,
            engine.paths(),
            &MemorySettings::new(),
            &mut RejectingSink,
        ));
        assert!(matches!(result, Err(ArchiveError::Sink(_))));
    }
}
