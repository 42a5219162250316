//! Upload routing.
//!
//! Decides which engine write primitive receives a file, either from an
//! explicit category (external uploads that have a proper type but maybe not
//! a proper name) or from the file name.

use futures::future::join_all;

use super::classifier::classify;
use super::engine::EngineWriter;
use super::error::EngineError;
use crate::models::{FileCategory, NamedFile};
use crate::utils::{log, path};

/// Write one file to the engine.
///
/// Returns the category the file was routed to, or `Ok(None)` when the name
/// matches no category and no override was given; such files are dropped
/// after a warning. Each call performs at most one write.
pub async fn dispatch<W: EngineWriter + ?Sized>(
    writer: &W,
    file: NamedFile,
    category_override: Option<FileCategory>,
) -> Result<Option<FileCategory>, EngineError> {
    let Some(category) = category_override.or_else(|| classify(&file.name)) else {
        log::warn(&format!("No supported write path for {}", file.name));
        return Ok(None);
    };

    match category {
        FileCategory::Rom => writer.upload_rom(file).await?,
        FileCategory::Autosave => {
            let dest = path::join(&writer.autosave_dir(), &file.name);
            writer.write_autosave(&dest, file.bytes).await?
        }
        FileCategory::Save => writer.upload_save(file).await?,
        FileCategory::Cheat => writer.upload_cheats(file).await?,
        FileCategory::Patch => writer.upload_patch(file).await?,
        FileCategory::Screenshot => writer.upload_screenshot(file).await?,
    }

    Ok(Some(category))
}

/// Write several files concurrently; results are in input order.
pub async fn dispatch_all<W: EngineWriter + ?Sized>(
    writer: &W,
    files: Vec<NamedFile>,
    category_override: Option<FileCategory>,
) -> Vec<Result<Option<FileCategory>, EngineError>> {
    join_all(
        files
            .into_iter()
            .map(|file| dispatch(writer, file, category_override)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{MemoryEngine, WriteRecord};
    use crate::models::FilePaths;
    use futures::executor::block_on;

    fn engine() -> MemoryEngine {
        MemoryEngine::new(FilePaths::default())
    }

    fn send(engine: &MemoryEngine, name: &str) -> Option<FileCategory> {
        block_on(dispatch(engine, NamedFile::new(name, b"data".to_vec()), None)).unwrap()
    }

    #[test]
    fn test_routes_by_name() {
        let engine = engine();
        assert_eq!(send(&engine, "a.gba"), Some(FileCategory::Rom));
        assert_eq!(send(&engine, "a.sav"), Some(FileCategory::Save));
        assert_eq!(send(&engine, "a.ss1"), Some(FileCategory::Save));
        assert_eq!(send(&engine, "a.cheats"), Some(FileCategory::Cheat));
        assert_eq!(send(&engine, "a.ips"), Some(FileCategory::Patch));
        assert_eq!(send(&engine, "a.png"), Some(FileCategory::Screenshot));

        let paths: Vec<String> = engine.writes().into_iter().map(|w| w.path).collect();
        assert_eq!(
            paths,
            vec![
                "/data/games/a.gba",
                "/data/saves/a.sav",
                "/data/states/a.ss1",
                "/data/cheats/a.cheats",
                "/data/patches/a.ips",
                "/data/screenshots/a.png",
            ]
        );
    }

    #[test]
    fn test_autosave_written_to_autosave_mount() {
        let engine = engine();
        assert_eq!(send(&engine, "Game_auto.ss"), Some(FileCategory::Autosave));
        assert_eq!(
            engine.writes(),
            vec![WriteRecord {
                category: FileCategory::Autosave,
                path: "/autosave/Game_auto.ss".to_string(),
            }]
        );
        assert_eq!(engine.file("/autosave/Game_auto.ss").unwrap(), b"data");
    }

    #[test]
    fn test_override_is_authoritative() {
        let engine = engine();
        let routed = block_on(dispatch(
            &engine,
            NamedFile::new("download", b"rom".to_vec()),
            Some(FileCategory::Rom),
        ))
        .unwrap();
        assert_eq!(routed, Some(FileCategory::Rom));
        assert_eq!(engine.writes()[0].path, "/data/games/download");
    }

    #[test]
    fn test_uncategorized_is_dropped() {
        let engine = engine();
        assert_eq!(send(&engine, "notes.txt"), None);
        assert!(engine.writes().is_empty());
    }

    #[test]
    fn test_same_name_overwrites() {
        let engine = engine();
        block_on(dispatch(&engine, NamedFile::new("a.sav", b"one".to_vec()), None)).unwrap();
        block_on(dispatch(&engine, NamedFile::new("a.sav", b"two".to_vec()), None)).unwrap();
        assert_eq!(engine.file("/data/saves/a.sav").unwrap(), b"two");
    }

    #[test]
    fn test_write_failure_is_returned() {
        let engine = engine();
        engine.fail_uploads_for("bad.gba");
        let result = block_on(dispatch(&engine, NamedFile::new("bad.gba", b"x".to_vec()), None));
        assert!(matches!(result, Err(EngineError::WriteFailed { .. })));
    }

    #[test]
    fn test_dispatch_all_keeps_input_order() {
        let engine = engine();
        engine.fail_uploads_for("b.gba");
        let results = block_on(dispatch_all(
            &engine,
            vec![
                NamedFile::new("a.gba", b"a".to_vec()),
                NamedFile::new("b.gba", b"b".to_vec()),
                NamedFile::new("c.txt", b"c".to_vec()),
            ],
            None,
        ));
        assert_eq!(results[0], Ok(Some(FileCategory::Rom)));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(None));
    }
}
