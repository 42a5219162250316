//! Slot-indexed save states of the running program.
//!
//! A state for slot `N` of program `game.gba` lives at
//! `<state-dir>/game.ss<N>`. The autosave is a separate, single file per
//! program on its own mount and is tracked by modification time instead.

use std::collections::BTreeMap;

use super::engine::{DirectoryLister, FileReader, FileRemover, SaveStateEngine, SettingsRepository};
use super::error::SettingsError;
use crate::config::FS_IGNORE_PATHS;
use crate::config::save_states::SLOT_EXTENSION;
use crate::config::storage_keys::SAVE_STATE_SLOTS;
use crate::models::FilePaths;
use crate::utils::{log, path};

/// Extract the slot from a state file name (`game.ss12` → `12`).
pub fn slot_from_file_name(name: &str) -> Option<u32> {
    let (_, extension) = name.rsplit_once('.')?;
    let digits = extension.strip_prefix("ss")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Save state operations for one program.
pub struct SaveStateManager<'a, E: ?Sized> {
    engine: &'a E,
    paths: &'a FilePaths,
    program: Option<String>,
}

impl<'a, E> SaveStateManager<'a, E>
where
    E: SaveStateEngine + DirectoryLister + FileReader + FileRemover + ?Sized,
{
    /// `program` is the running program's path or file name, if any.
    pub fn new(engine: &'a E, paths: &'a FilePaths, program: Option<&str>) -> Self {
        Self {
            engine,
            paths,
            program: program
                .map(path::file_name)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }

    /// File name prefix shared by all states of the program (`game.ss`).
    fn state_prefix(&self) -> Option<String> {
        self.program
            .as_deref()
            .map(|program| path::replace_extension(program, SLOT_EXTENSION))
    }

    /// File name of the state in `slot`.
    pub fn state_file_name(&self, slot: u32) -> Option<String> {
        self.state_prefix().map(|prefix| format!("{}{}", prefix, slot))
    }

    /// Snapshot the running program into `slot`.
    ///
    /// The listing is not refreshed; call [`list`](Self::list) afterwards.
    pub fn create(&self, slot: u32) -> bool {
        self.engine.save_state(slot)
    }

    /// Restore the state in `slot`.
    pub fn load(&self, slot: u32) -> bool {
        self.engine.load_state(slot)
    }

    /// Unlink the state file of `slot` without checking that it exists.
    pub fn delete(&self, slot: u32) {
        let Some(name) = self.state_file_name(slot) else {
            log::warn(&format!("no program loaded, cannot delete state slot {}", slot));
            return;
        };
        let state_path = path::join(&self.paths.save_state_path, &name);
        if let Err(e) = self.engine.unlink(&state_path) {
            log::warn(&format!("failed to delete save state: {}", e));
        }
    }

    /// State file names of the program, in engine order.
    pub fn list(&self) -> Vec<String> {
        let Some(prefix) = self.state_prefix() else {
            return Vec::new();
        };
        match self.engine.list_dir(&self.paths.save_state_path) {
            Ok(names) => names
                .into_iter()
                .filter(|name| !FS_IGNORE_PATHS.contains(&name.as_str()))
                .filter(|name| name.starts_with(&prefix))
                .collect(),
            Err(e) => {
                log::debug(&format!("no save states listed: {}", e));
                Vec::new()
            }
        }
    }

    /// Raw bytes of a state file by name; a missing file reads as empty.
    pub fn read_state(&self, name: &str) -> Vec<u8> {
        self.engine
            .read_file(&path::join(&self.paths.save_state_path, name))
            .unwrap_or_default()
    }

    /// Modification time of the autosave at `autosave_path`, if it exists.
    pub fn autosave_modified(&self, autosave_path: &str) -> Option<u64> {
        self.engine.modified_time(autosave_path).ok()
    }
}

// =============================================================================
// Current Slot Selection
// =============================================================================

fn read_slot_map<S: SettingsRepository + ?Sized>(settings: &S) -> BTreeMap<String, u32> {
    settings
        .get(SAVE_STATE_SLOTS)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// Slot currently selected for `program`; defaults to 0.
pub fn current_slot<S: SettingsRepository + ?Sized>(settings: &S, program: &str) -> u32 {
    read_slot_map(settings)
        .get(path::file_name(program))
        .copied()
        .unwrap_or(0)
}

/// Persist the slot selected for `program`.
pub fn set_current_slot<S: SettingsRepository + ?Sized>(
    settings: &S,
    program: &str,
    slot: u32,
) -> Result<(), SettingsError> {
    let mut slots = read_slot_map(settings);
    slots.insert(path::file_name(program).to_string(), slot);
    let json = serde_json::to_string(&slots)
        .map_err(|_| SettingsError::SaveFailed(SAVE_STATE_SLOTS.to_string()))?;
    settings.set(SAVE_STATE_SLOTS, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::save_states::MAX_SLOT;
    use crate::core::memory::{MemoryEngine, MemorySettings};

    fn engine_with_program() -> MemoryEngine {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.set_program(Some("/data/games/game.gba"));
        engine
    }

    #[test]
    fn test_slot_from_file_name() {
        assert_eq!(slot_from_file_name("game.ss0"), Some(0));
        assert_eq!(slot_from_file_name("game.ss42"), Some(42));
        assert_eq!(slot_from_file_name("my.game.ss7"), Some(7));
        assert_eq!(slot_from_file_name("game.ss"), None);
        assert_eq!(slot_from_file_name("game.sav"), None);
        assert_eq!(slot_from_file_name("game_auto.ss"), None);
        assert_eq!(slot_from_file_name("game.ss+1"), None);
    }

    #[test]
    fn test_state_file_name() {
        let engine = engine_with_program();
        let manager = SaveStateManager::new(&engine, engine.paths(), engine.program().as_deref());
        assert_eq!(manager.state_file_name(3).as_deref(), Some("game.ss3"));
    }

    #[test]
    fn test_create_then_list() {
        let engine = engine_with_program();
        engine.insert_file("/data/states/other.ss0", b"x");
        let program = engine.program();
        let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());

        assert!(manager.list().is_empty());
        assert!(manager.create(0));
        assert!(manager.create(2));
        assert_eq!(manager.list(), vec!["game.ss0", "game.ss2"]);
    }

    #[test]
    fn test_list_keeps_engine_order() {
        let engine = engine_with_program();
        for name in ["game.ss9", "other.ss0", "game.ss1", "game.ss10"] {
            engine.insert_file(&format!("/data/states/{}", name), b"x");
        }
        engine.set_listing(
            "/data/states",
            &["game.ss9", ".", "other.ss0", "game.ss1", "..", "game.ss10"],
        );
        let program = engine.program();
        let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());

        assert_eq!(manager.list(), vec!["game.ss9", "game.ss1", "game.ss10"]);
    }

    #[test]
    fn test_load_reports_failure() {
        let engine = engine_with_program();
        let program = engine.program();
        let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());

        assert!(!manager.load(1));
        assert!(manager.create(1));
        assert!(manager.load(1));

        engine.fail_save_states(true);
        assert!(!manager.create(4));
        assert!(!manager.load(1));
    }

    #[test]
    fn test_delete_unlinks_exactly_one_path_per_slot() {
        for slot in 0..=MAX_SLOT {
            let engine = engine_with_program();
            let program = engine.program();
            let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());

            manager.delete(slot);
            assert_eq!(
                engine.unlinks(),
                vec![format!("/data/states/game.ss{}", slot)]
            );
        }
    }

    #[test]
    fn test_delete_without_program_is_noop() {
        let engine = MemoryEngine::new(FilePaths::default());
        let manager = SaveStateManager::new(&engine, engine.paths(), None);
        manager.delete(0);
        assert!(engine.unlinks().is_empty());
        assert!(manager.list().is_empty());
    }

    #[test]
    fn test_read_state() {
        let engine = engine_with_program();
        let program = engine.program();
        let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());
        manager.create(5);
        assert_eq!(manager.read_state("game.ss5"), b"state 5");
        assert!(manager.read_state("game.ss6").is_empty());
    }

    #[test]
    fn test_autosave_modified_tracks_writes() {
        let engine = engine_with_program();
        let program = engine.program();
        let manager = SaveStateManager::new(&engine, engine.paths(), program.as_deref());

        assert_eq!(manager.autosave_modified("/autosave/game_auto.ss"), None);
        engine.insert_file("/autosave/game_auto.ss", b"1");
        let first = manager.autosave_modified("/autosave/game_auto.ss").unwrap();
        engine.insert_file("/autosave/game_auto.ss", b"2");
        let second = manager.autosave_modified("/autosave/game_auto.ss").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_current_slot_persistence() {
        let settings = MemorySettings::with_entries([("volume", "50")]);
        assert_eq!(current_slot(&settings, "game.gba"), 0);

        set_current_slot(&settings, "/data/games/game.gba", 3).unwrap();
        set_current_slot(&settings, "other.gba", 1).unwrap();

        assert_eq!(current_slot(&settings, "game.gba"), 3);
        assert_eq!(current_slot(&settings, "other.gba"), 1);
        assert_eq!(settings.get("volume").as_deref(), Some("50"));
    }
}
