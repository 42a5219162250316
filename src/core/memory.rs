//! In-memory engine and settings store.
//!
//! Mirrors the engine's filesystem behavior closely enough to exercise the
//! adapter without a browser: `readdir` returns `.`/`..`, uploads land in
//! the category's mount, and every write and unlink is recorded.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use super::engine::{
    DirectoryLister, EngineWriter, FileReader, FileRemover, SaveStateEngine, SettingsRepository,
};
use super::error::{EngineError, SettingsError};
use crate::config::save_states::SLOT_EXTENSION;
use crate::models::{FileCategory, FilePaths, NamedFile};
use crate::utils::path;

/// A write observed by the fake engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub category: FileCategory,
    pub path: String,
}

#[derive(Clone, Debug)]
struct MemoryFile {
    bytes: Vec<u8>,
    modified: u64,
}

/// Fake engine backed by ordered maps.
pub struct MemoryEngine {
    paths: FilePaths,
    files: RefCell<BTreeMap<String, MemoryFile>>,
    dirs: RefCell<BTreeSet<String>>,
    listings: RefCell<BTreeMap<String, Vec<String>>>,
    program: RefCell<Option<String>>,
    writes: RefCell<Vec<WriteRecord>>,
    unlinks: RefCell<Vec<String>>,
    failing: RefCell<BTreeSet<String>>,
    save_state_fails: Cell<bool>,
    clock: Cell<u64>,
}

impl MemoryEngine {
    /// Create an engine with every mount of `paths` present and empty.
    pub fn new(paths: FilePaths) -> Self {
        let engine = Self {
            files: RefCell::new(BTreeMap::new()),
            dirs: RefCell::new(BTreeSet::new()),
            listings: RefCell::new(BTreeMap::new()),
            program: RefCell::new(None),
            writes: RefCell::new(Vec::new()),
            unlinks: RefCell::new(Vec::new()),
            failing: RefCell::new(BTreeSet::new()),
            save_state_fails: Cell::new(false),
            clock: Cell::new(1_700_000_000_000),
            paths,
        };
        for mount in engine.paths.mounts() {
            engine.insert_dir(mount);
        }
        engine
    }

    pub fn paths(&self) -> &FilePaths {
        &self.paths
    }

    /// Set the path of the running program (e.g. `/data/games/a.gba`).
    pub fn set_program(&self, program: Option<&str>) {
        *self.program.borrow_mut() = program.map(str::to_string);
    }

    pub fn program(&self) -> Option<String> {
        self.program.borrow().clone()
    }

    /// Create a directory and its ancestors.
    pub fn insert_dir(&self, dir: &str) {
        let mut dirs = self.dirs.borrow_mut();
        dirs.insert("/".to_string());
        let mut current = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            current.push('/');
            current.push_str(segment);
            dirs.insert(current.clone());
        }
    }

    /// Create or overwrite a file, creating its parent directories.
    pub fn insert_file(&self, file_path: &str, bytes: &[u8]) {
        if let Some((parent, _)) = file_path.rsplit_once('/') {
            self.insert_dir(parent);
        }
        let modified = self.clock.get() + 1;
        self.clock.set(modified);
        self.files.borrow_mut().insert(
            file_path.to_string(),
            MemoryFile {
                bytes: bytes.to_vec(),
                modified,
            },
        );
    }

    pub fn file(&self, file_path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(file_path).map(|f| f.bytes.clone())
    }

    /// Absolute paths of every file.
    pub fn file_paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.writes.borrow().clone()
    }

    pub fn unlinks(&self) -> Vec<String> {
        self.unlinks.borrow().clone()
    }

    /// Make every upload of a file named `name` fail.
    pub fn fail_uploads_for(&self, name: &str) {
        self.failing.borrow_mut().insert(name.to_string());
    }

    /// Return `names` verbatim from `readdir` of `dir`, whatever its contents.
    pub fn set_listing(&self, dir: &str, names: &[&str]) {
        self.listings.borrow_mut().insert(
            dir.to_string(),
            names.iter().map(|name| name.to_string()).collect(),
        );
    }

    pub fn fail_save_states(&self, fail: bool) {
        self.save_state_fails.set(fail);
    }

    fn store(&self, category: FileCategory, dir: &str, file: NamedFile) -> Result<(), EngineError> {
        let dest = path::join(dir, &file.name);
        if self.failing.borrow().contains(&file.name) {
            return Err(EngineError::WriteFailed {
                path: dest,
                message: "rejected by engine".to_string(),
            });
        }
        self.insert_file(&dest, &file.bytes);
        self.writes.borrow_mut().push(WriteRecord {
            category,
            path: dest,
        });
        Ok(())
    }

    fn state_path(&self, slot: u32) -> Option<String> {
        let program = self.program.borrow().clone()?;
        let base = path::replace_extension(path::file_name(&program), SLOT_EXTENSION);
        Some(path::join(
            &self.paths.save_state_path,
            &format!("{}{}", base, slot),
        ))
    }
}

impl DirectoryLister for MemoryEngine {
    fn list_dir(&self, dir: &str) -> Result<Vec<String>, EngineError> {
        let dirs = self.dirs.borrow();
        if !dirs.contains(dir) {
            return Err(EngineError::NotFound(dir.to_string()));
        }
        if let Some(names) = self.listings.borrow().get(dir) {
            return Ok(names.clone());
        }

        let prefix = if dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{}/", dir)
        };
        let direct_child = |candidate: &String| -> Option<String> {
            let rest = candidate.strip_prefix(&prefix)?;
            (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
        };

        let mut names = vec![".".to_string(), "..".to_string()];
        names.extend(dirs.iter().filter_map(direct_child));
        names.extend(self.files.borrow().keys().filter_map(direct_child));
        Ok(names)
    }

    fn is_dir(&self, node: &str) -> Result<bool, EngineError> {
        if self.dirs.borrow().contains(node) {
            Ok(true)
        } else if self.files.borrow().contains_key(node) {
            Ok(false)
        } else {
            Err(EngineError::NotFound(node.to_string()))
        }
    }
}

impl FileReader for MemoryEngine {
    fn read_file(&self, file_path: &str) -> Result<Vec<u8>, EngineError> {
        self.file(file_path)
            .ok_or_else(|| EngineError::NotFound(file_path.to_string()))
    }

    fn modified_time(&self, file_path: &str) -> Result<u64, EngineError> {
        self.files
            .borrow()
            .get(file_path)
            .map(|f| f.modified)
            .ok_or_else(|| EngineError::NotFound(file_path.to_string()))
    }
}

impl FileRemover for MemoryEngine {
    fn unlink(&self, file_path: &str) -> Result<(), EngineError> {
        self.unlinks.borrow_mut().push(file_path.to_string());
        match self.files.borrow_mut().remove(file_path) {
            Some(_) => Ok(()),
            None => Err(EngineError::NotFound(file_path.to_string())),
        }
    }
}

impl EngineWriter for MemoryEngine {
    fn autosave_dir(&self) -> String {
        self.paths.autosave.clone()
    }

    async fn upload_rom(&self, file: NamedFile) -> Result<(), EngineError> {
        self.store(FileCategory::Rom, &self.paths.game_path, file)
    }

    async fn upload_save(&self, file: NamedFile) -> Result<(), EngineError> {
        let dir = if file.name.to_lowercase().ends_with(".sav") {
            self.paths.save_path.clone()
        } else {
            self.paths.save_state_path.clone()
        };
        self.store(FileCategory::Save, &dir, file)
    }

    async fn upload_cheats(&self, file: NamedFile) -> Result<(), EngineError> {
        self.store(FileCategory::Cheat, &self.paths.cheats_path, file)
    }

    async fn upload_patch(&self, file: NamedFile) -> Result<(), EngineError> {
        self.store(FileCategory::Patch, &self.paths.patch_path, file)
    }

    async fn upload_screenshot(&self, file: NamedFile) -> Result<(), EngineError> {
        self.store(FileCategory::Screenshot, &self.paths.screenshots_path, file)
    }

    async fn write_autosave(&self, dest: &str, bytes: Vec<u8>) -> Result<(), EngineError> {
        if self.failing.borrow().contains(path::file_name(dest)) {
            return Err(EngineError::WriteFailed {
                path: dest.to_string(),
                message: "rejected by engine".to_string(),
            });
        }
        self.insert_file(dest, &bytes);
        self.writes.borrow_mut().push(WriteRecord {
            category: FileCategory::Autosave,
            path: dest.to_string(),
        });
        Ok(())
    }
}

impl SaveStateEngine for MemoryEngine {
    fn save_state(&self, slot: u32) -> bool {
        if self.save_state_fails.get() {
            return false;
        }
        match self.state_path(slot) {
            Some(state) => {
                self.insert_file(&state, format!("state {}", slot).as_bytes());
                true
            }
            None => false,
        }
    }

    fn load_state(&self, slot: u32) -> bool {
        !self.save_state_fails.get()
            && self
                .state_path(slot)
                .is_some_and(|state| self.files.borrow().contains_key(&state))
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Settings repository held in an ordered map.
#[derive(Default)]
pub struct MemorySettings {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let settings = Self::new();
        settings.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        settings
    }
}

impl SettingsRepository for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_all(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }
}
