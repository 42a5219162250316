//! Browser bindings.
//!
//! [`FileManager`] wraps a loaded mGBA module and the page's `localStorage`
//! and exposes the file operations to JavaScript. Free functions cover the
//! engine-independent helpers (classification, accept lists, cheat parsing).

pub mod dom;
pub mod mgba;
pub mod storage;

use std::rc::Rc;

use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::archive::{EXPORT_PREFIX, MIME_TYPE};
use crate::core::{archive, cheats, save_states, SaveStateManager};
use crate::models::{FileCategory, FileNode, ImportReport, NamedFile, ParsedCheat};
use crate::utils::log;
use mgba::MgbaEngine;
use storage::LocalStorageSettings;

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

// =============================================================================
// Engine-independent Helpers
// =============================================================================

/// Category name of a file, or `undefined` if uncategorized.
#[wasm_bindgen(js_name = classifyFile)]
pub fn classify_file(file_name: &str) -> Option<String> {
    crate::core::classify(file_name).map(|category| category.to_string())
}

/// Whether `file_name` belongs to the named category.
#[wasm_bindgen(js_name = isFileOfType)]
pub fn is_file_of_type(file_name: &str, category: &str) -> Result<bool, JsValue> {
    let category: FileCategory = category.parse().map_err(to_js_error)?;
    Ok(crate::core::matches_category(file_name, category))
}

/// Accepted extensions of a category, for `<input accept>` lists.
#[wasm_bindgen(js_name = acceptList)]
pub fn accept_list(category: &str) -> Result<Vec<String>, JsValue> {
    let category: FileCategory = category.parse().map_err(to_js_error)?;
    Ok(crate::core::accept_list(category)
        .into_iter()
        .map(str::to_string)
        .collect())
}

#[wasm_bindgen(js_name = parseCheats)]
pub fn parse_cheats(text: &str) -> Result<JsValue, JsValue> {
    to_js(&cheats::parse(text))
}

/// Slot number of a save state file name (`game.ss3` → 3), if it is one.
#[wasm_bindgen(js_name = slotFromFileName)]
pub fn slot_from_file_name(file_name: &str) -> Option<u32> {
    save_states::slot_from_file_name(file_name)
}

/// Serialize a cheat list for `program`; `undefined` without a program.
#[wasm_bindgen(js_name = cheatsToFile)]
pub fn cheats_to_file(list: JsValue, program: Option<String>) -> Result<JsValue, JsValue> {
    let list: Vec<ParsedCheat> = serde_wasm_bindgen::from_value(list)?;
    match cheats::serialize(&list, program.as_deref()) {
        Some(file) => to_js(&file),
        None => Ok(JsValue::UNDEFINED),
    }
}

// =============================================================================
// File Manager
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResult {
    written: Vec<String>,
    settings_keys: usize,
    warnings: Vec<String>,
}

impl From<&ImportReport> for ImportResult {
    fn from(report: &ImportReport) -> Self {
        Self {
            written: report.written.iter().map(|(path, _)| path.clone()).collect(),
            settings_keys: report.settings_keys,
            warnings: report
                .warnings()
                .map(|entry| format!("{}: {}", entry.path, entry.reason))
                .collect(),
        }
    }
}

/// One node of the filesystem without its subtree.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeInfo<'a> {
    path: &'a str,
    name: &'a str,
    is_dir: bool,
    children: usize,
}

impl<'a> From<&'a FileNode> for NodeInfo<'a> {
    fn from(node: &'a FileNode) -> Self {
        Self {
            path: &node.path,
            name: node.name(),
            is_dir: node.is_dir,
            children: node.children.len(),
        }
    }
}

struct Inner {
    engine: MgbaEngine,
    settings: LocalStorageSettings,
}

/// File operations over a loaded mGBA module.
#[wasm_bindgen]
pub struct FileManager {
    inner: Rc<Inner>,
}

impl FileManager {
    fn with_save_states<T>(&self, f: impl FnOnce(&SaveStateManager<'_, MgbaEngine>) -> T) -> T {
        let engine = &self.inner.engine;
        let paths = engine.file_paths();
        let program = engine.game_name();
        f(&SaveStateManager::new(engine, &paths, program.as_deref()))
    }
}

#[wasm_bindgen]
impl FileManager {
    #[wasm_bindgen(constructor)]
    pub fn new(module: JsValue) -> Result<FileManager, JsValue> {
        let engine = MgbaEngine::new(module).map_err(to_js_error)?;
        Ok(Self {
            inner: Rc::new(Inner {
                engine,
                settings: LocalStorageSettings,
            }),
        })
    }

    /// Snapshot of the whole filesystem as a list of root nodes.
    #[wasm_bindgen(js_name = listAllFiles)]
    pub fn list_all_files(&self) -> Result<JsValue, JsValue> {
        let engine = &self.inner.engine;
        to_js(&crate::core::build_file_tree(engine, &engine.file_paths()))
    }

    /// Look up one path in the filesystem. Resolves to its label, kind and
    /// child count, or `undefined` if no mount contains it.
    #[wasm_bindgen(js_name = statNode)]
    pub fn stat_node(&self, path: &str) -> Result<JsValue, JsValue> {
        let engine = &self.inner.engine;
        let tree = crate::core::build_file_tree(engine, &engine.file_paths());
        match tree.find(path) {
            Some(node) => to_js(&NodeInfo::from(node)),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Write a file to its category's mount. Resolves to the category name,
    /// or `null` when the file was dropped as uncategorized.
    #[wasm_bindgen(js_name = uploadFile)]
    pub fn upload_file(&self, name: String, bytes: Vec<u8>, category: Option<String>) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let category_override = category
                .map(|c| c.parse::<FileCategory>())
                .transpose()
                .map_err(to_js_error)?;
            let file = NamedFile::new(name, bytes);
            let routed = crate::core::dispatch(&inner.engine, file, category_override)
                .await
                .map_err(to_js_error)?;
            Ok(routed.map_or(JsValue::NULL, |c| JsValue::from_str(c.as_str())))
        })
    }

    // -------------------------------------------------------------------------
    // Cheats
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = currentCheats)]
    pub fn current_cheats(&self) -> Result<JsValue, JsValue> {
        let engine = &self.inner.engine;
        let program = engine.game_name();
        to_js(&cheats::read_current_cheats(
            engine,
            &engine.file_paths(),
            program.as_deref(),
        ))
    }

    /// Replace the running program's cheat list and reload it.
    #[wasm_bindgen(js_name = saveCheats)]
    pub fn save_cheats(&self, list: JsValue) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let list: Vec<ParsedCheat> = serde_wasm_bindgen::from_value(list)?;
            let program = inner.engine.game_name();
            let Some(file) = cheats::serialize(&list, program.as_deref()) else {
                log::warn("no program loaded, cheats not saved");
                return Ok(JsValue::FALSE);
            };

            crate::core::dispatch(
                &inner.engine,
                NamedFile::new(file.name, file.content.into_bytes()),
                Some(FileCategory::Cheat),
            )
            .await
            .map_err(to_js_error)?;
            Ok(JsValue::from_bool(inner.engine.auto_load_cheats()))
        })
    }

    // -------------------------------------------------------------------------
    // Save States
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = listSaveStates)]
    pub fn list_save_states(&self) -> Vec<String> {
        self.with_save_states(|states| states.list())
    }

    #[wasm_bindgen(js_name = createSaveState)]
    pub fn create_save_state(&self, slot: u32) -> bool {
        self.with_save_states(|states| states.create(slot))
    }

    #[wasm_bindgen(js_name = loadSaveState)]
    pub fn load_save_state(&self, slot: u32) -> bool {
        self.with_save_states(|states| states.load(slot))
    }

    #[wasm_bindgen(js_name = deleteSaveState)]
    pub fn delete_save_state(&self, slot: u32) {
        self.with_save_states(|states| states.delete(slot))
    }

    #[wasm_bindgen(js_name = readSaveState)]
    pub fn read_save_state(&self, name: &str) -> Vec<u8> {
        self.with_save_states(|states| states.read_state(name))
    }

    /// Modification time of an autosave in milliseconds, if it exists.
    #[wasm_bindgen(js_name = autosaveModified)]
    pub fn autosave_modified(&self, path: &str) -> Option<f64> {
        self.with_save_states(|states| states.autosave_modified(path))
            .map(|millis| millis as f64)
    }

    #[wasm_bindgen(js_name = currentSlot)]
    pub fn current_slot(&self) -> u32 {
        self.inner
            .engine
            .game_name()
            .map_or(0, |program| crate::core::current_slot(&self.inner.settings, &program))
    }

    #[wasm_bindgen(js_name = setCurrentSlot)]
    pub fn set_current_slot(&self, slot: u32) -> Result<(), JsValue> {
        let Some(program) = self.inner.engine.game_name() else {
            return Ok(());
        };
        crate::core::set_current_slot(&self.inner.settings, &program, slot).map_err(to_js_error)
    }

    // -------------------------------------------------------------------------
    // Archives
    // -------------------------------------------------------------------------

    /// Build a backup archive of the filesystem and settings and hand it to
    /// the user. Resolves to the archive file name.
    ///
    /// With a save picker the archive is streamed into the chosen file as it
    /// is built. Without one it is assembled in memory and downloaded.
    #[wasm_bindgen(js_name = exportArchive)]
    pub fn export_archive(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let engine = &inner.engine;
            let paths = engine.file_paths();
            let name = archive::archive_name(EXPORT_PREFIX, &dom::now_iso());

            match dom::open_save_picker(&name).await? {
                Some(mut writable) => {
                    let exported =
                        archive::export_to_sink(engine, &paths, &inner.settings, &mut writable)
                            .await;
                    if let Err(e) = exported {
                        log::warn(&format!("archive export failed: {}", e));
                        let _ = writable.abort().await;
                        return Err(to_js_error(e));
                    }
                    writable.close().await?;
                }
                None => {
                    let (bytes, _) = archive::export_to_vec(engine, &paths, &inner.settings)
                        .map_err(to_js_error)?;
                    dom::download_blob(&bytes, &name, MIME_TYPE)?;
                }
            }
            Ok(JsValue::from_str(&name))
        })
    }

    /// Restore a backup archive. Resolves to a summary of written files,
    /// restored settings and per-entry warnings.
    #[wasm_bindgen(js_name = importArchive)]
    pub fn import_archive(&self, bytes: Vec<u8>) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let report = archive::import_archive(&inner.engine, &inner.settings, &bytes)
                .await
                .map_err(to_js_error)?;
            to_js(&ImportResult::from(&report))
        })
    }
}
