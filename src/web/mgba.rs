//! Adapter over the mGBA emscripten module.
//!
//! The module object exposes an emscripten `FS` plus upload, save state and
//! path helpers. Everything is reached through `Reflect` so the crate does
//! not depend on generated bindings for the module.

use js_sys::{Array, Date, Function, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use super::dom;
use crate::core::engine::{
    DirectoryLister, EngineWriter, FileReader, FileRemover, SaveStateEngine,
};
use crate::core::error::EngineError;
use crate::models::{FilePaths, NamedFile};

/// Best-effort message of a thrown JS value.
fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// The loaded mGBA module.
#[derive(Clone, Debug)]
pub struct MgbaEngine {
    module: Object,
}

impl MgbaEngine {
    pub fn new(module: JsValue) -> Result<Self, EngineError> {
        module
            .dyn_into::<Object>()
            .map(|module| Self { module })
            .map_err(|_| EngineError::Unavailable("engine module is not an object".to_string()))
    }

    fn property(target: &JsValue, key: &str) -> Result<JsValue, EngineError> {
        Reflect::get(target, &key.into())
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .ok_or_else(|| EngineError::Unavailable(key.to_string()))
    }

    fn method(target: &JsValue, name: &str) -> Result<Function, EngineError> {
        Self::property(target, name)?
            .dyn_into::<Function>()
            .map_err(|_| EngineError::Unavailable(name.to_string()))
    }

    fn fs(&self) -> Result<JsValue, EngineError> {
        Self::property(&self.module, "FS")
    }

    /// Call `FS.<name>(path)`.
    fn fs_call(&self, name: &str, path: &str) -> Result<JsValue, JsValue> {
        let fs = self.fs().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let function = Self::method(&fs, name).map_err(|e| JsValue::from_str(&e.to_string()))?;
        function.call1(&fs, &path.into())
    }

    /// Mount layout reported by `filePaths()`, or the default layout.
    pub fn file_paths(&self) -> FilePaths {
        Self::method(&self.module, "filePaths")
            .ok()
            .and_then(|f| f.call0(&self.module).ok())
            .and_then(|value| serde_wasm_bindgen::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Path of the running program, if one is loaded.
    pub fn game_name(&self) -> Option<String> {
        Reflect::get(&self.module, &"gameName".into())
            .ok()?
            .as_string()
            .filter(|name| !name.is_empty())
    }

    /// Ask the engine to reload cheats for the running program.
    pub fn auto_load_cheats(&self) -> bool {
        Self::method(&self.module, "autoLoadCheats")
            .and_then(|f| {
                f.call0(&self.module)
                    .map_err(|e| EngineError::Unavailable(js_message(&e)))
            })
            .map(|result| result.as_bool().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Call a callback-style upload primitive and wait for its callback.
    ///
    /// The returned future settles only when the engine invokes the callback
    /// or the call throws. The engine must call the callback on every path,
    /// including its own failures; otherwise the future never resolves and an
    /// archive import awaiting it stays pending. There is no timeout.
    async fn upload(&self, method: &str, file: NamedFile) -> Result<(), EngineError> {
        let write_failed = |message: String| EngineError::WriteFailed {
            path: file.name.clone(),
            message,
        };

        let upload = Self::method(&self.module, method)?;
        let parts = Array::of1(&Uint8Array::from(file.bytes.as_slice()));
        let js_file = File::new_with_u8_array_sequence(&parts, &file.name)
            .map_err(|e| write_failed(js_message(&e)))?;

        let module = &self.module;
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(e) = upload.call2(module, &js_file, &resolve) {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });

        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| write_failed(js_message(&e)))
    }
}

impl DirectoryLister for MgbaEngine {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, EngineError> {
        let entries = self
            .fs_call("readdir", path)
            .map_err(|e| EngineError::ListFailed {
                path: path.to_string(),
                message: js_message(&e),
            })?;
        Ok(Array::from(&entries)
            .iter()
            .filter_map(|name| name.as_string())
            .collect())
    }

    fn is_dir(&self, path: &str) -> Result<bool, EngineError> {
        let not_found = || EngineError::NotFound(path.to_string());

        let fs = self.fs()?;
        let lookup = Self::method(&fs, "lookupPath")?;
        let found = lookup
            .call2(&fs, &path.into(), &Object::new())
            .map_err(|_| not_found())?;
        let mode = Reflect::get(&found, &"node".into())
            .and_then(|node| Reflect::get(&node, &"mode".into()))
            .map_err(|_| not_found())?;

        let is_dir = Self::method(&fs, "isDir")?;
        is_dir
            .call1(&fs, &mode)
            .map(|result| result.as_bool().unwrap_or(false))
            .map_err(|_| not_found())
    }
}

impl FileReader for MgbaEngine {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        self.fs_call("readFile", path)
            .map(|data| Uint8Array::new(&data).to_vec())
            .map_err(|e| EngineError::ReadFailed {
                path: path.to_string(),
                message: js_message(&e),
            })
    }

    fn modified_time(&self, path: &str) -> Result<u64, EngineError> {
        let stat = self
            .fs_call("stat", path)
            .map_err(|_| EngineError::NotFound(path.to_string()))?;
        let mtime = Reflect::get(&stat, &"mtime".into())
            .map_err(|_| EngineError::NotFound(path.to_string()))?;

        let millis = match mtime.as_f64() {
            Some(millis) => millis,
            None => mtime
                .dyn_into::<Date>()
                .map(|date| date.get_time())
                .map_err(|_| EngineError::NotFound(path.to_string()))?,
        };
        Ok(millis as u64)
    }
}

impl FileRemover for MgbaEngine {
    fn unlink(&self, path: &str) -> Result<(), EngineError> {
        self.fs_call("unlink", path)
            .map(|_| ())
            .map_err(|e| EngineError::RemoveFailed {
                path: path.to_string(),
                message: js_message(&e),
            })
    }
}

impl EngineWriter for MgbaEngine {
    fn autosave_dir(&self) -> String {
        self.file_paths().autosave
    }

    async fn upload_rom(&self, file: NamedFile) -> Result<(), EngineError> {
        self.upload("uploadRom", file).await
    }

    async fn upload_save(&self, file: NamedFile) -> Result<(), EngineError> {
        self.upload("uploadSaveOrSaveState", file).await
    }

    async fn upload_cheats(&self, file: NamedFile) -> Result<(), EngineError> {
        self.upload("uploadCheats", file).await
    }

    async fn upload_patch(&self, file: NamedFile) -> Result<(), EngineError> {
        self.upload("uploadPatch", file).await
    }

    async fn upload_screenshot(&self, file: NamedFile) -> Result<(), EngineError> {
        self.upload("uploadScreenshot", file).await
    }

    async fn write_autosave(&self, path: &str, bytes: Vec<u8>) -> Result<(), EngineError> {
        let write_failed = |message: String| EngineError::WriteFailed {
            path: path.to_string(),
            message,
        };

        let upload = Self::method(&self.module, "uploadAutoSaveState")?;
        let result = upload
            .call2(&self.module, &path.into(), &dom::to_uint8_array(&bytes))
            .map_err(|e| write_failed(js_message(&e)))?;

        JsFuture::from(Promise::resolve(&result))
            .await
            .map(|_| ())
            .map_err(|e| write_failed(js_message(&e)))
    }
}

impl SaveStateEngine for MgbaEngine {
    fn save_state(&self, slot: u32) -> bool {
        self.call_slot("saveState", slot)
    }

    fn load_state(&self, slot: u32) -> bool {
        self.call_slot("loadState", slot)
    }
}

impl MgbaEngine {
    fn call_slot(&self, method: &str, slot: u32) -> bool {
        Self::method(&self.module, method)
            .ok()
            .and_then(|f| f.call1(&self.module, &slot.into()).ok())
            .and_then(|result| result.as_bool())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn module_with_upload(body: &str) -> MgbaEngine {
        let module = Object::new();
        let upload = Function::new_with_args("file, done", body);
        Reflect::set(&module, &"uploadRom".into(), &upload).unwrap();
        MgbaEngine::new(module.into()).unwrap()
    }

    #[wasm_bindgen_test]
    async fn test_upload_resolves_when_callback_runs() {
        let engine = module_with_upload("this.lastName = file.name; done();");
        engine
            .upload_rom(NamedFile::new("game.gba", b"rom".to_vec()))
            .await
            .unwrap();
        let last = Reflect::get(&engine.module, &"lastName".into()).unwrap();
        assert_eq!(last.as_string().as_deref(), Some("game.gba"));
    }

    #[wasm_bindgen_test]
    async fn test_upload_rejects_when_primitive_throws() {
        let engine = module_with_upload("throw new Error('disk full');");
        let result = engine
            .upload_rom(NamedFile::new("game.gba", b"rom".to_vec()))
            .await;
        assert!(matches!(
            result,
            Err(EngineError::WriteFailed { ref message, .. }) if message == "disk full"
        ));
    }

    #[wasm_bindgen_test]
    async fn test_upload_missing_primitive_is_unavailable() {
        let engine = MgbaEngine::new(Object::new().into()).unwrap();
        let result = engine
            .upload_rom(NamedFile::new("game.gba", b"rom".to_vec()))
            .await;
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }
}
