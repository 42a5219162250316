//! DOM and Web API helpers.

use js_sys::{Array, Date, Function, Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Storage, Url, Window};

use crate::config::archive::{ACCEPTED_EXTENSIONS, MIME_TYPE};
use crate::core::archive::ArchiveSink;
use crate::core::error::ArchiveError;

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get localStorage.
#[inline]
pub fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// Current time as an ISO-8601 string.
pub fn now_iso() -> String {
    Date::new_0().to_iso_string().into()
}

/// Copy bytes into a fresh JS `Uint8Array`.
pub fn to_uint8_array(bytes: &[u8]) -> Uint8Array {
    Uint8Array::from(bytes)
}

// =============================================================================
// Saving Files
// =============================================================================

/// Trigger a download of `bytes` through a temporary object URL.
pub fn download_blob(bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), JsValue> {
    let document = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document not available"))?;

    let parts = Array::of1(&to_uint8_array(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&url)
}

/// Options object for `showSaveFilePicker`.
fn save_picker_options(file_name: &str) -> Result<Object, JsValue> {
    let accept = Object::new();
    let extensions: Array = ACCEPTED_EXTENSIONS.iter().map(|e| JsValue::from_str(e)).collect();
    Reflect::set(&accept, &MIME_TYPE.into(), &extensions)?;

    let file_type = Object::new();
    Reflect::set(&file_type, &"description".into(), &"Zip archive".into())?;
    Reflect::set(&file_type, &"accept".into(), &accept)?;

    let options = Object::new();
    Reflect::set(&options, &"suggestedName".into(), &file_name.into())?;
    Reflect::set(&options, &"types".into(), &Array::of1(&file_type))?;
    Ok(options)
}

async fn call_async(
    target: &JsValue,
    method: &str,
    arg: Option<&JsValue>,
) -> Result<JsValue, JsValue> {
    let function = Reflect::get(target, &method.into())?.dyn_into::<Function>()?;
    let result = match arg {
        Some(arg) => function.call1(target, arg)?,
        None => function.call0(target)?,
    };
    JsFuture::from(Promise::from(result)).await
}

/// Open the File System Access save picker and return a writable stream for
/// the chosen file.
///
/// Returns `Ok(None)` when the browser has no save picker. Rejects when the
/// user dismisses the picker.
pub async fn open_save_picker(file_name: &str) -> Result<Option<WritableSink>, JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
    let picker = Reflect::get(&window, &"showSaveFilePicker".into())?;
    if !picker.is_function() {
        return Ok(None);
    }

    let options = save_picker_options(file_name)?;
    let handle = call_async(&window, "showSaveFilePicker", Some(&JsValue::from(options))).await?;
    let writable = call_async(&handle, "createWritable", None).await?;
    Ok(Some(WritableSink { writable }))
}

/// `FileSystemWritableFileStream` fed one archive chunk at a time.
pub struct WritableSink {
    writable: JsValue,
}

impl WritableSink {
    /// Commit the written file. Nothing is visible on disk before this.
    pub async fn close(&self) -> Result<(), JsValue> {
        call_async(&self.writable, "close", None).await.map(|_| ())
    }

    /// Discard the partially written file.
    pub async fn abort(&self) -> Result<(), JsValue> {
        call_async(&self.writable, "abort", None).await.map(|_| ())
    }
}

impl ArchiveSink for WritableSink {
    async fn write_chunk(&mut self, chunk: Vec<u8>) -> Result<(), ArchiveError> {
        let data = JsValue::from(to_uint8_array(&chunk));
        call_async(&self.writable, "write", Some(&data))
            .await
            .map(|_| ())
            .map_err(|e| ArchiveError::Sink(format!("{:?}", e)))
    }
}
