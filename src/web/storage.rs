//! Settings repository backed by `localStorage`.

use std::collections::BTreeMap;

use super::dom;
use crate::core::engine::SettingsRepository;
use crate::core::error::SettingsError;

/// The page's `localStorage`, looked up on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageSettings;

impl SettingsRepository for LocalStorageSettings {
    fn get(&self, key: &str) -> Option<String> {
        dom::local_storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let storage = dom::local_storage().ok_or(SettingsError::StorageUnavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| SettingsError::SaveFailed(key.to_string()))
    }

    fn get_all(&self) -> BTreeMap<String, String> {
        let Some(storage) = dom::local_storage() else {
            return BTreeMap::new();
        };
        let len = storage.length().unwrap_or(0);

        (0..len)
            .filter_map(|i| storage.key(i).ok().flatten())
            .filter_map(|key| {
                let value = storage.get_item(&key).ok().flatten()?;
                Some((key, value))
            })
            .collect()
    }
}
