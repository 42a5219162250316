//! Mount layout of the engine's virtual filesystem.
//!
//! The engine dedicates one top-level directory to each kind of data
//! (games, saves, states, cheats, screenshots, patches) under a shared data
//! root, and keeps autosaves on a separate mount outside that root.

use serde::{Deserialize, Serialize};

use crate::config::mounts;

/// Directory layout reported by the engine's `filePaths()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePaths {
    /// Data root containing every per-category mount except autosave
    pub root: String,
    pub cheats_path: String,
    pub game_path: String,
    pub save_path: String,
    pub save_state_path: String,
    pub screenshots_path: String,
    #[serde(default = "default_patch_path")]
    pub patch_path: String,
    /// Separate mount holding one autosave state per program
    #[serde(default = "default_autosave_path")]
    pub autosave: String,
}

fn default_patch_path() -> String {
    format!("{}/patches", mounts::ROOT)
}

fn default_autosave_path() -> String {
    mounts::AUTOSAVE.to_string()
}

impl Default for FilePaths {
    fn default() -> Self {
        Self::under_root(mounts::ROOT, mounts::AUTOSAVE)
    }
}

impl FilePaths {
    /// Build the conventional layout below `root`.
    pub fn under_root(root: impl Into<String>, autosave: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            cheats_path: format!("{}/cheats", root),
            game_path: format!("{}/games", root),
            save_path: format!("{}/saves", root),
            save_state_path: format!("{}/states", root),
            screenshots_path: format!("{}/screenshots", root),
            patch_path: format!("{}/patches", root),
            autosave: autosave.into(),
            root,
        }
    }

    /// Every per-category mount, autosave last.
    pub fn mounts(&self) -> [&str; 7] {
        [
            &self.game_path,
            &self.save_path,
            &self.save_state_path,
            &self.cheats_path,
            &self.screenshots_path,
            &self.patch_path,
            &self.autosave,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = FilePaths::default();
        assert_eq!(paths.root, "/data");
        assert_eq!(paths.save_state_path, "/data/states");
        assert_eq!(paths.cheats_path, "/data/cheats");
        assert_eq!(paths.autosave, "/autosave");
    }

    #[test]
    fn test_deserialize_engine_paths() {
        let json = r#"{
            "root": "/data",
            "cheatsPath": "/data/cheats",
            "gamePath": "/data/games",
            "savePath": "/data/saves",
            "saveStatePath": "/data/states",
            "screenshotsPath": "/data/screenshots"
        }"#;
        let paths: FilePaths = serde_json::from_str(json).unwrap();
        assert_eq!(paths, FilePaths::default());
    }

    #[test]
    fn test_mounts_lists_autosave_last() {
        let paths = FilePaths::under_root("/x", "/auto");
        assert_eq!(paths.mounts()[0], "/x/games");
        assert_eq!(paths.mounts()[6], "/auto");
    }
}
