//! Virtual path helpers.
//!
//! Engine paths are absolute (`/data/games/a.gba`); archive paths are the
//! same paths with leading slashes removed (`data/games/a.gba`).

/// Remove every leading `/`.
pub fn strip_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Normalize an archive entry name: backslashes become `/` and leading
/// slashes are removed.
pub fn normalize_entry_path(name: &str) -> String {
    strip_leading_slashes(&name.replace('\\', "/")).to_string()
}

/// Check whether a normalized path contains a `..` segment.
pub fn has_parent_traversal(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}

/// Last segment of a path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Join a directory and a child name with a single separator.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Replace the final extension of a file name.
///
/// `extension` includes its leading dot. A name without an extension gets
/// `extension` appended.
pub fn replace_extension(name: &str, extension: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{}{}", stem, extension),
        _ => format!("{}{}", name, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_slashes() {
        assert_eq!(strip_leading_slashes("///data/a.gba"), "data/a.gba");
        assert_eq!(strip_leading_slashes("data/a.gba"), "data/a.gba");
        assert_eq!(strip_leading_slashes("/"), "");
    }

    #[test]
    fn test_normalize_entry_path() {
        assert_eq!(normalize_entry_path("\\data\\saves\\a.sav"), "data/saves/a.sav");
        assert_eq!(normalize_entry_path("//autosave/a_auto.ss"), "autosave/a_auto.ss");
    }

    #[test]
    fn test_parent_traversal() {
        assert!(has_parent_traversal("../evil.txt"));
        assert!(has_parent_traversal("data/../../etc/passwd"));
        assert!(!has_parent_traversal("data/games/a..b.gba"));
        assert!(!has_parent_traversal("data/games/a.gba"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("data/games/a.gba"), "a.gba");
        assert_eq!(file_name("a.gba"), "a.gba");
        assert_eq!(file_name("data/"), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/data", "games"), "/data/games");
        assert_eq!(join("/", "data"), "/data");
    }

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("testGame.gba", ".cheats"), "testGame.cheats");
        assert_eq!(replace_extension("my.game.gba", ".ss"), "my.game.ss");
        assert_eq!(replace_extension("noext", ".cheats"), "noext.cheats");
        assert_eq!(replace_extension(".hidden", ".ss"), ".hidden.ss");
    }
}
