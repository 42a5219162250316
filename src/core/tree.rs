//! Tree view of the engine's virtual filesystem.
//!
//! Trees are rebuilt from the engine on every call; nothing is cached.

use super::engine::DirectoryLister;
use crate::config::FS_IGNORE_PATHS;
use crate::models::{FileNode, FilePaths, FileTree};
use crate::utils::{log, path};

/// Recursively materialize the directory at `root`.
///
/// A root that cannot be listed yields an empty directory node. Children
/// keep the engine's listing order.
pub fn build_tree<F: DirectoryLister + ?Sized>(fs: &F, root: &str) -> FileNode {
    let mut node = FileNode::directory(root);
    fill_children(fs, &mut node);
    node
}

fn fill_children<F: DirectoryLister + ?Sized>(fs: &F, node: &mut FileNode) {
    let names = match fs.list_dir(&node.path) {
        Ok(names) => names,
        Err(e) => {
            log::debug(&format!("treating {} as empty: {}", node.path, e));
            return;
        }
    };

    for name in names {
        if FS_IGNORE_PATHS.contains(&name.as_str()) {
            continue;
        }

        let child_path = path::join(&node.path, &name);
        let is_dir = match fs.is_dir(&child_path) {
            Ok(is_dir) => is_dir,
            Err(e) => {
                log::warn(&format!("skipping {}: {}", child_path, e));
                continue;
            }
        };

        let mut child = if is_dir {
            FileNode::directory(child_path)
        } else {
            FileNode::file(child_path)
        };
        if child.is_dir {
            fill_children(fs, &mut child);
        }
        node.children.push(child);
    }
}

/// Build the combined view: the data root followed by the autosave mount.
///
/// The autosave mount lives outside the data root and is added as a
/// separate root rather than nested.
pub fn build_file_tree<F: DirectoryLister + ?Sized>(fs: &F, paths: &FilePaths) -> FileTree {
    let mut roots = vec![build_tree(fs, &paths.root)];
    let autosave_nested = paths.autosave == paths.root
        || paths
            .autosave
            .starts_with(&format!("{}/", paths.root.trim_end_matches('/')));
    if !autosave_nested {
        roots.push(build_tree(fs, &paths.autosave));
    }
    FileTree::new(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MemoryEngine;

    fn engine() -> MemoryEngine {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/data/games/a.gba", b"rom-a");
        engine.insert_file("/data/saves/a.sav", b"save-a");
        engine.insert_dir("/data/screenshots");
        engine.insert_file("/autosave/a_auto.ss", b"auto");
        engine
    }

    #[test]
    fn test_build_tree_recurses() {
        let root = build_tree(&engine(), "/data");
        assert!(root.is_dir);
        let games = root
            .children
            .iter()
            .find(|c| c.path == "/data/games")
            .unwrap();
        assert!(games.is_dir);
        assert_eq!(games.children, vec![FileNode::file("/data/games/a.gba")]);
    }

    #[test]
    fn test_children_keep_listing_order() {
        let engine = MemoryEngine::new(FilePaths::default());
        engine.insert_file("/r/a.gba", b"a");
        engine.insert_file("/r/m.sav", b"m");
        engine.insert_file("/r/z.gba", b"z");
        engine.set_listing("/r", &["z.gba", ".", "a.gba", "m.sav", ".."]);

        let root = build_tree(&engine, "/r");
        let children: Vec<&str> = root.children.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(children, vec!["/r/z.gba", "/r/a.gba", "/r/m.sav"]);

        let tree = FileTree::new(vec![root]);
        assert_eq!(tree.flatten_files(), vec!["/r/z.gba", "/r/a.gba", "/r/m.sav"]);
    }

    #[test]
    fn test_pseudo_entries_are_skipped() {
        let root = build_tree(&engine(), "/data");
        assert!(root.children.iter().all(|c| !c.path.ends_with("/.")));
        assert!(root.children.iter().all(|c| !c.path.ends_with("/..")));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let root = build_tree(&engine(), "/nowhere");
        assert_eq!(root, FileNode::directory("/nowhere"));
    }

    #[test]
    fn test_empty_directory_kept() {
        let root = build_tree(&engine(), "/data");
        let shots = root
            .children
            .iter()
            .find(|c| c.path == "/data/screenshots")
            .unwrap();
        assert!(shots.is_dir);
        assert!(shots.children.is_empty());
    }

    #[test]
    fn test_file_tree_stitches_autosave_root() {
        let tree = build_file_tree(&engine(), &FilePaths::default());
        assert_eq!(tree.roots.len(), 2);
        assert_eq!(tree.roots[1].path, "/autosave");

        let mut files = tree.flatten_files();
        files.sort();
        assert_eq!(
            files,
            vec!["/autosave/a_auto.ss", "/data/games/a.gba", "/data/saves/a.sav"]
        );
    }

    #[test]
    fn test_nested_autosave_not_duplicated() {
        let paths = FilePaths::under_root("/data", "/data/autosave");
        let engine = MemoryEngine::new(paths.clone());
        engine.insert_file("/data/autosave/a_auto.ss", b"auto");

        let tree = build_file_tree(&engine, &paths);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.flatten_files(), vec!["/data/autosave/a_auto.ss"]);
    }
}
