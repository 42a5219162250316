use serde::{Deserialize, Serialize};

// =============================================================================
// File Tree
// =============================================================================

/// A node in the engine's virtual filesystem.
///
/// Paths are absolute virtual paths as the engine reports them
/// (e.g. `/data/games/pokemon.gba`). `children` is only meaningful for
/// directories and keeps the engine's listing order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub path: String,
    pub is_dir: bool,
    #[serde(default)]
    pub children: Vec<FileNode>,
}

impl FileNode {
    /// Create an empty directory node.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            children: Vec::new(),
        }
    }

    /// Create a file node.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    /// Last path segment, used as the display label.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Append every file path below (and including) this node, depth-first.
    fn collect_files(&self, out: &mut Vec<String>) {
        if !self.is_dir {
            out.push(self.path.clone());
            return;
        }
        for child in &self.children {
            child.collect_files(out);
        }
    }

    fn find(&self, path: &str) -> Option<&FileNode> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

/// A set of independent filesystem roots.
///
/// The primary data root comes first; separately mounted trees (the autosave
/// mount) follow as siblings. Roots are never nested inside each other, so
/// traversal is a plain union.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileTree {
    pub roots: Vec<FileNode>,
}

impl FileTree {
    pub fn new(roots: Vec<FileNode>) -> Self {
        Self { roots }
    }

    /// All file paths across every root, directories excluded.
    ///
    /// Roots are visited in order, each depth-first in listing order.
    pub fn flatten_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        for root in &self.roots {
            root.collect_files(&mut files);
        }
        files
    }

    /// Look up a node by its absolute path.
    pub fn find(&self, path: &str) -> Option<&FileNode> {
        self.roots.iter().find_map(|root| root.find(path))
    }
}

// =============================================================================
// Named Files
// =============================================================================

/// A file handed to the engine: a bare file name plus its content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}
