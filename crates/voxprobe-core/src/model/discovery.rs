//! Bounded directory indexing
//! Lists the files (and directories) of a model pack for the classifiers

use std::fs;
use std::path::{Path, PathBuf};

use super::types::FileEntry;

/// Deepest subdirectory level descended below the scan root.
/// Files directly in the root are at depth 0.
pub const MAX_SCAN_DEPTH: usize = 4;

/// A directory found while indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the directory
    pub path: PathBuf,
    /// Case-folded directory name
    pub name: String,
}

/// Everything found under a scan root
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    /// Regular files, in scan order
    pub files: Vec<FileEntry>,
    /// Subdirectories, in scan order (the root itself is not included)
    pub directories: Vec<DirEntry>,
}

impl FileIndex {
    /// First directory with exactly this (lowercase) name
    pub fn find_directory(&self, name: &str) -> Option<&DirEntry> {
        self.directories.iter().find(|d| d.name == name)
    }

    /// True when no regular file was found
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Recursive, depth-bounded directory lister
#[derive(Debug, Clone, Copy)]
pub struct FileIndexer {
    max_depth: usize,
}

impl FileIndexer {
    /// Indexer using [`MAX_SCAN_DEPTH`]
    pub fn new() -> Self {
        Self {
            max_depth: MAX_SCAN_DEPTH,
        }
    }

    #[cfg(test)]
    fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Index `root`.
    ///
    /// Returns an empty index when `root` is missing or not a directory;
    /// turning that into an error is up to the caller. Within a directory,
    /// files come before subdirectories and both are sorted by name, so two
    /// scans of an unchanged tree produce identical indexes. Symlinks are
    /// followed; the depth bound keeps cycles finite.
    pub fn scan(&self, root: &Path) -> FileIndex {
        let mut index = FileIndex::default();
        if root.is_dir() {
            self.walk(root, 0, &mut index);
        }
        tracing::trace!(
            "Indexed {:?}: {} files, {} directories",
            root,
            index.files.len(),
            index.directories.len()
        );
        index
    }

    fn walk(&self, dir: &Path, depth: usize, index: &mut FileIndex) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {:?}: {}", dir, e);
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
        paths.sort();

        let mut subdirs = Vec::new();
        for path in paths {
            // fs::metadata follows symlinks
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            if metadata.is_file() {
                index.files.push(FileEntry::new(path, metadata.len()));
            } else if metadata.is_dir() {
                subdirs.push(path);
            }
        }

        if depth >= self.max_depth {
            return;
        }
        for path in subdirs {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            index.directories.push(DirEntry {
                path: path.clone(),
                name,
            });
            self.walk(&path, depth + 1, index);
        }
    }
}

impl Default for FileIndexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Index `root` with the default depth bound
pub fn index_files(root: &Path) -> FileIndex {
    FileIndexer::new().scan(root)
}
