use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::config::SortMethod;
use crate::error::Result;
use crate::item::TreeEntry;
use crate::tree::sort_entries;

/// Rows of one refresh, in display order, plus each directory's children as
/// a separate sibling group.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub rows: Vec<TreeEntry>,
    pub sibling_groups: Vec<Vec<TreeEntry>>,
}

/// A lazily expanded directory tree rooted at one path.
pub struct Listing {
    root_path: PathBuf,
    show_hidden: bool,
    sort: SortMethod,
    trees_first: bool,
    expanded: HashSet<PathBuf>,
}

impl Listing {
    pub fn new(root_path: PathBuf, show_hidden: bool, sort: SortMethod, trees_first: bool) -> Self {
        Self {
            root_path,
            show_hidden,
            sort,
            trees_first,
            expanded: HashSet::new(),
        }
    }

    // ------------------------------------------------------------------
    // Expansion state
    // ------------------------------------------------------------------

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    pub fn expand(&mut self, path: &Path) {
        self.expanded.insert(path.to_path_buf());
    }

    /// Collapse `path`; returns whether it was expanded.
    pub fn collapse(&mut self, path: &Path) -> bool {
        self.expanded.remove(path)
    }

    pub fn toggle(&mut self, path: &Path) {
        if !self.collapse(path) {
            self.expand(path);
        }
    }

    /// Expand every directory above `depth` levels below the root.
    pub fn expand_to_depth(&mut self, depth: usize) {
        if depth <= 1 {
            return;
        }
        let walker = WalkDir::new(&self.root_path)
            .min_depth(1)
            .max_depth(depth - 1)
            .into_iter()
            .filter_entry(|e| self.show_hidden || !is_hidden(e))
            .filter_map(|e| e.ok());

        let dirs: Vec<PathBuf> = walker
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        self.expanded.extend(dirs);
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    /// Sorted direct children of `dir`, tagged with `level`.
    pub fn read_children(&self, dir: &Path, level: usize) -> Result<Vec<TreeEntry>> {
        let mut children = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.show_hidden || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) if err.depth() == 0 => return Err(std::io::Error::from(err).into()),
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    continue;
                }
            };
            children.push(self.tree_entry(&entry, level));
        }

        let sorted = sort_entries(&children, self.sort, self.trees_first);
        Ok(sorted.into_iter().cloned().collect())
    }

    fn tree_entry(&self, entry: &DirEntry, level: usize) -> TreeEntry {
        let path = entry.path();
        let is_link = entry.path_is_symlink();
        // Links report their own metadata; follow them to classify.
        let meta = if is_link {
            fs::metadata(path).ok()
        } else {
            entry.metadata().ok()
        };

        let is_dir = meta.as_ref().is_some_and(|m| m.is_dir());
        let size = meta.as_ref().filter(|m| m.is_file()).map(|m| m.len());
        let mtime = meta
            .as_ref()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);

        TreeEntry {
            path: path.to_string_lossy().into_owned(),
            level,
            is_dir,
            is_expanded: is_dir && self.is_expanded(path),
            is_link,
            size,
            mtime,
        }
    }

    /// Walk the root and every expanded directory below it.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();
        self.collect(&self.root_path, 0, &mut snapshot)?;
        Ok(snapshot)
    }

    fn collect(&self, dir: &Path, level: usize, snapshot: &mut Snapshot) -> Result<()> {
        let children = self.read_children(dir, level)?;
        snapshot.sibling_groups.push(children.clone());

        for child in children {
            let recurse = child.is_expanded;
            let path = PathBuf::from(&child.path);
            snapshot.rows.push(child);
            if recurse {
                self.collect(&path, level + 1, snapshot)?;
            }
        }
        Ok(())
    }
}

/// Hidden entries start with a dot; the walk root never counts.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
