//! Last-sibling bookkeeping and box-drawing indentation for tree rows.
//!
//! The resolver never sees the whole tree, only the batch of rows the host
//! materialized for the current refresh. Each recompute looks at the deepest
//! tier of that batch, orders it the way the host orders siblings, and records
//! which child name comes last under its parent. `indent_for` then walks a
//! row's ancestors and picks corner, branch, bar or blank glyphs from those
//! records.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::SortMethod;
use crate::item::TreeEntry;

const BRANCH: &str = "├ ";
const CORNER: &str = "└ ";
const BAR: &str = "│ ";
const BLANK: &str = "  ";

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

fn compare(a: &TreeEntry, b: &TreeEntry, method: SortMethod) -> Ordering {
    match method {
        SortMethod::None => Ordering::Equal,
        SortMethod::Filename => a.path.cmp(&b.path),
        SortMethod::Extension => a.extension().cmp(b.extension()),
        SortMethod::Size => size_key(a).cmp(&size_key(b)),
        SortMethod::Time => a.mtime.unwrap_or(-1).cmp(&b.mtime.unwrap_or(-1)),
    }
}

/// Unknown sizes sort before every known size.
fn size_key(entry: &TreeEntry) -> i128 {
    entry.size.map(i128::from).unwrap_or(-1)
}

/// Order `entries` by `method` (stable, ascending), then move directories in
/// front of files when `trees_first` is set, keeping each group's order.
pub fn sort_entries<'a>(
    entries: impl IntoIterator<Item = &'a TreeEntry>,
    method: SortMethod,
    trees_first: bool,
) -> Vec<&'a TreeEntry> {
    let mut sorted: Vec<&TreeEntry> = entries.into_iter().collect();
    sorted.sort_by(|a, b| compare(a, b, method));

    if trees_first {
        let (dirs, files): (Vec<&TreeEntry>, Vec<&TreeEntry>) =
            sorted.into_iter().partition(|e| e.is_dir);
        sorted = dirs;
        sorted.extend(files);
    }

    sorted
}

/// Split a tree path into `(parent, name)`, ignoring a trailing `/`.
fn split_path(path: &Path) -> Option<(PathBuf, String)> {
    let name = path.file_name()?.to_string_lossy().into_owned();
    let parent = path.parent()?.to_path_buf();
    Some((parent, name))
}

// ---------------------------------------------------------------------------
// IndentResolver
// ---------------------------------------------------------------------------

/// Owns the last-sibling table for one listing.
#[derive(Debug, Default)]
pub struct IndentResolver {
    /// Parent directory -> name of its last child under the active ordering.
    last_children: HashMap<PathBuf, String>,
}

impl IndentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the last child of the deepest tier present in `entries`.
    ///
    /// Only the parent of the single final row is updated; callers with
    /// several open directories on the same tier call this once per sibling
    /// group.
    pub fn recompute_last_siblings(
        &mut self,
        entries: &[TreeEntry],
        method: SortMethod,
        trees_first: bool,
    ) {
        let Some(deepest) = entries.iter().map(|e| e.level).max() else {
            return;
        };

        let tier = entries.iter().filter(|e| e.level == deepest);
        let sorted = sort_entries(tier, method, trees_first);

        let Some(last) = sorted.last() else {
            return;
        };
        if let Some((parent, name)) = split_path(Path::new(&last.path)) {
            trace!(parent = %parent.display(), %name, "last sibling");
            self.last_children.insert(parent, name);
        }
    }

    /// Whether `path` is recorded as the last child of its parent.
    pub fn is_last(&self, path: &Path) -> bool {
        match split_path(path) {
            Some((parent, name)) => self.last_children.get(&parent) == Some(&name),
            None => false,
        }
    }

    /// Indentation glyphs for a row at `level`, one two-column glyph per level.
    pub fn indent_for(&self, path: &str, level: usize) -> String {
        let mut indent = String::with_capacity(level * BRANCH.len());
        let mut current = Path::new(path);

        for step in 0..level {
            let is_last = self.is_last(current);
            let glyph = match (step, is_last) {
                (0, true) => CORNER,
                (0, false) => BRANCH,
                (_, true) => BLANK,
                (_, false) => BAR,
            };
            indent.insert_str(0, glyph);
            current = current.parent().unwrap_or(current);
        }

        indent
    }

    pub fn last_child_of(&self, parent: &Path) -> Option<&str> {
        self.last_children.get(parent).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.last_children.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
