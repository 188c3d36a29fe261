use std::path::Path;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// TreeEntry
// ---------------------------------------------------------------------------

/// One visible row of the file tree, immutable for the duration of a render
/// pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeEntry {
    /// Full tree path (absolute for filesystem listings).
    pub path: String,
    /// Depth relative to the listing root; 0 is a root-level row.
    pub level: usize,
    pub is_dir: bool,
    pub is_expanded: bool,
    pub is_link: bool,
    pub size: Option<u64>,
    /// Modification time in seconds since the UNIX epoch.
    pub mtime: Option<i64>,
}

impl TreeEntry {
    pub fn new(path: impl Into<String>, level: usize, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            level,
            is_dir,
            ..Self::default()
        }
    }

    /// Last path component, ignoring a trailing `/`.
    pub fn name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.path.as_str())
    }

    /// Substring after the last `.` of the name, or `""` when there is none.
    pub fn extension(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(idx) => &name[idx + 1..],
            None => "",
        }
    }

    /// Path used for git lookups: directories carry a trailing `/`.
    pub fn status_path(&self) -> String {
        if self.is_dir && !self.path.ends_with('/') {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Host boundary
// ---------------------------------------------------------------------------

/// Item record as handed over by a host listing. Every field is optional;
/// defaults are applied once in [`TreeEntry::from`].
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HostItem {
    pub word: String,
    pub tree_path: Option<String>,
    pub level: usize,
    pub is_tree: bool,
    pub is_expanded: bool,
    pub action: Option<ActionData>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionData {
    pub path: Option<String>,
    pub is_directory: Option<bool>,
    pub is_link: Option<bool>,
    pub size: Option<u64>,
    pub mtime: Option<i64>,
}

impl From<HostItem> for TreeEntry {
    fn from(item: HostItem) -> Self {
        let action = item.action.unwrap_or_default();
        let path = item
            .tree_path
            .or(action.path)
            .unwrap_or(item.word);

        let is_dir = action.is_directory.unwrap_or(item.is_tree);

        TreeEntry {
            is_expanded: item.is_expanded,
            is_link: action.is_link.unwrap_or(false),
            size: action.size,
            mtime: action.mtime,
            ..TreeEntry::new(path, item.level, is_dir)
        }
    }
}

/// Parse a JSON array of host items into tree entries.
pub fn parse_items(json: &str) -> crate::error::Result<Vec<TreeEntry>> {
    let items: Vec<HostItem> = serde_json::from_str(json)?;
    Ok(items.into_iter().map(TreeEntry::from).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
