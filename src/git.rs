//! Map absolute paths to git working-tree status.
//!
//! The table is built from `git status --porcelain -u` text and only rebuilt
//! when a fingerprint of that text changes. Lookups try an exact key first and
//! then fall back to every key the query path is a prefix of, so a directory
//! picks up the status of changed files below it.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use tracing::{debug, trace};

/// Width of the fixed `XY ` status field at the start of a porcelain line.
const STATUS_FIELD_WIDTH: usize = 3;

// ---------------------------------------------------------------------------
// StatusKind / StatusDescriptor
// ---------------------------------------------------------------------------

/// Display information for one status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusDescriptor {
    /// Lower is more severe.
    pub rank: u8,
    /// Highlight group the name is drawn with.
    pub group: &'static str,
    /// Palette name of the group's foreground color.
    pub color: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Conflicted,
    Deleted,
    Modified,
    Renamed,
    Copied,
    TypeChanged,
    Added,
    Untracked,
    Ignored,
}

impl StatusKind {
    pub const ALL: [StatusKind; 9] = [
        StatusKind::Conflicted,
        StatusKind::Deleted,
        StatusKind::Modified,
        StatusKind::Renamed,
        StatusKind::Copied,
        StatusKind::TypeChanged,
        StatusKind::Added,
        StatusKind::Untracked,
        StatusKind::Ignored,
    ];

    /// Classify a trimmed porcelain status code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        let kind = match code {
            "UU" | "AA" | "DD" | "AU" | "UA" | "DU" | "UD" => StatusKind::Conflicted,
            "D" | "AD" | "MD" | "RD" | "CD" => StatusKind::Deleted,
            "M" | "MM" | "AM" | "TM" | "CM" => StatusKind::Modified,
            "R" | "RM" => StatusKind::Renamed,
            "C" => StatusKind::Copied,
            "T" | "MT" | "AT" => StatusKind::TypeChanged,
            "A" => StatusKind::Added,
            "??" => StatusKind::Untracked,
            "!!" => StatusKind::Ignored,
            _ => return None,
        };
        Some(kind)
    }

    pub fn descriptor(self) -> StatusDescriptor {
        let (rank, group, color) = match self {
            StatusKind::Conflicted => (0, "TreecolGitConflicted", "magenta"),
            StatusKind::Deleted => (1, "TreecolGitDeleted", "red"),
            StatusKind::Modified => (2, "TreecolGitModified", "orange"),
            StatusKind::Renamed => (3, "TreecolGitRenamed", "purple"),
            StatusKind::Copied => (3, "TreecolGitCopied", "purple"),
            StatusKind::TypeChanged => (3, "TreecolGitTypeChanged", "orange"),
            StatusKind::Added => (4, "TreecolGitAdded", "green"),
            StatusKind::Untracked => (5, "TreecolGitUntracked", "yellow"),
            StatusKind::Ignored => (6, "TreecolGitIgnored", "gray"),
        };
        StatusDescriptor { rank, group, color }
    }
}

/// Descriptor for a raw status code, if the code is known.
pub fn descriptor_for(code: &str) -> Option<StatusDescriptor> {
    StatusKind::from_code(code).map(StatusKind::descriptor)
}

// ---------------------------------------------------------------------------
// Porcelain parsing
// ---------------------------------------------------------------------------

/// Byte offset of the `n`th character, or the line length when shorter.
fn char_offset(line: &str, n: usize) -> usize {
    line.char_indices()
        .nth(n)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

/// Split a porcelain line into `(status code, relative path)`.
///
/// Lines shorter than the status field keep whatever prefix they have as the
/// code and an empty path.
pub fn parse_line(line: &str) -> (&str, String) {
    let code = line[..char_offset(line, 2)].trim();
    let rest = &line[char_offset(line, STATUS_FIELD_WIDTH)..];

    // Renames and copies list `old -> new`; the status belongs to `new`.
    let path = if code.starts_with(['R', 'C']) {
        rename_target(rest)
    } else {
        rest
    };

    (code, unquote(path))
}

/// Byte length of a leading quoted path, both quotes included.
fn quoted_len(path: &str) -> Option<usize> {
    let bytes = path.as_bytes();
    if bytes.first() != Some(&b'"') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// The `new` half of `old -> new`, splitting outside quotes only.
fn rename_target(rest: &str) -> &str {
    match quoted_len(rest) {
        Some(len) => rest[len..].strip_prefix(" -> ").unwrap_or(rest),
        None => rest.split_once(" -> ").map_or(rest, |(_, new)| new),
    }
}

/// Undo git's C-style quoting. Octal escapes are raw bytes of a UTF-8 name.
fn unquote(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let Some(&next) = bytes.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        if next.is_ascii_digit() && next < b'8' {
            let digits = bytes[i + 1..]
                .iter()
                .take(3)
                .take_while(|b| (b'0'..=b'7').contains(*b))
                .count();
            let value = bytes[i + 1..i + 1 + digits]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            out.push((value & 0xff) as u8);
            i += 1 + digits;
            continue;
        }
        out.push(match next {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            other => other,
        });
        i += 2;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Hash of the porcelain text and the repository root, so the same output
/// from a different repository still rebuilds the table.
fn fingerprint(raw: &str, repo_root: &str) -> u64 {
    let mut hasher = FxHasher::default();
    repo_root.hash(&mut hasher);
    raw.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// GitStatusResolver
// ---------------------------------------------------------------------------

/// Owns the path -> status code table for one listing.
#[derive(Debug, Default)]
pub struct GitStatusResolver {
    fingerprint: Option<u64>,
    /// Absolute path -> trimmed porcelain status code.
    table: HashMap<String, String>,
}

impl GitStatusResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the table from porcelain output unless it is unchanged since
    /// the last refresh. Returns whether the table was replaced.
    pub fn refresh(&mut self, raw: &str, repo_root: &str) -> bool {
        let raw = raw.trim_end();
        let print = fingerprint(raw, repo_root);
        if self.fingerprint == Some(print) {
            trace!(fingerprint = print, "git status unchanged");
            return false;
        }

        let root = repo_root.trim_end_matches('/');
        let mut table = HashMap::new();
        for line in raw.lines().filter(|l| !l.is_empty()) {
            if line.len() < STATUS_FIELD_WIDTH {
                debug!(line, "short porcelain line");
            }
            let (code, path) = parse_line(line);
            table.insert(format!("{}/{}", root, path), code.to_string());
        }

        debug!(entries = table.len(), fingerprint = print, "git status rebuilt");
        self.table = table;
        self.fingerprint = Some(print);
        true
    }

    /// Raw status code applying to `full_path` or anything below it.
    ///
    /// When several nested paths match, the lexicographically smallest code
    /// wins.
    pub fn code_for(&self, full_path: &str) -> Option<&str> {
        if let Some(code) = self.table.get(full_path) {
            return Some(code.as_str());
        }

        self.table
            .iter()
            .filter(|(path, _)| path.starts_with(full_path))
            .map(|(_, code)| code.as_str())
            .min()
    }

    pub fn status_for(&self, full_path: &str) -> Option<StatusDescriptor> {
        self.code_for(full_path).and_then(descriptor_for)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
