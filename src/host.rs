//! Collaborators the column relies on but does not implement itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

/// Services a host listing provides to the column.
pub trait Host {
    /// Display width of `text` in terminal columns.
    fn display_width(&self, text: &str) -> usize;

    /// Real path behind a symbolic link.
    fn resolve_link(&self, path: &Path) -> Result<PathBuf>;

    /// Top level of the git repository containing `dir`, if any.
    fn repo_root(&self, dir: &Path) -> Result<Option<PathBuf>>;

    /// Raw `git status --porcelain -u` output for the repository at `root`.
    fn porcelain_status(&self, root: &Path) -> Result<String>;
}

/// Host backed by the local filesystem and the `git` executable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    fn git(&self, dir: &Path, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| Error::Git {
                command: args.join(" "),
                message: e.to_string(),
            })
    }
}

impl Host for SystemHost {
    fn display_width(&self, text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }

    fn resolve_link(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|source| Error::Link {
            path: path.to_path_buf(),
            source,
        })
    }

    fn repo_root(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let output = self.git(dir, &["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            // Not inside a work tree.
            debug!(dir = %dir.display(), "no git repository");
            return Ok(None);
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            return Ok(None);
        }
        Ok(Some(PathBuf::from(root)))
    }

    fn porcelain_status(&self, root: &Path) -> Result<String> {
        let args = ["status", "--porcelain", "-u"];
        let output = self.git(root, &args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git {
                command: args.join(" "),
                message: stderr.trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width() {
        let host = SystemHost;
        assert_eq!(host.display_width("abc"), 3);
        assert_eq!(host.display_width("├ "), 2);
        assert_eq!(host.display_width("日本"), 4);
        assert_eq!(host.display_width(""), 0);
    }

    #[test]
    fn test_resolve_link_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = SystemHost.resolve_link(&missing).unwrap_err();
        assert!(matches!(err, Error::Link { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_link_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        fs::write(&target, "x").unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let resolved = SystemHost.resolve_link(&link).unwrap();
        assert_eq!(resolved, fs::canonicalize(&target).unwrap());
    }
}
