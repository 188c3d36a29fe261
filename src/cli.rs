use clap::Parser;
use std::path::PathBuf;

use crate::config::SortMethod;

/// Browse a directory with tree indentation, file icons and git status
#[derive(Parser, Debug)]
#[command(name = "treecol")]
#[command(version)]
#[command(about = "Browse a directory with tree indentation, file icons and git status")]
pub struct Cli {
    /// Directory to list
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Sort method for siblings
    #[arg(short = 's', long = "sort", value_enum)]
    pub sort: Option<SortMethod>,

    /// Sort directories among files instead of before them
    #[arg(long = "no-trees-first")]
    pub no_trees_first: bool,

    /// Display columns reserved for each icon
    #[arg(long = "icon-width")]
    pub icon_width: Option<usize>,

    /// Disable git status highlighting
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Show the target of symbolic links
    #[arg(long = "link-target")]
    pub link_target: bool,

    /// JSON column configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Show hidden files and directories
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Expand directories to this depth in print modes
    #[arg(short = 'd', long = "depth", default_value_t = 1)]
    pub depth: usize,

    /// Print the column once as plain text and exit
    #[arg(long = "print", conflicts_with = "json")]
    pub print: bool,

    /// Print the column once as JSON lines with highlights and exit
    #[arg(long = "json")]
    pub json: bool,

    /// Render a host item batch (JSON array) from a file, or `-` for stdin
    #[arg(long = "items")]
    pub items: Option<String>,

    /// Refresh interval in seconds
    #[arg(short = 'i', long = "interval", default_value_t = 0.25)]
    pub interval: f64,

    /// Write logs to this file (or directory)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Whether output goes straight to stdout instead of the TUI.
    pub fn is_batch(&self) -> bool {
        self.print || self.json || self.items.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["treecol"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.depth, 1);
        assert!(cli.sort.is_none());
        assert!(!cli.is_batch());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "treecol", "src", "--sort", "size", "--no-trees-first", "--icon-width", "3", "--json",
            "-d", "2",
        ]);
        assert_eq!(cli.sort, Some(SortMethod::Size));
        assert!(cli.no_trees_first);
        assert_eq!(cli.icon_width, Some(3));
        assert!(cli.is_batch());
        assert_eq!(cli.depth, 2);
    }

    #[test]
    fn test_print_and_json_conflict() {
        assert!(Cli::try_parse_from(["treecol", "--print", "--json"]).is_err());
    }
}
