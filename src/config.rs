use std::collections::HashMap;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Sort criterion shared by the host listing and the last-sibling resolver.
#[derive(Deserialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    None,
    Extension,
    Size,
    Time,
    #[default]
    Filename,
}

impl SortMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMethod::None => "none",
            SortMethod::Extension => "extension",
            SortMethod::Size => "size",
            SortMethod::Time => "time",
            SortMethod::Filename => "filename",
        }
    }
}

/// Column configuration. Every field has a default so partial JSON documents
/// are accepted.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnConfig {
    pub sort: SortMethod,
    pub sort_trees_first: bool,
    /// Display width of the icon cell.
    pub icon_width: usize,
    /// Spaces between the icon cell and the name.
    pub span: usize,
    /// Extra columns appended to the computed column width.
    pub padding: usize,
    pub collapsed_icon: Option<String>,
    pub expanded_icon: Option<String>,
    pub link_icon: Option<String>,
    pub default_icon: Option<String>,
    pub git_status: bool,
    pub show_link_target: bool,
    /// Palette overrides: name -> `#rrggbb` or any ratatui color name.
    pub palette: HashMap<String, String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            sort: SortMethod::Filename,
            sort_trees_first: true,
            icon_width: 2,
            span: 1,
            padding: 1,
            collapsed_icon: None,
            expanded_icon: None,
            link_icon: None,
            default_icon: None,
            git_status: true,
            show_link_target: false,
            palette: HashMap::new(),
        }
    }
}

impl ColumnConfig {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: ColumnConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.icon_width == 0 {
            return Err(Error::Config("iconWidth must be at least 1".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ColumnConfig::default();
        assert_eq!(config.sort, SortMethod::Filename);
        assert!(config.sort_trees_first);
        assert_eq!(config.icon_width, 2);
        assert!(config.git_status);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ColumnConfig::from_json(r#"{"sort": "size", "expandedIcon": "v"}"#).unwrap();
        assert_eq!(config.sort, SortMethod::Size);
        assert_eq!(config.expanded_icon.as_deref(), Some("v"));
        assert!(config.sort_trees_first);
        assert_eq!(config.span, 1);
    }

    #[test]
    fn test_unknown_sort_rejected() {
        assert!(ColumnConfig::from_json(r#"{"sort": "random"}"#).is_err());
    }

    #[test]
    fn test_zero_icon_width_rejected() {
        let err = ColumnConfig::from_json(r#"{"iconWidth": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("column.json");
        fs::write(&path, r##"{"sortTreesFirst": false, "palette": {"red": "#ff0000"}}"##).unwrap();
        let config = ColumnConfig::load(&path).unwrap();
        assert!(!config.sort_trees_first);
        assert_eq!(config.palette.get("red").map(String::as_str), Some("#ff0000"));
    }
}
