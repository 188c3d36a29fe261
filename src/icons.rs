//! Icon glyphs and colors for tree rows.
//!
//! Structural kinds (directories, links) are consulted before the extension
//! table. Extensions are matched case-sensitively on the text after the last
//! `.` of the name; anything unmatched gets the default file icon.

use std::collections::HashMap;
use std::str::FromStr;

use ratatui::style::Color;

use crate::config::ColumnConfig;
use crate::error::{Error, Result};
use crate::item::TreeEntry;

// ---------------------------------------------------------------------------
// IconDescriptor
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconDescriptor {
    pub glyph: String,
    pub group: &'static str,
    /// Palette name of the glyph color.
    pub color: &'static str,
}

impl IconDescriptor {
    fn new(glyph: &str, group: &'static str, color: &'static str) -> Self {
        Self {
            glyph: glyph.to_string(),
            group,
            color,
        }
    }
}

/// Structural entry kinds with their own icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconKind {
    Directory,
    ExpandedDirectory,
    LinkDirectory,
    Link,
}

impl IconKind {
    pub const ALL: [IconKind; 4] = [
        IconKind::Directory,
        IconKind::ExpandedDirectory,
        IconKind::LinkDirectory,
        IconKind::Link,
    ];

    /// Kind of `entry`, if it is not a plain file.
    pub fn of(entry: &TreeEntry) -> Option<Self> {
        if entry.is_expanded {
            Some(IconKind::ExpandedDirectory)
        } else if entry.is_dir && entry.is_link {
            Some(IconKind::LinkDirectory)
        } else if entry.is_dir {
            Some(IconKind::Directory)
        } else if entry.is_link {
            Some(IconKind::Link)
        } else {
            None
        }
    }

    fn descriptor(self) -> IconDescriptor {
        match self {
            IconKind::Directory => IconDescriptor::new("\u{f07b}", "TreecolIconDirectory", "blue"),
            IconKind::ExpandedDirectory => {
                IconDescriptor::new("\u{f07c}", "TreecolIconDirectoryOpen", "blue")
            }
            IconKind::LinkDirectory => {
                IconDescriptor::new("\u{f482}", "TreecolIconDirectoryLink", "cyan")
            }
            IconKind::Link => IconDescriptor::new("\u{f481}", "TreecolIconLink", "cyan"),
        }
    }
}

const DEFAULT_FILE: (&str, &str, &str) = ("\u{f15b}", "TreecolIconFile", "white");

/// Extension -> (glyph, highlight group, palette color).
const EXTENSIONS: &[(&str, &str, &str, &str)] = &[
    ("rs", "\u{e7a8}", "TreecolIconRust", "orange"),
    ("toml", "\u{e6b2}", "TreecolIconToml", "gray"),
    ("py", "\u{e606}", "TreecolIconPython", "yellow"),
    ("js", "\u{e74e}", "TreecolIconJavascript", "yellow"),
    ("mjs", "\u{e74e}", "TreecolIconJavascript", "yellow"),
    ("ts", "\u{e628}", "TreecolIconTypescript", "blue"),
    ("tsx", "\u{e7ba}", "TreecolIconReact", "cyan"),
    ("jsx", "\u{e7ba}", "TreecolIconReact", "cyan"),
    ("json", "\u{e60b}", "TreecolIconJson", "yellow"),
    ("md", "\u{e73e}", "TreecolIconMarkdown", "white"),
    ("txt", "\u{f15c}", "TreecolIconText", "white"),
    ("go", "\u{e627}", "TreecolIconGo", "cyan"),
    ("c", "\u{e61e}", "TreecolIconC", "blue"),
    ("h", "\u{e61e}", "TreecolIconCHeader", "purple"),
    ("cpp", "\u{e61d}", "TreecolIconCpp", "blue"),
    ("hpp", "\u{e61d}", "TreecolIconCppHeader", "purple"),
    ("java", "\u{e738}", "TreecolIconJava", "red"),
    ("rb", "\u{e739}", "TreecolIconRuby", "red"),
    ("lua", "\u{e620}", "TreecolIconLua", "blue"),
    ("vim", "\u{e62b}", "TreecolIconVim", "green"),
    ("sh", "\u{f489}", "TreecolIconShell", "green"),
    ("bash", "\u{f489}", "TreecolIconShell", "green"),
    ("zsh", "\u{f489}", "TreecolIconShell", "green"),
    ("fish", "\u{f489}", "TreecolIconShell", "green"),
    ("html", "\u{e736}", "TreecolIconHtml", "orange"),
    ("css", "\u{e749}", "TreecolIconCss", "blue"),
    ("scss", "\u{e603}", "TreecolIconSass", "pink"),
    ("yaml", "\u{e6a8}", "TreecolIconYaml", "purple"),
    ("yml", "\u{e6a8}", "TreecolIconYaml", "purple"),
    ("lock", "\u{f023}", "TreecolIconLock", "gray"),
    ("gitignore", "\u{e702}", "TreecolIconGit", "red"),
    ("gitmodules", "\u{e702}", "TreecolIconGit", "red"),
    ("png", "\u{f1c5}", "TreecolIconImage", "purple"),
    ("jpg", "\u{f1c5}", "TreecolIconImage", "purple"),
    ("jpeg", "\u{f1c5}", "TreecolIconImage", "purple"),
    ("gif", "\u{f1c5}", "TreecolIconImage", "purple"),
    ("svg", "\u{f1c5}", "TreecolIconImage", "purple"),
    ("pdf", "\u{f1c1}", "TreecolIconPdf", "red"),
    ("zip", "\u{f410}", "TreecolIconArchive", "brown"),
    ("gz", "\u{f410}", "TreecolIconArchive", "brown"),
    ("tar", "\u{f410}", "TreecolIconArchive", "brown"),
    ("sql", "\u{f1c0}", "TreecolIconDatabase", "white"),
    ("dockerfile", "\u{f308}", "TreecolIconDocker", "blue"),
];

// ---------------------------------------------------------------------------
// IconTable
// ---------------------------------------------------------------------------

/// Immutable icon lookup built once from the column config.
#[derive(Clone, Debug)]
pub struct IconTable {
    kinds: HashMap<IconKind, IconDescriptor>,
    extensions: HashMap<&'static str, IconDescriptor>,
    default: IconDescriptor,
}

impl IconTable {
    pub fn new(config: &ColumnConfig) -> Self {
        let mut kinds: HashMap<IconKind, IconDescriptor> = IconKind::ALL
            .iter()
            .map(|kind| (*kind, kind.descriptor()))
            .collect();

        let overrides = [
            (IconKind::Directory, &config.collapsed_icon),
            (IconKind::ExpandedDirectory, &config.expanded_icon),
            (IconKind::Link, &config.link_icon),
        ];
        for (kind, glyph) in overrides {
            if let (Some(glyph), Some(desc)) = (glyph, kinds.get_mut(&kind)) {
                desc.glyph = glyph.clone();
            }
        }

        let extensions = EXTENSIONS
            .iter()
            .map(|&(ext, glyph, group, color)| (ext, IconDescriptor::new(glyph, group, color)))
            .collect();

        let (glyph, group, color) = DEFAULT_FILE;
        let glyph = config.default_icon.as_deref().unwrap_or(glyph);

        Self {
            kinds,
            extensions,
            default: IconDescriptor::new(glyph, group, color),
        }
    }

    /// Icon for `entry`: structural kind, then extension, then default.
    pub fn lookup(&self, entry: &TreeEntry) -> &IconDescriptor {
        if let Some(desc) = IconKind::of(entry).and_then(|kind| self.kinds.get(&kind)) {
            return desc;
        }
        self.for_extension(entry.extension())
    }

    /// Case-sensitive extension lookup; unknown and empty extensions get the
    /// default descriptor.
    pub fn for_extension(&self, ext: &str) -> &IconDescriptor {
        self.extensions.get(ext).unwrap_or(&self.default)
    }

    /// Every descriptor in the table, for highlight registration.
    pub fn descriptors(&self) -> impl Iterator<Item = &IconDescriptor> {
        self.kinds
            .values()
            .chain(self.extensions.values())
            .chain(std::iter::once(&self.default))
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const DEFAULT_PALETTE: &[(&str, &str)] = &[
    ("red", "#e06c75"),
    ("green", "#98c379"),
    ("yellow", "#e5c07b"),
    ("blue", "#61afef"),
    ("purple", "#c678dd"),
    ("magenta", "#d16d9e"),
    ("cyan", "#56b6c2"),
    ("orange", "#d19a66"),
    ("pink", "#f4a8c4"),
    ("brown", "#a0785a"),
    ("gray", "#7f848e"),
    ("white", "#dcdfe4"),
];

/// Palette name -> color, resolved once when the column is created.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: HashMap<String, Color>,
}

impl Palette {
    pub fn new(overrides: &HashMap<String, String>) -> Result<Self> {
        let mut colors = HashMap::new();
        let defaults = DEFAULT_PALETTE.iter().map(|(n, v)| (*n, *v));
        let overrides = overrides.iter().map(|(n, v)| (n.as_str(), v.as_str()));

        for (name, value) in defaults.chain(overrides) {
            let color =
                Color::from_str(value).map_err(|_| Error::InvalidColor(value.to_string()))?;
            colors.insert(name.to_string(), color);
        }

        Ok(Self { colors })
    }

    /// Unknown names resolve to the terminal's default color.
    pub fn color(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> IconTable {
        IconTable::new(&ColumnConfig::default())
    }

    #[test]
    fn test_extension_lookup() {
        let icons = table();
        let entry = TreeEntry::new("/r/main.py", 0, false);
        assert_eq!(icons.lookup(&entry).group, "TreecolIconPython");
    }

    #[test]
    fn test_extension_lookup_is_case_sensitive() {
        let icons = table();
        let entry = TreeEntry::new("/r/SCRIPT.PY", 0, false);
        assert_eq!(icons.lookup(&entry).group, "TreecolIconFile");
        assert_eq!(icons.for_extension("PY").group, "TreecolIconFile");
    }

    #[test]
    fn test_no_extension_falls_back_to_default() {
        let icons = table();
        assert_eq!(icons.lookup(&TreeEntry::new("/r/Makefile", 0, false)).group, "TreecolIconFile");
        assert_eq!(icons.lookup(&TreeEntry::new("/r/trailing.", 0, false)).group, "TreecolIconFile");
    }

    #[test]
    fn test_kind_precedence() {
        let icons = table();
        let mut entry = TreeEntry::new("/r/src.rs", 0, true);
        assert_eq!(icons.lookup(&entry).group, "TreecolIconDirectory");

        entry.is_link = true;
        assert_eq!(icons.lookup(&entry).group, "TreecolIconDirectoryLink");

        entry.is_expanded = true;
        assert_eq!(icons.lookup(&entry).group, "TreecolIconDirectoryOpen");

        let link = TreeEntry {
            is_link: true,
            ..TreeEntry::new("/r/a.rs", 0, false)
        };
        assert_eq!(icons.lookup(&link).group, "TreecolIconLink");
    }

    #[test]
    fn test_config_glyph_overrides() {
        let config = ColumnConfig {
            collapsed_icon: Some("+".to_string()),
            expanded_icon: Some("-".to_string()),
            link_icon: Some("@".to_string()),
            default_icon: Some("*".to_string()),
            ..ColumnConfig::default()
        };
        let icons = IconTable::new(&config);

        let mut dir = TreeEntry::new("/r/d", 0, true);
        assert_eq!(icons.lookup(&dir).glyph, "+");
        dir.is_expanded = true;
        assert_eq!(icons.lookup(&dir).glyph, "-");
        let link = TreeEntry {
            is_link: true,
            ..TreeEntry::new("/r/l", 0, false)
        };
        assert_eq!(icons.lookup(&link).glyph, "@");
        assert_eq!(icons.for_extension("nope").glyph, "*");
    }

    #[test]
    fn test_palette_defaults_and_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("red".to_string(), "#ff0000".to_string());
        overrides.insert("accent".to_string(), "light-green".to_string());
        let palette = Palette::new(&overrides).unwrap();

        assert_eq!(palette.color("red"), Color::Rgb(255, 0, 0));
        assert_eq!(palette.color("accent"), Color::LightGreen);
        assert_eq!(palette.color("blue"), Color::Rgb(0x61, 0xaf, 0xef));
        assert_eq!(palette.color("missing"), Color::Reset);
    }

    #[test]
    fn test_palette_rejects_bad_color() {
        let mut overrides = HashMap::new();
        overrides.insert("red".to_string(), "not-a-color".to_string());
        assert!(matches!(Palette::new(&overrides), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn test_every_palette_name_used_by_tables_exists() {
        let palette = Palette::new(&HashMap::new()).unwrap();
        for desc in table().descriptors() {
            assert_ne!(palette.color(desc.color), Color::Reset, "{}", desc.color);
        }
    }
}
