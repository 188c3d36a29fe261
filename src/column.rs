//! The file column: indentation, icon and git-highlighted name per row.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::config::ColumnConfig;
use crate::error::Result;
use crate::git::{GitStatusResolver, StatusKind};
use crate::highlight::{HighlightDef, HighlightSink};
use crate::host::Host;
use crate::icons::{IconDescriptor, IconTable, Palette};
use crate::item::TreeEntry;
use crate::tree::IndentResolver;

pub const INDENT_GROUP: &str = "TreecolIndent";
pub const DIRECTORY_GROUP: &str = "TreecolDirectory";

/// A highlight over `text`, in byte offsets.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ColumnHighlight {
    pub name: String,
    pub col: usize,
    pub width: usize,
}

/// Rendered text of one row plus its highlights.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ColumnText {
    pub text: String,
    pub highlights: Vec<ColumnHighlight>,
}

struct RowParts<'a> {
    indent: String,
    icon: &'a IconDescriptor,
    icon_cell: String,
    name: String,
}

pub struct TreeColumn {
    config: ColumnConfig,
    icons: IconTable,
    palette: Palette,
    indent: IndentResolver,
    git: GitStatusResolver,
}

impl TreeColumn {
    pub fn new(config: ColumnConfig) -> Result<Self> {
        let palette = Palette::new(&config.palette)?;
        let icons = IconTable::new(&config);
        Ok(Self {
            config,
            icons,
            palette,
            indent: IndentResolver::new(),
            git: GitStatusResolver::new(),
        })
    }

    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    pub fn git(&self) -> &GitStatusResolver {
        &self.git
    }

    /// Register every highlight group the column emits.
    pub fn on_init(&self, sink: &mut impl HighlightSink) {
        for icon in self.icons.descriptors() {
            sink.register(icon.group, HighlightDef::Fg(self.palette.color(icon.color)));
        }
        for kind in StatusKind::ALL {
            let desc = kind.descriptor();
            sink.register(desc.group, HighlightDef::Fg(self.palette.color(desc.color)));
        }
        sink.register(DIRECTORY_GROUP, HighlightDef::Link("Directory".to_string()));
        sink.register(INDENT_GROUP, HighlightDef::Link("Comment".to_string()));
    }

    /// Update last-sibling records from one batch of rows.
    pub fn update_tree(&mut self, entries: &[TreeEntry]) {
        self.indent.recompute_last_siblings(
            entries,
            self.config.sort,
            self.config.sort_trees_first,
        );
    }

    /// Forget every last-sibling record, for hosts that resend all groups.
    pub fn reset_tree(&mut self) {
        self.indent.clear();
    }

    /// Refresh git status for the repository containing `dir`.
    ///
    /// On failure the previous table stays in place.
    pub fn refresh_git(&mut self, host: &impl Host, dir: &Path) -> Result<bool> {
        if !self.config.git_status {
            return Ok(false);
        }
        let Some(root) = host.repo_root(dir)? else {
            return Ok(false);
        };
        let raw = host.porcelain_status(&root)?;
        let changed = self.git.refresh(&raw, &root.to_string_lossy());
        if changed {
            debug!(
                root = %root.display(),
                entries = self.git.len(),
                clean = self.git.is_empty(),
                "git table replaced"
            );
        }
        Ok(changed)
    }

    /// Per-refresh entry point for a host that hands over one batch at a time.
    pub fn refresh(&mut self, host: &impl Host, entries: &[TreeEntry]) -> Result<()> {
        self.update_tree(entries);
        let dir = entries
            .first()
            .and_then(|e| Path::new(&e.path).parent())
            .map(Path::to_path_buf);
        if let Some(dir) = dir {
            self.refresh_git(host, &dir)?;
        }
        Ok(())
    }

    fn parts(&self, host: &impl Host, entry: &TreeEntry) -> Result<RowParts<'_>> {
        let indent = self.indent.indent_for(&entry.path, entry.level);
        let icon = self.icons.lookup(entry);

        let pad = self
            .config
            .icon_width
            .saturating_sub(host.display_width(&icon.glyph));
        let icon_cell = format!("{}{}", icon.glyph, " ".repeat(pad + self.config.span));

        let mut name = entry.name().to_string();
        if entry.is_dir {
            name.push('/');
        }
        if entry.is_link && self.config.show_link_target {
            let target = host.resolve_link(Path::new(&entry.path))?;
            name = format!("{} -> {}", name, target.display());
        }

        Ok(RowParts {
            indent,
            icon,
            icon_cell,
            name,
        })
    }

    fn parts_width(&self, host: &impl Host, parts: &RowParts<'_>) -> usize {
        host.display_width(&parts.indent)
            + host.display_width(&parts.icon_cell)
            + host.display_width(&parts.name)
    }

    /// Column width needed to show every row in `entries`.
    pub fn length(&self, host: &impl Host, entries: &[TreeEntry]) -> Result<usize> {
        let mut widest = 0;
        for entry in entries {
            let parts = self.parts(host, entry)?;
            widest = widest.max(self.parts_width(host, &parts));
        }
        Ok(widest + self.config.padding)
    }

    /// Highlight group for the name of `entry`.
    fn name_group(&self, entry: &TreeEntry) -> Option<&'static str> {
        if self.config.git_status {
            if let Some(status) = self.git.status_for(&entry.status_path()) {
                return Some(status.group);
            }
        }
        entry.is_dir.then_some(DIRECTORY_GROUP)
    }

    /// Row text padded to `width` display columns.
    pub fn text(&self, host: &impl Host, entry: &TreeEntry, width: usize) -> Result<ColumnText> {
        let parts = self.parts(host, entry)?;
        let used = self.parts_width(host, &parts);

        let mut highlights = Vec::new();
        let mut text = String::new();

        if !parts.indent.is_empty() {
            highlights.push(ColumnHighlight {
                name: INDENT_GROUP.to_string(),
                col: 0,
                width: parts.indent.len(),
            });
        }
        text.push_str(&parts.indent);

        highlights.push(ColumnHighlight {
            name: parts.icon.group.to_string(),
            col: text.len(),
            width: parts.icon.glyph.len(),
        });
        text.push_str(&parts.icon_cell);

        if let Some(group) = self.name_group(entry) {
            highlights.push(ColumnHighlight {
                name: group.to_string(),
                col: text.len(),
                width: parts.name.len(),
            });
        }
        text.push_str(&parts.name);

        text.push_str(&" ".repeat(width.saturating_sub(used)));

        Ok(ColumnText { text, highlights })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
