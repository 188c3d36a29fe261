use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

/// How a named highlight group is drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightDef {
    /// Direct foreground color.
    Fg(Color),
    /// Reuse another group's style.
    Link(String),
    /// Full style, used for the host's base groups.
    Style(Style),
}

/// Receives highlight registrations from the column.
pub trait HighlightSink {
    fn register(&mut self, name: &str, def: HighlightDef);
}

/// Links deeper than this are treated as unresolved.
const MAX_LINK_DEPTH: usize = 16;

/// Host-side table of named highlight groups.
#[derive(Clone, Debug)]
pub struct HighlightRegistry {
    groups: HashMap<String, HighlightDef>,
}

impl Default for HighlightRegistry {
    fn default() -> Self {
        let mut groups = HashMap::new();
        groups.insert(
            "Directory".to_string(),
            HighlightDef::Style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
        );
        groups.insert("Normal".to_string(), HighlightDef::Style(Style::default()));
        groups.insert(
            "Comment".to_string(),
            HighlightDef::Style(Style::default().fg(Color::DarkGray)),
        );
        Self { groups }
    }
}

impl HighlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&HighlightDef> {
        self.groups.get(name)
    }

    /// Style of `name`, following links. Unknown groups and link cycles
    /// resolve to the default style.
    pub fn style(&self, name: &str) -> Style {
        let mut current = name;
        for _ in 0..MAX_LINK_DEPTH {
            match self.groups.get(current) {
                Some(HighlightDef::Fg(color)) => return Style::default().fg(*color),
                Some(HighlightDef::Style(style)) => return *style,
                Some(HighlightDef::Link(target)) => current = target.as_str(),
                None => return Style::default(),
            }
        }
        Style::default()
    }
}

impl HighlightSink for HighlightRegistry {
    fn register(&mut self, name: &str, def: HighlightDef) {
        self.groups.insert(name.to_string(), def);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
