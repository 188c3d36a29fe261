//! Ratatui view of the listing.
//!
//! Purely presentational: rows arrive as `ColumnText` and highlight names are
//! resolved through the host's `HighlightRegistry`.

use std::path::Path;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::column::ColumnText;
use crate::highlight::HighlightRegistry;

/// Everything one frame needs, borrowed from the app.
pub struct View<'a> {
    pub root_path: &'a Path,
    pub rows: &'a [ColumnText],
    pub highlights: &'a HighlightRegistry,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub sort_label: &'a str,
    pub git_entries: usize,
    pub last_error: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Row conversion
// ---------------------------------------------------------------------------

/// Split a row into spans along its highlights.
///
/// Highlights that overlap an earlier one or do not land on char boundaries
/// are skipped.
pub fn row_to_line(row: &ColumnText, highlights: &HighlightRegistry) -> Line<'static> {
    let mut ordered: Vec<_> = row.highlights.iter().collect();
    ordered.sort_by_key(|hl| hl.col);

    let text = row.text.as_str();
    let mut spans = Vec::new();
    let mut pos = 0;

    for hl in ordered {
        if hl.col < pos {
            continue;
        }
        let end = hl.col + hl.width;
        let (Some(gap), Some(segment)) = (text.get(pos..hl.col), text.get(hl.col..end)) else {
            continue;
        };
        if !gap.is_empty() {
            spans.push(Span::raw(gap.to_string()));
        }
        spans.push(Span::styled(segment.to_string(), highlights.style(&hl.name)));
        pos = end;
    }

    if let Some(rest) = text.get(pos..) {
        if !rest.is_empty() {
            spans.push(Span::raw(rest.to_string()));
        }
    }

    Line::from(spans)
}

/// Scroll offset that keeps `cursor` inside a viewport of `height` rows.
pub fn follow_cursor(scroll_offset: usize, cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    if cursor < scroll_offset {
        cursor
    } else if cursor >= scroll_offset + height {
        cursor + 1 - height
    } else {
        scroll_offset
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Draw the whole UI; returns the height of the listing viewport.
pub fn render_ui(frame: &mut Frame, view: &View<'_>) -> usize {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // header
            Constraint::Min(1),    // listing
            Constraint::Length(1), // legend
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view);
    render_listing(frame, chunks[1], view);
    render_legend(frame, chunks[2], view);

    chunks[1].height as usize
}

fn render_header(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let title_line = Line::from(vec![
        Span::styled(
            " treecol ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            view.root_path.display().to_string(),
            Style::default().fg(Color::White),
        ),
    ]);

    let info_line = Line::from(vec![
        Span::styled(" Sort: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.sort_label.to_string(), Style::default().fg(Color::Cyan)),
        Span::styled("  Rows: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.rows.len().to_string(), Style::default().fg(Color::White)),
        Span::styled("  Git: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.git_entries.to_string(), Style::default().fg(Color::White)),
    ]);

    let paragraph = Paragraph::new(Text::from(vec![title_line, info_line]))
        .block(Block::default().borders(Borders::NONE));
    frame.render_widget(paragraph, area);
}

fn render_listing(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let height = area.height as usize;
    let lines: Vec<Line<'static>> = view
        .rows
        .iter()
        .enumerate()
        .skip(view.scroll_offset)
        .take(height)
        .map(|(index, row)| {
            let line = row_to_line(row, view.highlights);
            if index == view.cursor {
                line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn render_legend(frame: &mut Frame, area: Rect, view: &View<'_>) {
    let mut spans = vec![Span::styled(
        " j/k move  l/Enter expand  h collapse  r refresh  q quit",
        Style::default().fg(Color::DarkGray),
    )];

    if let Some(err) = view.last_error {
        spans.push(Span::styled(
            format!("  [!] {}", err),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnHighlight;
    use crate::highlight::{HighlightDef, HighlightSink};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn hl(name: &str, col: usize, width: usize) -> ColumnHighlight {
        ColumnHighlight {
            name: name.to_string(),
            col,
            width,
        }
    }

    fn registry() -> HighlightRegistry {
        let mut registry = HighlightRegistry::new();
        registry.register("Red", HighlightDef::Fg(Color::Red));
        registry.register("Green", HighlightDef::Fg(Color::Green));
        registry
    }

    fn contents(line: &Line<'_>) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_row_to_line_splits_on_highlights() {
        let row = ColumnText {
            text: "├ x  name.rs  ".to_string(),
            highlights: vec![hl("Green", "├ x  ".len(), 7), hl("Red", 0, "├ ".len())],
        };
        let line = row_to_line(&row, &registry());
        assert_eq!(contents(&line), vec!["├ ", "x  ", "name.rs", "  "]);
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
        assert_eq!(line.spans[2].style.fg, Some(Color::Green));
        assert_eq!(line.spans[1].style, Style::default());
    }

    #[test]
    fn test_row_to_line_skips_bad_offsets() {
        let row = ColumnText {
            text: "├ a".to_string(),
            // Offset 1 falls inside the multi-byte glyph.
            highlights: vec![hl("Red", 1, 1), hl("Green", 100, 2)],
        };
        let line = row_to_line(&row, &registry());
        assert_eq!(contents(&line), vec!["├ a"]);
    }

    #[test]
    fn test_follow_cursor() {
        assert_eq!(follow_cursor(0, 3, 10), 0);
        assert_eq!(follow_cursor(5, 2, 10), 2);
        assert_eq!(follow_cursor(0, 12, 10), 3);
        assert_eq!(follow_cursor(0, 4, 0), 4);
    }

    #[test]
    fn test_render_ui_draws_rows() {
        let rows = vec![
            ColumnText {
                text: "src/".to_string(),
                highlights: vec![hl("Directory", 0, 4)],
            },
            ColumnText {
                text: "main.rs".to_string(),
                highlights: Vec::new(),
            },
        ];
        let highlights = registry();
        let view = View {
            root_path: Path::new("/project"),
            rows: &rows,
            highlights: &highlights,
            cursor: 1,
            scroll_offset: 0,
            sort_label: "filename",
            git_entries: 0,
            last_error: Some("boom"),
        };

        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let mut height = 0;
        terminal
            .draw(|frame| height = render_ui(frame, &view))
            .unwrap();
        assert_eq!(height, 5);

        let buffer = terminal.backend().buffer().clone();
        let row_text: String = (0u16..4).map(|x| buffer[(x, 2u16)].symbol().to_string()).collect();
        assert_eq!(row_text, "src/");
        assert!(buffer[(0u16, 3u16)].modifier.contains(Modifier::REVERSED));
    }
}
