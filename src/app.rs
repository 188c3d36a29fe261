use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use tracing::{debug, info, warn};

use crate::cli::Cli;
use crate::column::{ColumnText, TreeColumn};
use crate::config::ColumnConfig;
use crate::highlight::HighlightRegistry;
use crate::host::{Host, SystemHost};
use crate::item::TreeEntry;
use crate::renderer::{self, View};
use crate::scanner::Listing;
use crate::watcher::{FileWatcher, WatchEvent};

/// Interactive listing state and run loop.
pub struct App<H: Host = SystemHost> {
    pub root_path: PathBuf,
    listing: Listing,
    column: TreeColumn,
    host: H,
    highlights: HighlightRegistry,
    rows: Vec<TreeEntry>,
    lines: Vec<ColumnText>,
    cursor: usize,
    scroll_offset: usize,
    viewport_height: usize,
    refresh_interval: Duration,
    last_error: Option<String>,
}

impl App<SystemHost> {
    /// Build a new `App` from parsed CLI arguments.
    pub fn new(cli: &Cli, config: ColumnConfig) -> Result<Self> {
        let root_path = cli
            .path
            .canonicalize()
            .with_context(|| format!("cannot open {}", cli.path.display()))?;
        let refresh_interval = Duration::from_secs_f64(cli.interval.max(0.0));
        Self::with_host(root_path, cli.all, config, SystemHost, refresh_interval)
    }
}

impl<H: Host> App<H> {
    pub fn with_host(
        root_path: PathBuf,
        show_hidden: bool,
        config: ColumnConfig,
        host: H,
        refresh_interval: Duration,
    ) -> Result<Self> {
        let listing = Listing::new(
            root_path.clone(),
            show_hidden,
            config.sort,
            config.sort_trees_first,
        );
        let column = TreeColumn::new(config)?;
        let mut highlights = HighlightRegistry::new();
        column.on_init(&mut highlights);

        Ok(Self {
            root_path,
            listing,
            column,
            host,
            highlights,
            rows: Vec::new(),
            lines: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            viewport_height: 0,
            refresh_interval,
            last_error: None,
        })
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[TreeEntry] {
        &self.rows
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[ColumnText] {
        &self.lines
    }

    pub fn selected(&self) -> Option<&TreeEntry> {
        self.rows.get(self.cursor)
    }

    /// Rescan the listing and rebuild every row.
    ///
    /// A git failure is reported but keeps the previous status table.
    pub fn refresh(&mut self) -> Result<()> {
        let selected = self.selected().map(|e| e.path.clone());

        let snapshot = self.listing.snapshot()?;
        self.column.reset_tree();
        for group in &snapshot.sibling_groups {
            self.column.update_tree(group);
        }

        self.last_error = None;
        if let Err(err) = self.column.refresh_git(&self.host, &self.root_path) {
            warn!(error = %err, "git status refresh failed");
            self.last_error = Some(err.to_string());
        }

        let width = self.column.length(&self.host, &snapshot.rows)?;
        let lines = snapshot
            .rows
            .iter()
            .map(|entry| self.column.text(&self.host, entry, width))
            .collect::<crate::error::Result<Vec<_>>>()?;

        self.rows = snapshot.rows;
        self.lines = lines;
        self.cursor = selected
            .and_then(|path| self.rows.iter().position(|e| e.path == path))
            .unwrap_or(self.cursor)
            .min(self.rows.len().saturating_sub(1));

        debug!(rows = self.rows.len(), width, "listing refreshed");
        Ok(())
    }

    fn refresh_reporting(&mut self) {
        if let Err(err) = self.refresh() {
            warn!(error = %err, "refresh failed");
            self.last_error = Some(err.to_string());
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.rows.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    fn selected_dir(&self) -> Option<PathBuf> {
        self.selected()
            .filter(|e| e.is_dir)
            .map(|e| PathBuf::from(&e.path))
    }

    /// Apply one key press; returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => self.cursor = 0,
            KeyCode::Char('G') | KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter => {
                if let Some(dir) = self.selected_dir() {
                    self.listing.toggle(&dir);
                    self.refresh_reporting();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(dir) = self.selected_dir() {
                    self.listing.expand(&dir);
                    self.refresh_reporting();
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.collapse_or_parent(),
            KeyCode::Char('r') => self.refresh_reporting(),
            _ => {}
        }
        false
    }

    /// Collapse the selected directory, or jump to the parent row.
    fn collapse_or_parent(&mut self) {
        let Some(entry) = self.selected() else {
            return;
        };
        let path = PathBuf::from(&entry.path);

        if entry.is_expanded {
            self.listing.collapse(&path);
            self.refresh_reporting();
            return;
        }

        let parent = path.parent().map(Path::to_path_buf);
        if let Some(index) = parent.and_then(|p| {
            self.rows
                .iter()
                .position(|e| Path::new(&e.path) == p.as_path())
        }) {
            self.cursor = index;
        }
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.scroll_offset =
            renderer::follow_cursor(self.scroll_offset, self.cursor, self.viewport_height);

        let mut height = 0;
        let view = View {
            root_path: &self.root_path,
            rows: &self.lines,
            highlights: &self.highlights,
            cursor: self.cursor,
            scroll_offset: self.scroll_offset,
            sort_label: self.column.config().sort.as_str(),
            git_entries: self.column.git().len(),
            last_error: self.last_error.as_deref(),
        };
        terminal.draw(|frame| height = renderer::render_ui(frame, &view))?;
        self.viewport_height = height;
        Ok(())
    }

    fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        watch_rx: Option<&Receiver<WatchEvent>>,
    ) -> Result<()> {
        let mut last_update = Instant::now();
        let mut pending = false;

        loop {
            self.draw(terminal)?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        return Ok(());
                    }
                }
            }

            // --- Check for filesystem changes (non-blocking) ---
            if let Some(rx) = watch_rx {
                while let Ok(event) = rx.try_recv() {
                    match event {
                        WatchEvent::Changed => pending = true,
                        WatchEvent::Error(err) => self.last_error = Some(err),
                    }
                }
            }

            if pending && last_update.elapsed() >= self.refresh_interval {
                self.refresh_reporting();
                pending = false;
                last_update = Instant::now();
            }
        }
    }
}

impl App<SystemHost> {
    /// Run the interactive TUI until the user quits.
    pub fn run(&mut self) -> Result<()> {
        // Fail before touching the terminal if the root cannot be listed.
        self.refresh()?;

        let watcher = match FileWatcher::new(&self.root_path) {
            Ok(pair) => Some(pair),
            Err(err) => {
                warn!(error = %err, "watching disabled");
                self.last_error = Some(format!("watching disabled: {}", err));
                None
            }
        };
        let watch_rx = watcher.as_ref().map(|(_, rx)| rx);

        enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(out);
        let mut terminal = Terminal::new(backend)?;

        info!(root = %self.root_path.display(), "session started");
        let result = self.event_loop(&mut terminal, watch_rx);

        // Restore the terminal even when the loop failed.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/beta"), "").unwrap();
        fs::write(root.join("src/alpha"), "").unwrap();
        fs::write(root.join("LICENSE"), "").unwrap();
        dir
    }

    fn app(root: &Path) -> App {
        let config = ColumnConfig {
            git_status: false,
            default_icon: Some("*".to_string()),
            collapsed_icon: Some("+".to_string()),
            expanded_icon: Some("-".to_string()),
            ..ColumnConfig::default()
        };
        let mut app = App::with_host(
            root.to_path_buf(),
            false,
            config,
            SystemHost,
            Duration::ZERO,
        )
        .unwrap();
        app.refresh().unwrap();
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn texts(app: &App) -> Vec<String> {
        app.lines().iter().map(|l| l.text.trim_end().to_string()).collect()
    }

    #[test]
    fn test_initial_rows() {
        let dir = fixture();
        let app = app(dir.path());
        assert_eq!(texts(&app), vec!["+  src/", "*  LICENSE"]);
    }

    #[test]
    fn test_expand_and_collapse() {
        let dir = fixture();
        let mut app = app(dir.path());

        assert!(!press(&mut app, KeyCode::Char('l')));
        assert_eq!(
            texts(&app),
            vec!["-  src/", "├ *  alpha", "└ *  beta", "*  LICENSE"]
        );

        // Rows share one width.
        let widths: Vec<usize> = app.lines().iter().map(|l| l.text.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected().unwrap().name(), "alpha");

        // h on a file jumps to its parent, then collapses it.
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.selected().unwrap().name(), "src");
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.rows().len(), 2);
    }

    #[test]
    fn test_enter_toggles() {
        let dir = fixture();
        let mut app = app(dir.path());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.rows().len(), 4);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.rows().len(), 2);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let dir = fixture();
        let mut app = app(dir.path());
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.selected().unwrap().name(), "src");
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.selected().unwrap().name(), "LICENSE");
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.selected().unwrap().name(), "LICENSE");
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.selected().unwrap().name(), "src");
    }

    #[test]
    fn test_refresh_keeps_selection_and_sees_new_files() {
        let dir = fixture();
        let mut app = app(dir.path());
        press(&mut app, KeyCode::Char('G'));
        fs::write(dir.path().join("build.rs"), "").unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.rows().len(), 3);
        assert_eq!(app.selected().unwrap().name(), "LICENSE");
    }

    #[test]
    fn test_quit_keys() {
        let dir = fixture();
        let mut app = app(dir.path());
        assert!(press(&mut app, KeyCode::Char('q')));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }
}
