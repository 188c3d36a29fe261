mod app;
mod cli;
mod column;
mod config;
mod error;
mod git;
mod highlight;
mod host;
mod icons;
mod item;
mod log;
mod renderer;
mod scanner;
mod tree;
mod watcher;

use std::io::{self, BufWriter, Read, Write};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use crate::column::{ColumnText, TreeColumn};
use crate::config::ColumnConfig;
use crate::host::SystemHost;
use crate::item::TreeEntry;
use crate::scanner::Listing;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let log_guard = log::init(log::LogConfig {
        log_file_path: cli.log_file.clone(),
        stderr: cli.is_batch(),
    })?;
    info!(log_file = %log_guard.log_file.display(), "logging initialized");

    let config = column_config(&cli)?;

    // Handle --items mode
    if let Some(ref source) = cli.items {
        return handle_items(&cli, config, source);
    }

    // Handle --print / --json mode
    if cli.print || cli.json {
        return handle_print(&cli, config);
    }

    // Interactive mode
    let mut app = app::App::new(&cli, config)?;
    app.run()
}

/// Config file (if any) with command-line overrides applied on top.
fn column_config(cli: &cli::Cli) -> anyhow::Result<ColumnConfig> {
    let mut config = match cli.config {
        Some(ref path) => ColumnConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ColumnConfig::default(),
    };

    if let Some(sort) = cli.sort {
        config.sort = sort;
    }
    if cli.no_trees_first {
        config.sort_trees_first = false;
    }
    if let Some(width) = cli.icon_width {
        config.icon_width = width;
    }
    if cli.no_git {
        config.git_status = false;
    }
    if cli.link_target {
        config.show_link_target = true;
    }

    config.validate()?;
    Ok(config)
}

/// Render one batch of host items, in the order given.
fn handle_items(cli: &cli::Cli, config: ColumnConfig, source: &str) -> anyhow::Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))?
    };
    let entries = item::parse_items(&raw).context("invalid item batch")?;

    let host = SystemHost;
    let mut column = TreeColumn::new(config)?;
    if let Err(err) = column.refresh(&host, &entries) {
        warn!(error = %err, "git status unavailable");
    }

    emit(cli, &column, &host, &entries)
}

/// Walk the directory to `--depth` and print every row.
fn handle_print(cli: &cli::Cli, config: ColumnConfig) -> anyhow::Result<()> {
    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("cannot open {}", cli.path.display()))?;

    let mut listing = Listing::new(root.clone(), cli.all, config.sort, config.sort_trees_first);
    listing.expand_to_depth(cli.depth);
    let snapshot = listing.snapshot()?;

    let host = SystemHost;
    let mut column = TreeColumn::new(config)?;
    for group in &snapshot.sibling_groups {
        column.update_tree(group);
    }
    if let Err(err) = column.refresh_git(&host, &root) {
        warn!(error = %err, "git status unavailable");
    }

    emit(cli, &column, &host, &snapshot.rows)
}

fn emit(
    cli: &cli::Cli,
    column: &TreeColumn,
    host: &SystemHost,
    entries: &[TreeEntry],
) -> anyhow::Result<()> {
    let width = column.length(host, entries)?;
    let mut out = BufWriter::new(io::stdout().lock());

    for entry in entries {
        let row: ColumnText = column.text(host, entry, width)?;
        if cli.json {
            serde_json::to_writer(&mut out, &row)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", row.text)?;
        }
    }

    out.flush()?;
    Ok(())
}
