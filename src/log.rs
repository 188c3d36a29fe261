//! Logging setup: always to a file, optionally to stderr.
//!
//! Filter priority is `TREECOL_LOG` > `RUST_LOG` > `warn`.
//!
//! Default file: `<data_local_dir>/treecol/logs/treecol-<pid>.log`. Override
//! with `--log-file <path>`; a path without an extension is taken as the
//! directory.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Returned from [`init`]; hold it until exit so the file writer flushes.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
    /// Mirror records to stderr. Off while the TUI owns the terminal.
    pub stderr: bool,
}

pub fn init(config: LogConfig) -> Result<LogGuard> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter());

    let env_set = env::var("TREECOL_LOG").is_ok() || env::var("RUST_LOG").is_ok();
    let stderr_layer = (config.stderr && env_set).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(create_filter())
    });

    Registry::default()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("treecol-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("treecol")
        .join("logs");
    (dir, filename)
}

fn create_filter() -> EnvFilter {
    env::var("TREECOL_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_with_file_name() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/logs/run.log")));
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert_eq!(name, "run.log");
    }

    #[test]
    fn test_override_bare_file_name_uses_cwd() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("run.log")));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "run.log");
    }

    #[test]
    fn test_override_directory() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/treecol-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/treecol-logs"));
        assert!(name.starts_with("treecol-") && name.ends_with(".log"));
    }

    #[test]
    fn test_default_location() {
        let (dir, _) = resolve_log_path(None);
        assert!(dir.ends_with("treecol/logs"));
    }
}
