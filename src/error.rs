use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot resolve link {path}: {source}")]
    Link {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("`git {command}` failed: {message}")]
    Git { command: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
