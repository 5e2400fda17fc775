use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors of the conversion and classification stages.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{} misses {field}", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Cannot build NAF document: {0}")]
    Build(String),

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    FileExists(PathBuf),

    #[error("Line {line}: expected at least 3 tab-separated fields, found {fields}")]
    MalformedLine { line: usize, fields: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot (de)serialize classifier model: {0}")]
    Model(#[from] serde_yaml::Error),

    #[error("Cannot parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
