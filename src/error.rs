use std::path::PathBuf;

use thiserror::Error;

/// The error type user handlers return, boxed.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed flag tag {tag:?} on field '{field}': the flag name must be non-empty")]
    MalformedTag { field: String, tag: String },

    #[error("Unsupported type '{ty}' for flag field '{field}'")]
    UnsupportedFieldType { field: String, ty: String },

    #[error("Duplicate flag name '--{name}'")]
    DuplicateFlagName { name: String },

    #[error("The 'config' flag is not defined on this command, cannot read the config file path")]
    MissingConfigFlag,

    /// An error returned by the command handler, passed through untouched.
    #[error(transparent)]
    Handler(BoxError),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Unsupported config file format: {path} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<CommandError>),

    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl CommandError {
    /// The handler's own error, if this is a [`CommandError::Handler`].
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CommandError::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Unwrap the handler's own error, giving back everything else.
    pub fn into_handler_error(self) -> Result<BoxError, CommandError> {
        match self {
            CommandError::Handler(e) => Ok(e),
            other => Err(other),
        }
    }
}
