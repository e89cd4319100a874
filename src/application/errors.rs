//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        BotError::Network(e.to_string())
    }
}

/// Export parsing errors.
///
/// Only a document that is not valid JSON is an error; a document without
/// messages parses to an empty result.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to read export{}: {source}", path_suffix(.path))]
    Io {
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    #[error("Malformed export JSON{}: {source}", path_suffix(.path))]
    Malformed {
        #[source]
        source: serde_json::Error,
        path: Option<PathBuf>,
    },
}

impl ExportError {
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match self {
            ExportError::Io { source, .. } => ExportError::Io { source, path },
            ExportError::Malformed { source, .. } => ExportError::Malformed { source, path },
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(source: serde_json::Error) -> Self {
        ExportError::Malformed { source, path: None }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(source: std::io::Error) -> Self {
        ExportError::Io { source, path: None }
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" (file: {})", p.display()))
        .unwrap_or_default()
}

/// Scratch storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scratch directory already removed: {0}")]
    Closed(PathBuf),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_mentions_path() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ExportError::from(source).with_path("/tmp/01_result.json");
        let text = err.to_string();
        assert!(text.starts_with("Malformed export JSON (file: /tmp/01_result.json)"), "{}", text);
    }

    #[test]
    fn test_export_error_lifts_into_bot_error() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BotError = ExportError::from(source).into();
        assert!(matches!(err, BotError::Export(ExportError::Io { .. })));
    }
}
