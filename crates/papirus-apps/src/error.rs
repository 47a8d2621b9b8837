//! Error types for papirus-apps

use std::path::PathBuf;

/// Reasons a desktop entry file is rejected by the parser.
#[derive(Debug, thiserror::Error)]
pub enum DesktopEntryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected a group header or key=value, found {content:?}")]
    InvalidLine { line: usize, content: String },

    #[error("line {line}: duplicate group [{group}]")]
    DuplicateGroup { line: usize, group: String },

    #[error("line {line}: duplicate key {key:?} in [{group}]")]
    DuplicateKey {
        line: usize,
        group: String,
        key: String,
    },
}

/// Errors surfaced by the audit and fix operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DesktopEntryError,
    },

    #[error("{} has no [Desktop Entry] group", .0.display())]
    MissingDesktopEntry(PathBuf),

    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error("Config error in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AuditError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
