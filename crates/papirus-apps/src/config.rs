//! User configuration stored as JSON.

use crate::error::AuditError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Pixel size requested from the icon lookup capability.
pub const DEFAULT_LOOKUP_SIZE: u32 = 48;

/// Entries shown per package origin in the summary.
pub const DEFAULT_SUMMARY_LIMIT: usize = 5;

/// When the fix step writes a per-user override instead of editing in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverridePolicy {
    /// Only when the original file is not writable by the current user.
    #[default]
    WhenReadOnly,
    /// Always; the original file is never edited.
    Always,
}

/// Tunables read from `config.json`. Every field is optional in the file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Active icon theme used by the index lookup. Detected when unset.
    pub icon_theme: Option<String>,
    pub lookup_size: u32,
    pub summary_limit: usize,
    /// Theme installations outside the standard candidate list.
    pub extra_theme_paths: Vec<PathBuf>,
    /// Additional directories to scan for `.desktop` files.
    pub extra_application_dirs: Vec<PathBuf>,
    pub override_policy: OverridePolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            icon_theme: None,
            lookup_size: DEFAULT_LOOKUP_SIZE,
            summary_limit: DEFAULT_SUMMARY_LIMIT,
            extra_theme_paths: Vec::new(),
            extra_application_dirs: Vec::new(),
            override_policy: OverridePolicy::default(),
        }
    }
}

impl AuditConfig {
    /// Default location: `$XDG_CONFIG_HOME/papirus-audit/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("papirus-audit").join("config.json"))
    }

    /// Load from a config file. A missing file yields the defaults; an
    /// unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        Self::load_existing(path).map(Option::unwrap_or_default)
    }

    /// Like [`AuditConfig::load`], but `None` when there is no file at `path`.
    pub fn load_existing(path: &Path) -> Result<Option<Self>, AuditError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuditError::io(path, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| AuditError::Config {
                path: path.to_path_buf(),
                source,
            })
    }
}
