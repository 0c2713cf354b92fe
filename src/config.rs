//! Realm configuration binding.
//!
//! The core itself only needs two paths; this module gives hosts a
//! serde-friendly shape for them plus JSON file loading for hosts that keep
//! the realm definition on disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File paths a realm is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealmConfig {
    /// Path to the `htpasswd` file.
    pub passwd_file: PathBuf,
    /// Optional path to the `htgroup` file. Absent means group queries
    /// resolve to empty membership rather than an error.
    #[serde(default)]
    pub group_file: Option<PathBuf>,
}

impl RealmConfig {
    /// Configuration with a password file only.
    #[must_use]
    pub fn new(passwd_file: impl Into<PathBuf>) -> Self {
        Self {
            passwd_file: passwd_file.into(),
            group_file: None,
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}
