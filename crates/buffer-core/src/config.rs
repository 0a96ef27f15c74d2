//! Storage backend configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{Error, Result};

/// Prefix used for temp file names when none is configured
pub const DEFAULT_PREFIX: &str = "hybridbuffer";

/// File system backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemConfig {
    /// Directory for temp files (platform temp dir if unset or empty)
    pub temp_dir: Option<PathBuf>,

    /// String prepended to generated file names
    pub prefix: String,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl FileSystemConfig {
    /// Load a configuration from JSON text; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The directory temp files are created in
    pub fn resolved_temp_dir(&self) -> PathBuf {
        match self.temp_dir.as_deref() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::temp_dir(),
        }
    }

    /// Check that generated names stay directly inside the temp directory
    pub fn validate(&self) -> Result<()> {
        if self.prefix.chars().any(std::path::is_separator) {
            return Err(Error::InvalidConfig {
                message: format!("prefix {:?} contains a path separator", self.prefix),
            });
        }
        Ok(())
    }
}
