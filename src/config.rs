// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Registry configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config file.
//! `validate()` runs on every load and fails fast on values that would make a
//! registry unusable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capacity::{CapacityPolicy, ShrinkPolicy};
use crate::integrity::ChecksumKind;

/// Default hard cap on live containers per registry.
pub const DEFAULT_MAX_CONTAINERS: usize = 1 << 20;

/// Default log sink location, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "stack.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Shrinking never goes below this many slots.
    pub min_capacity: usize,
    pub shrink_policy: ShrinkPolicy,
    pub max_containers: usize,
    pub checksum: ChecksumKind,
    pub log_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_capacity: 1,
            shrink_policy: ShrinkPolicy::Exact,
            max_containers: DEFAULT_MAX_CONTAINERS,
            checksum: ChecksumKind::Polynomial,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_capacity == 0 {
            return Err(ConfigError::Invalid(
                "minCapacity must be at least 1".to_string(),
            ));
        }
        if self.max_containers == 0 {
            return Err(ConfigError::Invalid(
                "maxContainers must be at least 1".to_string(),
            ));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("logPath is empty".to_string()));
        }
        Ok(())
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        CapacityPolicy::new(self.min_capacity, self.shrink_policy)
    }
}
