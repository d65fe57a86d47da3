/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailrow, mail archive steps for row pipelines.
 *
 * Mailrow is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailrow is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailrow.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Runtime configuration: load/save ~/.mailrow/config.json.
//! Step settings (which field holds the archive path, etc.) are not stored here;
//! they belong to each step and are supplied by the host.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows between two progress log lines.
pub const DEFAULT_FEEDBACK_SIZE: u64 = 50_000;

/// Characters of plain body copied into `body_prefix` by backends that synthesize it.
pub const DEFAULT_BODY_PREFIX_CHARS: usize = 255;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What a walk does when one message's attributes cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageErrorPolicy {
    /// Yield the error and end the walk of that archive.
    #[default]
    Abort,
    /// Log a warning and continue with the next message.
    Skip,
}

/// Process-wide settings shared by all steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailrowConfig {
    pub feedback_size: u64,
    pub on_message_error: MessageErrorPolicy,
    /// Addresses that identify the archive owner (from_me / to_me / cc_me for backends
    /// that do not record those flags).
    pub owner_addresses: Vec<String>,
    pub body_prefix_chars: usize,
}

impl Default for MailrowConfig {
    fn default() -> Self {
        Self {
            feedback_size: DEFAULT_FEEDBACK_SIZE,
            on_message_error: MessageErrorPolicy::Abort,
            owner_addresses: Vec::new(),
            body_prefix_chars: DEFAULT_BODY_PREFIX_CHARS,
        }
    }
}

/// Default config directory: ~/.mailrow.
pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from).map(|h| h.join(".mailrow"))
}

/// Default config path: ~/.mailrow/config.json.
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|d| d.join("config.json"))
}

/// Load config from `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<MailrowConfig, ConfigError> {
    let data = match fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MailrowConfig::default()),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_slice(&data).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save config to `path`, creating the parent directory if needed.
pub fn save_config(path: &Path, config: &MailrowConfig) -> Result<(), ConfigError> {
    let write_err = |e: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_vec_pretty(config).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(write_err)
}
