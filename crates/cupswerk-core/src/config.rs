// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client configuration, read from a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CupswerkError, Result};
use crate::types::{Destination, DocumentFormat};

/// File name inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Job name used when none is given.
    pub job_name: String,
    /// Document format used when it cannot be inferred.
    pub format: DocumentFormat,
    /// Preferred destination (`name` or `name/instance`). `None` means the
    /// server's default destination.
    pub destination: Option<String>,
    /// Options applied on top of the destination's own before printing.
    pub options: BTreeMap<String, String>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            job_name: "cupswerk".to_string(),
            format: DocumentFormat::Text,
            destination: None,
            options: BTreeMap::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| CupswerkError::Config(format!("{}: {e}", path.display())))
    }

    /// Copy the configured option overrides onto `destination`.
    pub fn apply_options(&self, destination: &mut Destination) {
        for (key, value) in &self.options {
            destination.set_option(key.clone(), value.clone());
        }
    }
}

/// Default config file location: `$XDG_CONFIG_HOME/cupswerk/config.json`,
/// falling back to `~/.config/cupswerk/config.json`.
pub fn default_config_path() -> PathBuf {
    config_base().join("cupswerk").join(CONFIG_FILE)
}

fn config_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}
