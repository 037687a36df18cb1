// Licensed under the Apache-2.0 license

use adac_host_command_types::{
    default_permission_request, AUTH_CHALLENGE_SIZE, PACKET_HEADER_SIZE, PERMISSION_REQUEST_SIZE,
    WORD_SIZE,
};
use adac_host_transport::MAX_PACKET_SIZE;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for by [`HostConfig::load_default`]
pub const CONFIG_FILE_NAME: &str = "adac-host.toml";

/// Smallest buffer that still holds a challenge response
pub const MIN_BUFFER_SIZE: usize = PACKET_HEADER_SIZE + AUTH_CHALLENGE_SIZE;

/// Shared configuration for the ADAC host client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub unlock: UnlockConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

/// Unlock sequence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockConfig {
    /// Requested permission bits, one byte per entry
    pub permissions: [u8; PERMISSION_REQUEST_SIZE],
    /// Lock debug again once the session is closed
    pub relock: bool,
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Size of the packet staging buffer in bytes
    pub buffer_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
}

impl HostConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: HostConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        let size = self.transport.buffer_size;
        if !(MIN_BUFFER_SIZE..=MAX_PACKET_SIZE).contains(&size) {
            bail!(
                "transport.buffer_size {} outside {}..={}",
                size,
                MIN_BUFFER_SIZE,
                MAX_PACKET_SIZE
            );
        }
        if size % WORD_SIZE != 0 {
            bail!("transport.buffer_size {} is not a multiple of {}", size, WORD_SIZE);
        }
        Ok(())
    }

    /// Load the first `adac-host.toml` found in the current directory or one
    /// of its parents, falling back to defaults
    pub fn load_default() -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        Self::search_from(&current_dir)
    }

    /// Search `start` and its parents for `adac-host.toml`
    pub fn search_from(start: &Path) -> Result<Self> {
        for dir in start.ancestors() {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(config_path);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        std::fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            permissions: default_permission_request(),
            relock: true,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            buffer_size: MAX_PACKET_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
