//! Bridge-domain manager configuration.

use serde::{Deserialize, Serialize};
use sonic_dataplane::{BridgeDomainFlags, SplitHorizonGroup};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or validating an [`L2BridgeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Configuration of the bridge-domain manager.
///
/// Missing fields take their defaults.
///
/// ```json
/// {
///     "bridge_domain_flags": { "flood": true, "uu_flood": true, "forward": true, "learn": true },
///     "server_split_horizon_group": 1,
///     "client_split_horizon_group": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct L2BridgeConfig {
    /// Flags of every bridge domain the manager creates
    pub bridge_domain_flags: BridgeDomainFlags,
    /// Group server-facing interfaces are attached in; must be non-zero so
    /// server-facing interfaces never flood to each other
    pub server_split_horizon_group: SplitHorizonGroup,
    /// Group the client-facing interface is attached in
    pub client_split_horizon_group: SplitHorizonGroup,
}

impl Default for L2BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_domain_flags: BridgeDomainFlags::LEARNING_BRIDGE,
            server_split_horizon_group: SplitHorizonGroup::new(1),
            client_split_horizon_group: SplitHorizonGroup::NONE,
        }
    }
}

impl L2BridgeConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks the configuration for values the manager cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_split_horizon_group.is_none() {
            return Err(ConfigError::Invalid {
                field: "server_split_horizon_group",
                message: "must be non-zero; group 0 floods between server interfaces".to_string(),
            });
        }
        if self.client_split_horizon_group == self.server_split_horizon_group {
            return Err(ConfigError::Invalid {
                field: "client_split_horizon_group",
                message: format!(
                    "must differ from server_split_horizon_group ({})",
                    self.server_split_horizon_group
                ),
            });
        }
        Ok(())
    }
}
