//! TOML configuration for a placement instance.
//!
//! ```toml
//! strategy = "multiring"
//! num_servers = 64
//! virtual_factor = 256
//! replication = 3
//! ```
//!
//! Every field is optional; missing fields take the [`Default`] values.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, PlacementError};
use crate::instance::{PlacementInstance, check_replication};
use crate::registry;
use crate::ring::check_params;

/// Parameters for building and querying one placement instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Registered strategy name.
    pub strategy: String,
    /// Number of physical servers.
    pub num_servers: u32,
    /// Virtual nodes per server.
    pub virtual_factor: u32,
    /// Replicas per object the caller intends to request.
    pub replication: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            strategy: "baseline".to_string(),
            num_servers: 1,
            virtual_factor: 128,
            replication: 1,
        }
    }
}

impl PlacementConfig {
    /// Load config from a TOML file, or use defaults if no path is given.
    ///
    /// The result is validated before it is returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::from_toml(&std::fs::read_to_string(p)?)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string without validating it.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Check every value against the global registry and engine limits.
    ///
    /// Catches a bad replication factor here, before any instance is built,
    /// instead of on the first lookup.
    pub fn validate(&self) -> Result<(), PlacementError> {
        registry::global().resolve(&self.strategy)?;
        check_params(self.num_servers, self.virtual_factor)?;
        check_replication(self.replication, self.num_servers)
    }

    /// Validate and build the instance.
    pub fn build(&self) -> Result<PlacementInstance, PlacementError> {
        self.validate()?;
        PlacementInstance::initialize(&self.strategy, self.num_servers, self.virtual_factor)
    }
}
