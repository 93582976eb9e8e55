//! Error types for placement operations.

/// Errors returned by instance construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// A construction parameter is out of range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What was wrong.
        reason: &'static str,
    },

    /// No strategy is registered under the requested name.
    #[error("unknown placement strategy: {0}")]
    UnknownStrategy(String),

    /// The requested replication factor cannot be satisfied.
    #[error(
        "invalid replication factor {requested}: must be in 1..={max} and at most {num_servers} servers"
    )]
    InvalidReplicationFactor {
        /// Replication factor asked for.
        requested: usize,
        /// Servers in the instance.
        num_servers: u32,
        /// Compile-time bound (`CH_MAX_REPLICATION`).
        max: usize,
    },

    /// A strategy's layout returned a result that breaks the lookup contract.
    #[error("strategy {strategy} produced an invalid placement: {reason}")]
    InvalidLayoutOutput {
        /// Name the instance was initialized with.
        strategy: String,
        /// Which rule the result broke.
        reason: &'static str,
    },
}

/// Errors that can occur while loading a placement configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The parsed values are rejected by the engine.
    #[error("invalid config: {0}")]
    Invalid(#[from] PlacementError),
}
