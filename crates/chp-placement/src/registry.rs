//! Name-to-strategy registry.
//!
//! [`global`] holds the built-in strategies. It is populated on first use
//! and never changes afterwards; callers that need extra strategies build
//! their own [`Registry`] and initialize instances through it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::error::PlacementError;
use crate::instance::PlacementInstance;
use crate::strategy::{Baseline, HashModulo, MultiRing, PlacementStrategy, StaticModulo};

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// The process-wide registry of built-in strategies.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Mapping from strategy name (or alias) to implementation.
#[derive(Clone, Default)]
pub struct Registry {
    strategies: HashMap<String, Arc<dyn PlacementStrategy>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in strategy.
    ///
    /// | Name | Strategy |
    /// |------|----------|
    /// | `baseline`, `ring` | [`Baseline`] |
    /// | `multiring` | [`MultiRing`] |
    /// | `static_modulo` | [`StaticModulo`] |
    /// | `hash_modulo` | [`HashModulo`] |
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Baseline);
        registry.register(MultiRing);
        registry.register(StaticModulo);
        registry.register(HashModulo);
        registry.alias("ring", Arc::new(Baseline));
        registry
    }

    /// Register a strategy under its own name, returning any strategy it replaced.
    pub fn register<S>(&mut self, strategy: S) -> Option<Arc<dyn PlacementStrategy>>
    where
        S: PlacementStrategy + 'static,
    {
        let name = strategy.name().to_string();
        debug!(strategy = %name, "registered placement strategy");
        self.strategies.insert(name, Arc::new(strategy))
    }

    /// Make `alias` resolve to the strategy registered as `target`.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<(), PlacementError> {
        let strategy = self.resolve(target)?;
        self.alias(alias, strategy);
        Ok(())
    }

    fn alias(&mut self, alias: &str, strategy: Arc<dyn PlacementStrategy>) {
        debug!(alias, target = strategy.name(), "registered placement alias");
        self.strategies.insert(alias.to_string(), strategy);
    }

    /// Look up a strategy by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PlacementStrategy>, PlacementError> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| PlacementError::UnknownStrategy(name.to_string()))
    }

    /// Whether `name` resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// All registered names and aliases, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an instance with the strategy registered as `strategy_name`.
    pub fn initialize(
        &self,
        strategy_name: &str,
        num_servers: u32,
        virtual_factor: u32,
    ) -> Result<PlacementInstance, PlacementError> {
        let strategy = self.resolve(strategy_name)?;
        PlacementInstance::build(strategy.as_ref(), strategy_name, num_servers, virtual_factor)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("strategies", &self.names())
            .finish()
    }
}
