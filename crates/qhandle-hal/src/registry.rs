//! Platform registry.
//!
//! The [`PlatformRegistry`] maps platform names to factories so that a
//! front end can build the platform it was configured with and hand it to
//! a submitter explicitly.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{HalError, HalResult};
use crate::platform::{ExecutionPlatform, PlatformConfig, PlatformFactory};

/// Factory function type for registered platforms.
type Factory = Box<dyn Fn(PlatformConfig) -> HalResult<Arc<dyn ExecutionPlatform>> + Send + Sync>;

/// Central registry of execution platforms.
pub struct PlatformRegistry {
    factories: FxHashMap<String, Factory>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a platform type under `name`.
    pub fn register<P>(&mut self, name: impl Into<String>)
    where
        P: PlatformFactory + 'static,
    {
        let name = name.into();
        debug!("Registering platform: {}", name);
        self.factories.insert(
            name,
            Box::new(|config| {
                let platform = P::from_config(config)?;
                Ok(Arc::new(platform))
            }),
        );
    }

    /// Register a platform with a custom constructor.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(PlatformConfig) -> HalResult<Arc<dyn ExecutionPlatform>>
        + Send
        + Sync
        + 'static,
    ) {
        let name = name.into();
        debug!("Registering factory platform: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a platform by name.
    pub fn create(
        &self,
        name: &str,
        config: PlatformConfig,
    ) -> HalResult<Arc<dyn ExecutionPlatform>> {
        match self.factories.get(name) {
            Some(factory) => factory(config),
            None => Err(HalError::Configuration(format!(
                "No platform registered with name '{}'. Available: {}",
                name,
                self.available_platforms().join(", ")
            ))),
        }
    }

    /// List all registered platform names, sorted.
    pub fn available_platforms(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a platform is registered under `name`.
    pub fn has_platform(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
