use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::engine::errors::ProvisionError;
use crate::engine::fixture::{FixtureDefinition, FixtureVars};

/// Fixture definitions by case-insensitive name, in registration order.
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    fixtures: IndexMap<String, Arc<FixtureDefinition>>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, fixture: FixtureDefinition) -> Result<(), ProvisionError> {
        fixture
            .validate()
            .map_err(|message| ProvisionError::Definition {
                path: fixture.name.clone(),
                message,
            })?;
        let key = fixture.key();
        if self.fixtures.contains_key(&key) {
            return Err(ProvisionError::Duplicate(fixture.name));
        }
        debug!(fixture = %fixture.name, version = fixture.version, "Registered fixture");
        self.fixtures.insert(key, Arc::new(fixture));
        Ok(())
    }

    /// Loads every `*.json` file in `dir`, resolving statement placeholders.
    pub fn load_dir(dir: impl AsRef<Path>, vars: &FixtureVars) -> Result<Self, ProvisionError> {
        let dir = dir.as_ref();
        let pattern = dir.join("*.json");
        let mut paths = glob::glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .collect::<Vec<_>>();
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            let fixture: FixtureDefinition =
                serde_json::from_str(&content).map_err(|e| ProvisionError::Definition {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            registry.register(fixture.resolved(vars))?;
        }
        info!(dir = %dir.display(), count = registry.len(), "Loaded fixture definitions");
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<Arc<FixtureDefinition>> {
        self.fixtures.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fixtures.values().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
