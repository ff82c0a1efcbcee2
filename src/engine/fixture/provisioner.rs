use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::engine::errors::ProvisionError;
use crate::engine::fixture::{FixtureDefinition, FixtureInstaller, FixtureRegistry};

/// Installs registry fixtures on first use, at most once per run.
///
/// Concurrent `ensure` calls for one name share a single install: the first
/// caller runs it and the others wait on the same cell. A failed install
/// leaves the cell empty, so the next caller tries again.
pub struct FixtureProvisioner {
    registry: FixtureRegistry,
    installer: Arc<dyn FixtureInstaller>,
    slots: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
    installed: Mutex<Vec<Arc<FixtureDefinition>>>,
}

impl FixtureProvisioner {
    pub fn new(registry: FixtureRegistry, installer: Arc<dyn FixtureInstaller>) -> Self {
        Self {
            registry,
            installer,
            slots: Mutex::new(HashMap::new()),
            installed: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &FixtureRegistry {
        &self.registry
    }

    pub async fn ensure(&self, name: &str) -> Result<Arc<FixtureDefinition>, ProvisionError> {
        let fixture = self
            .registry
            .get(name)
            .ok_or_else(|| ProvisionError::UnknownFixture(name.to_string()))?;

        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(fixture.key()).or_default().clone()
        };

        slot.get_or_try_init(|| async {
            info!(fixture = %fixture.name, version = fixture.version, "Installing fixture");
            self.installer
                .install(&fixture)
                .await
                .map_err(|source| ProvisionError::Install {
                    fixture: fixture.name.clone(),
                    source,
                })?;
            self.installed.lock().push(Arc::clone(&fixture));
            Ok::<_, ProvisionError>(())
        })
        .await?;

        Ok(fixture)
    }

    pub fn is_provisioned(&self, name: &str) -> bool {
        self.slots
            .lock()
            .get(&name.to_ascii_lowercase())
            .is_some_and(|slot| slot.initialized())
    }

    /// Fixtures installed so far, in install order.
    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().iter().map(|f| f.name.clone()).collect()
    }

    /// Uninstalls everything in reverse install order. Keeps going past
    /// failures and returns them.
    pub async fn release_all(&self) -> Vec<ProvisionError> {
        let fixtures = std::mem::take(&mut *self.installed.lock());
        self.slots.lock().clear();

        let mut errors = Vec::new();
        for fixture in fixtures.iter().rev() {
            info!(fixture = %fixture.name, "Releasing fixture");
            if let Err(source) = self.installer.uninstall(fixture).await {
                warn!(fixture = %fixture.name, error = %source, "Fixture teardown failed");
                errors.push(ProvisionError::Uninstall {
                    fixture: fixture.name.clone(),
                    source,
                });
            }
        }
        errors
    }
}
