use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::engine::backend::{BackendClient, BackendId, ClientFactory};
use crate::engine::errors::BackendError;
use crate::engine::fixture::FixtureDefinition;

/// Puts a fixture's data in place on a backend and takes it away again.
#[async_trait]
pub trait FixtureInstaller: Send + Sync {
    async fn install(&self, fixture: &FixtureDefinition) -> Result<(), BackendError>;

    async fn uninstall(&self, fixture: &FixtureDefinition) -> Result<(), BackendError>;
}

/// Runs the fixture's own setup and teardown statements on one backend,
/// using a short-lived client per call.
pub struct StatementInstaller {
    factory: Arc<dyn ClientFactory>,
    backend: BackendId,
}

impl StatementInstaller {
    pub fn new(factory: Arc<dyn ClientFactory>, backend: BackendId) -> Self {
        Self { factory, backend }
    }

    async fn run_all(&self, fixture: &str, statements: &[String]) -> Result<(), BackendError> {
        if statements.is_empty() {
            return Ok(());
        }
        let mut client = self.factory.open(&self.backend).await?;
        let result = run_statements(client.as_mut(), fixture, statements).await;
        if let Err(e) = client.close().await {
            warn!(fixture, error = %e, "Failed to close installer client");
        }
        result
    }
}

async fn run_statements(
    client: &mut dyn BackendClient,
    fixture: &str,
    statements: &[String],
) -> Result<(), BackendError> {
    for (index, sql) in statements.iter().enumerate() {
        debug!(fixture, step = index, "Running fixture statement");
        client.execute(sql).await?;
    }
    Ok(())
}

#[async_trait]
impl FixtureInstaller for StatementInstaller {
    async fn install(&self, fixture: &FixtureDefinition) -> Result<(), BackendError> {
        self.run_all(&fixture.name, &fixture.setup).await
    }

    async fn uninstall(&self, fixture: &FixtureDefinition) -> Result<(), BackendError> {
        self.run_all(&fixture.name, &fixture.teardown).await
    }
}
