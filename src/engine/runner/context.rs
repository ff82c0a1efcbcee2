use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::engine::backend::{BackendClient, BackendId, ClientFactory, QualifiedName, Query};
use crate::engine::compare::{CompareMode, FloatPolicy, QueryAssert};
use crate::engine::errors::{BackendError, HarnessError};
use crate::engine::fixture::{FixtureDefinition, FixtureVars};
use crate::engine::poll::{PollOutcome, Poller, QueryProbe};
use crate::engine::types::ResultSet;

/// Everything a case body may touch. Owns the case's clients; nothing in
/// here is shared with other cases.
pub struct TestContext {
    case: String,
    factory: Arc<dyn ClientFactory>,
    clients: HashMap<BackendId, Box<dyn BackendClient>>,
    poller: Poller,
    policy: FloatPolicy,
    poll_timeout: Duration,
    vars: FixtureVars,
    fixtures: HashMap<String, Arc<FixtureDefinition>>,
    deferred: Vec<Query>,
}

impl TestContext {
    pub fn new(
        case: impl Into<String>,
        factory: Arc<dyn ClientFactory>,
        poller: Poller,
        poll_timeout: Duration,
        vars: FixtureVars,
    ) -> Self {
        Self {
            case: case.into(),
            factory,
            clients: HashMap::new(),
            poller,
            policy: FloatPolicy::default(),
            poll_timeout,
            vars,
            fixtures: HashMap::new(),
            deferred: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: FloatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn case_name(&self) -> &str {
        &self.case
    }

    pub fn vars(&self) -> &FixtureVars {
        &self.vars
    }

    /// `<catalog>.<keyspace>.<table>`
    pub fn table(&self, table: &str) -> QualifiedName {
        self.vars.table(table)
    }

    pub fn policy(&self) -> FloatPolicy {
        self.policy
    }

    /// Overrides the float policy for the rest of this case.
    pub fn set_policy(&mut self, policy: FloatPolicy) {
        self.policy = policy;
    }

    pub(crate) fn add_fixture(&mut self, fixture: Arc<FixtureDefinition>) {
        self.fixtures.insert(fixture.key(), fixture);
    }

    /// A fixture the case declared with `requires`.
    pub fn fixture(&self, name: &str) -> Result<Arc<FixtureDefinition>, HarnessError> {
        self.fixtures
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                HarnessError::Setup(format!(
                    "case '{}' did not declare fixture '{}'",
                    self.case, name
                ))
            })
    }

    pub async fn query(&mut self, query: &Query) -> Result<ResultSet, HarnessError> {
        debug!(case = %self.case, "Executing {}", query);
        let client = client_for(&mut self.clients, self.factory.as_ref(), &query.backend).await?;
        Ok(client.execute(&query.sql).await?)
    }

    pub async fn engine(&mut self, sql: impl Into<String>) -> Result<ResultSet, HarnessError> {
        self.query(&Query::engine(sql)).await
    }

    pub async fn native(&mut self, sql: impl Into<String>) -> Result<ResultSet, HarnessError> {
        self.query(&Query::native(sql)).await
    }

    /// Assertions over `actual` using this case's float policy.
    pub fn assert_that<'r>(&self, actual: &'r ResultSet) -> QueryAssert<'r> {
        QueryAssert::new(actual).with_policy(self.policy)
    }

    /// Re-runs `query` until it matches, within the configured poll timeout.
    pub async fn await_match(
        &mut self,
        query: &Query,
        expected: &ResultSet,
        mode: CompareMode,
    ) -> Result<PollOutcome, HarnessError> {
        let timeout = self.poll_timeout;
        self.await_match_within(query, expected, mode, timeout).await
    }

    pub async fn await_match_within(
        &mut self,
        query: &Query,
        expected: &ResultSet,
        mode: CompareMode,
        timeout: Duration,
    ) -> Result<PollOutcome, HarnessError> {
        debug!(case = %self.case, ?timeout, "Polling {}", query);
        let client = client_for(&mut self.clients, self.factory.as_ref(), &query.backend).await?;
        let mut probe = QueryProbe::new(client.as_mut(), &query.sql);
        let poller = self.poller.clone().with_policy(self.policy);
        poller.await_match(&mut probe, expected, mode, timeout).await
    }

    /// Registers a cleanup statement. Cleanups run last-in first-out when
    /// the case ends, however it ends.
    pub fn defer(&mut self, query: Query) {
        self.deferred.push(query);
    }

    pub fn deferred(&self) -> &[Query] {
        &self.deferred
    }

    /// Runs deferred cleanups, each bounded by `limit`, then closes every
    /// client. Returns what went wrong without stopping early.
    pub async fn release(&mut self, limit: Duration) -> Vec<String> {
        let mut problems = Vec::new();
        while let Some(query) = self.deferred.pop() {
            match tokio::time::timeout(limit, self.query(&query)).await {
                Ok(Ok(_)) => debug!(case = %self.case, "Cleanup done: {}", query),
                Ok(Err(e)) => {
                    warn!(case = %self.case, error = %e, "Cleanup failed: {}", query);
                    problems.push(format!("cleanup {} failed: {}", query, e));
                }
                Err(_) => {
                    warn!(case = %self.case, "Cleanup timed out: {}", query);
                    problems.push(format!("cleanup {} timed out after {:?}", query, limit));
                }
            }
        }

        let clients = std::mem::take(&mut self.clients);
        for (backend, mut client) in clients {
            if let Err(e) = client.close().await {
                warn!(case = %self.case, %backend, error = %e, "Failed to close client");
                problems.push(format!("closing {} failed: {}", backend, e));
            }
        }
        problems
    }

    pub fn open_clients(&self) -> usize {
        self.clients.len()
    }
}

/// Opens the backend's client on first use.
async fn client_for<'c>(
    clients: &'c mut HashMap<BackendId, Box<dyn BackendClient>>,
    factory: &dyn ClientFactory,
    backend: &BackendId,
) -> Result<&'c mut Box<dyn BackendClient>, BackendError> {
    if !clients.contains_key(backend) {
        let client = factory.open(backend).await?;
        clients.insert(backend.clone(), client);
    }
    clients
        .get_mut(backend)
        .ok_or_else(|| BackendError::UnknownBackend(backend.to_string()))
}
