use std::future::Future;

use async_trait::async_trait;

use crate::engine::backend::BackendClient;
use crate::engine::errors::BackendError;
use crate::engine::types::ResultSet;

/// One observation of backend state.
#[async_trait]
pub trait Probe: Send {
    async fn probe(&mut self) -> Result<ResultSet, BackendError>;
}

/// Re-runs a query on a borrowed client.
pub struct QueryProbe<'a> {
    client: &'a mut dyn BackendClient,
    sql: &'a str,
}

impl<'a> QueryProbe<'a> {
    pub fn new(client: &'a mut dyn BackendClient, sql: &'a str) -> Self {
        Self { client, sql }
    }
}

#[async_trait]
impl Probe for QueryProbe<'_> {
    async fn probe(&mut self) -> Result<ResultSet, BackendError> {
        self.client.execute(self.sql).await
    }
}

/// Adapts a closure returning a future.
pub struct FnProbe<F>(pub F);

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<ResultSet, BackendError>> + Send,
{
    async fn probe(&mut self) -> Result<ResultSet, BackendError> {
        (self.0)().await
    }
}
