use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::engine::backend::decode::decode_cell;
use crate::engine::backend::native_type::map_native_type;
use crate::engine::backend::{BackendClient, BackendId, ClientFactory};
use crate::engine::errors::BackendError;
use crate::engine::types::{Column, ResultSet, Row};
use crate::shared::config::BackendConfig;

type HttpClient = Client<HttpConnector, Full<Bytes>>;

#[derive(Debug, Deserialize)]
struct WireColumn {
    name: String,
    #[serde(rename = "type")]
    native_type: String,
}

#[derive(Debug, Deserialize)]
struct WireResultSet {
    #[serde(default)]
    columns: Vec<WireColumn>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

/// Client for a gateway that accepts SQL text over HTTP POST and answers
/// with `{"columns": [{"name", "type"}], "rows": [[...]]}`.
pub struct HttpJsonClient {
    backend: BackendId,
    uri: Uri,
    auth_token: Option<String>,
    request_timeout: Duration,
    http_client: Option<HttpClient>,
}

impl HttpJsonClient {
    pub fn new(backend: BackendId, config: &BackendConfig) -> Result<Self, BackendError> {
        let uri = config
            .url
            .parse::<Uri>()
            .map_err(|e| BackendError::Connection {
                backend: backend.to_string(),
                message: format!("invalid URL '{}': {}", config.url, e),
            })?;
        let http_client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            backend,
            uri,
            auth_token: config.auth_token.clone(),
            request_timeout: config.request_timeout(),
            http_client: Some(http_client),
        })
    }

    fn connection_error(&self, message: impl ToString) -> BackendError {
        BackendError::Connection {
            backend: self.backend.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl BackendClient for HttpJsonClient {
    fn backend(&self) -> &BackendId {
        &self.backend
    }

    async fn execute(&mut self, sql: &str) -> Result<ResultSet, BackendError> {
        let http_client = self
            .http_client
            .as_ref()
            .ok_or_else(|| BackendError::Closed(self.backend.to_string()))?;

        let mut req_builder = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header("Content-Type", "text/plain");
        if let Some(token) = &self.auth_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }
        let req = req_builder
            .body(Full::new(Bytes::from(sql.to_string())))
            .map_err(|e| self.connection_error(format!("failed to build request: {}", e)))?;

        debug!(backend = %self.backend, "Sending query: {}", sql);
        let res = tokio::time::timeout(self.request_timeout, http_client.request(req))
            .await
            .map_err(|_| {
                self.connection_error(format!("no response within {:?}", self.request_timeout))
            })?
            .map_err(|e| self.connection_error(e))?;

        let status = res.status();
        let body = res
            .into_body()
            .collect()
            .await
            .map_err(|e| self.connection_error(format!("failed to read body: {}", e)))?
            .to_bytes();

        if !status.is_success() {
            return Err(BackendError::Query {
                backend: self.backend.to_string(),
                status: status.as_u16(),
                payload: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        decode_response(&self.backend, &body)
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if self.http_client.take().is_some() {
            debug!(backend = %self.backend, "Closed client");
        }
        Ok(())
    }
}

/// Decodes a gateway response body into a typed result set.
pub fn decode_response(backend: &BackendId, body: &[u8]) -> Result<ResultSet, BackendError> {
    let wire: WireResultSet =
        serde_json::from_slice(body).map_err(|e| BackendError::Protocol {
            backend: backend.to_string(),
            message: format!("invalid JSON body: {}", e),
        })?;

    let mut mappings = Vec::with_capacity(wire.columns.len());
    let mut columns = Vec::with_capacity(wire.columns.len());
    for column in &wire.columns {
        let mapping =
            map_native_type(&column.native_type).ok_or_else(|| BackendError::Decode {
                backend: backend.to_string(),
                column: column.name.clone(),
                message: format!("unsupported type '{}'", column.native_type),
            })?;
        mappings.push(mapping);
        columns.push(Column::new(column.name.clone(), mapping.column_type));
    }

    let mut rows = Vec::with_capacity(wire.rows.len());
    for (row_index, values) in wire.rows.iter().enumerate() {
        if values.len() != columns.len() {
            return Err(BackendError::Protocol {
                backend: backend.to_string(),
                message: format!(
                    "row {} has {} values for {} columns",
                    row_index,
                    values.len(),
                    columns.len()
                ),
            });
        }
        let mut cells = Vec::with_capacity(values.len());
        for ((value, mapping), column) in values.iter().zip(&mappings).zip(&wire.columns) {
            let cell = decode_cell(value, *mapping).map_err(|message| BackendError::Decode {
                backend: backend.to_string(),
                column: column.name.clone(),
                message,
            })?;
            cells.push(cell);
        }
        rows.push(Row::new(cells));
    }

    ResultSet::new(columns, rows).map_err(|e| BackendError::Protocol {
        backend: backend.to_string(),
        message: e.to_string(),
    })
}

/// Opens [`HttpJsonClient`]s from the `[backends.*]` config tables.
pub struct HttpJsonClientFactory {
    backends: HashMap<BackendId, BackendConfig>,
}

impl HttpJsonClientFactory {
    pub fn new(backends: &HashMap<String, BackendConfig>) -> Self {
        let backends = backends
            .iter()
            .map(|(name, config)| (BackendId::new(name.as_str()), config.clone()))
            .collect();
        Self { backends }
    }
}

#[async_trait]
impl ClientFactory for HttpJsonClientFactory {
    async fn open(&self, backend: &BackendId) -> Result<Box<dyn BackendClient>, BackendError> {
        let config = self
            .backends
            .get(backend)
            .ok_or_else(|| BackendError::UnknownBackend(backend.to_string()))?;
        info!(backend = %backend, url = %config.url, "Opening client");
        Ok(Box::new(HttpJsonClient::new(backend.clone(), config)?))
    }
}
