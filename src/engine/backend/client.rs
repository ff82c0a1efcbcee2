use std::fmt;

use async_trait::async_trait;

use crate::engine::errors::BackendError;
use crate::engine::types::ResultSet;

/// Name of a configured backend, e.g. `engine` or `native`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(String);

impl BackendId {
    pub const ENGINE: &'static str = "engine";
    pub const NATIVE: &'static str = "native";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_ascii_lowercase())
    }

    /// The distributed query engine.
    pub fn engine() -> Self {
        Self::new(Self::ENGINE)
    }

    /// The wide-store database, addressed with its own statements.
    pub fn native() -> Self {
        Self::new(Self::NATIVE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A connection to one backend.
///
/// `close` is idempotent: closing twice is a no-op. `execute` after `close`
/// fails with [`BackendError::Closed`].
#[async_trait]
pub trait BackendClient: Send + Sync {
    fn backend(&self) -> &BackendId;

    async fn execute(&mut self, sql: &str) -> Result<ResultSet, BackendError>;

    async fn close(&mut self) -> Result<(), BackendError>;
}

/// Opens fresh clients; each test case gets its own.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn open(&self, backend: &BackendId) -> Result<Box<dyn BackendClient>, BackendError>;
}

/// SQL text addressed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub backend: BackendId,
    pub sql: String,
}

impl Query {
    pub fn on(backend: BackendId, sql: impl Into<String>) -> Self {
        Self {
            backend,
            sql: sql.into(),
        }
    }

    pub fn engine(sql: impl Into<String>) -> Self {
        Self::on(BackendId::engine(), sql)
    }

    pub fn native(sql: impl Into<String>) -> Self {
        Self::on(BackendId::native(), sql)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.backend, self.sql)
    }
}

/// `<catalog>.<schema>.<table>` as the query engine addresses a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl QualifiedName {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// `<schema>.<table>`, the form native statements use.
    pub fn native(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}
