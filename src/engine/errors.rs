use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::engine::compare::Diff;
use crate::engine::poll::LastSeen;
use crate::engine::runner::CaseStatus;
use crate::engine::types::ColumnType;

/// Failures reported by a backend client. The payload is whatever the
/// backend returned, kept verbatim for the report.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("connection to '{backend}' failed: {message}")]
    Connection { backend: String, message: String },

    #[error("'{backend}' rejected the query (status {status}): {payload}")]
    Query {
        backend: String,
        status: u16,
        payload: String,
    },

    #[error("malformed response from '{backend}': {message}")]
    Protocol { backend: String, message: String },

    #[error("cannot decode column '{column}' from '{backend}': {message}")]
    Decode {
        backend: String,
        column: String,
        message: String,
    },

    #[error("no backend configured under '{0}'")]
    UnknownBackend(String),

    #[error("client for '{0}' is closed")]
    Closed(String),
}

impl BackendError {
    /// Whether a poller may treat this as "not converged yet".
    pub fn is_transient(&self) -> bool {
        !matches!(self, BackendError::Closed(_) | BackendError::UnknownBackend(_))
    }
}

#[derive(Debug, Error)]
pub enum ResultSetError {
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row} column {column} holds a {actual} cell in a {expected} column")]
    CellType {
        row: usize,
        column: usize,
        expected: ColumnType,
        actual: ColumnType,
    },
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("unknown fixture '{0}'")]
    UnknownFixture(String),

    #[error("fixture '{fixture}' failed to install: {source}")]
    Install {
        fixture: String,
        #[source]
        source: BackendError,
    },

    #[error("fixture '{fixture}' failed to uninstall: {source}")]
    Uninstall {
        fixture: String,
        #[source]
        source: BackendError,
    },

    #[error("fixture '{0}' is defined twice")]
    Duplicate(String),

    #[error("invalid fixture definition {path}: {message}")]
    Definition { path: String, message: String },

    #[error("fixture reference rows do not decode: {0}")]
    ReferenceRows(#[from] ResultSetError),

    #[error("fixture directory error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fixture glob error: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal case transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: CaseStatus,
    pub to: CaseStatus,
}

/// Poll deadline details carried by [`HarnessError::Timeout`].
#[derive(Debug)]
pub struct PollTimeout {
    pub timeout: Duration,
    pub attempts: u32,
    pub last_seen: LastSeen,
}

/// Everything a test case can end with other than success.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("provisioning error: {0}")]
    Provision(#[from] ProvisionError),

    #[error("result mismatch:\n{0}")]
    Mismatch(Diff),

    #[error(
        "no match within {:?} after {} attempt(s); last seen: {}",
        .0.timeout,
        .0.attempts,
        .0.last_seen
    )]
    Timeout(PollTimeout),

    #[error("invalid result set: {0}")]
    ResultSet(#[from] ResultSetError),

    #[error("case exceeded its {0:?} time limit")]
    CaseTimeout(Duration),

    #[error("run aborted: {0}")]
    Aborted(String),

    #[error("setup failed: {0}")]
    Setup(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transition(#[from] IllegalTransition),
}

impl HarnessError {
    /// Mismatches and poll timeouts fail a case; everything else errors it.
    pub fn is_failure(&self) -> bool {
        matches!(self, HarnessError::Mismatch(_) | HarnessError::Timeout(_))
    }

    pub fn log_error(&self, case: &str) {
        match self {
            HarnessError::Mismatch(diff) => {
                warn!(case, "Result mismatch");
                debug!(case, "Mismatch details:\n{}", diff);
            }
            HarnessError::Timeout(t) => {
                warn!(case, attempts = t.attempts, "Poll deadline {:?} exceeded", t.timeout);
                debug!(case, "Last seen: {}", t.last_seen);
            }
            other => {
                error!(case, "Case errored: {}", other);
                debug!(case, "Error details: {:?}", other);
            }
        }
    }
}
