use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::backend::{BackendClient, BackendId, ClientFactory, Query};
use crate::engine::errors::BackendError;
use crate::engine::types::ResultSet;

#[derive(Clone)]
enum Scripted {
    Respond(Result<ResultSet, BackendError>),
    Hang,
}

#[derive(Default)]
struct Script {
    responses: Mutex<HashMap<(BackendId, String), VecDeque<Scripted>>>,
    log: Mutex<Vec<Query>>,
    refuse: Mutex<Option<BackendError>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl Script {
    fn next(&self, backend: &BackendId, sql: &str) -> Scripted {
        let mut responses = self.responses.lock();
        match responses.get_mut(&(backend.clone(), normalize(sql))) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Scripted::Hang),
            Some(queue) => queue.front().cloned().unwrap_or(Scripted::Hang),
            None => Scripted::Respond(Ok(ResultSet::empty(Vec::new()))),
        }
    }
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Client factory over canned answers, keyed by backend and SQL text.
///
/// Each scripted SQL answers its queued responses in order and then keeps
/// repeating the last one. Unscripted SQL answers an empty result.
#[derive(Clone, Default)]
pub struct ScriptedClientFactory {
    script: Arc<Script>,
}

impl ScriptedClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, query: Query, response: Scripted) {
        self.script
            .responses
            .lock()
            .entry((query.backend, normalize(&query.sql)))
            .or_default()
            .push_back(response);
    }

    pub fn respond(&self, query: Query, result: ResultSet) -> &Self {
        self.push(query, Scripted::Respond(Ok(result)));
        self
    }

    pub fn fail(&self, query: Query, error: BackendError) -> &Self {
        self.push(query, Scripted::Respond(Err(error)));
        self
    }

    /// The query never completes.
    pub fn hang(&self, query: Query) -> &Self {
        self.push(query, Scripted::Hang);
        self
    }

    /// Every later `open` fails with `error`.
    pub fn refuse_connections(&self, error: BackendError) {
        *self.script.refuse.lock() = Some(error);
    }

    /// Every statement executed so far, in order.
    pub fn executed(&self) -> Vec<Query> {
        self.script.log.lock().clone()
    }

    pub fn executed_sql(&self, backend: &BackendId) -> Vec<String> {
        self.executed()
            .into_iter()
            .filter(|q| &q.backend == backend)
            .map(|q| q.sql)
            .collect()
    }

    pub fn count(&self, query: &Query) -> usize {
        let sql = normalize(&query.sql);
        self.script
            .log
            .lock()
            .iter()
            .filter(|q| q.backend == query.backend && normalize(&q.sql) == sql)
            .count()
    }

    pub fn opens(&self) -> usize {
        self.script.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.script.closes.load(Ordering::SeqCst)
    }

    pub fn client(&self, backend: BackendId) -> ScriptedBackend {
        ScriptedBackend {
            backend,
            script: Arc::clone(&self.script),
            closed: false,
        }
    }
}

#[async_trait]
impl ClientFactory for ScriptedClientFactory {
    async fn open(&self, backend: &BackendId) -> Result<Box<dyn BackendClient>, BackendError> {
        if let Some(error) = self.script.refuse.lock().clone() {
            return Err(error);
        }
        self.script.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.client(backend.clone())))
    }
}

pub struct ScriptedBackend {
    backend: BackendId,
    script: Arc<Script>,
    closed: bool,
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    fn backend(&self) -> &BackendId {
        &self.backend
    }

    async fn execute(&mut self, sql: &str) -> Result<ResultSet, BackendError> {
        if self.closed {
            return Err(BackendError::Closed(self.backend.to_string()));
        }
        self.script
            .log
            .lock()
            .push(Query::on(self.backend.clone(), sql));
        let next = self.script.next(&self.backend, sql);
        match next {
            Scripted::Respond(result) => result,
            Scripted::Hang => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if !self.closed {
            self.closed = true;
            self.script.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
