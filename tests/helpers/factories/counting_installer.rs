use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::engine::errors::BackendError;
use crate::engine::fixture::{FixtureDefinition, FixtureInstaller};

/// Records install and uninstall calls. Can be told to fail the next N
/// installs or to take a while.
pub struct CountingInstaller {
    installs: Mutex<Vec<String>>,
    uninstalls: Mutex<Vec<String>>,
    attempts: AtomicU32,
    fail_next: AtomicU32,
    fail_uninstall: bool,
    delay: Duration,
}

impl CountingInstaller {
    pub fn new() -> Self {
        Self {
            installs: Mutex::new(Vec::new()),
            uninstalls: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            fail_next: AtomicU32::new(0),
            fail_uninstall: false,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(self, count: u32) -> Self {
        self.fail_next.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_uninstall(mut self) -> Self {
        self.fail_uninstall = true;
        self
    }

    /// Successful installs, by fixture name.
    pub fn installs(&self) -> Vec<String> {
        self.installs.lock().clone()
    }

    pub fn uninstalls(&self) -> Vec<String> {
        self.uninstalls.lock().clone()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn rejected(message: &str) -> BackendError {
    BackendError::Query {
        backend: "native".into(),
        status: 500,
        payload: message.into(),
    }
}

#[async_trait]
impl FixtureInstaller for CountingInstaller {
    async fn install(&self, fixture: &FixtureDefinition) -> Result<(), BackendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let should_fail = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(rejected("keyspace unavailable"));
        }
        self.installs.lock().push(fixture.name.clone());
        Ok(())
    }

    async fn uninstall(&self, fixture: &FixtureDefinition) -> Result<(), BackendError> {
        self.uninstalls.lock().push(fixture.name.clone());
        if self.fail_uninstall {
            return Err(rejected("drop failed"));
        }
        Ok(())
    }
}
