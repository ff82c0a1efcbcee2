use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::engine::errors::HarnessError;
use crate::engine::runner::TestContext;

pub type CaseFuture<'a> = BoxFuture<'a, Result<(), HarnessError>>;

/// A case body or hook. Receives the case's own context.
pub type CaseFn = Arc<dyn for<'a> Fn(&'a mut TestContext) -> CaseFuture<'a> + Send + Sync>;

/// One named check: fixtures it needs, hooks around it, and its body.
///
/// ```ignore
/// TestCase::new("select_nation", |ctx| Box::pin(select_nation(ctx)))
///     .in_group("cassandra")
///     .requires("nation");
/// ```
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    pub groups: Vec<String>,
    pub fixtures: Vec<String>,
    pub(crate) setup: Vec<CaseFn>,
    pub(crate) teardown: Vec<CaseFn>,
    pub(crate) body: CaseFn,
}

impl TestCase {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&'a mut TestContext) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            groups: Vec::new(),
            fixtures: Vec::new(),
            setup: Vec::new(),
            teardown: Vec::new(),
            body: Arc::new(body),
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn requires(mut self, fixture: impl Into<String>) -> Self {
        self.fixtures.push(fixture.into());
        self
    }

    /// Runs after fixtures are in place and before the body.
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut TestContext) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        self.setup.push(Arc::new(hook));
        self
    }

    /// Runs after the body on every exit path, before deferred cleanup.
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a mut TestContext) -> CaseFuture<'a> + Send + Sync + 'static,
    {
        self.teardown.push(Arc::new(hook));
        self
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case(group))
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("fixtures", &self.fixtures)
            .finish_non_exhaustive()
    }
}
