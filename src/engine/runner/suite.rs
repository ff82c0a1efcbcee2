use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::engine::backend::ClientFactory;
use crate::engine::compare::FloatPolicy;
use crate::engine::errors::HarnessError;
use crate::engine::fixture::{FixtureProvisioner, FixtureVars};
use crate::engine::poll::{Backoff, Poller};
use crate::engine::runner::{
    CaseReport, CaseState, CaseStatus, Selection, SuiteReport, TestCase, TestContext,
};
use crate::shared::config::Settings;
use crate::shared::time::{Clock, TokioClock};

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub max_concurrency: usize,
    pub case_timeout: Duration,
    pub poll_timeout: Duration,
    pub backoff: Backoff,
    pub policy: FloatPolicy,
    pub shuffle: bool,
    pub keep_fixtures: bool,
}

impl RunnerSettings {
    pub fn from_settings(settings: &Settings) -> Result<Self, HarnessError> {
        let policy = settings.compare.policy().map_err(HarnessError::Config)?;
        if settings.harness.max_concurrency == 0 {
            return Err(HarnessError::Config(
                "harness.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_concurrency: settings.harness.max_concurrency,
            case_timeout: settings.harness.case_timeout(),
            poll_timeout: settings.poll.timeout(),
            backoff: Backoff::from_config(&settings.poll),
            policy,
            shuffle: settings.harness.shuffle,
            keep_fixtures: settings.harness.keep_fixtures,
        })
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            case_timeout: Duration::from_secs(300),
            poll_timeout: Duration::from_secs(60),
            backoff: Backoff::default(),
            policy: FloatPolicy::default(),
            shuffle: false,
            keep_fixtures: false,
        }
    }
}

/// Run-wide stop flag. Once raised it stays raised and keeps the first
/// reason given.
#[derive(Debug)]
pub struct AbortSignal {
    reason: watch::Sender<Option<String>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (reason, _) = watch::channel(None);
        Self { reason }
    }

    pub fn abort(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let raised = self.reason.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason.clone());
                true
            } else {
                false
            }
        });
        if raised {
            warn!("Run aborted: {}", reason);
        }
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.borrow().clone()
    }

    pub fn is_aborted(&self) -> bool {
        self.reason.borrow().is_some()
    }

    /// Resolves once the run is aborted.
    pub async fn wait(&self) -> String {
        let mut rx = self.reason.subscribe();
        let result = match rx.wait_for(Option::is_some).await {
            Ok(reason) => reason.clone().unwrap_or_default(),
            Err(_) => String::new(),
        };
        result
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs selected cases with bounded concurrency and collects their reports.
pub struct SuiteRunner {
    provisioner: Arc<FixtureProvisioner>,
    factory: Arc<dyn ClientFactory>,
    clock: Arc<dyn Clock>,
    vars: FixtureVars,
    settings: RunnerSettings,
    abort: Arc<AbortSignal>,
}

impl SuiteRunner {
    pub fn new(
        provisioner: Arc<FixtureProvisioner>,
        factory: Arc<dyn ClientFactory>,
        vars: FixtureVars,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            provisioner,
            factory,
            clock: Arc::new(TokioClock::new()),
            vars,
            settings,
            abort: Arc::new(AbortSignal::new()),
        }
    }

    /// Clock the poller sleeps on.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn abort_signal(&self) -> Arc<AbortSignal> {
        Arc::clone(&self.abort)
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub async fn run(&self, cases: &[TestCase], selection: &Selection) -> SuiteReport {
        let mut selected: Vec<(usize, &TestCase)> = cases
            .iter()
            .filter(|c| selection.matches(c))
            .enumerate()
            .collect();
        if self.settings.shuffle {
            selected.shuffle(&mut rand::thread_rng());
        }
        info!(
            selected = selected.len(),
            total = cases.len(),
            concurrency = self.settings.max_concurrency,
            "Starting run"
        );

        let started = Instant::now();
        let mut reports: Vec<(usize, CaseReport)> = stream::iter(selected)
            .map(|(index, case)| async move { (index, self.run_case(case).await) })
            .buffer_unordered(self.settings.max_concurrency.max(1))
            .collect()
            .await;
        reports.sort_by_key(|(index, _)| *index);

        if self.settings.keep_fixtures {
            info!(fixtures = ?self.provisioner.installed(), "Keeping fixtures");
        } else {
            for e in self.provisioner.release_all().await {
                warn!("Fixture release failed: {}", e);
            }
        }

        let report = SuiteReport::new(
            reports.into_iter().map(|(_, r)| r).collect(),
            started.elapsed(),
        );
        info!(
            passed = report.count(CaseStatus::Passed),
            failed = report.count(CaseStatus::Failed),
            errored = report.count(CaseStatus::Errored),
            "Run finished"
        );
        report
    }

    pub async fn run_case(&self, case: &TestCase) -> CaseReport {
        let started = Instant::now();
        let mut state = CaseState::new();
        let poller = Poller::new(Arc::clone(&self.clock), self.settings.backoff);
        let mut ctx = TestContext::new(
            case.name.clone(),
            Arc::clone(&self.factory),
            poller,
            self.settings.poll_timeout,
            self.vars.clone(),
        )
        .with_policy(self.settings.policy);

        debug!(case = %case.name, "Case started");
        let outcome = match self.abort.reason() {
            Some(reason) => Err(HarnessError::Aborted(reason)),
            None => self.drive(case, &mut state, &mut ctx).await,
        };

        let mut warnings = Vec::new();
        if state.status() == CaseStatus::Executing {
            warnings.extend(self.run_teardown(case, &mut ctx).await);
        }
        warnings.extend(ctx.release(self.settings.case_timeout).await);

        let (status, detail) = match outcome {
            Ok(()) => (CaseStatus::Passed, None),
            Err(e) => {
                e.log_error(&case.name);
                let status = if e.is_failure() && state.status() == CaseStatus::Executing {
                    CaseStatus::Failed
                } else {
                    CaseStatus::Errored
                };
                (status, Some(e.to_string()))
            }
        };
        if let Err(e) = state.advance(status) {
            error!(case = %case.name, "{}", e);
        }

        let report = CaseReport {
            name: case.name.clone(),
            groups: case.groups.clone(),
            status: state.status(),
            duration: started.elapsed(),
            detail,
            warnings,
        };
        info!(case = %report.name, status = %report.status, ms = report.duration.as_millis() as u64, "Case finished");
        report
    }

    /// Fixtures, setup hooks, then the body, under the case time limit and
    /// the run abort signal.
    async fn drive(
        &self,
        case: &TestCase,
        state: &mut CaseState,
        ctx: &mut TestContext,
    ) -> Result<(), HarnessError> {
        let work = async {
            for name in &case.fixtures {
                match self.provisioner.ensure(name).await {
                    Ok(fixture) => ctx.add_fixture(fixture),
                    Err(e) => {
                        self.abort
                            .abort(format!("fixture '{}' could not be provisioned: {}", name, e));
                        return Err(HarnessError::from(e));
                    }
                }
            }
            for hook in &case.setup {
                hook(&mut *ctx).await?;
            }
            state.advance(CaseStatus::FixturesReady)?;
            state.advance(CaseStatus::Executing)?;
            (case.body)(&mut *ctx).await
        };

        tokio::select! {
            biased;
            result = tokio::time::timeout(self.settings.case_timeout, work) => {
                result.unwrap_or(Err(HarnessError::CaseTimeout(self.settings.case_timeout)))
            }
            reason = self.abort.wait() => Err(HarnessError::Aborted(reason)),
        }
    }

    async fn run_teardown(&self, case: &TestCase, ctx: &mut TestContext) -> Vec<String> {
        let mut problems = Vec::new();
        for hook in &case.teardown {
            match tokio::time::timeout(self.settings.case_timeout, hook(&mut *ctx)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(case = %case.name, error = %e, "Teardown hook failed");
                    problems.push(format!("teardown hook failed: {}", e));
                }
                Err(_) => problems.push("teardown hook timed out".to_string()),
            }
        }
        problems
    }
}
