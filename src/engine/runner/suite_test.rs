use super::{CaseStatus, RunnerSettings, Selection, SuiteRunner, TestCase};
use crate::engine::backend::{BackendId, Query};
use crate::logging::init_for_tests;
use crate::engine::errors::{BackendError, HarnessError};
use crate::engine::fixture::{FixtureProvisioner, FixtureVars};
use crate::engine::poll::Backoff;
use crate::row;
use crate::shared::time::ManualClock;
use crate::test_helpers::factories::{CountingInstaller, FixtureFactory, ScriptedClientFactory};
use crate::test_helpers::factory::Factory;
use std::sync::Arc;
use std::time::Duration;

fn settings() -> RunnerSettings {
    RunnerSettings {
        max_concurrency: 4,
        case_timeout: Duration::from_millis(500),
        poll_timeout: Duration::from_secs(5),
        backoff: Backoff::fixed(Duration::from_millis(100)),
        ..RunnerSettings::default()
    }
}

fn runner(
    backends: &ScriptedClientFactory,
    installer: &Arc<CountingInstaller>,
    settings: RunnerSettings,
) -> SuiteRunner {
    let registry = FixtureFactory::registry(vec![
        Factory::fixture("nation").create(),
        Factory::fixture("supplier").create(),
    ]);
    let provisioner = Arc::new(FixtureProvisioner::new(registry, installer.clone()));
    SuiteRunner::new(
        provisioner,
        Arc::new(backends.clone()),
        FixtureVars::new("cassandra", "test"),
        settings,
    )
    .with_clock(Arc::new(ManualClock::new()))
}

fn one_row_nation(backends: &ScriptedClientFactory) {
    backends.respond(
        Query::engine("SELECT n_nationkey FROM cassandra.test.nation"),
        Factory::result_set().with_row(row![1i64]).create(),
    );
}

fn passing() -> TestCase {
    TestCase::new("passing", |ctx| {
        Box::pin(async move {
            let rs = ctx.engine("SELECT n_nationkey FROM cassandra.test.nation").await?;
            ctx.assert_that(&rs).contains_only([row![1i64]])?;
            Ok(())
        })
    })
    .in_group("cassandra")
    .requires("nation")
}

fn mismatching() -> TestCase {
    TestCase::new("mismatching", |ctx| {
        Box::pin(async move {
            let rs = ctx.engine("SELECT n_nationkey FROM cassandra.test.nation").await?;
            ctx.assert_that(&rs).contains_only([row![2i64]])?;
            Ok(())
        })
    })
    .in_group("cassandra")
    .requires("nation")
}

fn erroring() -> TestCase {
    TestCase::new("erroring", |ctx| {
        Box::pin(async move {
            ctx.engine("SELECT broken").await?;
            Ok(())
        })
    })
    .in_group("tpch")
}

#[tokio::test]
async fn classifies_pass_fail_and_error() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    backends.fail(
        Query::engine("SELECT broken"),
        BackendError::Query {
            backend: "engine".into(),
            status: 400,
            payload: "syntax error".into(),
        },
    );
    let installer = Arc::new(Factory::installer());

    let report = runner(&backends, &installer, settings())
        .run(&[passing(), mismatching(), erroring()], &Selection::all())
        .await;

    assert_eq!(report.get("passing").unwrap().status, CaseStatus::Passed);
    let failed = report.get("mismatching").unwrap();
    assert_eq!(failed.status, CaseStatus::Failed);
    assert!(failed.detail.as_deref().unwrap().contains("missing rows"));
    let errored = report.get("erroring").unwrap();
    assert_eq!(errored.status, CaseStatus::Errored);
    assert!(errored.detail.as_deref().unwrap().contains("syntax error"));

    assert!(!report.all_passed());
    assert_eq!(backends.opens(), backends.closes());
    assert_eq!(installer.installs(), vec!["nation"]);
}

#[tokio::test]
async fn report_keeps_selection_order() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer());

    let report = runner(&backends, &installer, settings())
        .run(&[erroring(), passing(), mismatching()], &Selection::all())
        .await;
    let names: Vec<_> = report.cases.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["erroring", "passing", "mismatching"]);
}

#[tokio::test]
async fn selection_limits_the_run() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer());

    let report = runner(&backends, &installer, settings())
        .run(
            &[passing(), mismatching(), erroring()],
            &Selection::all().include("cassandra").named("passing"),
        )
        .await;
    assert_eq!(report.cases.len(), 1);
    assert!(report.all_passed());
}

#[tokio::test]
async fn shared_fixture_installs_once_across_concurrent_cases() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer().with_delay(Duration::from_millis(20)));

    let cases: Vec<TestCase> = (0..6)
        .map(|i| {
            let mut case = passing();
            case.name = format!("passing_{}", i);
            case
        })
        .collect();
    let report = runner(&backends, &installer, settings())
        .run(&cases, &Selection::all())
        .await;

    assert!(report.all_passed());
    assert_eq!(installer.attempts(), 1);
    assert_eq!(installer.uninstalls(), vec!["nation"]);
}

#[tokio::test]
async fn keep_fixtures_skips_release() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer());
    let settings = RunnerSettings {
        keep_fixtures: true,
        ..settings()
    };

    runner(&backends, &installer, settings)
        .run(&[passing()], &Selection::all())
        .await;
    assert!(installer.uninstalls().is_empty());
}

#[tokio::test]
async fn provisioning_failure_aborts_the_run() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer().failing(u32::MAX));
    let settings = RunnerSettings {
        max_concurrency: 1,
        ..settings()
    };

    let report = runner(&backends, &installer, settings)
        .run(&[passing(), erroring(), mismatching()], &Selection::all())
        .await;

    for case in &report.cases {
        assert_eq!(case.status, CaseStatus::Errored, "{}", case.name);
    }
    assert!(report.cases[0].detail.as_deref().unwrap().contains("failed to install"));
    assert!(report.cases[1].detail.as_deref().unwrap().contains("run aborted"));
    assert!(report.cases[2].detail.as_deref().unwrap().contains("nation"));
    assert_eq!(installer.attempts(), 1);
}

#[tokio::test]
async fn case_timeout_still_runs_cleanup() {
    init_for_tests();
    let backends = Factory::backends();
    backends.hang(Query::engine("SELECT * FROM cassandra.test.slow"));
    let installer = Arc::new(Factory::installer());
    let settings = RunnerSettings {
        case_timeout: Duration::from_millis(50),
        ..settings()
    };

    let hanging = TestCase::new("hanging", |ctx| {
        Box::pin(async move {
            ctx.defer(Query::native("DROP MATERIALIZED VIEW IF EXISTS test.mv_slow"));
            ctx.engine("SELECT * FROM cassandra.test.slow").await?;
            Ok(())
        })
    })
    .after(|ctx| {
        Box::pin(async move {
            ctx.native("DROP TABLE IF EXISTS test.scratch").await?;
            Ok(())
        })
    });

    let report = runner(&backends, &installer, settings)
        .run(&[hanging], &Selection::all())
        .await;

    let case = report.get("hanging").unwrap();
    assert_eq!(case.status, CaseStatus::Errored);
    assert!(case.detail.as_deref().unwrap().contains("time limit"));
    assert_eq!(
        backends.executed_sql(&BackendId::native()),
        vec![
            "DROP TABLE IF EXISTS test.scratch",
            "DROP MATERIALIZED VIEW IF EXISTS test.mv_slow"
        ]
    );
    assert_eq!(backends.opens(), backends.closes());
}

#[tokio::test]
async fn failing_setup_hook_skips_body_and_teardown() {
    init_for_tests();
    let backends = Factory::backends();
    let installer = Arc::new(Factory::installer());

    let case = TestCase::new("guarded", |ctx| {
        Box::pin(async move {
            ctx.engine("SELECT body").await?;
            Ok(())
        })
    })
    .before(|_ctx| Box::pin(async { Err(HarnessError::Setup("no keyspace".into())) }))
    .after(|ctx| {
        Box::pin(async move {
            ctx.engine("SELECT teardown").await?;
            Ok(())
        })
    });

    let report = runner(&backends, &installer, settings())
        .run(&[case], &Selection::all())
        .await;

    assert_eq!(report.cases[0].status, CaseStatus::Errored);
    assert!(backends.executed().is_empty());
}

#[tokio::test]
async fn teardown_runs_after_failure() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer());

    let case = mismatching().after(|ctx| {
        Box::pin(async move {
            ctx.native("DROP TABLE IF EXISTS test.scratch").await?;
            Ok(())
        })
    });
    let report = runner(&backends, &installer, settings())
        .run(&[case], &Selection::all())
        .await;

    assert_eq!(report.cases[0].status, CaseStatus::Failed);
    assert_eq!(
        backends.executed_sql(&BackendId::native()),
        vec!["DROP TABLE IF EXISTS test.scratch"]
    );
}

#[tokio::test]
async fn external_abort_errors_every_case() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer());
    let runner = runner(&backends, &installer, settings());
    runner.abort_signal().abort("operator interrupt");

    let report = runner.run(&[passing(), erroring()], &Selection::all()).await;
    assert!(report.cases.iter().all(|c| c.status == CaseStatus::Errored));
    assert!(
        report.cases[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("operator interrupt")
    );
    assert_eq!(backends.opens(), 0);
}

#[tokio::test]
async fn abort_interrupts_in_flight_case() {
    init_for_tests();
    let backends = Factory::backends();
    backends.hang(Query::engine("SELECT * FROM cassandra.test.slow"));
    let installer = Arc::new(Factory::installer());
    let settings = RunnerSettings {
        case_timeout: Duration::from_secs(30),
        ..settings()
    };
    let runner = runner(&backends, &installer, settings);
    let signal = runner.abort_signal();

    let hanging = TestCase::new("hanging", |ctx| {
        Box::pin(async move {
            ctx.engine("SELECT * FROM cassandra.test.slow").await?;
            Ok(())
        })
    });

    let cases = [hanging];
    let selection = Selection::all();
    let (report, _) = tokio::join!(runner.run(&cases, &selection), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.abort("stop");
    });

    assert_eq!(report.cases[0].status, CaseStatus::Errored);
    assert!(report.cases[0].detail.as_deref().unwrap().contains("stop"));
    assert_eq!(backends.opens(), backends.closes());
}

#[tokio::test]
async fn abort_interrupts_a_slow_fixture_install() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer().with_delay(Duration::from_secs(5)));
    let settings = RunnerSettings {
        case_timeout: Duration::from_secs(30),
        ..settings()
    };
    let runner = runner(&backends, &installer, settings);
    let signal = runner.abort_signal();

    let cases = [passing()];
    let selection = Selection::all();
    let started = std::time::Instant::now();
    let (report, _) = tokio::join!(runner.run(&cases, &selection), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.abort("stop");
    });

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.cases[0].status, CaseStatus::Errored);
    assert!(report.cases[0].detail.as_deref().unwrap().contains("stop"));
    assert!(installer.installs().is_empty());
}

#[tokio::test]
async fn case_timeout_covers_fixture_install() {
    init_for_tests();
    let backends = Factory::backends();
    one_row_nation(&backends);
    let installer = Arc::new(Factory::installer().with_delay(Duration::from_secs(5)));
    let settings = RunnerSettings {
        case_timeout: Duration::from_millis(100),
        ..settings()
    };

    let started = std::time::Instant::now();
    let report = runner(&backends, &installer, settings)
        .run(&[passing()], &Selection::all())
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    let case = &report.cases[0];
    assert_eq!(case.status, CaseStatus::Errored);
    assert!(case.detail.as_deref().unwrap().contains("time limit"));
    assert_eq!(backends.opens(), backends.closes());
}
