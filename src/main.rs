use clap::Parser;
use conformance_harness::engine::backend::{BackendId, HttpJsonClientFactory};
use conformance_harness::engine::fixture::{
    FixtureProvisioner, FixtureRegistry, FixtureVars, StatementInstaller,
};
use conformance_harness::engine::runner::{RunnerSettings, Selection, SuiteRunner};
use conformance_harness::logging;
use conformance_harness::shared::config::{load_settings, load_settings_from};
use conformance_harness::suites;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "conformance")]
#[command(about = "Runs query conformance cases against the engine and the native store", long_about = None)]
struct Args {
    /// Config file (defaults to $CONFORMANCE_CONFIG, then ./config)
    #[arg(short, long)]
    config: Option<String>,

    /// Run only the named case; repeatable
    #[arg(long = "case")]
    cases: Vec<String>,

    /// Run only cases in this group; repeatable
    #[arg(short, long = "group")]
    groups: Vec<String>,

    /// Skip cases in this group; repeatable
    #[arg(long = "exclude-group")]
    exclude_groups: Vec<String>,

    /// Print the selected cases and exit
    #[arg(long)]
    list: bool,

    /// Randomize case order
    #[arg(long)]
    shuffle: bool,

    /// Override harness.max_concurrency
    #[arg(long)]
    concurrency: Option<usize>,
}

impl Args {
    fn selection(&self) -> Selection {
        Selection {
            names: self.cases.clone(),
            include_groups: self.groups.clone(),
            exclude_groups: self.exclude_groups.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };

    let cases = suites::all();
    let selection = args.selection();
    if args.list {
        for case in cases.iter().filter(|c| selection.matches(c)) {
            println!("{} [{}]", case.name, case.groups.join(","));
        }
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&settings.logging)?;
    for name in selection.unknown_names(&cases) {
        warn!("No case named '{}'", name);
    }

    let vars = FixtureVars::new(&settings.fixtures.catalog, &settings.fixtures.keyspace);
    let registry = FixtureRegistry::load_dir(&settings.fixtures.dir, &vars)?;
    info!(fixtures = ?registry.names(), dir = %settings.fixtures.dir, "Loaded fixtures");

    let factory = Arc::new(HttpJsonClientFactory::new(&settings.backends));
    let installer = Arc::new(StatementInstaller::new(
        factory.clone(),
        BackendId::new(settings.fixtures.installer_backend.as_str()),
    ));
    let provisioner = Arc::new(FixtureProvisioner::new(registry, installer));

    let mut runner_settings = RunnerSettings::from_settings(&settings)?;
    runner_settings.shuffle |= args.shuffle;
    if let Some(concurrency) = args.concurrency {
        runner_settings.max_concurrency = concurrency.max(1);
    }
    let runner = SuiteRunner::new(provisioner, factory, vars, runner_settings);

    let abort = runner.abort_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.abort("interrupted");
        }
    });

    let report = runner.run(&cases, &selection).await;
    println!("{}", report);

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
