mod case;
mod context;
mod report;
mod selection;
mod status;
mod suite;

pub use case::{CaseFn, CaseFuture, TestCase};
pub use context::TestContext;
pub use report::{CaseReport, SuiteReport};
pub use selection::Selection;
pub use status::{CaseState, CaseStatus};
pub use suite::{AbortSignal, RunnerSettings, SuiteRunner};

#[cfg(test)]
mod suite_test;
