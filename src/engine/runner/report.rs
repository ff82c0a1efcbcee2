use std::fmt;
use std::time::Duration;

use crate::engine::runner::CaseStatus;

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub groups: Vec<String>,
    pub status: CaseStatus,
    pub duration: Duration,
    /// Diff, deadline details or error text for anything but a pass.
    pub detail: Option<String>,
    /// Cleanup problems. These never change the status.
    pub warnings: Vec<String>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} {} [{}] ({} ms)",
            self.status,
            self.name,
            self.groups.join(","),
            self.duration.as_millis()
        )?;
        if let Some(detail) = &self.detail {
            for line in detail.lines() {
                write!(f, "\n        {}", line)?;
            }
        }
        for warning in &self.warnings {
            write!(f, "\n        warning: {}", warning)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    pub duration: Duration,
}

impl SuiteReport {
    pub fn new(cases: Vec<CaseReport>, duration: Duration) -> Self {
        Self { cases, duration }
    }

    pub fn count(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }

    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    pub fn get(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in &self.cases {
            writeln!(f, "{}", case)?;
        }
        write!(
            f,
            "{} cases: {} passed, {} failed, {} errored in {:.2}s",
            self.cases.len(),
            self.count(CaseStatus::Passed),
            self.count(CaseStatus::Failed),
            self.count(CaseStatus::Errored),
            self.duration.as_secs_f64()
        )
    }
}
