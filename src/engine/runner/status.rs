use std::fmt;

use crate::engine::errors::IllegalTransition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    Pending,
    FixturesReady,
    Executing,
    Passed,
    Failed,
    Errored,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "PENDING",
            CaseStatus::FixturesReady => "FIXTURES_READY",
            CaseStatus::Executing => "EXECUTING",
            CaseStatus::Passed => "PASSED",
            CaseStatus::Failed => "FAILED",
            CaseStatus::Errored => "ERRORED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CaseStatus::Passed | CaseStatus::Failed | CaseStatus::Errored
        )
    }

    pub fn can_advance_to(&self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (Pending, FixturesReady)
                | (Pending, Errored)
                | (FixturesReady, Executing)
                | (FixturesReady, Errored)
                | (Executing, Passed)
                | (Executing, Failed)
                | (Executing, Errored)
        )
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of one case run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseState {
    status: CaseStatus,
}

impl CaseState {
    pub fn new() -> Self {
        Self {
            status: CaseStatus::Pending,
        }
    }

    pub fn status(&self) -> CaseStatus {
        self.status
    }

    pub fn advance(&mut self, next: CaseStatus) -> Result<(), IllegalTransition> {
        if !self.status.can_advance_to(next) {
            return Err(IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Default for CaseState {
    fn default() -> Self {
        Self::new()
    }
}
