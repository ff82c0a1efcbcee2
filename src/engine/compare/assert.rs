use crate::engine::compare::{CompareMode, FloatPolicy, MatchResult, compare};
use crate::engine::errors::HarnessError;
use crate::engine::types::{ColumnType, ResultSet, Row};

/// Fluent assertions over one actual result set.
///
/// Each check returns `Err(HarnessError::Mismatch)` carrying the diff, so
/// case bodies chain them with `?`.
pub struct QueryAssert<'a> {
    actual: &'a ResultSet,
    policy: FloatPolicy,
}

impl<'a> QueryAssert<'a> {
    pub fn new(actual: &'a ResultSet) -> Self {
        Self {
            actual,
            policy: FloatPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FloatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn has_columns(&self, types: &[ColumnType]) -> Result<&Self, HarnessError> {
        let expected = ResultSet::typed(types, Vec::new())?;
        self.check(&expected, CompareMode::HasColumns)
    }

    pub fn contains_only(&self, rows: impl IntoIterator<Item = Row>) -> Result<&Self, HarnessError> {
        let expected = ResultSet::from_rows(rows.into_iter().collect())?;
        self.check(&expected, CompareMode::ContainsOnly)
    }

    pub fn contains(&self, rows: impl IntoIterator<Item = Row>) -> Result<&Self, HarnessError> {
        let expected = ResultSet::from_rows(rows.into_iter().collect())?;
        self.check(&expected, CompareMode::Contains)
    }

    pub fn contains_exactly(
        &self,
        rows: impl IntoIterator<Item = Row>,
    ) -> Result<&Self, HarnessError> {
        let expected = ResultSet::from_rows(rows.into_iter().collect())?;
        self.check(&expected, CompareMode::ExactOrdered)
    }

    /// Column tags and the row multiset both match `expected`.
    pub fn matches(&self, expected: &ResultSet) -> Result<&Self, HarnessError> {
        self.check(expected, CompareMode::HasColumns)?;
        self.check(expected, CompareMode::ContainsOnly)
    }

    pub fn check(&self, expected: &ResultSet, mode: CompareMode) -> Result<&Self, HarnessError> {
        match compare(self.actual, expected, mode, self.policy) {
            MatchResult::Match => Ok(self),
            MatchResult::Mismatch(diff) => Err(HarnessError::Mismatch(diff)),
        }
    }
}
