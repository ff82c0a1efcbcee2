use std::fmt;

use crate::engine::compare::CompareMode;
use crate::engine::types::{ColumnType, Row};

/// Why two result sets did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    pub mode: CompareMode,
    /// Rows present in the actual result but not expected, with their index.
    pub unexpected: Vec<(usize, Row)>,
    /// Expected rows absent from the actual result, with their index.
    pub missing: Vec<(usize, Row)>,
    /// `(actual, expected)` column tags when they differ.
    pub columns: Option<(Vec<ColumnType>, Vec<ColumnType>)>,
    /// First index where ordered comparison diverged.
    pub first_divergence: Option<usize>,
}

impl Diff {
    pub(crate) fn new(mode: CompareMode) -> Self {
        Self {
            mode,
            unexpected: Vec::new(),
            missing: Vec::new(),
            columns: None,
            first_divergence: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unexpected.is_empty() && self.missing.is_empty() && self.columns.is_none()
    }
}

fn join_types(types: &[ColumnType]) -> String {
    types
        .iter()
        .map(ColumnType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "comparison mode: {}", self.mode)?;
        if let Some((actual, expected)) = &self.columns {
            writeln!(f, "column types differ")?;
            writeln!(f, "  actual:   [{}]", join_types(actual))?;
            writeln!(f, "  expected: [{}]", join_types(expected))?;
        }
        if let Some(index) = self.first_divergence {
            writeln!(f, "first divergence at row {}", index)?;
        }
        if !self.unexpected.is_empty() {
            writeln!(f, "unexpected rows ({}):", self.unexpected.len())?;
            for (index, row) in &self.unexpected {
                writeln!(f, "  + [{}] {}", index, row)?;
            }
        }
        if !self.missing.is_empty() {
            writeln!(f, "missing rows ({}):", self.missing.len())?;
            for (index, row) in &self.missing {
                writeln!(f, "  - [{}] {}", index, row)?;
            }
        }
        Ok(())
    }
}
