use std::fmt;

use crate::engine::compare::FloatPolicy;
use crate::engine::types::Cell;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Same width, and every position matches by tag and value.
    pub fn matches(&self, other: &Row, policy: FloatPolicy) -> bool {
        self.cells.len() == other.cells.len()
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.matches(b, policy))
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Row::new(cells)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", cell)?;
        }
        f.write_str(")")
    }
}

/// Builds a [`Row`] from values convertible into [`Cell`].
///
/// ```
/// use conformance_harness::row;
/// use conformance_harness::engine::types::Cell;
///
/// let r = row!["CANADA", 3i64, Cell::Null];
/// assert_eq!(r.len(), 3);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::engine::types::Row::default()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::engine::types::Row::new(vec![$($crate::engine::types::Cell::from($value)),+])
    };
}
