use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

use crate::engine::compare::FloatPolicy;
use crate::engine::types::ColumnType;

/// One value of a result row, tagged with its universal type.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    Float(f32),
    Text(String),
    Binary(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
}

impl Cell {
    /// The column tag this cell belongs to. Null fits any column.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Cell::Null => None,
            Cell::Boolean(_) => Some(ColumnType::Boolean),
            Cell::Integer(_) => Some(ColumnType::Integer),
            Cell::Long(_) => Some(ColumnType::Bigint),
            Cell::Double(_) => Some(ColumnType::Double),
            Cell::Float(_) => Some(ColumnType::Real),
            Cell::Text(_) => Some(ColumnType::Varchar),
            Cell::Binary(_) => Some(ColumnType::Varbinary),
            Cell::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Tag-strict equality. Floating cells follow `policy`; every other tag
    /// compares exactly, timestamps as absolute instants.
    pub fn matches(&self, other: &Cell, policy: FloatPolicy) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Boolean(a), Cell::Boolean(b)) => a == b,
            (Cell::Integer(a), Cell::Integer(b)) => a == b,
            (Cell::Long(a), Cell::Long(b)) => a == b,
            (Cell::Double(a), Cell::Double(b)) => policy.doubles_equal(*a, *b),
            (Cell::Float(a), Cell::Float(b)) => policy.floats_equal(*a, *b),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Binary(a), Cell::Binary(b)) => a == b,
            (Cell::Timestamp(a), Cell::Timestamp(b)) => a == b,
            _ => false,
        }
    }

    pub fn timestamp_utc(dt: DateTime<Utc>) -> Self {
        Cell::Timestamp(dt.fixed_offset())
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other, FloatPolicy::Exact)
    }
}

impl fmt::Display for Cell {
    /// Literal-style rendering: text is quoted, longs carry `L`, floats `f`,
    /// so cells of different tags never print alike.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NULL"),
            Cell::Boolean(b) => write!(f, "{}", b),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Long(l) => write!(f, "{}L", l),
            Cell::Double(d) => write!(f, "{:?}", d),
            Cell::Float(x) => write!(f, "{:?}f", x),
            Cell::Text(s) => write!(f, "{:?}", s),
            Cell::Binary(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Cell::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", ts.to_rfc3339()),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Integer(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Long(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Double(value)
    }
}

impl From<f32> for Cell {
    fn from(value: f32) -> Self {
        Cell::Float(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Vec<u8>> for Cell {
    fn from(value: Vec<u8>) -> Self {
        Cell::Binary(value)
    }
}

impl From<&[u8]> for Cell {
    fn from(value: &[u8]) -> Self {
        Cell::Binary(value.to_vec())
    }
}

impl From<DateTime<FixedOffset>> for Cell {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Cell::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(value: DateTime<Utc>) -> Self {
        Cell::timestamp_utc(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}
