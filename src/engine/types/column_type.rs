use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Universal column tags every backend translates its native types into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Boolean,
    Integer,
    Bigint,
    Double,
    Real,
    Varchar,
    Varbinary,
    Timestamp,
    /// Column of an inferred result set whose cells are all null.
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Integer => "INTEGER",
            ColumnType::Bigint => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Real => "REAL",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Varbinary => "VARBINARY",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Unknown => "UNKNOWN",
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, ColumnType::Double | ColumnType::Real)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" => Ok(ColumnType::Boolean),
            "INTEGER" | "INT" => Ok(ColumnType::Integer),
            "BIGINT" => Ok(ColumnType::Bigint),
            "DOUBLE" => Ok(ColumnType::Double),
            "REAL" => Ok(ColumnType::Real),
            "VARCHAR" => Ok(ColumnType::Varchar),
            "VARBINARY" => Ok(ColumnType::Varbinary),
            "TIMESTAMP" => Ok(ColumnType::Timestamp),
            "UNKNOWN" => Ok(ColumnType::Unknown),
            _ => Err(()),
        }
    }
}
