use crate::engine::errors::ResultSetError;
use crate::engine::types::{Cell, ColumnType, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Option<String>,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: Some(name.into()),
            column_type,
        }
    }

    pub fn unnamed(column_type: ColumnType) -> Self {
        Self {
            name: None,
            column_type,
        }
    }
}

/// Rows plus their declared column tags.
///
/// Construction enforces that every row is as wide as the column list and
/// that every non-null cell carries its column's tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Result<Self, ResultSetError> {
        for (row_index, row) in rows.iter().enumerate() {
            validate_row(&columns, row_index, row)?;
        }
        Ok(Self { columns, rows })
    }

    pub fn empty(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Unnamed columns with the given tags.
    pub fn typed(types: &[ColumnType], rows: Vec<Row>) -> Result<Self, ResultSetError> {
        let columns = types.iter().copied().map(Column::unnamed).collect();
        Self::new(columns, rows)
    }

    /// Infers column tags from the first non-null cell of each position.
    /// Positions holding only nulls become `UNKNOWN`.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, ResultSetError> {
        let width = rows.first().map(Row::len).unwrap_or(0);
        let mut types = vec![ColumnType::Unknown; width];
        for row in &rows {
            for (slot, cell) in types.iter_mut().zip(row.cells()) {
                if *slot == ColumnType::Unknown {
                    if let Some(tag) = cell.column_type() {
                        *slot = tag;
                    }
                }
            }
        }
        Self::typed(&types, rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.column_type).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of the first row, for single-value queries.
    pub fn scalar(&self) -> Option<&Cell> {
        self.rows.first().and_then(|r| r.get(0))
    }
}

fn validate_row(columns: &[Column], row_index: usize, row: &Row) -> Result<(), ResultSetError> {
    if row.len() != columns.len() {
        return Err(ResultSetError::RowWidth {
            row: row_index,
            expected: columns.len(),
            actual: row.len(),
        });
    }
    for (column_index, (column, cell)) in columns.iter().zip(row.cells()).enumerate() {
        if let Some(tag) = cell.column_type() {
            if tag != column.column_type {
                return Err(ResultSetError::CellType {
                    row: row_index,
                    column: column_index,
                    expected: column.column_type,
                    actual: tag,
                });
            }
        }
    }
    Ok(())
}
