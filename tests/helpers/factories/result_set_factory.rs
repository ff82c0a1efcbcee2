use crate::engine::types::{Column, ColumnType, ResultSet, Row};

pub struct ResultSetFactory {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ResultSetFactory {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(Column::new(name, column_type));
        self
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Uses the declared columns, or infers them from the rows when none
    /// were declared.
    pub fn create(self) -> ResultSet {
        if self.columns.is_empty() {
            ResultSet::from_rows(self.rows).expect("rows infer a valid result set")
        } else {
            ResultSet::new(self.columns, self.rows).expect("rows fit the declared columns")
        }
    }
}
