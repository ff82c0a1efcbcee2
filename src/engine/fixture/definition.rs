use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::backend::{QualifiedName, decode_cell, map_native_type};
use crate::engine::errors::ProvisionError;
use crate::engine::types::{Column, ResultSet, Row};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureColumn {
    pub name: String,
    /// Native type name, e.g. `bigint` or `map<text,int>`.
    #[serde(rename = "type")]
    pub native_type: String,
}

/// A named reference dataset: how to install it and what it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDefinition {
    pub name: String,
    pub version: u32,
    pub table: String,
    pub columns: Vec<FixtureColumn>,
    /// Native statements that create and fill the table, in order.
    pub setup: Vec<String>,
    #[serde(default)]
    pub teardown: Vec<String>,
    /// Reference contents, one JSON value per column.
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

/// Values substituted for `${catalog}` and `${keyspace}` in statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureVars {
    pub catalog: String,
    pub keyspace: String,
}

impl FixtureVars {
    pub fn new(catalog: impl Into<String>, keyspace: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            keyspace: keyspace.into(),
        }
    }

    pub fn substitute(&self, text: &str) -> String {
        text.replace("${catalog}", &self.catalog)
            .replace("${keyspace}", &self.keyspace)
    }

    /// Query-engine address of a table in the fixture keyspace.
    pub fn table(&self, table: &str) -> QualifiedName {
        QualifiedName::new(&self.catalog, &self.keyspace, table)
    }
}

impl FixtureDefinition {
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Copy with placeholders in every statement resolved.
    pub fn resolved(&self, vars: &FixtureVars) -> Self {
        Self {
            setup: self.setup.iter().map(|s| vars.substitute(s)).collect(),
            teardown: self.teardown.iter().map(|s| vars.substitute(s)).collect(),
            ..self.clone()
        }
    }

    /// Structural checks done when the registry loads a definition.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("fixture name is empty".to_string());
        }
        if self.columns.is_empty() {
            return Err(format!("fixture '{}' declares no columns", self.name));
        }
        if self.setup.is_empty() {
            return Err(format!("fixture '{}' has no setup statements", self.name));
        }
        for column in &self.columns {
            if map_native_type(&column.native_type).is_none() {
                return Err(format!(
                    "fixture '{}' column '{}' has unsupported type '{}'",
                    self.name, column.name, column.native_type
                ));
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(format!(
                    "fixture '{}' row {} has {} values for {} columns",
                    self.name,
                    index,
                    row.len(),
                    self.columns.len()
                ));
            }
        }
        Ok(())
    }

    /// The reference contents as the query engine should return them for
    /// `SELECT <all columns> FROM <table>`.
    pub fn reference_result(&self) -> Result<ResultSet, ProvisionError> {
        let mut mappings = Vec::with_capacity(self.columns.len());
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mapping = map_native_type(&column.native_type).ok_or_else(|| {
                self.definition_error(format!("unsupported type '{}'", column.native_type))
            })?;
            mappings.push(mapping);
            columns.push(Column::new(column.name.clone(), mapping.column_type));
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for values in &self.rows {
            let cells = values
                .iter()
                .zip(&mappings)
                .zip(&self.columns)
                .map(|((value, mapping), column)| {
                    decode_cell(value, *mapping)
                        .map_err(|e| self.definition_error(format!("column '{}': {}", column.name, e)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(Row::new(cells));
        }
        Ok(ResultSet::new(columns, rows)?)
    }

    fn definition_error(&self, message: String) -> ProvisionError {
        ProvisionError::Definition {
            path: self.name.clone(),
            message,
        }
    }
}
