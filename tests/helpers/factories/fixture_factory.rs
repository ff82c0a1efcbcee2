use serde_json::{Value, json};

use crate::engine::fixture::{FixtureColumn, FixtureDefinition, FixtureRegistry};

pub struct FixtureFactory {
    fixture: FixtureDefinition,
}

impl FixtureFactory {
    pub fn new(name: &str) -> Self {
        let table = name.to_ascii_lowercase();
        Self {
            fixture: FixtureDefinition {
                name: name.to_string(),
                version: 1,
                table: table.clone(),
                columns: vec![FixtureColumn {
                    name: "id".into(),
                    native_type: "bigint".into(),
                }],
                setup: vec![
                    format!("CREATE TABLE ${{keyspace}}.{} (id bigint PRIMARY KEY)", table),
                    format!("INSERT INTO ${{keyspace}}.{} (id) VALUES (1)", table),
                ],
                teardown: vec![format!("DROP TABLE IF EXISTS ${{keyspace}}.{}", table)],
                rows: vec![vec![json!(1)]],
            },
        }
    }

    pub fn with_columns(mut self, columns: &[(&str, &str)]) -> Self {
        self.fixture.columns = columns
            .iter()
            .map(|(name, native_type)| FixtureColumn {
                name: name.to_string(),
                native_type: native_type.to_string(),
            })
            .collect();
        self.fixture.rows.clear();
        self
    }

    pub fn with_row(mut self, values: Vec<Value>) -> Self {
        self.fixture.rows.push(values);
        self
    }

    pub fn with_setup(mut self, statements: &[&str]) -> Self {
        self.fixture.setup = statements.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_teardown(mut self, statements: &[&str]) -> Self {
        self.fixture.teardown = statements.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.fixture.version = version;
        self
    }

    pub fn create(self) -> FixtureDefinition {
        self.fixture
    }

    /// A registry holding just this fixture.
    pub fn registry_of(self) -> FixtureRegistry {
        Self::registry(vec![self.create()])
    }

    pub fn registry(fixtures: Vec<FixtureDefinition>) -> FixtureRegistry {
        let mut registry = FixtureRegistry::new();
        for fixture in fixtures {
            registry.register(fixture).expect("fixture registers");
        }
        registry
    }
}
