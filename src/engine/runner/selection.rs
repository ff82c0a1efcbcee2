use crate::engine::runner::TestCase;

/// Which cases a run picks up. Empty lists impose no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub names: Vec<String>,
    pub include_groups: Vec<String>,
    pub exclude_groups: Vec<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn include(mut self, group: impl Into<String>) -> Self {
        self.include_groups.push(group.into());
        self
    }

    pub fn exclude(mut self, group: impl Into<String>) -> Self {
        self.exclude_groups.push(group.into());
        self
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        let named = self.names.is_empty()
            || self.names.iter().any(|n| n.eq_ignore_ascii_case(&case.name));
        let included =
            self.include_groups.is_empty() || self.include_groups.iter().any(|g| case.has_group(g));
        let excluded = self.exclude_groups.iter().any(|g| case.has_group(g));
        named && included && !excluded
    }

    /// Requested names that match no case.
    pub fn unknown_names<'a>(&'a self, cases: &[TestCase]) -> Vec<&'a str> {
        self.names
            .iter()
            .filter(|n| !cases.iter().any(|c| c.name.eq_ignore_ascii_case(n)))
            .map(String::as_str)
            .collect()
    }
}
