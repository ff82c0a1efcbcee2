pub mod cassandra_select;

use crate::engine::runner::TestCase;

/// Every case the binary knows about.
pub fn all() -> Vec<TestCase> {
    cassandra_select::cases()
}
