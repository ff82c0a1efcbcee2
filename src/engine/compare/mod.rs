mod assert;
mod comparator;
mod diff;
mod float_policy;

pub use assert::QueryAssert;
pub use comparator::{CompareMode, MatchResult, compare};
pub use diff::Diff;
pub use float_policy::FloatPolicy;
