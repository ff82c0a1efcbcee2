pub mod engine;
pub mod logging;
pub mod shared;
pub mod suites;

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
