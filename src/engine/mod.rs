pub mod backend;
pub mod compare;
pub mod errors;
pub mod fixture;
pub mod poll;
pub mod runner;
pub mod types;

pub use errors::*;
