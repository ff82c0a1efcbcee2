pub mod counting_installer;
pub mod fixture_factory;
pub mod result_set_factory;
pub mod scripted_backend;

pub use counting_installer::CountingInstaller;
pub use fixture_factory::FixtureFactory;
pub use result_set_factory::ResultSetFactory;
pub use scripted_backend::{ScriptedBackend, ScriptedClientFactory};

#[cfg(test)]
mod scripted_backend_test;
