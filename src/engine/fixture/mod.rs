mod definition;
mod installer;
mod provisioner;
mod registry;

pub use definition::{FixtureColumn, FixtureDefinition, FixtureVars};
pub use installer::{FixtureInstaller, StatementInstaller};
pub use provisioner::FixtureProvisioner;
pub use registry::FixtureRegistry;
