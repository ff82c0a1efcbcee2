pub use super::factories::{
    CountingInstaller, FixtureFactory, ResultSetFactory, ScriptedClientFactory,
};

pub struct Factory;

impl Factory {
    pub fn result_set() -> ResultSetFactory {
        ResultSetFactory::new()
    }

    pub fn fixture(name: &str) -> FixtureFactory {
        FixtureFactory::new(name)
    }

    pub fn backends() -> ScriptedClientFactory {
        ScriptedClientFactory::new()
    }

    pub fn installer() -> CountingInstaller {
        CountingInstaller::new()
    }
}
