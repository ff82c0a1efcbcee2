pub mod model;

pub use model::{
    BackendConfig, CompareConfig, FixturesConfig, HarnessConfig, LoggingConfig, PollConfig,
    Settings, load_settings, load_settings_from,
};
