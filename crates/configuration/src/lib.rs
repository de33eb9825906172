use crate::error::ConfigError;
use crate::settings::EngineConfig;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Backend, EngineConfig as Config, Refresh};

/// Loads the engine configuration from `meridian.toml`, falling back to the
/// built-in defaults when the file is absent.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `meridian.toml`.
        .add_source(config::File::with_name("meridian").required(false))
        // Environment overrides, e.g. MERIDIAN_INITIAL_CURRENCY=EUR.
        .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
        .build()?;

    let config = builder.try_deserialize::<EngineConfig>()?;

    Ok(config)
}
