use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::SettingsOverrides;
pub use error::ConfigError;
pub use settings::{
    ForecastSettings, IndicatorSettings, LoggingSettings, MarketDataSettings, Settings,
    StatisticsSettings,
};

/// Prefix of the environment variables that override file values,
/// e.g. `CRYPTOLENS__STATISTICS__RISK_FREE_RATE=0.03`.
pub const ENV_PREFIX: &str = "CRYPTOLENS";

/// Keys whose environment values are comma-separated lists,
/// e.g. `CRYPTOLENS__INDICATORS__MA_WINDOWS=10,50`.
const LIST_KEYS: [&str; 1] = ["indicators.ma_windows"];

/// Loads the application configuration from an optional `config.toml` in the
/// working directory, layered with `CRYPTOLENS__*` environment variables.
///
/// This function is the primary entry point for this crate. Missing keys fall
/// back to their defaults, and the result is validated before it is returned.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(environment());
    finish(builder)
}

/// Loads the configuration from an explicit file, which must exist.
pub fn load_settings_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(true))
        .add_source(environment());
    tracing::debug!(path = %path.display(), "loading configuration file");
    finish(builder)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key(LIST_KEYS[0])
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Settings, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_env(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let builder = config::Config::builder().add_source(environment().source(Some(source)));
        finish(builder)
    }

    #[test]
    fn list_values_are_split_on_commas() {
        let settings = from_env(&[("CRYPTOLENS__INDICATORS__MA_WINDOWS", "10,50")]).unwrap();
        assert_eq!(settings.indicators.ma_windows, vec![10, 50]);
    }

    #[test]
    fn scalar_values_are_parsed() {
        let settings = from_env(&[
            ("CRYPTOLENS__STATISTICS__RISK_FREE_RATE", "0.03"),
            ("CRYPTOLENS__FORECAST__HORIZON", "14"),
        ])
        .unwrap();
        assert_eq!(settings.statistics.risk_free_rate, 0.03);
        assert_eq!(settings.forecast.horizon, 14);
        assert_eq!(settings.indicators.ma_windows, vec![7, 30]);
    }
}
