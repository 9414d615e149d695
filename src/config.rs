use serde::Deserialize;
use config::{Config, ConfigError, Environment};
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub discovery: DiscoveryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DiscoveryConfig {
    pub default_radius_km: f64,
    pub default_limit: usize,
    /// Offset used to turn instants into schedule time of day.
    pub utc_offset_minutes: i32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 10.0,
            default_limit: 10,
            utc_offset_minutes: 7 * 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub snapshot_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Settings {
    /// Built-in defaults, then `config/default.*` if present, then `APP__*`
    /// environment variables (`APP__DISCOVERY__DEFAULT_LIMIT=5`).
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_environment(Environment::with_prefix("APP").separator("__"))
    }

    fn with_environment(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = DiscoveryConfig::default();
        let builder = Config::builder()
            .set_default("discovery.default_radius_km", defaults.default_radius_km)?
            .set_default("discovery.default_limit", defaults.default_limit as i64)?
            .set_default("discovery.utc_offset_minutes", i64::from(defaults.utc_offset_minutes))?
            .set_default("storage.snapshot_path", "data/snapshot.json")?
            .set_default("logging.filter", "info")?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(environment);

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        debug!(
            discovery = ?settings.discovery,
            snapshot_path = %settings.storage.snapshot_path,
            "Loaded settings"
        );

        Ok(settings)
    }
}
