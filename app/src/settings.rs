use config::{Config, ConfigError, Environment, File};
use infrastructure::{DatabaseConfig, MonitoringConfig, MqttConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringConfig,
    pub database: DatabaseConfig,
    pub mqtt: MqttConfig,
    pub aquarea: crate::adapter::aquarea::AquareaSettings,
    pub homeassistant: crate::frontends::homeassistant::HomeAssistant,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::default().separator("_").list_separator(","));

        let s = builder.build()?;
        s.try_deserialize()
    }
}
