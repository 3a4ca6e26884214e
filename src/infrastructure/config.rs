use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub weather: WeatherSettings,
    pub storage: StorageSettings,
    pub seed: SeedSettings,
    pub timeline: TimelineSettings,
    pub alerts: AlertSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    pub archive_url: String,
    pub default_data_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: String,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimelineSettings {
    pub window_days: i64,
    pub weather_lookback_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertSettings {
    pub first_alert_secs: u64,
    pub min_interval_secs: u64,
    pub max_interval_secs: u64,
}

/// `config/app.toml`, overridden by `IIOT__SECTION__KEY` environment variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app"))
        .add_source(config::Environment::with_prefix("IIOT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
