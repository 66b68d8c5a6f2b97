pub mod auth;
pub mod file;

use crate::config::file::FileConfig;
use crate::core::scheduler::DEFAULT_INTERVAL;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_field,
    validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub use auth::AuthConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "weather-sync")]
#[command(about = "Polls a weather station, stores its readings and serves them over HTTP")]
pub struct ServiceConfig {
    #[arg(long, env = "WEATHER_COM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "STATION_ID", default_value = "ISANTI245")]
    pub station_id: String,

    #[arg(long, env = "WEATHER_API_BASE_URL", default_value = "https://api.weather.com")]
    pub provider_base_url: String,

    /// Remote document store, e.g. https://<project>-default-rtdb.firebaseio.com
    #[arg(long, env = "FIREBASE_URL")]
    pub firebase_url: Option<String>,

    /// Also POST each new record on top of the full history PUT
    #[arg(long, env = "MIRROR_APPEND", default_value_t = true, action = clap::ArgAction::Set)]
    pub mirror_append: bool,

    #[arg(long, env = "DATA_DIR", default_value = ".")]
    pub data_dir: String,

    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_INTERVAL.as_secs())]
    pub interval_secs: u64,

    #[arg(long, env = "ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Optional TOML file; its values override the flags above
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "LOG_JSON", help = "Emit JSON log lines")]
    pub log_json: bool,
}

impl ServiceConfig {
    /// Parses flags/environment and applies the TOML overlay when given.
    pub fn load() -> Result<Self> {
        let mut config = Self::parse();
        if let Some(path) = config.config.clone() {
            FileConfig::from_file(&path)?.apply_to(&mut config);
        }
        config.normalize();
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.firebase_url = self
            .firebase_url
            .take()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
    }

    pub fn api_key(&self) -> Result<&str> {
        validate_required_field("WEATHER_COM_API_KEY", &self.api_key).map(String::as_str)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", self.api_key()?)?;
        validate_non_empty_string("station_id", &self.station_id)?;
        validate_url("provider_base_url", &self.provider_base_url)?;
        if let Some(url) = &self.firebase_url {
            validate_url("firebase_url", url)?;
        }
        validate_path("data_dir", &self.data_dir)?;
        validate_positive_number("interval_secs", self.interval_secs, 1)?;
        Ok(())
    }
}
