use crate::config::ServiceConfig;
use crate::utils::error::{Result, SyncError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional `weather-sync.toml` overlay. Every field is optional; present
/// values replace the corresponding flag or environment value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub provider: Option<ProviderSection>,
    pub remote: Option<RemoteSection>,
    pub storage: Option<StorageSection>,
    pub schedule: Option<ScheduleSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    pub base_url: Option<String>,
    pub station_id: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSection {
    pub base_url: Option<String>,
    pub mirror_append: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSection {
    pub interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub allowed_origin: Option<String>,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::InvalidConfigValue {
            field: "config".to_string(),
            value: "<toml>".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    pub fn apply_to(self, config: &mut ServiceConfig) {
        if let Some(provider) = self.provider {
            if let Some(v) = provider.base_url {
                config.provider_base_url = v;
            }
            if let Some(v) = provider.station_id {
                config.station_id = v;
            }
            if provider.api_key.is_some() {
                config.api_key = provider.api_key;
            }
        }
        if let Some(remote) = self.remote {
            if let Some(v) = remote.base_url {
                config.firebase_url = Some(v);
            }
            if let Some(v) = remote.mirror_append {
                config.mirror_append = v;
            }
        }
        if let Some(v) = self.storage.and_then(|s| s.data_dir) {
            config.data_dir = v;
        }
        if let Some(v) = self.schedule.and_then(|s| s.interval_secs) {
            config.interval_secs = v;
        }
        if let Some(server) = self.server {
            if let Some(v) = server.port {
                config.port = v;
            }
            if server.allowed_origin.is_some() {
                config.allowed_origin = server.allowed_origin;
            }
        }
    }
}

/// 替換環境變數 (例如 ${WEATHER_COM_API_KEY})，未設定者保留原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::InvalidConfigValue {
        field: "config".to_string(),
        value: "<pattern>".to_string(),
        reason: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
