use crate::domain::model::{local_timestamp, RawReading};
use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use url::Url;

pub const CURRENT_OBSERVATION_PATH: &str = "/v2/pws/observations/current";

/// Station query against the provider's "current observation" endpoint.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    base_url: String,
    station_id: String,
    api_key: String,
    client: Client,
}

impl WeatherFetcher {
    pub fn new(base_url: &str, station_id: &str, api_key: &str) -> Self {
        Self::with_client(base_url, station_id, api_key, Client::new())
    }

    /// 不另外設定逾時，沿用 reqwest 預設（無上限）
    pub fn with_client(base_url: &str, station_id: &str, api_key: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            station_id: station_id.to_string(),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn request_url(&self) -> Result<Url> {
        let endpoint = format!("{}{}", self.base_url, CURRENT_OBSERVATION_PATH);
        Url::parse_with_params(
            &endpoint,
            &[
                ("stationId", self.station_id.as_str()),
                ("format", "json"),
                ("units", "m"),
                ("apiKey", self.api_key.as_str()),
            ],
        )
        .map_err(|e| SyncError::InvalidConfigValue {
            field: "provider_base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// One GET, no retry. Failures are logged here and handed back as `Err`.
    pub async fn fetch(&self) -> Result<RawReading> {
        let result = self.fetch_inner().await;
        if let Err(e) = &result {
            tracing::error!(station = %self.station_id, "❌ Failed to fetch observation: {}", e);
        }
        result
    }

    async fn fetch_inner(&self) -> Result<RawReading> {
        let url = self.request_url()?;
        tracing::debug!(station = %self.station_id, "Requesting current observation");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Provider response status: {}", status);

        if !status.is_success() {
            return Err(SyncError::Http {
                status: status.as_u16(),
                url: format!("{}{}", self.base_url, CURRENT_OBSERVATION_PATH),
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(RawReading {
            body,
            local_timestamp: local_timestamp(),
        })
    }
}
