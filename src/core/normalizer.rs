use crate::domain::model::{Observation, RawReading};
use crate::utils::error::{Result, SyncError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    observations: Vec<ProviderObservation>,
}

#[derive(Debug, Deserialize)]
struct ProviderObservation {
    #[serde(default)]
    humidity: Option<Value>,
    metric: ProviderMetric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderMetric {
    #[serde(default)]
    temp: Option<Value>,
    #[serde(default)]
    heat_index: Option<Value>,
    #[serde(default)]
    dewpt: Option<Value>,
    #[serde(default)]
    wind_chill: Option<Value>,
    #[serde(default)]
    wind_speed: Option<Value>,
    #[serde(default)]
    wind_gust: Option<Value>,
    #[serde(default)]
    pressure: Option<Value>,
    #[serde(default)]
    precip_rate: Option<Value>,
    #[serde(default)]
    precip_total: Option<Value>,
}

/// Flattens `observations[0]` and its `metric` block into an [`Observation`].
///
/// Values are copied as received; absent or null fields become `None`. A body without an observations list, with an
/// empty list, or without a `metric` object is a [`SyncError::MalformedResponse`].
pub fn normalize(raw: &RawReading) -> Result<Observation> {
    let response = ProviderResponse::deserialize(&raw.body)
        .map_err(|e| SyncError::malformed(e.to_string()))?;

    let obs = response
        .observations
        .into_iter()
        .next()
        .ok_or_else(|| SyncError::malformed("observations list is empty"))?;
    let metric = obs.metric;

    Ok(Observation {
        temp: metric.temp,
        heat_index: metric.heat_index,
        dewpt: metric.dewpt,
        wind_chill: metric.wind_chill,
        wind_speed: metric.wind_speed,
        wind_gust: metric.wind_gust,
        humidity: obs.humidity,
        pressure: metric.pressure,
        precip_rate: metric.precip_rate,
        precip_total: metric.precip_total,
        timestamp: raw.local_timestamp.clone(),
    })
}
