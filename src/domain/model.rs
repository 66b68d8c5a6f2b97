use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 本地時間戳格式，秒級精度
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn local_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Provider response plus the local wall-clock time it was received at.
#[derive(Debug, Clone)]
pub struct RawReading {
    pub body: Value,
    pub local_timestamp: String,
}

/// One normalized station reading. Measurements are the provider's values
/// as received, so `1012` stays an integer and `22.5` a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub temp: Option<Value>,
    #[serde(default, rename = "heatIndex")]
    pub heat_index: Option<Value>,
    #[serde(default)]
    pub dewpt: Option<Value>,
    #[serde(default, rename = "windChill")]
    pub wind_chill: Option<Value>,
    #[serde(default, rename = "windSpeed")]
    pub wind_speed: Option<Value>,
    #[serde(default, rename = "windGust")]
    pub wind_gust: Option<Value>,
    #[serde(default)]
    pub humidity: Option<Value>,
    #[serde(default)]
    pub pressure: Option<Value>,
    #[serde(default, rename = "precipRate")]
    pub precip_rate: Option<Value>,
    #[serde(default, rename = "precipTotal")]
    pub precip_total: Option<Value>,
    pub timestamp: String,
}

impl Observation {
    /// Calendar day used to pick the CSV partition. Falls back to today when
    /// the timestamp cannot be parsed.
    pub fn partition_date(&self) -> NaiveDate {
        parse_timestamp_date(&self.timestamp).unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn to_row(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

fn parse_timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    let trimmed = timestamp.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok())
}

/// Client-submitted flood report. The payload is free-form; `id` and
/// `timestamp` are always assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodReport {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    pub timestamp: String,
    pub id: u64,
}

impl FloodReport {
    pub fn new(mut payload: Map<String, Value>, id: u64, timestamp: String) -> Self {
        // 伺服器欄位優先
        payload.remove("id");
        payload.remove("timestamp");
        Self {
            payload,
            timestamp,
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Counters reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    pub total_records: usize,
    pub total_flood_reports: usize,
    pub last_updated: Option<String>,
    pub last_record: Option<Observation>,
}
