use crate::domain::model::{local_timestamp, FloodReport, Observation, StationSummary};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    history: Vec<Observation>,
    last_updated: Option<String>,
    flood_reports: Vec<FloodReport>,
}

/// In-process state shared by the polling task and the request handlers.
/// All access goes through these methods; every mutation happens inside a
/// single write-lock section.
#[derive(Debug, Default)]
pub struct StationState {
    inner: RwLock<Inner>,
}

impl StationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<Observation>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                history,
                ..Inner::default()
            }),
        }
    }

    pub async fn history(&self) -> Vec<Observation> {
        self.inner.read().await.history.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.history.is_empty()
    }

    pub async fn latest(&self) -> Option<Observation> {
        self.inner.read().await.history.last().cloned()
    }

    /// Appends one observation and returns the resulting history snapshot.
    pub async fn append_observation(&self, observation: Observation) -> Vec<Observation> {
        let mut inner = self.inner.write().await;
        inner.history.push(observation);
        inner.last_updated = Some(local_timestamp());
        inner.history.clone()
    }

    pub async fn summary(&self) -> StationSummary {
        let inner = self.inner.read().await;
        StationSummary {
            total_records: inner.history.len(),
            total_flood_reports: inner.flood_reports.len(),
            last_updated: inner.last_updated.clone(),
            last_record: inner.history.last().cloned(),
        }
    }

    pub async fn flood_reports(&self) -> Vec<FloodReport> {
        self.inner.read().await.flood_reports.clone()
    }

    /// Stores a flood report with `id = len + 1`. Id assignment and append
    /// share one write lock, so ids follow arrival order.
    pub async fn add_flood_report(&self, payload: Map<String, Value>) -> FloodReport {
        let mut inner = self.inner.write().await;
        let id = inner.flood_reports.len() as u64 + 1;
        let report = FloodReport::new(payload, id, local_timestamp());
        inner.flood_reports.push(report.clone());
        report
    }
}
