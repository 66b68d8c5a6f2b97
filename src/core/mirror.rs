use crate::domain::model::{FloodReport, Observation};
use crate::domain::ports::{DocumentStore, Storage};
use crate::utils::error::{Result, SyncError};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

pub const HISTORY_DIR: &str = "history";
pub const CONSOLIDATED_FILE: &str = "records.json";

// 遠端資料庫既有的節點名稱
pub const REMOTE_RECORDS_PATH: &str = "/registros";
pub const REMOTE_HISTORY_PATH: &str = "/json_data";
pub const REMOTE_FLOOD_REPORTS_PATH: &str = "/reportes_inundacion";

pub fn partition_file(date: NaiveDate) -> String {
    format!("{}/{}.csv", HISTORY_DIR, date.format("%Y-%m-%d"))
}

/// Writes observations to the local files and, when configured, to the
/// remote document store.
pub struct PersistenceMirror<S: Storage, D: DocumentStore> {
    storage: S,
    remote: Option<D>,
    mirror_append: bool,
}

impl<S: Storage, D: DocumentStore> PersistenceMirror<S, D> {
    pub fn new(storage: S, remote: Option<D>) -> Self {
        Self {
            storage,
            remote,
            mirror_append: true,
        }
    }

    /// 關閉單筆遠端新增，只保留整份取代
    pub fn with_mirror_append(mut self, enabled: bool) -> Self {
        self.mirror_append = enabled;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Runs every write step for one new record. Each failure is logged and
    /// the remaining steps still run.
    pub async fn persist(&self, record: &Observation, history: &[Observation]) {
        if self.mirror_append {
            if let Err(e) = self.push_record(record).await {
                tracing::error!("❌ Remote append failed: {}", e);
            } else if self.remote.is_some() {
                tracing::info!("Record {} appended to remote store", record.timestamp);
            }
        }

        match self.append_day_partitions(std::slice::from_ref(record)).await {
            Ok(written) => {
                for (file, rows) in written {
                    tracing::info!("Saved {} rows to {}", rows, file);
                }
            }
            Err(e) => tracing::error!("❌ Failed to write day partition: {}", e),
        }

        self.rewrite_history(history).await;
    }

    /// Full rewrite of the consolidated document plus the remote full
    /// replace. O(n) per cycle; swap this out for an incremental writer if
    /// the history grows large.
    pub async fn rewrite_history(&self, history: &[Observation]) {
        match self.write_consolidated(history).await {
            Ok(()) => tracing::info!("Saved {} records to {}", history.len(), CONSOLIDATED_FILE),
            Err(e) => tracing::error!("❌ Failed to write {}: {}", CONSOLIDATED_FILE, e),
        }

        match self.push_full_history(history).await {
            Ok(()) if self.remote.is_some() => {
                tracing::info!("History mirrored to remote store ({})", REMOTE_HISTORY_PATH)
            }
            Ok(()) => {}
            Err(e) => tracing::error!("❌ Remote history replace failed: {}", e),
        }
    }

    /// Groups records by calendar day and appends them to the matching CSV
    /// file. Returns `(file, rows)` per partition written.
    pub async fn append_day_partitions(
        &self,
        records: &[Observation],
    ) -> Result<Vec<(String, usize)>> {
        let mut by_day: BTreeMap<NaiveDate, Vec<Map<String, Value>>> = BTreeMap::new();
        for record in records {
            by_day
                .entry(record.partition_date())
                .or_default()
                .push(record.to_row());
        }

        let mut written = Vec::with_capacity(by_day.len());
        for (date, rows) in by_day {
            let file = partition_file(date);
            let include_header = !self.storage.exists(&file).await;
            let data = encode_csv(&rows, include_header)?;
            self.storage.append_file(&file, &data).await?;
            written.push((file, rows.len()));
        }

        Ok(written)
    }

    pub async fn write_consolidated(&self, history: &[Observation]) -> Result<()> {
        let json = serde_json::to_vec_pretty(history)?;
        self.storage.write_file(CONSOLIDATED_FILE, &json).await
    }

    pub async fn push_full_history(&self, history: &[Observation]) -> Result<()> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        remote
            .put(REMOTE_HISTORY_PATH, &serde_json::to_value(history)?)
            .await
    }

    pub async fn push_record(&self, record: &Observation) -> Result<()> {
        let Some(remote) = &self.remote else {
            return Ok(());
        };
        remote
            .post(REMOTE_RECORDS_PATH, &serde_json::to_value(record)?)
            .await
    }

    /// Best-effort copy of a flood report to the remote store.
    pub async fn mirror_flood_report(&self, report: &FloodReport) {
        let Some(remote) = &self.remote else {
            return;
        };
        let result = match serde_json::to_value(report) {
            Ok(value) => remote.post(REMOTE_FLOOD_REPORTS_PATH, &value).await,
            Err(e) => Err(SyncError::from(e)),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to mirror flood report {}: {}", report.id, e);
        }
    }

    /// Loads the history from the consolidated document, falling back to the
    /// remote copy and finally to an empty list.
    pub async fn load_history(&self) -> Vec<Observation> {
        if self.storage.exists(CONSOLIDATED_FILE).await {
            match self.read_consolidated().await {
                Ok(history) => {
                    tracing::info!("Loaded {} records from {}", history.len(), CONSOLIDATED_FILE);
                    return history;
                }
                Err(e) => {
                    // 檔案損毀時視為空
                    tracing::warn!("Ignoring unreadable {}: {}", CONSOLIDATED_FILE, e);
                    return Vec::new();
                }
            }
        }

        let Some(remote) = &self.remote else {
            return Vec::new();
        };
        match remote.get(REMOTE_HISTORY_PATH).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<Observation>>(value) {
                Ok(history) => {
                    tracing::info!("Loaded {} records from remote store", history.len());
                    history
                }
                Err(e) => {
                    tracing::warn!("Remote history has an unexpected shape: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not load remote history: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn read_consolidated(&self) -> Result<Vec<Observation>> {
        let bytes = self.storage.read_file(CONSOLIDATED_FILE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Columns are the sorted union of keys across `rows`; nulls become empty
/// cells.
fn encode_csv(rows: &[Map<String, Value>], include_header: bool) -> Result<Vec<u8>> {
    let columns: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    if include_header {
        writer.write_record(&columns)?;
    }
    for row in rows {
        writer.write_record(columns.iter().map(|column| cell(row.get(*column))))?;
    }

    writer
        .into_inner()
        .map_err(|e| SyncError::Io(e.into_error()))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
