use crate::core::state::StationState;
use crate::domain::model::Observation;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs one sync cycle at a time against the shared [`StationState`].
pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
    state: Arc<StationState>,
    cycle_lock: Mutex<()>,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P, state: Arc<StationState>) -> Self {
        Self {
            pipeline,
            state,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn state(&self) -> &Arc<StationState> {
        &self.state
    }

    /// Fetch, normalize and persist one observation.
    ///
    /// Returns `Err` only when fetching or normalizing fails, in which case
    /// the history is untouched. Persistence problems are logged by the
    /// pipeline and do not fail the cycle.
    pub async fn run_cycle(&self) -> Result<Observation> {
        // 排程與手動更新不可交錯
        let _guard = self.cycle_lock.lock().await;

        tracing::debug!("Extracting observation...");
        let raw = self.pipeline.extract().await?;

        tracing::debug!("Normalizing observation...");
        let record = self.pipeline.transform(raw).await?;

        let history = self.state.append_observation(record.clone()).await;
        tracing::info!(
            total = history.len(),
            "Observation {} added to history",
            record.timestamp
        );

        self.pipeline.load(&record, &history).await;
        Ok(record)
    }
}

impl<P: Pipeline + 'static> SyncEngine<P> {
    /// Runs [`SyncEngine::run_cycle`] on its own task and waits for it.
    /// Dropping the returned future does not stop the cycle, so a record
    /// appended to the history always reaches the files.
    pub async fn run_cycle_detached(self: &Arc<Self>) -> Result<Observation> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.run_cycle().await }).await?
    }
}
