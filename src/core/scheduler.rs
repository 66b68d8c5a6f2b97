use crate::core::engine::SyncEngine;
use crate::domain::ports::Pipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(900);

/// Runs a cycle right away, then sleeps `interval` and repeats forever.
/// The wait does not depend on whether the cycle succeeded.
pub async fn run_forever<P: Pipeline>(engine: Arc<SyncEngine<P>>, interval: Duration) {
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        match engine.run_cycle().await {
            Ok(record) => tracing::info!(cycle, "✅ Sync cycle completed ({})", record.timestamp),
            Err(e) => tracing::error!(cycle, "❌ Sync cycle failed: {}", e),
        }
        tracing::debug!("Next cycle in {:?}", interval);
        tokio::time::sleep(interval).await;
    }
}

/// Spawns the polling loop as its own task. The first cycle starts
/// immediately and races whatever the caller does next.
pub fn spawn<P: Pipeline + 'static>(
    engine: Arc<SyncEngine<P>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run_forever(engine, interval))
}
