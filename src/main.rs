use std::sync::Arc;
use weather_sync::api::{self, AppState};
use weather_sync::core::fetcher::WeatherFetcher;
use weather_sync::core::scheduler;
use weather_sync::utils::{logger, validation::Validate};
use weather_sync::{
    LocalStorage, PersistenceMirror, RestDocumentStore, ServiceConfig, StationPipeline,
    StationState, SyncEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    logger::init(config.verbose, config.log_json);
    tracing::info!("🌦️ Starting weather-sync v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    tracing::info!(
        station = %config.station_id,
        data_dir = %config.data_dir,
        remote_enabled = config.firebase_url.is_some(),
        interval_secs = config.interval_secs,
        "Loaded configuration"
    );

    // 1. 儲存與遠端鏡像
    let storage = LocalStorage::new(config.data_dir.clone());
    let remote = config.firebase_url.as_deref().map(RestDocumentStore::new);
    let mirror = PersistenceMirror::new(storage, remote).with_mirror_append(config.mirror_append);

    let fetcher = WeatherFetcher::new(&config.provider_base_url, &config.station_id, config.api_key()?);
    let pipeline = StationPipeline::new(fetcher, mirror);

    // 2. 載入既有歷史
    let history = pipeline.load_history().await;
    let state = Arc::new(StationState::with_history(history));
    let engine = Arc::new(SyncEngine::new(pipeline, state));

    // 3. 背景排程：第一輪立即執行，與監聽埠綁定同時進行
    let _poller = scheduler::spawn(engine.clone(), config.interval());

    // 4. HTTP API
    let router = api::build_router(
        AppState::new(engine, config.station_id.clone()),
        config.allowed_origin.as_deref(),
    );

    tokio::select! {
        result = api::serve(router, config.listen_addr()) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
