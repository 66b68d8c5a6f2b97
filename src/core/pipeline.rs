use crate::core::fetcher::WeatherFetcher;
use crate::core::mirror::PersistenceMirror;
use crate::core::normalizer::normalize;
use crate::domain::model::{FloodReport, Observation, RawReading};
use crate::domain::ports::{DocumentStore, Pipeline, Storage};
use crate::utils::error::Result;

/// Fetch → normalize → persist for a single weather station.
pub struct StationPipeline<S: Storage, D: DocumentStore> {
    fetcher: WeatherFetcher,
    mirror: PersistenceMirror<S, D>,
}

impl<S: Storage, D: DocumentStore> StationPipeline<S, D> {
    pub fn new(fetcher: WeatherFetcher, mirror: PersistenceMirror<S, D>) -> Self {
        Self { fetcher, mirror }
    }

    pub fn mirror(&self) -> &PersistenceMirror<S, D> {
        &self.mirror
    }

    pub async fn load_history(&self) -> Vec<Observation> {
        self.mirror.load_history().await
    }

    pub async fn mirror_flood_report(&self, report: &FloodReport) {
        self.mirror.mirror_flood_report(report).await
    }
}

#[async_trait::async_trait]
impl<S: Storage, D: DocumentStore> Pipeline for StationPipeline<S, D> {
    async fn extract(&self) -> Result<RawReading> {
        self.fetcher.fetch().await
    }

    async fn transform(&self, raw: RawReading) -> Result<Observation> {
        let observation = normalize(&raw);
        if let Err(e) = &observation {
            tracing::error!("❌ Could not normalize provider response: {}", e);
        }
        observation
    }

    async fn load(&self, record: &Observation, history: &[Observation]) {
        self.mirror.persist(record, history).await
    }
}
