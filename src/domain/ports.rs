use crate::domain::model::{Observation, RawReading};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Local file storage rooted at a base directory.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// Path-addressed JSON document store used as a passive mirror.
pub trait DocumentStore: Send + Sync {
    fn get(&self, path: &str) -> impl std::future::Future<Output = Result<Option<Value>>> + Send;
    /// 整份取代，後寫者勝
    fn put(&self, path: &str, data: &Value) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 於路徑下新增子節點
    fn post(&self, path: &str, data: &Value) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawReading>;
    async fn transform(&self, raw: RawReading) -> Result<Observation>;
    /// `history` already ends with `record`. Sub-step failures are logged,
    /// never returned.
    async fn load(&self, record: &Observation, history: &[Observation]);
}
