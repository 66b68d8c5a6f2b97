pub mod adapters;
pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, RestDocumentStore};
pub use config::{AuthConfig, ServiceConfig};
pub use core::{
    engine::SyncEngine, mirror::PersistenceMirror, pipeline::StationPipeline, state::StationState,
};
pub use utils::error::{Result, SyncError};
