pub mod engine;
pub mod fetcher;
pub mod mirror;
pub mod normalizer;
pub mod pipeline;
pub mod scheduler;
pub mod state;

pub use crate::domain::model::{FloodReport, Observation, RawReading};
pub use crate::domain::ports::{DocumentStore, Pipeline, Storage};
pub use crate::utils::error::Result;
