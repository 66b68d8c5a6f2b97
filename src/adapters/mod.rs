// Adapters layer: concrete implementations for external systems.

pub mod remote;
pub mod storage;

pub use remote::RestDocumentStore;
pub use storage::LocalStorage;
