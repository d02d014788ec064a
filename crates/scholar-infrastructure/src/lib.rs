pub mod config;
pub mod dto;
pub mod json_session_store;
pub mod memory_session_store;
pub mod paths;
pub mod storage;

pub use crate::config::{AppConfig, EndpointConfig, StorageConfig};
pub use crate::json_session_store::JsonSessionStore;
pub use crate::memory_session_store::InMemorySessionStore;
pub use crate::paths::ScholarPaths;
