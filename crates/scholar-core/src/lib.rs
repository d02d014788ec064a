//! Domain layer for Scholar.
//!
//! Holds the session model, the error type, and the traits the application
//! layer uses to reach storage, identity generation and the assistant.

pub mod error;
pub mod session;
pub mod transport;

// Re-export common error type
pub use error::ScholarError;
