//! Session store trait.
//!
//! Defines the interface for persisting the full session collection.

use super::model::Session;
use crate::error::Result;

/// What a store found when asked to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLoad {
    /// A valid persisted collection, newest first.
    Loaded(Vec<Session>),
    /// Nothing has been persisted yet.
    Empty,
    /// Something was persisted but could not be parsed; it has been discarded.
    Corrupt { reason: String },
}

impl StoreLoad {
    /// The loaded sessions, or an empty list for `Empty` and `Corrupt`.
    pub fn into_sessions(self) -> Vec<Session> {
        match self {
            Self::Loaded(sessions) => sessions,
            Self::Empty | Self::Corrupt { .. } => Vec::new(),
        }
    }
}

/// An abstract store for the whole session collection.
///
/// This trait decouples the controller from the storage mechanism (a JSON
/// file, memory, browser-style key/value storage). Writes are full
/// overwrites: every `save` replaces whatever was persisted before.
pub trait SessionStore: Send + Sync {
    /// Reads the persisted collection.
    ///
    /// # Returns
    ///
    /// - `Ok(StoreLoad::Loaded(_))`: Collection parsed successfully
    /// - `Ok(StoreLoad::Empty)`: Nothing persisted yet
    /// - `Ok(StoreLoad::Corrupt { .. })`: Persisted data was unreadable and discarded
    /// - `Err(_)`: The storage medium itself could not be read
    fn load(&self) -> Result<StoreLoad>;

    /// Overwrites the persisted collection with `sessions`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Collection saved successfully
    /// - `Err(_)`: Error occurred during save
    fn save(&self, sessions: &[Session]) -> Result<()>;
}
