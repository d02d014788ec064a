//! JSON-file SessionStore implementation.

use std::path::{Path, PathBuf};

use scholar_core::error::{Result, ScholarError};
use scholar_core::session::{Session, SessionStore, StoreLoad};

use crate::dto::{SessionDto, sessions_from_dtos};
use crate::storage::{AtomicJsonError, AtomicJsonFile};

/// Stores the whole session collection as a single JSON document.
///
/// Every save serializes the full collection and atomically replaces the
/// file. A file that cannot be parsed is moved aside to `<file>.corrupt`
/// and reported as [`StoreLoad::Corrupt`], so the application can start
/// from a clean collection without destroying the bytes.
pub struct JsonSessionStore {
    file: AtomicJsonFile<Vec<SessionDto>>,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicJsonFile::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn discard_corrupt(&self, reason: String) -> StoreLoad {
        match self.file.quarantine() {
            Ok(moved_to) => tracing::warn!(
                "Discarding unreadable session store {} (kept at {}): {}",
                self.path().display(),
                moved_to.display(),
                reason
            ),
            Err(e) => tracing::warn!(
                "Discarding unreadable session store {} (could not move it aside: {}): {}",
                self.path().display(),
                e,
                reason
            ),
        }
        StoreLoad::Corrupt { reason }
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<StoreLoad> {
        let dtos = match self.file.load() {
            Ok(Some(dtos)) => dtos,
            Ok(None) => return Ok(StoreLoad::Empty),
            Err(AtomicJsonError::Parse(e)) => return Ok(self.discard_corrupt(e.to_string())),
            Err(AtomicJsonError::Io(e)) => return Err(e.into()),
            Err(e) => return Err(ScholarError::internal(e.to_string())),
        };

        match sessions_from_dtos(dtos) {
            Ok(sessions) => {
                tracing::debug!(
                    "Loaded {} sessions from {}",
                    sessions.len(),
                    self.path().display()
                );
                Ok(StoreLoad::Loaded(sessions))
            }
            Err(e) => Ok(self.discard_corrupt(e.to_string())),
        }
    }

    fn save(&self, sessions: &[Session]) -> Result<()> {
        let dtos: Vec<SessionDto> = sessions.iter().map(SessionDto::from).collect();
        self.file.save(&dtos).map_err(|e| match e {
            AtomicJsonError::Io(io) => io.into(),
            other => ScholarError::serialization("JSON", other.to_string()),
        })
    }
}
