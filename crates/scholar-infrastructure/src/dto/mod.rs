//! Persisted data transfer objects.
//!
//! The on-disk schema is kept separate from the domain model so either can
//! change without dragging the other along.

mod session;

pub use session::{MessageDto, SenderDto, SessionDto, VisualizationDto, sessions_from_dtos};
