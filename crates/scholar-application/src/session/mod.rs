//! Session application services.
//!
//! This module contains the session controller (CRUD plus the send-message
//! protocol) and the set of replies that are still in flight.

mod controller;
mod in_flight;

pub use controller::{ApplyOutcome, Completion, FALLBACK_REPLY, PendingReply, SessionController};
pub use in_flight::InFlightReplies;
