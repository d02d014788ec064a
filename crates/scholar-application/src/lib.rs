//! Application layer for Scholar.
//!
//! This crate coordinates the domain model, the session store and the
//! assistant transport into the session controller the view layer drives.

pub mod session;

pub use session::{
    ApplyOutcome, Completion, FALLBACK_REPLY, InFlightReplies, PendingReply, SessionController,
};
