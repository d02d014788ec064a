//! Session domain module.
//!
//! This module contains all session-related domain models and the store and
//! id-generation interfaces the controller depends on.
//!
//! # Module Structure
//!
//! - `model`: Core session entity (`Session`)
//! - `message`: Message types (`Sender`, `Message`, `Visualization`)
//! - `collection`: Ordered session list with active pointer (`SessionCollection`)
//! - `repository`: Store trait for whole-collection persistence
//! - `id`: Identifier generation

mod collection;
mod id;
mod message;
mod model;
mod repository;

pub use collection::SessionCollection;
pub use id::{IdGenerator, UuidIdGenerator};
pub use message::{ImagePayload, Message, Sender, Visualization};
pub use model::{
    DEFAULT_SESSION_TITLE, MAX_MESSAGE_ID, Session, WELCOME_MESSAGE, WELCOME_MESSAGE_ID, now_millis,
};
pub use repository::{SessionStore, StoreLoad};
