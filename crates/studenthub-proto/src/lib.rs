//! Wire types for the StudentHub sync core.
//!
//! The realtime channel carries JSON envelopes of the form
//! `{"event": "<name>", "data": {...}}` in both directions: server-pushed
//! [`ServerEvent`]s and client-emitted [`ClientDirective`]s. The REST side of
//! the backend speaks plain JSON bodies; the response shapes consumed by the
//! sync core live in [`rest`].
//!
//! This crate is a pure data layer. It never performs I/O and never panics on
//! malformed input; decode failures surface as [`ProtocolError`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod directives;
mod errors;
mod events;
mod ids;
pub mod rest;

pub use directives::ClientDirective;
pub use errors::{ProtocolError, Result};
pub use events::{Message, PostNotice, RequestNotice, ServerEvent, UserRef};
pub use ids::{RoomId, UserId};
