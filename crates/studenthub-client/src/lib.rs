//! Sync client state machine for the StudentHub realtime layer.
//!
//! The [`SyncClient`] is sans-IO: the caller feeds it [`ClientEvent`]s
//! (session lifecycle, transport callbacks, server events, user intents) and
//! executes the [`ClientAction`]s it returns (emit directives, run REST
//! fetches, update the view). The optional `transport` feature provides a
//! WebSocket transport and a REST client for production use.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod rest;
#[cfg(feature = "transport")]
pub mod transport;

pub use client::SyncClient;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent};
