//! Pure state primitives for the StudentHub sync core.
//!
//! Everything here is sans-IO: state machines and accumulators that take
//! inputs (events, time) and return values or actions for a driver to
//! execute. The [`env::Environment`] abstraction supplies time and randomness
//! so the same logic runs in production and in deterministic tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod counters;
pub mod env;
pub mod error;
pub mod log;
pub mod presence;
pub mod session;

pub use connection::{Connection, ConnectionAction, ConnectionState, ReconnectPolicy};
pub use counters::{CounterKind, CounterSnapshot, NotificationCounters};
pub use error::ConnectionError;
pub use log::{Applied, DeliveryStatus, LogEntry, MessageLog};
pub use presence::PeerPresence;
pub use session::Session;
