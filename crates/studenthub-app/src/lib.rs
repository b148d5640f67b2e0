//! Application layer for StudentHub
//!
//! Pure state machines and a generic runtime for view and protocol
//! orchestration, enabling deterministic testing with the same code that runs
//! against a live backend.
//!
//! # Components
//!
//! - [`App`]: view state machine (badges, chat view, connection banner)
//! - [`Bridge`]: protocol bridge (translates App actions to sync client events)
//! - [`Driver`]: trait for platform-specific I/O abstraction
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, IoCommand};
pub use driver::Driver;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ChatLine, ChatView, ConnectionBanner};
