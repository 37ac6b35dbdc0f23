//! Display session implementations.
//!
//! This module provides implementations of the [`DisplaySession`] trait:
//!
//! - [`X11Session`]: X11 protocol session via `x11rb` (production)
//! - [`ScriptedSession`]: Replays synthetic events and records calls (testing)
//!
//! Both implement the [`DisplaySession`] trait from `xaskpass-core`.
//!
//! [`DisplaySession`]: xaskpass_core::DisplaySession

mod mock;
mod x11;

pub use mock::{ScriptedSession, SessionCall};
pub use x11::X11Session;
