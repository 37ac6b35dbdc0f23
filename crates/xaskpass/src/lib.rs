//! xaskpass - a minimal modal X11 passphrase dialog.
//!
//! This crate provides the binary's building blocks on top of
//! `xaskpass-core`: the command line and the display sessions that drive
//! the dialog.
//!
//! Note: Everything that does not need a display lives in `xaskpass-core`.
//! This crate only adapts it to X11 and to scripted test input.

pub mod cli;
pub mod session;

// Re-export main components
pub use cli::Cli;
pub use session::{ScriptedSession, SessionCall, X11Session};
