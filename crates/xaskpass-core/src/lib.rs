//! Core types and logic for xaskpass.
//!
//! This crate holds everything about the passphrase dialog that does not need
//! a display server. It is intentionally display-agnostic to allow:
//!
//! - Security review of the secret-handling code in isolation
//! - Unit tests that feed synthetic event sequences
//! - Different display backends (X11, scripted test sessions)
//!
//! # Modules
//!
//! - [`buffer`]: Fixed-capacity secret buffer that zeroes itself
//! - [`capture`]: The input capture state machine
//! - [`config`]: Fixed dialog parameters (`DialogConfig`)
//! - [`dialog`]: Window setup, event loop and cleanup ordering
//! - [`geometry`]: Window and text placement derived from font metrics
//! - [`keymap`]: Keycode and keysym translation to Latin-1 bytes
//! - [`output`]: Exit protocol (`Outcome`, secret emission)
//! - [`traits`]: The `DisplaySession` seam and its error type
//! - [`types`]: Shared data types (`DisplayEvent`, `PromptText`, metrics)
//!
//! # Example
//!
//! ```
//! use xaskpass_core::buffer::SecretBuffer;
//! use xaskpass_core::capture::{Action, InputCapture};
//! use xaskpass_core::types::DisplayEvent;
//!
//! let mut buffer = SecretBuffer::with_capacity(16);
//! let mut capture = InputCapture::new(&mut buffer);
//!
//! assert_eq!(capture.handle(DisplayEvent::Mapped), Action::GrabKeyboard);
//! capture.keyboard_grabbed();
//! capture.handle(DisplayEvent::KeyPress(Some(b'x')));
//! assert_eq!(capture.handle(DisplayEvent::KeyPress(Some(b'\r'))), Action::Accept);
//! ```

pub mod buffer;
pub mod capture;
pub mod config;
pub mod dialog;
pub mod geometry;
pub mod keymap;
pub mod output;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root for convenience
pub use buffer::SecretBuffer;
pub use capture::{Action, CaptureState, InputCapture};
pub use config::DialogConfig;
pub use dialog::DialogError;
pub use geometry::DialogGeometry;
pub use keymap::{KeyboardMap, Modifiers};
pub use output::Outcome;
pub use traits::{DisplayError, DisplaySession, WindowSpec};
pub use types::{DisplayEvent, PromptText, ScreenInfo, TextMetrics};
