//! Trait definitions for the display seam.
//!
//! [`DisplaySession`] abstracts the windowing service the dialog talks to:
//! - The X11 implementation in the `xaskpass` crate (production)
//! - A scripted session that replays synthetic events (testing)
//!
//! By keeping the dialog logic behind this trait, the capture state machine
//! and the cleanup ordering are tested without a display server.

use crate::types::{DisplayEvent, ScreenInfo, TextMetrics};

/// Error type for display session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// The display service could not be reached.
    #[error("unable to open display: {0}")]
    Connection(String),

    /// A font, window or drawing context could not be created.
    #[error("failed to create {resource}: {reason}")]
    ResourceLoad {
        /// What was being created (e.g. "window", "font '...'").
        resource: String,
        /// Why it failed.
        reason: String,
    },

    /// The exclusive keyboard grab was refused.
    #[error("unable to grab keyboard: {0}")]
    Grab(String),

    /// The connection failed after setup.
    #[error("display connection error: {0}")]
    Protocol(String),
}

impl DisplayError {
    /// Shorthand for a [`DisplayError::ResourceLoad`].
    pub fn resource(resource: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DisplayError::ResourceLoad {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Parameters for the dialog window.
///
/// Colors (black border and text on white), the transient-for hint pointing
/// at the root window and the event selection are fixed and applied by every
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec<'a> {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
    pub border_width: u16,
    /// Class hint instance name.
    pub instance_name: &'a str,
    /// Class hint class name.
    pub class_name: &'a str,
}

/// Trait for display session implementations.
///
/// A session owns the connection and exactly one dialog window. Methods are
/// called by [`crate::dialog::run`] in this order: `measure_text`,
/// `create_window`, `set_title`, `map_window`, `create_context`, then the
/// event loop (`next_event`, `draw_text`, `sync`, `grab_keyboard`) and
/// finally `ungrab_keyboard` if a grab was taken.
///
/// # Example (Scripted Implementation)
///
/// ```ignore
/// impl DisplaySession for Replay {
///     fn next_event(&mut self) -> Result<DisplayEvent, DisplayError> {
///         self.events
///             .pop_front()
///             .ok_or_else(|| DisplayError::Protocol("replay exhausted".into()))
///     }
///     // ...
/// }
/// ```
pub trait DisplaySession {
    /// Size of the screen the dialog is placed on.
    fn screen(&self) -> ScreenInfo;

    /// Measure `text` (Latin-1) in the dialog font.
    fn measure_text(&mut self, text: &[u8]) -> Result<TextMetrics, DisplayError>;

    /// Create the dialog window.
    ///
    /// The window must select exactly structure-change, exposure and
    /// key-press notifications.
    fn create_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), DisplayError>;

    /// Set the window title. Callers treat failure as non-fatal.
    fn set_title(&mut self, title: &str) -> Result<(), DisplayError>;

    /// Map (show) the window and synchronize with the display.
    fn map_window(&mut self) -> Result<(), DisplayError>;

    /// Create the drawing context used by [`DisplaySession::draw_text`].
    fn create_context(&mut self) -> Result<(), DisplayError>;

    /// Draw `text` (Latin-1) with its baseline origin at (`x`, `y`).
    fn draw_text(&mut self, x: i16, y: i16, text: &[u8]) -> Result<(), DisplayError>;

    /// Flush pending requests and wait until the display has processed them.
    fn sync(&mut self) -> Result<(), DisplayError>;

    /// Grab the keyboard exclusively for the dialog window.
    fn grab_keyboard(&mut self) -> Result<(), DisplayError>;

    /// Release the keyboard grab.
    fn ungrab_keyboard(&mut self) -> Result<(), DisplayError>;

    /// Block until the next event arrives.
    ///
    /// There is no timeout; the dialog waits indefinitely.
    fn next_event(&mut self) -> Result<DisplayEvent, DisplayError>;
}
