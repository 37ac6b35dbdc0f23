//! Core types for xaskpass.
//!
//! This module contains the data exchanged between the dialog logic and a
//! display session: events, screen and font metrics, and the prompt text.

use crate::config::DEFAULT_PROMPT;

/// An event delivered by the display session.
///
/// Only three kinds of notification drive the dialog. Everything else the
/// display produces is reported as [`DisplayEvent::Other`] and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// The dialog window became mapped (visible).
    Mapped,

    /// Part or all of the window needs to be redrawn.
    Damaged,

    /// A key was pressed. Carries the byte the key translates to in the
    /// current keyboard state, or `None` if it produces no character.
    KeyPress(Option<u8>),

    /// Any other event.
    Other,
}

impl std::fmt::Display for DisplayEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes are secret material and never formatted
        match self {
            DisplayEvent::Mapped => write!(f, "mapped"),
            DisplayEvent::Damaged => write!(f, "damaged"),
            DisplayEvent::KeyPress(_) => write!(f, "key_press"),
            DisplayEvent::Other => write!(f, "other"),
        }
    }
}

/// Size of the screen the dialog is placed on, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u16,
    pub height: u16,
}

/// Metrics of a string rendered in the dialog font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    /// Width of the whole glyph string.
    pub width: i32,
    /// Font ascent above the baseline.
    pub ascent: i16,
    /// Font descent below the baseline.
    pub descent: i16,
}

/// The prompt shown in the dialog.
///
/// Immutable after construction. The display font is ISO-8859 encoded, so
/// the text is converted to Latin-1 once; characters outside Latin-1 are
/// rendered as `?`. Bytes that are not UTF-8 are drawn as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText {
    text: String,
    latin1: Vec<u8>,
}

impl PromptText {
    /// Create a prompt from the given text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let latin1 = text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect();
        Self { text, latin1 }
    }

    /// Create a prompt from raw argument bytes.
    ///
    /// UTF-8 input is converted like [`PromptText::new`]. Anything else is
    /// assumed to be in the font's encoding already and kept byte for byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::new(text),
            Err(_) => Self {
                text: String::from_utf8_lossy(bytes).into_owned(),
                latin1: bytes.to_vec(),
            },
        }
    }

    /// The prompt as given, lossily decoded if it was not UTF-8.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The prompt encoded for the display font.
    pub fn as_latin1(&self) -> &[u8] {
        &self.latin1
    }
}

impl Default for PromptText {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT)
    }
}

impl std::fmt::Display for PromptText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
