//! Scripted display session for testing.
//!
//! This module provides a configurable implementation of [`DisplaySession`]
//! that replays a fixed event sequence and records every call, so the whole
//! dialog can be exercised without a display server.

use std::collections::VecDeque;

use xaskpass_core::{
    DisplayError, DisplayEvent, DisplaySession, ScreenInfo, TextMetrics, WindowSpec,
};

/// A display operation recorded by [`ScriptedSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    MeasureText(Vec<u8>),
    CreateWindow {
        x: i16,
        y: i16,
        width: u16,
        height: u16,
        border_width: u16,
        instance_name: String,
        class_name: String,
    },
    SetTitle(String),
    MapWindow,
    CreateContext,
    DrawText {
        x: i16,
        y: i16,
        text: Vec<u8>,
    },
    Sync,
    GrabKeyboard,
    UngrabKeyboard,
}

#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    create_window: bool,
    set_title: bool,
    create_context: bool,
    grab: bool,
    ungrab: bool,
}

/// A scripted display session.
///
/// Glyphs are a fixed width; events are returned in the order queued. When
/// the script runs out, `next_event` fails the way a dropped connection
/// would.
///
/// # Example
///
/// ```
/// use xaskpass::session::ScriptedSession;
/// use xaskpass_core::{dialog, DialogConfig, Outcome, PromptText, SecretBuffer};
///
/// let mut session = ScriptedSession::new()
///     .then_map()
///     .then_expose()
///     .then_keys(b"1234\r");
///
/// let mut buffer = SecretBuffer::with_capacity(2048);
/// let mut out = Vec::new();
/// let outcome = dialog::run(
///     &mut session,
///     &PromptText::new("Enter PIN:"),
///     &DialogConfig::default(),
///     &mut buffer,
///     &mut out,
/// )
/// .unwrap();
///
/// assert_eq!(outcome, Outcome::Accepted);
/// assert_eq!(out, b"1234\n");
/// assert!(buffer.is_wiped());
/// ```
#[derive(Debug)]
pub struct ScriptedSession {
    screen: ScreenInfo,
    glyph_width: i32,
    ascent: i16,
    descent: i16,
    events: VecDeque<DisplayEvent>,
    calls: Vec<SessionCall>,
    failures: Failures,
    grabbed: bool,
}

impl ScriptedSession {
    /// Glyph width of the scripted font.
    pub const GLYPH_WIDTH: i32 = 6;
    /// Ascent of the scripted font.
    pub const ASCENT: i16 = 8;
    /// Descent of the scripted font.
    pub const DESCENT: i16 = 2;

    /// Create a session on a 1024x768 screen with no events queued.
    pub fn new() -> Self {
        Self {
            screen: ScreenInfo {
                width: 1024,
                height: 768,
            },
            glyph_width: Self::GLYPH_WIDTH,
            ascent: Self::ASCENT,
            descent: Self::DESCENT,
            events: VecDeque::new(),
            calls: Vec::new(),
            failures: Failures::default(),
            grabbed: false,
        }
    }

    /// Use a different screen size.
    pub fn with_screen(mut self, width: u16, height: u16) -> Self {
        self.screen = ScreenInfo { width, height };
        self
    }

    /// Queue an event.
    pub fn then(mut self, event: DisplayEvent) -> Self {
        self.events.push_back(event);
        self
    }

    /// Queue a map notification.
    pub fn then_map(self) -> Self {
        self.then(DisplayEvent::Mapped)
    }

    /// Queue a damage notification.
    pub fn then_expose(self) -> Self {
        self.then(DisplayEvent::Damaged)
    }

    /// Queue one key press per byte.
    pub fn then_keys(mut self, bytes: &[u8]) -> Self {
        self.events
            .extend(bytes.iter().map(|&b| DisplayEvent::KeyPress(Some(b))));
        self
    }

    /// Make window creation fail.
    pub fn fail_create_window(mut self) -> Self {
        self.failures.create_window = true;
        self
    }

    /// Make setting the title fail.
    pub fn fail_set_title(mut self) -> Self {
        self.failures.set_title = true;
        self
    }

    /// Make drawing context creation fail.
    pub fn fail_create_context(mut self) -> Self {
        self.failures.create_context = true;
        self
    }

    /// Make the keyboard grab fail.
    pub fn fail_grab(mut self) -> Self {
        self.failures.grab = true;
        self
    }

    /// Make releasing the keyboard grab fail.
    pub fn fail_ungrab(mut self) -> Self {
        self.failures.ungrab = true;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[SessionCall] {
        &self.calls
    }

    /// Number of prompt draws.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SessionCall::DrawText { .. }))
            .count()
    }

    /// Whether the keyboard is currently grabbed.
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Number of events not yet delivered.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySession for ScriptedSession {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn measure_text(&mut self, text: &[u8]) -> Result<TextMetrics, DisplayError> {
        self.calls.push(SessionCall::MeasureText(text.to_vec()));
        let glyphs = i32::try_from(text.len()).unwrap_or(i32::MAX / self.glyph_width);
        Ok(TextMetrics {
            width: glyphs * self.glyph_width,
            ascent: self.ascent,
            descent: self.descent,
        })
    }

    fn create_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::CreateWindow {
            x: spec.x,
            y: spec.y,
            width: spec.width,
            height: spec.height,
            border_width: spec.border_width,
            instance_name: spec.instance_name.to_string(),
            class_name: spec.class_name.to_string(),
        });
        if self.failures.create_window {
            return Err(DisplayError::resource("window", "BadAlloc (scripted)"));
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::SetTitle(title.to_string()));
        if self.failures.set_title {
            return Err(DisplayError::Protocol("BadAtom (scripted)".into()));
        }
        Ok(())
    }

    fn map_window(&mut self) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::MapWindow);
        Ok(())
    }

    fn create_context(&mut self) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::CreateContext);
        if self.failures.create_context {
            return Err(DisplayError::resource(
                "graphics context",
                "BadAlloc (scripted)",
            ));
        }
        Ok(())
    }

    fn draw_text(&mut self, x: i16, y: i16, text: &[u8]) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::DrawText {
            x,
            y,
            text: text.to_vec(),
        });
        Ok(())
    }

    fn sync(&mut self) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::Sync);
        Ok(())
    }

    fn grab_keyboard(&mut self) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::GrabKeyboard);
        if self.failures.grab {
            return Err(DisplayError::Grab("AlreadyGrabbed (scripted)".into()));
        }
        self.grabbed = true;
        Ok(())
    }

    fn ungrab_keyboard(&mut self) -> Result<(), DisplayError> {
        self.calls.push(SessionCall::UngrabKeyboard);
        if self.failures.ungrab {
            return Err(DisplayError::Protocol("connection closed (scripted)".into()));
        }
        self.grabbed = false;
        Ok(())
    }

    fn next_event(&mut self) -> Result<DisplayEvent, DisplayError> {
        self.events
            .pop_front()
            .ok_or_else(|| DisplayError::Protocol("scripted event stream exhausted".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_replayed_in_order() {
        let mut session = ScriptedSession::new().then_map().then_expose().then_keys(b"ab");
        assert_eq!(session.next_event(), Ok(DisplayEvent::Mapped));
        assert_eq!(session.next_event(), Ok(DisplayEvent::Damaged));
        assert_eq!(session.next_event(), Ok(DisplayEvent::KeyPress(Some(b'a'))));
        assert_eq!(session.next_event(), Ok(DisplayEvent::KeyPress(Some(b'b'))));
        assert!(matches!(
            session.next_event(),
            Err(DisplayError::Protocol(_))
        ));
    }

    #[test]
    fn text_metrics_use_fixed_glyph_width() {
        let mut session = ScriptedSession::new();
        let metrics = session.measure_text(b"abcd").unwrap();
        assert_eq!(metrics.width, 24);
        assert_eq!(metrics.ascent, 8);
        assert_eq!(metrics.descent, 2);
    }

    #[test]
    fn grab_state_is_tracked() {
        let mut session = ScriptedSession::new();
        assert!(!session.is_grabbed());
        session.grab_keyboard().unwrap();
        assert!(session.is_grabbed());
        session.ungrab_keyboard().unwrap();
        assert!(!session.is_grabbed());
    }

    #[test]
    fn scripted_failures() {
        let mut session = ScriptedSession::new().fail_grab().fail_set_title();
        assert!(matches!(session.grab_keyboard(), Err(DisplayError::Grab(_))));
        assert!(!session.is_grabbed());
        assert!(session.set_title("t").is_err());
        assert_eq!(
            session.calls(),
            &[SessionCall::GrabKeyboard, SessionCall::SetTitle("t".into())]
        );
    }
}
