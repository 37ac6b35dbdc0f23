//! Input capture state machine.
//!
//! ```text
//! WaitingForMap --(map + grab ok)--> Capturing --(Return)--> Accepted
//!                                              \--(Escape)--> Cancelled
//! ```
//!
//! The machine only decides; the dialog loop performs the side effects it
//! asks for through [`Action`]. Entering `Capturing` is confirmed by the loop
//! calling [`InputCapture::keyboard_grabbed`] after the grab succeeded, so a
//! refused grab never lets key input reach the buffer.

use tracing::trace;

use crate::buffer::SecretBuffer;
use crate::output::Outcome;
use crate::types::DisplayEvent;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;
const LINE_FEED: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';
const ESCAPE: u8 = 0x1b;
const FIRST_PRINTABLE: u8 = 0x20;

/// State of the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Window not yet visible; no keyboard grab.
    WaitingForMap,
    /// Keyboard grabbed; key presses edit the buffer.
    Capturing,
    /// The user confirmed the entry.
    Accepted,
    /// The user cancelled.
    Cancelled,
}

impl CaptureState {
    /// Whether no further event can change the state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptureState::Accepted | CaptureState::Cancelled)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::WaitingForMap => write!(f, "waiting_for_map"),
            CaptureState::Capturing => write!(f, "capturing"),
            CaptureState::Accepted => write!(f, "accepted"),
            CaptureState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What the dialog loop must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing; wait for the next event.
    Continue,
    /// Grab the keyboard, then call [`InputCapture::keyboard_grabbed`].
    GrabKeyboard,
    /// Draw the prompt.
    Redraw,
    /// Emit the buffer and exit successfully.
    Accept,
    /// Exit without output.
    Cancel,
}

/// The input capture state machine.
///
/// Borrows the secret buffer for its whole life; it is the only code that
/// mutates it.
#[derive(Debug)]
pub struct InputCapture<'b> {
    state: CaptureState,
    buffer: &'b mut SecretBuffer,
}

impl<'b> InputCapture<'b> {
    /// Start in [`CaptureState::WaitingForMap`] with `buffer`.
    pub fn new(buffer: &'b mut SecretBuffer) -> Self {
        Self {
            state: CaptureState::WaitingForMap,
            buffer,
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The buffer being filled.
    pub fn buffer(&self) -> &SecretBuffer {
        &*self.buffer
    }

    /// The final outcome, once a terminal state is reached.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            CaptureState::Accepted => Some(Outcome::Accepted),
            CaptureState::Cancelled => Some(Outcome::Cancelled),
            _ => None,
        }
    }

    /// Record that the keyboard grab succeeded.
    pub fn keyboard_grabbed(&mut self) {
        if self.state == CaptureState::WaitingForMap {
            trace!("Keyboard grabbed, capturing input");
            self.state = CaptureState::Capturing;
        }
    }

    /// Zero the buffer.
    pub fn wipe(&mut self) {
        self.buffer.wipe();
    }

    /// Feed one event and get the action the loop must take.
    pub fn handle(&mut self, event: DisplayEvent) -> Action {
        if self.state.is_terminal() {
            return Action::Continue;
        }

        match event {
            // A remapped window is grabbed again
            DisplayEvent::Mapped => Action::GrabKeyboard,
            DisplayEvent::Damaged => Action::Redraw,
            DisplayEvent::KeyPress(byte) if self.state == CaptureState::Capturing => {
                self.on_key(byte)
            }
            DisplayEvent::KeyPress(_) => {
                trace!(state = %self.state, "Ignoring key press before grab");
                Action::Continue
            }
            DisplayEvent::Other => Action::Continue,
        }
    }

    fn on_key(&mut self, byte: Option<u8>) -> Action {
        let Some(byte) = byte else {
            return Action::Continue;
        };

        match byte {
            BACKSPACE | DELETE => {
                self.buffer.pop();
                Action::Continue
            }
            LINE_FEED | CARRIAGE_RETURN => {
                self.state = CaptureState::Accepted;
                Action::Accept
            }
            ESCAPE => {
                self.state = CaptureState::Cancelled;
                self.buffer.wipe();
                Action::Cancel
            }
            b if b >= FIRST_PRINTABLE => {
                self.buffer.push(b);
                Action::Continue
            }
            _ => Action::Continue,
        }
    }
}
