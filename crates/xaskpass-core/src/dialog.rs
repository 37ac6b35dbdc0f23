//! Dialog lifecycle.
//!
//! [`run`] opens the window, drives the [`InputCapture`] state machine from
//! the session's events and performs the actions it asks for. All exits go
//! through a scope guard that, in this order:
//!
//! 1. zeroes the secret buffer
//! 2. releases the keyboard grab if one was taken (failure is logged only)
//!
//! The guard runs on normal returns, on `?` early returns during setup or in
//! the loop, and while unwinding from a panic.

use std::io::{self, Write};

use secrecy::ExposeSecret;
use tracing::{debug, trace, warn};

use crate::buffer::SecretBuffer;
use crate::capture::{Action, InputCapture};
use crate::config::DialogConfig;
use crate::geometry::DialogGeometry;
use crate::output::{self, Outcome};
use crate::traits::{DisplayError, DisplaySession, WindowSpec};
use crate::types::PromptText;

/// Error type for a dialog run.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// The display session failed.
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// The accepted secret could not be written.
    #[error("failed to write passphrase: {0}")]
    Output(#[source] io::Error),
}

/// Owns the cleanup of a dialog run.
struct CaptureScope<'s, 'b, S: DisplaySession + ?Sized> {
    session: &'s mut S,
    capture: InputCapture<'b>,
    grabbed: bool,
}

impl<S: DisplaySession + ?Sized> CaptureScope<'_, '_, S> {
    fn grab_keyboard(&mut self) -> Result<(), DisplayError> {
        self.session.sync()?;
        self.session.grab_keyboard()?;
        self.grabbed = true;
        self.capture.keyboard_grabbed();
        debug!("Keyboard grabbed");
        Ok(())
    }
}

impl<S: DisplaySession + ?Sized> Drop for CaptureScope<'_, '_, S> {
    fn drop(&mut self) {
        self.capture.wipe();
        trace!("Secret buffer wiped");

        if self.grabbed {
            match self.session.ungrab_keyboard() {
                Ok(()) => debug!("Keyboard released"),
                Err(e) => warn!(error = %e, "Failed to release keyboard grab"),
            }
        }
    }
}

/// Create, title and map the dialog window and its drawing context.
///
/// Returns the geometry used for drawing. The title is best-effort.
pub fn open_window<S: DisplaySession + ?Sized>(
    session: &mut S,
    prompt: &PromptText,
    config: &DialogConfig,
) -> Result<DialogGeometry, DisplayError> {
    let metrics = session.measure_text(prompt.as_latin1())?;
    let geometry = DialogGeometry::compute(
        session.screen(),
        metrics,
        config.margin_width,
        config.margin_height,
    );
    debug!(
        text_width = geometry.text_width,
        text_height = geometry.text_height,
        width = geometry.width,
        height = geometry.height,
        x = geometry.x,
        y = geometry.y,
        "Dialog geometry"
    );

    session.create_window(&WindowSpec {
        x: geometry.x,
        y: geometry.y,
        width: geometry.width,
        height: geometry.height,
        border_width: config.border_width,
        instance_name: &config.instance_name,
        class_name: &config.class_name,
    })?;

    if let Err(e) = session.set_title(&config.title) {
        warn!(error = %e, "Failed to set window title");
    }

    session.map_window()?;
    session.create_context()?;

    Ok(geometry)
}

/// Draw the prompt and wait until the display has it.
pub fn render<S: DisplaySession + ?Sized>(
    session: &mut S,
    prompt: &PromptText,
    geometry: &DialogGeometry,
) -> Result<(), DisplayError> {
    session.draw_text(geometry.text_x, geometry.text_y, prompt.as_latin1())?;
    session.sync()
}

/// Run the dialog to completion.
///
/// `buffer` is zeroed before this returns, whatever the result; on
/// [`Outcome::Accepted`] its content was written to `out` first, followed by
/// a newline. Nothing is written to `out` otherwise.
pub fn run<S, W>(
    session: &mut S,
    prompt: &PromptText,
    config: &DialogConfig,
    buffer: &mut SecretBuffer,
    out: &mut W,
) -> Result<Outcome, DialogError>
where
    S: DisplaySession + ?Sized,
    W: Write + ?Sized,
{
    let mut scope = CaptureScope {
        session,
        capture: InputCapture::new(buffer),
        grabbed: false,
    };

    let geometry = open_window(&mut *scope.session, prompt, config)?;

    loop {
        let event = scope.session.next_event()?;
        trace!(%event, state = %scope.capture.state(), "Event");

        match scope.capture.handle(event) {
            Action::Continue => {}
            Action::GrabKeyboard => scope.grab_keyboard()?,
            Action::Redraw => render(&mut *scope.session, prompt, &geometry)?,
            Action::Accept => {
                output::emit_secret(out, scope.capture.buffer().expose_secret())
                    .map_err(DialogError::Output)?;
                return Ok(Outcome::Accepted);
            }
            Action::Cancel => return Ok(Outcome::Cancelled),
        }
    }
}
