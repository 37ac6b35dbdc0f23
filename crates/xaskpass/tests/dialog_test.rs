//! End-to-end dialog runs against a scripted display session.

use std::io::{self, Write};

use proptest::prelude::*;
use xaskpass::{ScriptedSession, SessionCall};
use xaskpass_core::{
    dialog, DialogConfig, DialogError, DisplayError, DisplayEvent, Outcome, PromptText,
    SecretBuffer,
};

const RETURN: u8 = b'\r';
const ESCAPE: u8 = 0x1b;
const BACKSPACE: u8 = 0x08;

struct Run {
    result: Result<Outcome, DialogError>,
    output: Vec<u8>,
    buffer: SecretBuffer,
    session: ScriptedSession,
}

fn run_with(mut session: ScriptedSession, prompt: &PromptText, config: &DialogConfig) -> Run {
    let mut buffer = SecretBuffer::with_capacity(config.capacity);
    let mut output = Vec::new();
    let result = dialog::run(&mut session, prompt, config, &mut buffer, &mut output);
    Run {
        result,
        output,
        buffer,
        session,
    }
}

fn run(session: ScriptedSession) -> Run {
    run_with(session, &PromptText::default(), &DialogConfig::default())
}

fn mapped() -> ScriptedSession {
    ScriptedSession::new().then_map().then_expose()
}

#[test]
fn enter_pin_example() {
    let session = mapped().then_keys(b"1234").then_keys(&[RETURN]);
    let run = run_with(
        session,
        &PromptText::new("Enter PIN:"),
        &DialogConfig::default(),
    );

    let outcome = run.result.expect("dialog should succeed");
    assert_eq!(outcome, Outcome::Accepted);
    assert_eq!(outcome.status(), 0);
    assert_eq!(run.output, b"1234\n");
    assert!(run.buffer.is_wiped());
}

#[test]
fn cancel_example_emits_nothing() {
    let session = mapped().then_keys(&[b'a', b'b', BACKSPACE, b'c', ESCAPE]);
    let run = run(session);

    let outcome = run.result.expect("cancel is not an error");
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(outcome.status(), 1);
    assert!(run.output.is_empty());
    assert!(run.buffer.is_wiped());
}

#[test]
fn capacity_example_drops_overflow() {
    let session = mapped().then_keys(b"abcde").then_keys(&[RETURN]);
    let run = run_with(
        session,
        &PromptText::default(),
        &DialogConfig::default().with_capacity(4),
    );

    assert_eq!(run.result.unwrap(), Outcome::Accepted);
    assert_eq!(run.output, b"abcd\n");
    assert!(run.buffer.is_wiped());
}

#[test]
fn empty_entry_emits_bare_newline() {
    let run = run(mapped().then_keys(&[RETURN]));
    assert_eq!(run.result.unwrap(), Outcome::Accepted);
    assert_eq!(run.output, b"\n");
}

#[test]
fn setup_sequence_and_geometry() {
    let session = ScriptedSession::new().with_screen(1024, 768).then_keys(&[ESCAPE]);
    let run = run_with(
        session,
        &PromptText::new("Enter PIN:"),
        &DialogConfig::default(),
    );

    // 10 glyphs of 6 pixels plus margins, centred and a third of the way down
    assert_eq!(
        run.session.calls(),
        &[
            SessionCall::MeasureText(b"Enter PIN:".to_vec()),
            SessionCall::CreateWindow {
                x: 466,
                y: 235,
                width: 92,
                height: 42,
                border_width: 2,
                instance_name: "xaskpass".into(),
                class_name: "Xaskpass".into(),
            },
            SessionCall::SetTitle("SSH Authentication Passphrase Request".into()),
            SessionCall::MapWindow,
            SessionCall::CreateContext,
        ]
    );
    // Never mapped, so the escape was ignored and the script ran dry
    assert!(matches!(
        run.result,
        Err(DialogError::Display(DisplayError::Protocol(_)))
    ));
}

#[test]
fn open_window_reports_text_extent() {
    let mut session = ScriptedSession::new();
    let geometry = dialog::open_window(
        &mut session,
        &PromptText::new("Enter PIN:"),
        &DialogConfig::default(),
    )
    .expect("window setup should succeed");

    assert_eq!(geometry.text_width, 10 * ScriptedSession::GLYPH_WIDTH);
    assert_eq!(
        geometry.text_height,
        i32::from(ScriptedSession::ASCENT + ScriptedSession::DESCENT)
    );
    assert_eq!((geometry.text_x, geometry.text_y), (16, 24));
}

#[test]
fn grab_happens_on_map_after_sync() {
    let run = run(mapped().then_keys(&[ESCAPE]));

    let calls = run.session.calls();
    let grab = calls
        .iter()
        .position(|c| *c == SessionCall::GrabKeyboard)
        .expect("keyboard should be grabbed");
    assert_eq!(calls[grab - 1], SessionCall::Sync);
    assert_eq!(calls[grab - 2], SessionCall::CreateContext);
}

#[test]
fn keys_before_map_are_ignored() {
    let session = ScriptedSession::new()
        .then_keys(b"early")
        .then_map()
        .then_keys(b"ok")
        .then_keys(&[RETURN]);
    let run = run(session);

    assert_eq!(run.result.unwrap(), Outcome::Accepted);
    assert_eq!(run.output, b"ok\n");
}

#[test]
fn return_before_map_does_not_accept() {
    let session = ScriptedSession::new().then_keys(&[RETURN]).then_map().then_keys(&[ESCAPE]);
    let run = run(session);
    assert_eq!(run.result.unwrap(), Outcome::Cancelled);
}

#[test]
fn rendering_is_idempotent() {
    let session = ScriptedSession::new()
        .then_map()
        .then_expose()
        .then_expose()
        .then_keys(b"s3cret")
        .then_expose()
        .then_keys(&[ESCAPE]);
    let run = run_with(
        session,
        &PromptText::new("Passphrase:"),
        &DialogConfig::default(),
    );

    assert_eq!(run.session.draw_count(), 3);
    let draws: Vec<_> = run
        .session
        .calls()
        .iter()
        .filter(|c| matches!(c, SessionCall::DrawText { .. }))
        .collect();
    for draw in &draws {
        assert_eq!(
            **draw,
            SessionCall::DrawText {
                x: 16,
                y: 24,
                text: b"Passphrase:".to_vec(),
            }
        );
    }

    // Every draw is immediately followed by a sync
    let calls = run.session.calls();
    for (i, call) in calls.iter().enumerate() {
        if matches!(call, SessionCall::DrawText { .. }) {
            assert_eq!(calls[i + 1], SessionCall::Sync);
        }
    }
}

#[test]
fn typed_characters_are_never_drawn() {
    let session = mapped().then_keys(b"hunter2").then_expose().then_keys(&[RETURN]);
    let run = run(session);

    for call in run.session.calls() {
        if let SessionCall::DrawText { text, .. } = call {
            assert_eq!(text.as_slice(), PromptText::default().as_latin1());
        }
    }
}

#[test]
fn keyboard_released_last() {
    let run = run(mapped().then_keys(b"pw").then_keys(&[RETURN]));

    assert_eq!(
        run.session.calls().last(),
        Some(&SessionCall::UngrabKeyboard)
    );
    assert!(!run.session.is_grabbed());
}

#[test]
fn keyboard_released_on_cancel() {
    let run = run(mapped().then_keys(&[ESCAPE]));
    assert_eq!(
        run.session.calls().last(),
        Some(&SessionCall::UngrabKeyboard)
    );
}

#[test]
fn remap_grabs_again() {
    let session = mapped().then_keys(b"a").then_map().then_keys(b"b").then_keys(&[RETURN]);
    let run = run(session);

    let grabs = run
        .session
        .calls()
        .iter()
        .filter(|c| **c == SessionCall::GrabKeyboard)
        .count();
    assert_eq!(grabs, 2);
    assert_eq!(run.output, b"ab\n");
}

#[test]
fn other_events_are_ignored() {
    let session = mapped()
        .then(DisplayEvent::Other)
        .then_keys(b"x")
        .then(DisplayEvent::KeyPress(None))
        .then(DisplayEvent::Other)
        .then_keys(&[RETURN]);
    let run = run(session);
    assert_eq!(run.output, b"x\n");
}

#[test]
fn grab_failure_is_fatal() {
    let session = mapped().fail_grab().then_keys(b"secret").then_keys(&[RETURN]);
    let run = run(session);

    assert!(matches!(
        run.result,
        Err(DialogError::Display(DisplayError::Grab(_)))
    ));
    assert!(run.output.is_empty());
    assert!(run.buffer.is_wiped());
    // Nothing to release, and no key was consumed
    assert!(!run.session.calls().contains(&SessionCall::UngrabKeyboard));
    assert_eq!(run.session.pending_events(), 8);
}

#[test]
fn window_creation_failure_is_fatal_before_event_loop() {
    let session = mapped().fail_create_window().then_keys(&[RETURN]);
    let run = run(session);

    assert!(matches!(
        run.result,
        Err(DialogError::Display(DisplayError::ResourceLoad { .. }))
    ));
    assert!(run.output.is_empty());
    assert!(run.buffer.is_wiped());
    assert_eq!(run.session.pending_events(), 3);
    assert!(!run.session.calls().contains(&SessionCall::MapWindow));
}

#[test]
fn context_creation_failure_is_fatal() {
    let run = run(mapped().fail_create_context().then_keys(&[RETURN]));

    assert!(matches!(
        run.result,
        Err(DialogError::Display(DisplayError::ResourceLoad { .. }))
    ));
    assert_eq!(run.session.draw_count(), 0);
    assert_eq!(run.session.pending_events(), 3);
}

#[test]
fn title_failure_is_not_fatal() {
    let run = run(mapped().fail_set_title().then_keys(b"ok").then_keys(&[RETURN]));
    assert_eq!(run.result.unwrap(), Outcome::Accepted);
    assert_eq!(run.output, b"ok\n");
}

#[test]
fn ungrab_failure_is_not_fatal() {
    let run = run(mapped().fail_ungrab().then_keys(b"ok").then_keys(&[RETURN]));
    assert_eq!(run.result.unwrap(), Outcome::Accepted);
    assert_eq!(run.output, b"ok\n");
    assert!(run.buffer.is_wiped());
}

#[test]
fn lost_connection_mid_entry_wipes_and_releases() {
    // Script ends before any terminal key
    let run = run(mapped().then_keys(b"half-typed"));

    assert!(matches!(
        run.result,
        Err(DialogError::Display(DisplayError::Protocol(_)))
    ));
    assert!(run.output.is_empty());
    assert!(run.buffer.is_wiped());
    assert_eq!(
        run.session.calls().last(),
        Some(&SessionCall::UngrabKeyboard)
    );
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_failure_is_reported_and_wipes() {
    let mut session = mapped().then_keys(b"pw").then_keys(&[RETURN]);
    let mut buffer = SecretBuffer::with_capacity(16);
    let result = dialog::run(
        &mut session,
        &PromptText::default(),
        &DialogConfig::default(),
        &mut buffer,
        &mut BrokenPipe,
    );

    assert!(matches!(result, Err(DialogError::Output(_))));
    assert!(buffer.is_wiped());
    assert!(!session.is_grabbed());
}

proptest! {
    /// Any printable entry within capacity is emitted verbatim plus a newline.
    #[test]
    fn accepted_output_is_entry_plus_newline(entry in "[ -~]{0,64}") {
        let session = mapped().then_keys(entry.as_bytes()).then_keys(&[RETURN]);
        let run = run(session);

        prop_assert_eq!(run.result.unwrap(), Outcome::Accepted);
        let mut expected = entry.into_bytes();
        expected.push(b'\n');
        prop_assert_eq!(run.output, expected);
        prop_assert!(run.buffer.is_wiped());
    }

    /// Cancel emits nothing, whatever was typed.
    #[test]
    fn cancel_never_emits(entry in "[ -~]{0,64}") {
        let session = mapped().then_keys(entry.as_bytes()).then_keys(&[ESCAPE]);
        let run = run(session);

        prop_assert_eq!(run.result.unwrap(), Outcome::Cancelled);
        prop_assert!(run.output.is_empty());
        prop_assert!(run.buffer.is_wiped());
    }
}
