//! X11 display session.
//!
//! This module implements [`DisplaySession`] over the core X11 protocol
//! using `x11rb`. It creates a simple dialog with:
//!
//! - A bordered, black-on-white top-level window, transient for the root
//! - `WM_CLASS`, `WM_NAME` and `_NET_WM_NAME` hints
//! - A core font for the prompt and its metrics
//! - Key translation through the server's keyboard and modifier mapping

use tracing::{debug, trace};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    AtomEnum, Char2b, ConnectionExt as _, CreateGCAux, CreateWindowAux, EventMask, Font,
    Gcontext, GrabMode, GrabStatus, PropMode, Visualid, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{COPY_DEPTH_FROM_PARENT, CURRENT_TIME};
use xaskpass_core::{
    DisplayError, DisplayEvent, DisplaySession, KeyboardMap, Modifiers, PromptText, ScreenInfo,
    TextMetrics, WindowSpec,
};

/// Longest string a single PolyText8 item carries.
const MAX_TEXT_ITEM: usize = 254;

fn protocol_error(err: impl std::fmt::Display) -> DisplayError {
    DisplayError::Protocol(err.to_string())
}

/// Encode `text` as PolyText8 items (length, delta, bytes).
fn encode_text_items(text: &[u8]) -> Vec<u8> {
    let mut items = Vec::with_capacity(text.len() + 2 * (text.len() / MAX_TEXT_ITEM + 1));
    for chunk in text.chunks(MAX_TEXT_ITEM) {
        items.push(chunk.len() as u8);
        items.push(0);
        items.extend_from_slice(chunk);
    }
    items
}

fn load_keyboard_map(conn: &RustConnection) -> Result<KeyboardMap, DisplayError> {
    let (min_keycode, max_keycode) = {
        let setup = conn.setup();
        (setup.min_keycode, setup.max_keycode)
    };
    let count = max_keycode.saturating_sub(min_keycode).saturating_add(1);

    let mapping = conn
        .get_keyboard_mapping(min_keycode, count)
        .map_err(protocol_error)?
        .reply()
        .map_err(protocol_error)?;
    let modifiers = conn
        .get_modifier_mapping()
        .map_err(protocol_error)?
        .reply()
        .map_err(protocol_error)?;

    let keyboard = KeyboardMap::new(min_keycode, mapping.keysyms_per_keycode, mapping.keysyms)
        .with_modifier_mapping(modifiers.keycodes.len() / 8, &modifiers.keycodes);
    trace!(num_lock = ?keyboard.num_lock(), "Loaded keyboard mapping");
    Ok(keyboard)
}

/// An X11 session owning the connection, the font and the dialog window.
pub struct X11Session {
    conn: RustConnection,
    root: Window,
    root_visual: Visualid,
    black_pixel: u32,
    white_pixel: u32,
    screen: ScreenInfo,
    font: Font,
    ascent: i16,
    descent: i16,
    keyboard: KeyboardMap,
    window: Option<Window>,
    gc: Option<Gcontext>,
}

impl X11Session {
    /// Connect to `display` (or `$DISPLAY`) and load `font_name`.
    ///
    /// # Errors
    ///
    /// Returns `DisplayError::Connection` if the display cannot be reached
    /// and `DisplayError::ResourceLoad` if the font does not exist.
    pub fn connect(display: Option<&str>, font_name: &str) -> Result<Self, DisplayError> {
        let (conn, screen_num) =
            x11rb::connect(display).map_err(|e| DisplayError::Connection(e.to_string()))?;

        let (root, root_visual, black_pixel, white_pixel, screen) = {
            let screen = conn.setup().roots.get(screen_num).ok_or_else(|| {
                DisplayError::Connection(format!("screen {screen_num} does not exist"))
            })?;
            (
                screen.root,
                screen.root_visual,
                screen.black_pixel,
                screen.white_pixel,
                ScreenInfo {
                    width: screen.width_in_pixels,
                    height: screen.height_in_pixels,
                },
            )
        };
        debug!(
            screen = screen_num,
            width = screen.width,
            height = screen.height,
            "Connected to X server"
        );

        let font = conn.generate_id().map_err(protocol_error)?;
        conn.open_font(font, font_name.as_bytes())
            .map_err(protocol_error)?
            .check()
            .map_err(|e| DisplayError::resource(format!("font '{font_name}'"), e))?;
        let font_info = conn
            .query_font(font)
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?;
        debug!(
            font = font_name,
            ascent = font_info.font_ascent,
            descent = font_info.font_descent,
            "Loaded font"
        );

        let keyboard = load_keyboard_map(&conn)?;

        Ok(Self {
            conn,
            root,
            root_visual,
            black_pixel,
            white_pixel,
            screen,
            font,
            ascent: font_info.font_ascent,
            descent: font_info.font_descent,
            keyboard,
            window: None,
            gc: None,
        })
    }

    fn window(&self) -> Result<Window, DisplayError> {
        self.window
            .ok_or_else(|| DisplayError::Protocol("dialog window not created".into()))
    }

    fn gc(&self) -> Result<Gcontext, DisplayError> {
        self.gc
            .ok_or_else(|| DisplayError::Protocol("graphics context not created".into()))
    }
}

impl DisplaySession for X11Session {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn measure_text(&mut self, text: &[u8]) -> Result<TextMetrics, DisplayError> {
        let chars: Vec<Char2b> = text
            .iter()
            .map(|&b| Char2b { byte1: 0, byte2: b })
            .collect();
        let extents = self
            .conn
            .query_text_extents(self.font, &chars)
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?;

        Ok(TextMetrics {
            width: extents.overall_width,
            ascent: self.ascent,
            descent: self.descent,
        })
    }

    fn create_window(&mut self, spec: &WindowSpec<'_>) -> Result<(), DisplayError> {
        let window = self.conn.generate_id().map_err(protocol_error)?;
        let aux = CreateWindowAux::new()
            .background_pixel(self.white_pixel)
            .border_pixel(self.black_pixel)
            .event_mask(EventMask::STRUCTURE_NOTIFY | EventMask::EXPOSURE | EventMask::KEY_PRESS);

        self.conn
            .create_window(
                COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                spec.x,
                spec.y,
                spec.width,
                spec.height,
                spec.border_width,
                WindowClass::INPUT_OUTPUT,
                self.root_visual,
                &aux,
            )
            .map_err(protocol_error)?
            .check()
            .map_err(|e| DisplayError::resource("window", e))?;
        self.window = Some(window);

        let class = [
            spec.instance_name.as_bytes(),
            b"\0",
            spec.class_name.as_bytes(),
            b"\0",
        ]
        .concat();
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                &class,
            )
            .map_err(protocol_error)?;
        self.conn
            .change_property32(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_TRANSIENT_FOR,
                AtomEnum::WINDOW,
                &[self.root],
            )
            .map_err(protocol_error)?;

        debug!(window, "Created dialog window");
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<(), DisplayError> {
        let window = self.window()?;

        let latin1 = PromptText::new(title);
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_NAME,
                AtomEnum::STRING,
                latin1.as_latin1(),
            )
            .map_err(protocol_error)?
            .check()
            .map_err(protocol_error)?;

        let net_wm_name = self
            .conn
            .intern_atom(false, b"_NET_WM_NAME")
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?
            .atom;
        let utf8_string = self
            .conn
            .intern_atom(false, b"UTF8_STRING")
            .map_err(protocol_error)?
            .reply()
            .map_err(protocol_error)?
            .atom;
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                net_wm_name,
                utf8_string,
                title.as_bytes(),
            )
            .map_err(protocol_error)?
            .check()
            .map_err(protocol_error)
    }

    fn map_window(&mut self) -> Result<(), DisplayError> {
        let window = self.window()?;
        self.conn.map_window(window).map_err(protocol_error)?;
        self.sync()
    }

    fn create_context(&mut self) -> Result<(), DisplayError> {
        let window = self.window()?;
        let gc = self.conn.generate_id().map_err(protocol_error)?;
        let aux = CreateGCAux::new()
            .font(self.font)
            .foreground(self.black_pixel)
            .background(self.white_pixel);

        self.conn
            .create_gc(gc, window, &aux)
            .map_err(protocol_error)?
            .check()
            .map_err(|e| DisplayError::resource("graphics context", e))?;
        self.gc = Some(gc);
        Ok(())
    }

    fn draw_text(&mut self, x: i16, y: i16, text: &[u8]) -> Result<(), DisplayError> {
        let window = self.window()?;
        let gc = self.gc()?;
        self.conn
            .poly_text8(window, gc, x, y, &encode_text_items(text))
            .map_err(protocol_error)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), DisplayError> {
        self.conn.sync().map_err(protocol_error)
    }

    fn grab_keyboard(&mut self) -> Result<(), DisplayError> {
        let window = self.window()?;
        let reply = self
            .conn
            .grab_keyboard(true, window, CURRENT_TIME, GrabMode::ASYNC, GrabMode::ASYNC)
            .map_err(protocol_error)?
            .reply()
            .map_err(|e| DisplayError::Grab(e.to_string()))?;

        if reply.status != GrabStatus::SUCCESS {
            return Err(DisplayError::Grab(format!("{:?}", reply.status)));
        }
        Ok(())
    }

    fn ungrab_keyboard(&mut self) -> Result<(), DisplayError> {
        self.conn
            .ungrab_keyboard(CURRENT_TIME)
            .map_err(protocol_error)?;
        self.conn.flush().map_err(protocol_error)
    }

    fn next_event(&mut self) -> Result<DisplayEvent, DisplayError> {
        let event = self.conn.wait_for_event().map_err(protocol_error)?;

        let event = match event {
            Event::MapNotify(_) => DisplayEvent::Mapped,
            Event::Expose(_) => DisplayEvent::Damaged,
            Event::KeyPress(key) => {
                let modifiers = Modifiers::from_bits(u16::from(key.state));
                DisplayEvent::KeyPress(self.keyboard.lookup(key.detail, modifiers))
            }
            Event::MappingNotify(_) => {
                self.keyboard = load_keyboard_map(&self.conn)?;
                DisplayEvent::Other
            }
            Event::Error(err) => {
                debug!(error = ?err, "Ignoring X11 error event");
                DisplayEvent::Other
            }
            _ => DisplayEvent::Other,
        };
        Ok(event)
    }
}

impl Drop for X11Session {
    fn drop(&mut self) {
        // Best-effort; the server frees everything on disconnect anyway
        if let Some(gc) = self.gc.take() {
            let _ = self.conn.free_gc(gc);
        }
        if let Some(window) = self.window.take() {
            let _ = self.conn.destroy_window(window);
        }
        let _ = self.conn.close_font(self.font);
        let _ = self.conn.flush();
    }
}
