//! Key translation.
//!
//! Turns a keycode plus modifier state into at most one Latin-1 byte, the
//! same way Xlib's `XLookupString` does for the cases a passphrase prompt
//! cares about:
//!
//! 1. Pick a keysym from the server's keyboard mapping (group 1 only), using
//!    Shift, Caps Lock and Num Lock to choose the column.
//! 2. Map the keysym to a byte: Latin-1 keysyms are their own code, the
//!    editing and keypad keysyms map to `keysym & 0x7f`, everything else
//!    produces nothing.
//! 3. With Control held, fold the byte into a control character
//!    (`Ctrl-H` is BackSpace, `Ctrl-[` is Escape, ...).

/// Keysym values used by the translation.
pub mod keysym {
    pub const NO_SYMBOL: u32 = 0;
    pub const BACKSPACE: u32 = 0xff08;
    pub const CLEAR: u32 = 0xff0b;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const NUM_LOCK: u32 = 0xff7f;
    pub const KP_SPACE: u32 = 0xff80;
    pub const KP_TAB: u32 = 0xff89;
    pub const KP_ENTER: u32 = 0xff8d;
    pub const KP_MULTIPLY: u32 = 0xffaa;
    pub const KP_9: u32 = 0xffb9;
    pub const KP_EQUAL: u32 = 0xffbd;
    pub const DELETE: u32 = 0xffff;
}

/// Core protocol modifier state (the low byte of a key event's `state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    pub const LOCK: Modifiers = Modifiers(1 << 1);
    pub const CONTROL: Modifiers = Modifiers(1 << 2);

    /// Wrap a raw state mask.
    pub fn from_bits(bits: u16) -> Self {
        Modifiers(bits)
    }

    /// Whether any bit of `mask` is set.
    pub fn intersects(self, mask: Modifiers) -> bool {
        self.0 & mask.0 != 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

fn is_keypad(sym: u32) -> bool {
    (keysym::KP_SPACE..=keysym::KP_EQUAL).contains(&sym)
}

fn is_function_char(sym: u32) -> bool {
    matches!(
        sym,
        keysym::BACKSPACE..=keysym::CLEAR
            | keysym::RETURN
            | keysym::ESCAPE
            | keysym::KP_SPACE
            | keysym::KP_TAB
            | keysym::KP_ENTER
            | keysym::KP_MULTIPLY..=keysym::KP_9
            | keysym::KP_EQUAL
            | keysym::DELETE
    )
}

/// Lower and upper case variants of a Latin-1 keysym.
///
/// Non-letters map to themselves in both positions.
fn convert_case(sym: u32) -> (u32, u32) {
    match sym {
        0x41..=0x5a => (sym + 0x20, sym),
        0x61..=0x7a => (sym, sym - 0x20),
        0xc0..=0xde if sym != 0xd7 => (sym + 0x20, sym),
        0xe0..=0xfe if sym != 0xf7 => (sym, sym - 0x20),
        _ => (sym, sym),
    }
}

/// Translate a keysym to the byte it types, if any.
pub fn keysym_to_byte(sym: u32, modifiers: Modifiers) -> Option<u8> {
    if sym == keysym::NO_SYMBOL {
        return None;
    }

    let mut c = match sym >> 8 {
        0 => (sym & 0xff) as u8,
        0xff if is_function_char(sym) => (sym & 0x7f) as u8,
        _ => return None,
    };

    if modifiers.intersects(Modifiers::CONTROL) {
        c = match c {
            b'@'..=b'~' | b' ' => c & 0x1f,
            b'2' => 0,
            b'3'..=b'7' => c - (b'3' - 0x1b),
            b'8' => 0x7f,
            b'/' => b'_' & 0x1f,
            _ => c,
        };
    }

    Some(c)
}

/// The server's keycode to keysym table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardMap {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
    num_lock: Modifiers,
}

impl KeyboardMap {
    /// Build from a keyboard mapping reply starting at `min_keycode`.
    pub fn new(min_keycode: u8, keysyms_per_keycode: u8, keysyms: Vec<u32>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
            num_lock: Modifiers::default(),
        }
    }

    /// Find which modifier carries Num Lock from a modifier mapping.
    ///
    /// `keycodes` holds eight groups (Shift, Lock, Control, Mod1..Mod5) of
    /// `keycodes_per_modifier` keycodes each, zero meaning unused.
    pub fn with_modifier_mapping(mut self, keycodes_per_modifier: usize, keycodes: &[u8]) -> Self {
        if keycodes_per_modifier == 0 {
            return self;
        }
        for (index, group) in keycodes.chunks(keycodes_per_modifier).take(8).enumerate() {
            let has_num_lock = group
                .iter()
                .filter(|&&keycode| keycode != 0)
                .any(|&keycode| self.row(keycode).contains(&keysym::NUM_LOCK));
            if has_num_lock {
                self.num_lock = Modifiers(1 << index);
                break;
            }
        }
        self
    }

    /// The modifier bit that means Num Lock, if any.
    pub fn num_lock(&self) -> Modifiers {
        self.num_lock
    }

    fn row(&self, keycode: u8) -> &[u32] {
        let per = usize::from(self.keysyms_per_keycode);
        let Some(index) = keycode.checked_sub(self.min_keycode) else {
            return &[];
        };
        let start = usize::from(index) * per;
        self.keysyms.get(start..start + per).unwrap_or(&[])
    }

    /// The keysym `keycode` produces under `modifiers`.
    pub fn keysym(&self, keycode: u8, modifiers: Modifiers) -> u32 {
        let row = self.row(keycode);
        let col0 = row.first().copied().unwrap_or(keysym::NO_SYMBOL);
        let col1 = row.get(1).copied().unwrap_or(keysym::NO_SYMBOL);

        let shift = modifiers.intersects(Modifiers::SHIFT);
        let lock = modifiers.intersects(Modifiers::LOCK);

        if modifiers.intersects(self.num_lock) && is_keypad(col1) {
            return if shift { col0 } else { col1 };
        }

        let (lower, upper) = if col1 == keysym::NO_SYMBOL {
            convert_case(col0)
        } else {
            (col0, col1)
        };

        match (shift, lock) {
            (false, false) => lower,
            (true, false) => upper,
            // Caps Lock upper-cases whatever the Shift state selected
            (false, true) => convert_case(lower).1,
            (true, true) => convert_case(upper).1,
        }
    }

    /// The byte `keycode` types under `modifiers`, if any.
    pub fn lookup(&self, keycode: u8, modifiers: Modifiers) -> Option<u8> {
        keysym_to_byte(self.keysym(keycode, modifiers), modifiers)
    }
}
