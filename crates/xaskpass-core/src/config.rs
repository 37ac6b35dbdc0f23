//! Fixed dialog parameters.
//!
//! xaskpass reads no configuration file and no environment variables; the
//! only runtime input is the prompt text. Everything else about the dialog
//! is a constant collected here and carried in [`DialogConfig`], so tests
//! can shrink the capacity or swap the font without touching the logic.

/// Program name, used for diagnostics and the window instance name.
pub const PROGRAM_NAME: &str = "xaskpass";

/// Window class name for window-manager policy matching.
pub const WINDOW_CLASS: &str = "Xaskpass";

/// Prompt shown when no prompt argument is given.
pub const DEFAULT_PROMPT: &str = "Please enter your authentication passphrase:";

/// Window title.
pub const DIALOG_TITLE: &str = "SSH Authentication Passphrase Request";

/// Core X font used for the prompt.
pub const FONT: &str = "-*-fixed-medium-r-*-*-10-*-*-*-*-*-iso8859-15";

/// Maximum passphrase length in bytes.
pub const MAX_PASSPHRASE_LEN: usize = 2048;

/// Horizontal margin around the prompt, in pixels.
pub const MARGIN_WIDTH: u16 = 16;

/// Vertical margin around the prompt, in pixels.
pub const MARGIN_HEIGHT: u16 = 16;

/// Window border width, in pixels.
pub const BORDER_WIDTH: u16 = 2;

/// Parameters of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    /// Core font name (XLFD).
    pub font: String,
    /// Window title.
    pub title: String,
    /// Class hint instance name.
    pub instance_name: String,
    /// Class hint class name.
    pub class_name: String,
    /// Horizontal margin in pixels.
    pub margin_width: u16,
    /// Vertical margin in pixels.
    pub margin_height: u16,
    /// Border width in pixels.
    pub border_width: u16,
    /// Secret buffer capacity in bytes.
    pub capacity: usize,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            font: FONT.to_string(),
            title: DIALOG_TITLE.to_string(),
            instance_name: PROGRAM_NAME.to_string(),
            class_name: WINDOW_CLASS.to_string(),
            margin_width: MARGIN_WIDTH,
            margin_height: MARGIN_HEIGHT,
            border_width: BORDER_WIDTH,
            capacity: MAX_PASSPHRASE_LEN,
        }
    }
}

impl DialogConfig {
    /// Same configuration with a different buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_config_default() {
        let config = DialogConfig::default();
        assert_eq!(config.font, FONT);
        assert_eq!(config.title, "SSH Authentication Passphrase Request");
        assert_eq!(config.instance_name, "xaskpass");
        assert_eq!(config.class_name, "Xaskpass");
        assert_eq!(config.margin_width, 16);
        assert_eq!(config.margin_height, 16);
        assert_eq!(config.border_width, 2);
        assert_eq!(config.capacity, 2048);
    }

    #[test]
    fn dialog_config_with_capacity() {
        let config = DialogConfig::default().with_capacity(4);
        assert_eq!(config.capacity, 4);
        assert_eq!(config.font, FONT);
    }
}
