//! Dialog placement.
//!
//! The window is sized to the prompt plus a fixed margin on every side,
//! centered horizontally and placed with its center at one third of the
//! screen height. Computed once; the window is never resized.

use crate::types::{ScreenInfo, TextMetrics};

/// Window and text placement derived from the prompt's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogGeometry {
    /// Width of the rendered prompt.
    pub text_width: i32,
    /// Height of the rendered prompt (ascent + descent).
    pub text_height: i32,
    /// Baseline origin of the prompt, relative to the window.
    pub text_x: i16,
    pub text_y: i16,
    /// Window size.
    pub width: u16,
    pub height: u16,
    /// Window position on the screen. May be negative for very wide prompts.
    pub x: i16,
    pub y: i16,
}

impl DialogGeometry {
    /// Compute the geometry for a prompt with `metrics` on `screen`.
    pub fn compute(
        screen: ScreenInfo,
        metrics: TextMetrics,
        margin_width: u16,
        margin_height: u16,
    ) -> Self {
        let margin_w = i32::from(margin_width);
        let margin_h = i32::from(margin_height);
        let ascent = i32::from(metrics.ascent);

        let text_width = metrics.width.max(0);
        let text_height = (ascent + i32::from(metrics.descent)).max(0);

        let width = text_width + 2 * margin_w;
        let height = text_height + 2 * margin_h;

        let x = i32::from(screen.width) / 2 - width / 2;
        let y = i32::from(screen.height) / 3 - height / 2;

        Self {
            text_width,
            text_height,
            text_x: clamp_i16(margin_w),
            text_y: clamp_i16(margin_h + ascent),
            width: clamp_size(width),
            height: clamp_size(height),
            x: clamp_i16(x),
            y: clamp_i16(y),
        }
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

// X11 rejects zero-sized windows
fn clamp_size(value: i32) -> u16 {
    value.clamp(1, i32::from(u16::MAX)) as u16
}
