//! Command line.
//!
//! `xaskpass [prompt-text]`. Askpass callers pass the prompt as the only
//! argument and may use any text, so no flags are interpreted: `--help` and
//! anything else starting with `-` is prompt text. With no argument, or with
//! more than one, the default prompt is used. Arguments need not be UTF-8.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use clap::Parser;
use xaskpass_core::PromptText;

/// Minimal modal X11 passphrase dialog.
#[derive(Debug, Parser)]
#[command(name = "xaskpass")]
#[command(about, long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Prompt shown in the dialog
    #[arg(
        allow_hyphen_values = true,
        value_name = "PROMPT",
        value_parser = clap::value_parser!(OsString)
    )]
    prompt: Option<OsString>,

    /// Surplus arguments; their presence selects the default prompt
    #[arg(
        hide = true,
        allow_hyphen_values = true,
        trailing_var_arg = true,
        value_parser = clap::value_parser!(OsString)
    )]
    extra: Vec<OsString>,
}

impl Cli {
    /// The prompt to display.
    pub fn prompt_text(&self) -> PromptText {
        match (&self.prompt, self.extra.is_empty()) {
            (Some(prompt), true) => PromptText::from_bytes(prompt.as_bytes()),
            _ => PromptText::default(),
        }
    }
}
