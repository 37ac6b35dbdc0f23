//! xaskpass - Minimal modal passphrase dialog for SSH_ASKPASS/GIT_ASKPASS/SUDO_ASKPASS.
//!
//! Shows the prompt given as the only argument in a small X11 window, grabs
//! the keyboard, and collects a passphrase without echoing it.
//!
//! # Usage
//!
//! ```bash
//! # Default prompt
//! xaskpass
//!
//! # Custom prompt
//! xaskpass 'Enter PIN for key:'
//!
//! # As SSH askpass
//! export SSH_ASKPASS=/path/to/xaskpass
//! ```
//!
//! The passphrase is printed to stdout followed by a newline when the user
//! presses Return, and the exit status is 0. Escape or any error prints
//! nothing to stdout and exits with status 1.

use std::fs::File;
use std::io;
use std::os::fd::AsFd;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xaskpass::{Cli, X11Session};
use xaskpass_core::config::PROGRAM_NAME;
use xaskpass_core::{dialog, DialogConfig, Outcome, SecretBuffer};

fn setup_logging() {
    // Stdout carries the passphrase; logs go to stderr only.
    // Use RUST_LOG=debug for verbose output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Standard output without a userspace buffer.
///
/// Bytes written go straight to the file descriptor, so no copy of the
/// passphrase is left in a `Stdout` buffer.
fn unbuffered_stdout() -> Result<File> {
    let fd = io::stdout()
        .as_fd()
        .try_clone_to_owned()
        .context("Failed to duplicate stdout")?;
    Ok(File::from(fd))
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = DialogConfig::default();
    let prompt = cli.prompt_text();

    let mut out = unbuffered_stdout()?;
    let mut session = X11Session::connect(None, &config.font)?;

    let mut buffer = SecretBuffer::with_capacity(config.capacity);
    debug!(
        capacity = buffer.capacity(),
        memory_locked = buffer.is_memory_locked(),
        "Secret buffer ready"
    );

    let outcome = dialog::run(&mut session, &prompt, &config, &mut buffer, &mut out)?;
    debug!(%outcome, "Dialog finished");
    Ok(outcome)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}: {}", PROGRAM_NAME, e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging();

    match run(&cli) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("{}: {:#}", PROGRAM_NAME, e);
            ExitCode::FAILURE
        }
    }
}
