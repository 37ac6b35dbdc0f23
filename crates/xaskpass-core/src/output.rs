//! Exit protocol.
//!
//! On acceptance the secret is written followed by a single newline and
//! nothing else; on cancellation or failure nothing is written. The process
//! exit status is 0 for acceptance and 1 for everything else.

use std::io::{self, Write};
use std::process::ExitCode;

/// How the dialog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The secret was confirmed and emitted.
    Accepted,
    /// The user cancelled; nothing was emitted.
    Cancelled,
}

impl Outcome {
    /// Numeric exit status.
    pub fn status(self) -> u8 {
        match self {
            Outcome::Accepted => 0,
            Outcome::Cancelled => 1,
        }
    }

    /// Process exit code.
    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Accepted => write!(f, "accepted"),
            Outcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Write `secret` and a line terminator to `out`, then flush.
///
/// The secret is written straight from the caller's storage; no copy is
/// made here.
pub fn emit_secret<W: Write + ?Sized>(out: &mut W, secret: &[u8]) -> io::Result<()> {
    out.write_all(secret)?;
    out.write_all(b"\n")?;
    out.flush()
}
