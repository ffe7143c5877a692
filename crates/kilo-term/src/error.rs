// SPDX-License-Identifier: MIT
//
// Terminal errors.
//
// Everything in here is fatal to the editor: once the terminal refuses a
// mode change or a frame write comes up short, the screen is in an unknown
// state and the only sane move is to restore, report, and exit.

use std::io;

use thiserror::Error;

/// A fatal failure talking to the terminal.
#[derive(Debug, Error)]
pub enum TermError {
    /// `tcgetattr` failed while capturing the original mode.
    #[error("tcgetattr: {0}")]
    GetAttr(#[source] io::Error),

    /// `tcsetattr` failed while applying or restoring a mode.
    #[error("tcsetattr: {0}")]
    SetAttr(#[source] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor-report fallback produced a size.
    #[error("getWindowSize: unable to determine terminal size")]
    WindowSize,

    /// Reading input bytes failed for a reason other than a timeout.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// A frame write returned fewer bytes than were handed to it.
    #[error("write: short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },
}

/// Convenience alias for terminal results.
pub type Result<T> = std::result::Result<T, TermError>;

// ─── Tests ───────────────────────────────────────────────────────────────────
