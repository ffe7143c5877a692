// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// The frame renderer never writes to the terminal piecemeal. Every escape
// sequence and every row of text for one frame goes into an `OutputBuffer`
// first, and the whole frame leaves in a single `write()` call. Partial
// frames never reach the screen, so there is no tearing while the cursor
// is hidden and rows are being redrawn.
//
// A short write is reported, not retried. The caller treats it as fatal.
//
// The target must be unbuffered for "single write" to hold on the wire;
// the editor passes `terminal::FdWriter`, not the line-buffered stdout.

use std::io::{self, Write};

use crate::error::{Result, TermError};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Hand the whole frame to `w` in exactly one `write()` call, then
    /// discard it.
    ///
    /// The buffer is cleared whether or not the write succeeds, so a
    /// failed frame is never replayed.
    ///
    /// # Errors
    ///
    /// [`TermError::Write`] if the write fails, [`TermError::ShortWrite`]
    /// if it accepts fewer bytes than the frame holds.
    pub fn write_once(&mut self, w: &mut impl Write) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }

        let expected = self.buf.len();
        let result = w.write(&self.buf);
        self.buf.clear();

        let written = result.map_err(TermError::Write)?;
        if written != expected {
            return Err(TermError::ShortWrite { written, expected });
        }
        w.flush().map_err(TermError::Write)
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. The real flush is `write_once`.
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
