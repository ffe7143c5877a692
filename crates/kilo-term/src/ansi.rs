// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — the frame renderer makes those. This
// module only knows the byte-level encoding of the VT100 subset the editor
// speaks: cursor hide/show, clear screen, cursor home, cursor position,
// erase to end of line, and reverse video on/off. Nothing else goes out.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Raw Sequences ──────────────────────────────────────────────────────────

/// DECTCEM reset.
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
/// DECTCEM set.
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
/// ED 2 — erase the whole display.
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
/// CUP with no arguments — top-left corner.
pub const CURSOR_HOME: &[u8] = b"\x1b[H";
/// EL 0 — erase from the cursor to the end of the line.
pub const CLEAR_LINE: &[u8] = b"\x1b[K";
/// SGR 7 — inverted colors.
pub const REVERSE_ON: &[u8] = b"\x1b[7m";
/// SGR with no arguments — back to normal rendition.
pub const REVERSE_OFF: &[u8] = b"\x1b[m";
/// Push the cursor to the bottom-right corner. CUF/CUD stop at the edge.
pub const CURSOR_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";
/// DSR 6 — ask the terminal to report the cursor position.
pub const QUERY_CURSOR: &[u8] = b"\x1b[6n";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Erase from the cursor to the end of the current line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_LINE)
}

// ─── Rendition ───────────────────────────────────────────────────────────────

/// Switch to inverted colors (SGR 7). Used for the status bar.
#[inline]
pub fn reverse_on(w: &mut impl Write) -> io::Result<()> {
    w.write_all(REVERSE_ON)
}

/// Return to normal rendition (SGR with no parameters).
#[inline]
pub fn reverse_off(w: &mut impl Write) -> io::Result<()> {
    w.write_all(REVERSE_OFF)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
