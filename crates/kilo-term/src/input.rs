// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw stdin bytes into logical keys. Every byte that isn't ESC is a
// key on its own: printable characters, control characters, Enter (`\r`
// in raw mode), all of them. ESC starts one of three small grammars:
//
//   ESC [ letter      arrows (A B C D), Home (H), End (F)
//   ESC [ digit ~     Home (1, 7), Delete (3), End (4, 8),
//                     PageUp (5), PageDown (6)
//   ESC O letter      Home (H), End (F) — application-mode encoding
//
// Anything else that begins with ESC collapses to a lone Escape key, which
// the editor treats as "dismiss". Nothing is ever reported as an error.
// After ESC the decoder always takes two more bytes when they arrive in
// time, so `ESC x y` is one Escape, not Escape followed by `y`.
//
// # Design
//
// Decoding is split in two. [`Decoder`] is a pure state machine: feed it
// one byte, it says either "here's a key" or "need another byte". It never
// touches I/O, so every grammar is testable from a byte slice. [`KeyReader`]
// drives a decoder from any `Read` source. Under raw mode a read returns
// zero bytes when the 100 ms VTIME timeout expires; the reader takes that
// as "the sequence ended here" and asks the decoder to finish, which turns
// a dangling ESC prefix into Escape.
//
// The decoder consumes exactly the bytes its grammar examined. Bytes after
// a finished key stay in the source for the next call.

use std::io::{self, Read};

use crate::error::{Result, TermError};

/// The escape byte.
pub const ESC: u8 = 0x1B;

/// What the terminal sends for the Backspace key.
pub const BACKSPACE: u8 = 0x7F;

/// The byte produced by holding Ctrl with `k` (strips bits 5 and 6).
///
/// ```
/// assert_eq!(kilo_term::input::ctrl(b'q'), 0x11);
/// ```
#[inline]
#[must_use]
pub const fn ctrl(k: u8) -> u8 {
    k & 0x1F
}

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key.
///
/// Raw bytes and named keys live in separate variants, so no byte value can
/// ever be mistaken for a special key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any single byte that isn't part of an escape sequence, including
    /// control characters like `\r` and Ctrl-letter combinations.
    Char(u8),
    // ── Navigation ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
    Backspace,
    /// A lone ESC, or any escape sequence we don't recognize.
    Escape,
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Where the decoder is inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Start,
    SawEsc,
    /// ESC then a byte that opens no known grammar; one more byte to go.
    SawEscOther(u8),
    SawBracket,
    SawSs3,
    SawBracketDigit(u8),
}

/// Result of feeding one byte to the [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A complete key. The decoder is back in its start state.
    Emit(Key),
    /// Inside an escape sequence; feed another byte or call
    /// [`Decoder::finish`].
    Pending,
}

/// Byte-at-a-time escape sequence state machine.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: State,
}

impl Decoder {
    /// Create a decoder in its start state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Start,
        }
    }

    /// Whether the decoder is partway through an escape sequence.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state != State::Start
    }

    /// Advance the state machine by one byte.
    pub fn feed(&mut self, byte: u8) -> Step {
        let (next, step) = match (self.state, byte) {
            (State::Start, ESC) => (State::SawEsc, Step::Pending),
            (State::Start, BACKSPACE) => (State::Start, Step::Emit(Key::Backspace)),
            (State::Start, b) => (State::Start, Step::Emit(Key::Char(b))),

            (State::SawEsc, b'[') => (State::SawBracket, Step::Pending),
            (State::SawEsc, b'O') => (State::SawSs3, Step::Pending),
            (State::SawEsc, b) => (State::SawEscOther(b), Step::Pending),
            (State::SawEscOther(a), b) => (State::Start, unrecognized(&[ESC, a, b])),

            (State::SawBracket, d @ b'0'..=b'9') => (State::SawBracketDigit(d), Step::Pending),
            (State::SawBracket, b) => (State::Start, csi_letter(b)),

            (State::SawSs3, b) => (State::Start, ss3_letter(b)),

            (State::SawBracketDigit(d), b'~') => (State::Start, csi_tilde(d)),
            (State::SawBracketDigit(d), b) => (State::Start, unrecognized(&[ESC, b'[', d, b])),
        };
        self.state = next;
        step
    }

    /// Input ran dry mid-sequence. Returns `Some(Key::Escape)` if a prefix
    /// was pending (a lone ESC, or a truncated sequence), `None` otherwise.
    pub fn finish(&mut self) -> Option<Key> {
        let pending = self.is_pending();
        self.state = State::Start;
        pending.then_some(Key::Escape)
    }
}

/// `ESC [ <byte>` with a letter final byte.
fn csi_letter(b: u8) -> Step {
    match b {
        b'A' => Step::Emit(Key::ArrowUp),
        b'B' => Step::Emit(Key::ArrowDown),
        b'C' => Step::Emit(Key::ArrowRight),
        b'D' => Step::Emit(Key::ArrowLeft),
        b'H' => Step::Emit(Key::Home),
        b'F' => Step::Emit(Key::End),
        _ => unrecognized(&[ESC, b'[', b]),
    }
}

/// `ESC [ <digit> ~`.
fn csi_tilde(digit: u8) -> Step {
    match digit {
        b'1' | b'7' => Step::Emit(Key::Home),
        b'3' => Step::Emit(Key::Delete),
        b'4' | b'8' => Step::Emit(Key::End),
        b'5' => Step::Emit(Key::PageUp),
        b'6' => Step::Emit(Key::PageDown),
        _ => unrecognized(&[ESC, b'[', digit, b'~']),
    }
}

/// `ESC O <byte>`.
fn ss3_letter(b: u8) -> Step {
    match b {
        b'H' => Step::Emit(Key::Home),
        b'F' => Step::Emit(Key::End),
        _ => unrecognized(&[ESC, b'O', b]),
    }
}

fn unrecognized(seq: &[u8]) -> Step {
    tracing::warn!(sequence = ?seq, "unrecognized escape sequence");
    Step::Emit(Key::Escape)
}

// ─── KeyReader ──────────────────────────────────────────────────────────────

/// Reads keys from a byte source, one [`Key`] per call.
///
/// The source is expected to behave like a raw-mode terminal: `read()`
/// returns `Ok(0)` (or `WouldBlock`/`Interrupted`) when nothing arrived
/// within the timeout. That is never treated as end of input.
///
/// # Example
///
/// ```
/// use kilo_term::input::{Key, KeyReader};
///
/// let mut keys = KeyReader::new(&b"\x1b[5~x"[..]);
/// assert_eq!(keys.read_key()?, Key::PageUp);
/// assert_eq!(keys.read_key()?, Key::Char(b'x'));
/// # Ok::<(), kilo_term::error::TermError>(())
/// ```
#[derive(Debug)]
pub struct KeyReader<R> {
    source: R,
    decoder: Decoder,
}

impl<R: Read> KeyReader<R> {
    /// Wrap a byte source.
    pub const fn new(source: R) -> Self {
        Self {
            source,
            decoder: Decoder::new(),
        }
    }

    /// Block until a key arrives.
    ///
    /// Retries across read timeouts until at least one byte shows up, then
    /// reads as many more as the escape grammar needs.
    ///
    /// # Errors
    ///
    /// [`TermError::Read`] if the source fails with anything other than a
    /// timeout.
    pub fn read_key(&mut self) -> Result<Key> {
        loop {
            if let Some(key) = self.try_read_key()? {
                return Ok(key);
            }
        }
    }

    /// Read at most one key, returning `None` if the first read times out.
    ///
    /// # Errors
    ///
    /// [`TermError::Read`] if the source fails with anything other than a
    /// timeout.
    pub fn try_read_key(&mut self) -> Result<Option<Key>> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };

        let mut step = self.decoder.feed(first);
        loop {
            match step {
                Step::Emit(key) => {
                    tracing::debug!(?key, "key");
                    return Ok(Some(key));
                }
                Step::Pending => match self.read_byte()? {
                    Some(byte) => step = self.decoder.feed(byte),
                    None => return Ok(self.decoder.finish()),
                },
            }
        }
    }

    /// One byte, or `None` on timeout.
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.source.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                Ok(None)
            }
            Err(e) => Err(TermError::Read(e)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
