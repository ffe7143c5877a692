//! Editor — the one piece of state the main loop owns.
//!
//! An [`Editor`] bundles the document ([`RowStore`]), the [`Cursor`], the
//! [`Viewport`], the file name and the status message. The main loop
//! drives it in two alternating steps:
//!
//! 1. [`refresh_screen`](Editor::refresh_screen) — scroll, then draw a
//!    frame into an output buffer.
//! 2. [`process_key`](Editor::process_key) — apply one decoded key.
//!
//! Nothing is global. Tests build an `Editor` with an explicit screen size
//! and drive it directly.
//!
//! # Key bindings
//!
//! | Key                        | Effect                                   |
//! |----------------------------|------------------------------------------|
//! | Ctrl-Q                     | Quit                                     |
//! | Arrows                     | Move one step (wrapping across rows)     |
//! | Home / End                 | Start / end of the current row           |
//! | PageUp / PageDown          | Move a screenful                         |
//! | Enter                      | Split the row at the cursor              |
//! | Backspace, Ctrl-H          | Delete the byte left of the cursor       |
//! | Delete                     | Delete the byte under the cursor         |
//! | Ctrl-L, Escape             | Nothing                                  |
//! | anything else              | Insert the byte at the cursor            |

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use kilo_term::input::{Key, ctrl};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

use crate::config::Config;
use crate::error::{EditorError, Result};
use crate::render;
use crate::row::RowStore;
use crate::view::{Cursor, Direction, Viewport};

/// Rows at the bottom of the screen taken by the status and message bars.
const BAR_ROWS: usize = 2;

/// What the main loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// Leave the loop and exit cleanly.
    Quit,
}

/// A status message and when it was set.
#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    set_at: Instant,
}

/// The editor state.
#[derive(Debug)]
pub struct Editor {
    rows: RowStore,
    cursor: Cursor,
    view: Viewport,
    filename: Option<PathBuf>,
    status: Option<StatusMessage>,
    config: Config,
}

impl Editor {
    /// Create an editor with an empty document for a terminal of `screen`
    /// size. The bottom two rows are reserved for the status and message
    /// bars.
    #[must_use]
    pub fn new(screen: Size, config: Config) -> Self {
        Self {
            rows: RowStore::new(config.tab_stop),
            cursor: Cursor::default(),
            view: Viewport::new(screen.rows.saturating_sub(BAR_ROWS), screen.cols),
            filename: None,
            status: None,
            config,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The document.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &RowStore {
        &self.rows
    }

    /// The cursor.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The visible window.
    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.view
    }

    /// The file being edited, if one was opened.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    // -- Files --------------------------------------------------------------

    /// Load `path` as the document.
    ///
    /// # Errors
    ///
    /// [`EditorError::Open`] if the file can't be opened or read.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let open_err = |source| EditorError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_err)?;
        self.load(BufReader::new(file)).map_err(open_err)?;
        self.filename = Some(path.to_path_buf());

        tracing::info!(path = %path.display(), rows = self.rows.len(), "opened file");
        Ok(())
    }

    /// Replace the document with the lines read from `reader`.
    ///
    /// Each line loses every trailing `\r` and `\n`. A final line without
    /// a newline is kept; nothing is added for a trailing newline.
    ///
    /// # Errors
    ///
    /// Any I/O error from `reader`.
    pub fn load(&mut self, mut reader: impl BufRead) -> io::Result<()> {
        let mut rows = RowStore::new(self.config.tab_stop);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            rows.append_row(&line);
        }
        rows.mark_clean();

        self.rows = rows;
        self.cursor = Cursor::default();
        self.view = Viewport::new(self.view.rows, self.view.cols);
        Ok(())
    }

    // -- Status message -----------------------------------------------------

    /// Show `text` on the message bar, starting now.
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at: Instant::now(),
        });
    }

    /// The status message, if it's non-empty and younger than the
    /// configured timeout at `now`.
    #[must_use]
    pub fn status_message(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|m| !m.text.is_empty())
            .filter(|m| now.saturating_duration_since(m.set_at) < self.config.message_timeout)
            .map(|m| m.text.as_str())
    }

    // -- Frame --------------------------------------------------------------

    /// Bring the viewport to the cursor and draw a full frame into `out`.
    pub fn refresh_screen(&mut self, out: &mut OutputBuffer) {
        self.scroll();
        render::draw_frame(self, out, Instant::now());
    }

    /// Recompute the render column and scroll offsets.
    pub fn scroll(&mut self) {
        self.view.scroll(&mut self.cursor, &self.rows);
    }

    // -- Cursor -------------------------------------------------------------

    /// Move the cursor one step.
    pub fn move_cursor(&mut self, dir: Direction) {
        self.cursor.step(dir, &self.rows);
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `c` at the cursor and move past it.
    pub fn insert_char(&mut self, c: u8) {
        self.rows.insert_char(self.cursor.cy, self.cursor.cx, c);
        self.cursor.cx += 1;
    }

    /// Break the current row at the cursor. The cursor moves to the start
    /// of the new row.
    pub fn insert_newline(&mut self) {
        if self.cursor.cx == 0 {
            self.rows.insert_row(self.cursor.cy, b"");
        } else {
            self.rows.split_row(self.cursor.cy, self.cursor.cx);
        }
        self.cursor.cy += 1;
        self.cursor.cx = 0;
    }

    /// Delete the byte left of the cursor. At the start of a row, join the
    /// row onto the previous one.
    pub fn delete_char(&mut self) {
        let Cursor { cx, cy, .. } = self.cursor;
        if cy >= self.rows.len() || (cx == 0 && cy == 0) {
            return;
        }

        if cx > 0 {
            self.rows.delete_char(cy, cx - 1);
            self.cursor.cx -= 1;
        } else {
            let joined = self.rows.row_len(cy - 1);
            let tail = self.rows.get(cy).map(|r| r.chars().to_vec()).unwrap_or_default();
            self.rows.append_bytes(cy - 1, &tail);
            self.rows.delete_row(cy);
            self.cursor.cy -= 1;
            self.cursor.cx = joined;
        }
    }

    // -- Keys ---------------------------------------------------------------

    /// Apply one key. Keys with no binding are inserted as bytes; lone
    /// Escape and Ctrl-L do nothing.
    pub fn process_key(&mut self, key: Key) -> Action {
        match key {
            Key::Char(c) if c == ctrl(b'q') => return Action::Quit,
            Key::Char(b'\r') => self.insert_newline(),
            Key::Char(c) if c == ctrl(b'l') => {}
            Key::Escape => {}

            Key::Backspace => self.delete_char(),
            Key::Char(c) if c == ctrl(b'h') => self.delete_char(),
            Key::Delete => {
                self.move_cursor(Direction::Right);
                self.delete_char();
            }

            Key::Home => self.cursor.cx = 0,
            Key::End => self.cursor.cx = self.rows.row_len(self.cursor.cy),
            Key::PageUp => self.view.page_up(&mut self.cursor, &self.rows),
            Key::PageDown => self.view.page_down(&mut self.cursor, &self.rows),

            Key::ArrowUp => self.move_cursor(Direction::Up),
            Key::ArrowDown => self.move_cursor(Direction::Down),
            Key::ArrowLeft => self.move_cursor(Direction::Left),
            Key::ArrowRight => self.move_cursor(Direction::Right),

            Key::Char(c) => self.insert_char(c),
        }
        Action::Continue
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
