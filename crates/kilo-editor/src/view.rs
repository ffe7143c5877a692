//! Viewport and cursor — where the user is, and what part of the document
//! is on screen.
//!
//! The [`Cursor`] lives in buffer coordinates: `cy` is a row index in
//! `0..=rows.len()` (the last value is the empty line past the end of the
//! document), `cx` a byte index in `0..=row.len()`. Its `rx` field is the
//! same column in render coordinates, recomputed from `cx` by
//! [`Viewport::scroll`] on every frame.
//!
//! The [`Viewport`] is the top-left corner of the visible window
//! (`rowoff`, `coloff`) plus the size of the text area. After `scroll`,
//! the cursor is always inside it:
//!
//! ```text
//! rowoff <= cy < rowoff + rows
//! coloff <= rx < coloff + cols
//! ```
//!
//! Neither type owns the document. Both take a [`RowStore`] by reference
//! for the duration of one call.

use crate::row::RowStore;

/// A single-step cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Cursor position in buffer coordinates, plus its render column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Byte index within the current row.
    pub cx: usize,
    /// Row index. `rows.len()` means "past the last row".
    pub cy: usize,
    /// `cx` translated to render columns. Valid after [`Viewport::scroll`].
    pub rx: usize,
}

impl Cursor {
    /// Move one step in `dir`.
    ///
    /// Left at column 0 wraps to the end of the previous row; right at
    /// the end of a row wraps to the start of the next. Up stops at row 0,
    /// down stops at the past-the-end row. Afterwards `cx` is pulled back
    /// to the length of whatever row the cursor landed on.
    pub fn step(&mut self, dir: Direction, rows: &RowStore) {
        match dir {
            Direction::Left => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = rows.row_len(self.cy);
                }
            }
            Direction::Right => {
                if let Some(row) = rows.get(self.cy) {
                    if self.cx < row.len() {
                        self.cx += 1;
                    } else if self.cx == row.len() {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Direction::Up => {
                self.cy = self.cy.saturating_sub(1);
            }
            Direction::Down => {
                if self.cy < rows.len() {
                    self.cy += 1;
                }
            }
        }
        self.clamp_to_row(rows);
    }

    /// Pull `cx` back inside the current row, and `cy` back inside the
    /// document.
    pub fn clamp_to_row(&mut self, rows: &RowStore) {
        self.cy = self.cy.min(rows.len());
        self.cx = self.cx.min(rows.row_len(self.cy));
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First document row on screen.
    pub rowoff: usize,
    /// First render column on screen.
    pub coloff: usize,
    /// Height of the text area in rows.
    pub rows: usize,
    /// Width of the text area in columns.
    pub cols: usize,
}

impl Viewport {
    /// A viewport of `rows × cols` at the top-left of the document.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            rowoff: 0,
            coloff: 0,
            rows,
            cols,
        }
    }

    /// Recompute `cursor.rx`, then shift the window just enough to keep
    /// the cursor visible.
    ///
    /// Idempotent: a second call with no cursor movement in between
    /// changes nothing.
    pub fn scroll(&mut self, cursor: &mut Cursor, store: &RowStore) {
        cursor.rx = store.cx_to_rx(cursor.cy, cursor.cx);

        if cursor.cy < self.rowoff {
            self.rowoff = cursor.cy;
        }
        if cursor.cy >= self.rowoff + self.rows {
            self.rowoff = cursor.cy + 1 - self.rows;
        }
        if cursor.rx < self.coloff {
            self.coloff = cursor.rx;
        }
        if cursor.rx >= self.coloff + self.cols {
            self.coloff = cursor.rx + 1 - self.cols;
        }

        tracing::debug!(
            rowoff = self.rowoff,
            coloff = self.coloff,
            cx = cursor.cx,
            cy = cursor.cy,
            rx = cursor.rx,
            "scroll"
        );
    }

    /// Page up: jump to the top row of the window, then step up a full
    /// screen.
    pub fn page_up(&self, cursor: &mut Cursor, store: &RowStore) {
        cursor.cy = self.rowoff;
        cursor.clamp_to_row(store);
        for _ in 0..self.rows {
            cursor.step(Direction::Up, store);
        }
    }

    /// Page down: jump to the bottom row of the window (or the end of the
    /// document), then step down a full screen.
    pub fn page_down(&self, cursor: &mut Cursor, store: &RowStore) {
        let bottom = (self.rowoff + self.rows).saturating_sub(1);
        cursor.cy = bottom.min(store.len());
        cursor.clamp_to_row(store);
        for _ in 0..self.rows {
            cursor.step(Direction::Down, store);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
