//! Rows — the document as an ordered list of byte lines.
//!
//! Each [`Row`] owns two byte strings:
//!
//! - **chars** — the line as it appears in the file, without its newline.
//!   This is the only thing edits touch.
//! - **render** — what actually gets drawn. Identical to `chars` except
//!   that every tab is expanded to spaces up to the next tab stop.
//!
//! `render` is derived, never edited: every mutation goes through a
//! method that regenerates it before returning.
//!
//! # Coordinates
//!
//! The editor uses two column systems. `cx` indexes bytes of `chars`;
//! `rx` indexes bytes of `render`. They differ only after a tab, and
//! [`Row::cx_to_rx`] is the one place that converts between them. Both
//! render regeneration and the conversion advance across a tab with
//! [`tab_advance`], so the cursor and the drawn text can't disagree.
//!
//! No Unicode width handling: one byte is one terminal column.

/// Columns a tab occupies when it starts at render column `rx`.
///
/// A tab always advances at least one column and lands on the next
/// multiple of `tab_stop`.
#[inline]
#[must_use]
pub const fn tab_advance(rx: usize, tab_stop: usize) -> usize {
    tab_stop - (rx % tab_stop)
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: Vec<u8>,
    render: Vec<u8>,
}

impl Row {
    /// Build a row from raw bytes and compute its render form.
    #[must_use]
    pub fn new(chars: &[u8], tab_stop: usize) -> Self {
        let mut row = Self {
            chars: chars.to_vec(),
            render: Vec::new(),
        };
        row.update(tab_stop);
        row
    }

    /// The raw content.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// The tab-expanded form that is drawn on screen.
    #[inline]
    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Number of bytes in `chars`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no content.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Convert a byte index in `chars` to a column in `render`.
    ///
    /// Positions past the end are treated as the end of the row.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let end = cx.min(self.chars.len());
        self.chars[..end].iter().fold(0, |rx, &b| {
            if b == b'\t' {
                rx + tab_advance(rx, tab_stop)
            } else {
                rx + 1
            }
        })
    }

    /// Regenerate `render` from `chars`.
    fn update(&mut self, tab_stop: usize) {
        self.render.clear();
        for &b in &self.chars {
            if b == b'\t' {
                let n = tab_advance(self.render.len(), tab_stop);
                self.render.resize(self.render.len() + n, b' ');
            } else {
                self.render.push(b);
            }
        }
    }

    fn insert(&mut self, at: usize, c: u8, tab_stop: usize) {
        let at = at.min(self.chars.len());
        self.chars.insert(at, c);
        self.update(tab_stop);
    }

    fn remove(&mut self, at: usize, tab_stop: usize) -> bool {
        if at >= self.chars.len() {
            return false;
        }
        self.chars.remove(at);
        self.update(tab_stop);
        true
    }

    fn extend(&mut self, bytes: &[u8], tab_stop: usize) {
        self.chars.extend_from_slice(bytes);
        self.update(tab_stop);
    }

    fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let tail = self.chars.split_off(at.min(self.chars.len()));
        self.update(tab_stop);
        tail
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// The document: rows in order, plus the tab stop that shapes their
/// render form and a count of edits since load.
///
/// Row indices run `0..len()`. Several operations also accept
/// `len()` itself, the "one past the last row" position where the cursor
/// sits in an empty document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowStore {
    rows: Vec<Row>,
    tab_stop: usize,
    dirty: usize,
}

impl RowStore {
    /// Create an empty store. A `tab_stop` of 0 is treated as 1.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            tab_stop: tab_stop.max(1),
            dirty: 0,
        }
    }

    // -- Queries ------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`, if there is one.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over all rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Length of the row at `index`, or 0 past the end.
    #[inline]
    #[must_use]
    pub fn row_len(&self, index: usize) -> usize {
        self.rows.get(index).map_or(0, Row::len)
    }

    /// The tab stop used for render forms.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Number of edits since the store was created or last marked clean.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    /// Forget outstanding edits (after loading a file).
    #[inline]
    pub const fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    /// Render column for byte `cx` of row `index`. Past the last row the
    /// answer is 0.
    #[must_use]
    pub fn cx_to_rx(&self, index: usize, cx: usize) -> usize {
        self.rows
            .get(index)
            .map_or(0, |row| row.cx_to_rx(cx, self.tab_stop))
    }

    // -- Row-level edits ----------------------------------------------------

    /// Append a new row at the end.
    pub fn append_row(&mut self, bytes: &[u8]) {
        self.insert_row(self.rows.len(), bytes);
    }

    /// Insert a new row so that it becomes row `at`. Indices past the end
    /// are ignored.
    pub fn insert_row(&mut self, at: usize, bytes: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(bytes, self.tab_stop));
        self.dirty += 1;
    }

    /// Remove row `at`. Indices past the end are ignored.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.dirty += 1;
    }

    /// Split row `index` at byte `at`: the row keeps `..at`, and a new row
    /// holding `at..` is inserted after it.
    pub fn split_row(&mut self, index: usize, at: usize) {
        let tab_stop = self.tab_stop;
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        let tail = row.split_off(at, tab_stop);
        self.insert_row(index + 1, &tail);
    }

    // -- Byte-level edits ---------------------------------------------------

    /// Insert byte `c` into row `index` at byte `at`.
    ///
    /// `at` is clamped to the row length. When `index == len()`, an empty
    /// row is appended first so the cursor parked past the last row has
    /// somewhere to type.
    pub fn insert_char(&mut self, index: usize, at: usize, c: u8) {
        if index == self.rows.len() {
            self.append_row(b"");
        }
        let tab_stop = self.tab_stop;
        if let Some(row) = self.rows.get_mut(index) {
            row.insert(at, c, tab_stop);
            self.dirty += 1;
        }
    }

    /// Remove the byte at `at` from row `index`. Returns whether anything
    /// was removed.
    pub fn delete_char(&mut self, index: usize, at: usize) -> bool {
        let tab_stop = self.tab_stop;
        let removed = self
            .rows
            .get_mut(index)
            .is_some_and(|row| row.remove(at, tab_stop));
        if removed {
            self.dirty += 1;
        }
        removed
    }

    /// Append `bytes` to the end of row `index`.
    pub fn append_bytes(&mut self, index: usize, bytes: &[u8]) {
        let tab_stop = self.tab_stop;
        if let Some(row) = self.rows.get_mut(index) {
            row.extend(bytes, tab_stop);
            self.dirty += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
