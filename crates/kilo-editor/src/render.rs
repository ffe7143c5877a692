//! Frame rendering — turn editor state into one VT100 byte stream.
//!
//! A frame is built entirely in an [`OutputBuffer`] and written to the
//! terminal in a single call by the main loop. Layout, top to bottom:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ text rows (render bytes, or ~)     │  viewport.rows lines
//! │ ...                                │
//! │ name - N lines (modified)     cy/N │  status bar, reverse video
//! │ message                            │  message bar
//! └────────────────────────────────────┘
//! ```
//!
//! The cursor is hidden while drawing and shown again at the end, so the
//! user never sees it jump around the screen.

use std::time::Instant;

use kilo_term::ansi;
use kilo_term::output::OutputBuffer;

use crate::editor::Editor;

/// Banner shown a third of the way down an empty document.
pub const WELCOME: &str = concat!("Kilo Editor -- version ", env!("CARGO_PKG_VERSION"));

/// Drawn at the start of screen rows past the end of the document.
pub const FILLER: &[u8] = b"~";

/// Status bar shows at most this many bytes of the file name.
const FILENAME_WIDTH: usize = 20;

/// Status bar name when no file was opened.
const NO_NAME: &str = "[No Name]";

/// Draw a full frame of `editor` into `out`.
///
/// `now` decides whether the status message has expired. The editor must
/// already be scrolled so the cursor is inside the viewport.
pub fn draw_frame(editor: &Editor, out: &mut OutputBuffer, now: Instant) {
    ansi::cursor_hide(out).ok();
    ansi::cursor_home(out).ok();

    draw_rows(editor, out);
    draw_status_bar(editor, out);
    draw_message_bar(editor, out, now);

    let cursor = editor.cursor();
    let view = editor.viewport();
    ansi::cursor_to(
        out,
        cursor.rx.saturating_sub(view.coloff),
        cursor.cy.saturating_sub(view.rowoff),
    )
    .ok();
    ansi::cursor_show(out).ok();
}

// -- Text area --------------------------------------------------------------

fn draw_rows(editor: &Editor, out: &mut OutputBuffer) {
    let rows = editor.rows();
    let view = editor.viewport();

    for y in 0..view.rows {
        match rows.get(y + view.rowoff) {
            Some(row) => {
                let render = row.render();
                let start = view.coloff.min(render.len());
                let end = (start + view.cols).min(render.len());
                out.push_bytes(&render[start..end]);
            }
            None if rows.is_empty() && y == view.rows / 3 => draw_welcome(out, view.cols),
            None => out.push_bytes(FILLER),
        }

        ansi::clear_line(out).ok();
        out.push_bytes(b"\r\n");
    }
}

/// Centered banner, truncated to `cols`. A filler still starts the line
/// when there's room for padding.
fn draw_welcome(out: &mut OutputBuffer, cols: usize) {
    let banner = &WELCOME.as_bytes()[..WELCOME.len().min(cols)];
    let mut padding = (cols - banner.len()) / 2;
    if padding > 0 {
        out.push_bytes(FILLER);
        padding -= 1;
    }
    out.push_bytes(&b" ".repeat(padding));
    out.push_bytes(banner);
}

// -- Bars -------------------------------------------------------------------

fn draw_status_bar(editor: &Editor, out: &mut OutputBuffer) {
    let cols = editor.viewport().cols;
    let rows = editor.rows();

    let name = editor
        .filename()
        .map_or_else(|| NO_NAME.to_owned(), |p| p.to_string_lossy().into_owned());
    let name = &name.as_bytes()[..name.len().min(FILENAME_WIDTH)];

    let mut left = name.to_vec();
    left.extend_from_slice(format!(" - {} lines", rows.len()).as_bytes());
    if rows.dirty() > 0 {
        left.extend_from_slice(b" (modified)");
    }
    let right = format!("{}/{}", editor.cursor().cy + 1, rows.len());

    ansi::reverse_on(out).ok();

    let mut len = left.len().min(cols);
    out.push_bytes(&left[..len]);
    while len < cols {
        if cols - len == right.len() {
            out.push_bytes(right.as_bytes());
            break;
        }
        out.push_bytes(b" ");
        len += 1;
    }

    ansi::reverse_off(out).ok();
    out.push_bytes(b"\r\n");
}

fn draw_message_bar(editor: &Editor, out: &mut OutputBuffer, now: Instant) {
    ansi::clear_line(out).ok();
    if let Some(msg) = editor.status_message(now) {
        let cols = editor.viewport().cols;
        out.push_bytes(&msg.as_bytes()[..msg.len().min(cols)]);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use kilo_term::input::Key;
    use kilo_term::terminal::Size;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn editor(cols: usize, rows: usize, text: &str) -> Editor {
        let mut e = Editor::new(Size { cols, rows }, Config::default());
        e.load(text.as_bytes()).unwrap();
        e
    }

    fn frame(e: &mut Editor) -> String {
        e.scroll();
        let mut out = OutputBuffer::new();
        draw_frame(e, &mut out, Instant::now());
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    /// Screen lines between the cursor-home prefix and the final cursor
    /// placement, split on `\r\n`.
    fn screen_lines(frame: &str) -> Vec<String> {
        let body = frame.strip_prefix("\x1b[?25l\x1b[H").unwrap();
        let end = body.rfind("\x1b[?25h").unwrap();
        let body = &body[..end];
        let end = body.rfind("\x1b[").unwrap();
        body[..end].split("\r\n").map(str::to_owned).collect()
    }

    // ── Whole frame ───────────────────────────────────────────────────────

    #[test]
    fn three_line_file_exact_frame() {
        let mut e = editor(40, 6, "one\ntwo\nthree\n");
        let expected = concat!(
            "\x1b[?25l\x1b[H",
            "one\x1b[K\r\n",
            "two\x1b[K\r\n",
            "three\x1b[K\r\n",
            "~\x1b[K\r\n",
            "\x1b[7m[No Name] - 3 lines                  1/3\x1b[m\r\n",
            "\x1b[K",
            "\x1b[1;1H\x1b[?25h",
        );
        assert_eq!(frame(&mut e), expected);
    }

    #[test]
    fn frame_starts_hidden_and_ends_shown() {
        let mut e = editor(20, 5, "x");
        let f = frame(&mut e);
        assert!(f.starts_with("\x1b[?25l\x1b[H"));
        assert!(f.ends_with("\x1b[?25h"));
    }

    #[test]
    fn filler_after_document_end() {
        let mut e = editor(20, 24, "a\nb\nc\n");
        let lines = screen_lines(&frame(&mut e));
        assert_eq!(lines[0], "a\x1b[K");
        assert_eq!(lines[2], "c\x1b[K");
        for line in &lines[3..22] {
            assert_eq!(line, "~\x1b[K");
        }
    }

    // ── Welcome ───────────────────────────────────────────────────────────

    #[test]
    fn welcome_centered_on_empty_document() {
        let mut e = editor(80, 24, "");
        let lines = screen_lines(&frame(&mut e));
        // 22 text rows, banner on row 7.
        let banner = &lines[7];
        let padding = (80 - WELCOME.len()) / 2;
        let expected = format!("~{}{WELCOME}\x1b[K", " ".repeat(padding - 1));
        assert_eq!(banner, &expected);
        assert_eq!(lines[6], "~\x1b[K");
        assert_eq!(lines[8], "~\x1b[K");
    }

    #[test]
    fn welcome_truncated_on_narrow_screen() {
        let mut e = editor(10, 5, "");
        let lines = screen_lines(&frame(&mut e));
        // 3 text rows, banner on row 1, no room for padding.
        assert_eq!(lines[1], format!("{}\x1b[K", &WELCOME[..10]));
    }

    #[test]
    fn welcome_banner_text() {
        assert_eq!(
            WELCOME,
            format!("Kilo Editor -- version {}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn no_welcome_once_document_has_rows() {
        let mut e = editor(80, 24, "");
        e.process_key(Key::Char(b'x'));
        let f = frame(&mut e);
        assert!(!f.contains("Kilo Editor"));
    }

    // ── Horizontal scroll ─────────────────────────────────────────────────

    #[test]
    fn long_row_clipped_to_width() {
        let mut e = editor(5, 4, "abcdefghij");
        let lines = screen_lines(&frame(&mut e));
        assert_eq!(lines[0], "abcde\x1b[K");
    }

    #[test]
    fn coloff_slices_render() {
        let mut e = editor(5, 4, "abcdefghij\nxy");
        e.process_key(Key::End);
        let f = frame(&mut e);
        let lines = screen_lines(&f);
        // cx = 10, coloff = 6.
        assert_eq!(lines[0], "ghij\x1b[K");
        assert_eq!(lines[1], "\x1b[K");
        assert!(f.ends_with("\x1b[1;5H\x1b[?25h"));
    }

    #[test]
    fn tabs_rendered_as_spaces() {
        let mut e = editor(20, 4, "\tx");
        let lines = screen_lines(&frame(&mut e));
        assert_eq!(lines[0], "        x\x1b[K");
    }

    // ── Status bar ────────────────────────────────────────────────────────

    #[test]
    fn status_bar_shows_modified() {
        let mut e = editor(40, 4, "abc");
        e.process_key(Key::Char(b'z'));
        let f = frame(&mut e);
        assert!(f.contains("\x1b[7m[No Name] - 1 lines (modified)       1/1\x1b[m"));
    }

    #[test]
    fn status_bar_truncates_file_name() {
        let path = std::env::temp_dir().join(format!(
            "kilo-a-rather-long-file-name-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "x\n").unwrap();
        let mut e = Editor::new(Size { cols: 80, rows: 4 }, Config::default());
        e.open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let f = frame(&mut e);
        let shown = path.to_string_lossy();
        let shown = &shown[..FILENAME_WIDTH];
        assert!(f.contains(&format!("\x1b[7m{shown} - 1 lines ")));
    }

    #[test]
    fn status_bar_drops_right_side_when_it_cannot_fit() {
        let mut e = editor(12, 4, "abc");
        let f = frame(&mut e);
        assert!(f.contains("\x1b[7m[No Name] - \x1b[m\r\n"));
    }

    #[test]
    fn status_bar_tracks_cursor_line() {
        let mut e = editor(30, 6, "a\nb\nc\n");
        e.process_key(Key::ArrowDown);
        e.process_key(Key::ArrowDown);
        let f = frame(&mut e);
        assert!(f.contains("3/3\x1b[m"));
    }

    // ── Message bar ───────────────────────────────────────────────────────

    #[test]
    fn message_bar_shows_fresh_message() {
        let mut e = editor(40, 4, "");
        e.set_status_message("HELP: Ctrl-Q = quit");
        let f = frame(&mut e);
        assert!(f.contains("\x1b[m\r\n\x1b[KHELP: Ctrl-Q = quit\x1b[1;1H"));
    }

    #[test]
    fn message_bar_hides_expired_message() {
        let mut e = editor(40, 4, "");
        e.set_status_message("old news");
        e.scroll();
        let mut out = OutputBuffer::new();
        draw_frame(&e, &mut out, Instant::now() + Duration::from_secs(10));
        let f = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(!f.contains("old news"));
    }

    #[test]
    fn message_bar_truncates_to_width() {
        let mut e = editor(8, 4, "");
        e.set_status_message("0123456789");
        let f = frame(&mut e);
        assert!(f.contains("\x1b[K01234567\x1b["));
        assert!(!f.contains("89"));
    }

    // ── Cursor placement ──────────────────────────────────────────────────

    #[test]
    fn cursor_placed_relative_to_viewport() {
        let text: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let mut e = editor(80, 12, &text);
        for _ in 0..30 {
            e.process_key(Key::ArrowDown);
        }
        e.process_key(Key::End);
        let f = frame(&mut e);
        // 10 text rows; cy = 30 → rowoff = 21, screen row 9. "line 30" → rx 7.
        assert!(f.ends_with("\x1b[10;8H\x1b[?25h"));
        assert!(f.contains("line 21\x1b[K"));
        assert!(!f.contains("line 20\x1b[K"));
    }
}
