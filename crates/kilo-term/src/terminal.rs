// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Raw mode is acquired through `RawMode::enable()`, which hands back a
// guard. Dropping the guard restores the exact termios captured on entry,
// so every return path out of the editor — quit, `?` on a fatal error,
// unwinding — puts the terminal back the way the shell left it.
//
// The read policy is VMIN=0 / VTIME=1: `read()` returns as soon as any
// byte is available, or with zero bytes after 100 ms. The key reader
// loops over those timeouts; they never count as end of input.
//
// The panic hook covers the one case the guard can't: the default panic
// message printing into a raw, echo-less terminal before the unwinder
// reaches the guard. The hook restores first, then lets the original
// handler print.

use std::io::{self, Read, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::error::{Result, TermError};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: usize,
    /// Number of rows (height in character cells).
    pub rows: usize,
}

// ─── Window Size ────────────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero columns.
#[cfg(unix)]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Some(Size {
            cols: usize::from(ws.ws_col),
            rows: usize::from(ws.ws_row),
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn ioctl_size() -> Option<Size> {
    None
}

/// Determine the window size, falling back to a cursor-position probe.
///
/// When `TIOCGWINSZ` is unavailable, the cursor is pushed to the far
/// bottom-right corner (CUF/CUD clamp at the screen edge) and the terminal
/// is asked where it ended up. That position is the screen extent. The
/// probe needs raw mode: the reply arrives on `input` without a newline.
///
/// # Errors
///
/// [`TermError::WindowSize`] if both methods fail.
pub fn window_size(out: &mut impl Write, input: &mut impl Read) -> Result<Size> {
    if let Some(size) = ioctl_size() {
        return Ok(size);
    }

    tracing::debug!("TIOCGWINSZ unavailable, probing cursor position");
    out.write_all(ansi::CURSOR_FAR_CORNER)
        .and_then(|()| out.flush())
        .map_err(|_| TermError::WindowSize)?;
    cursor_position(out, input)
}

/// Ask the terminal where the cursor is (DSR 6) and parse the reply.
///
/// # Errors
///
/// [`TermError::WindowSize`] if the request can't be written or the
/// reply is malformed.
pub fn cursor_position(out: &mut impl Write, input: &mut impl Read) -> Result<Size> {
    out.write_all(ansi::QUERY_CURSOR)
        .and_then(|()| out.flush())
        .map_err(|_| TermError::WindowSize)?;

    // Reply is `ESC [ rows ; cols R`. Read up to 'R' or until the
    // buffer fills or a read comes back empty.
    let mut reply = Vec::with_capacity(32);
    let mut byte = [0u8; 1];
    while reply.len() < 31 {
        match input.read(&mut byte) {
            Ok(1) if byte[0] == b'R' => break,
            Ok(1) => reply.push(byte[0]),
            _ => break,
        }
    }

    parse_cursor_report(&reply).ok_or(TermError::WindowSize)
}

/// Parse a cursor position report with the trailing `R` already removed:
/// `ESC [ rows ; cols`.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some(Size {
        rows: rows.trim().parse().ok()?,
        cols: cols.trim().parse().ok()?,
    })
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Unbuffered Output ──────────────────────────────────────────────────────

/// Unbuffered writer on a raw file descriptor.
///
/// Every `write` is exactly one `write(2)` and `flush` has nothing to do.
/// `io::stdout()` is line-buffered: handed a frame, it pushes everything
/// up to the last newline and holds the rest until the next flush, which
/// splits the frame in two. Frames go through this writer instead.
#[derive(Debug, Clone, Copy)]
pub struct FdWriter {
    #[cfg(unix)]
    fd: libc::c_int,
}

impl FdWriter {
    /// Writer on standard output.
    #[must_use]
    pub const fn stdout() -> Self {
        Self {
            #[cfg(unix)]
            fd: libc::STDOUT_FILENO,
        }
    }

    /// Writer on `fd`. The caller keeps `fd` open while the writer is used.
    #[cfg(all(unix, test))]
    const fn from_fd(fd: libc::c_int) -> Self {
        Self { fd }
    }
}

impl Write for FdWriter {
    #[cfg(unix)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe { libc::write(self.fd, buf.as_ptr().cast::<libc::c_void>(), buf.len()) };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    #[cfg(not(unix))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't
/// access it. This backup — behind a [`Mutex`], not `static mut` — lets the
/// hook restore cooked mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Clear screen, cursor home, cursor visible.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing Rust's `io::stdout()` lock in case the panic happened
/// while it was held.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw-mode guard.
///
/// Holds the termios captured before raw mode was applied and restores it
/// on drop. There is one original mode per process, acquired once and
/// released once.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... read keys, draw frames ...
/// drop(raw); // cooked mode again
/// # Ok::<(), kilo_term::error::TermError>(())
/// ```
#[must_use = "raw mode is released as soon as the guard is dropped"]
pub struct RawMode {
    #[cfg(unix)]
    original: libc::termios,
}

impl RawMode {
    /// Capture the current mode and switch stdin to raw mode.
    ///
    /// Disables canonical line buffering, echo, signal keys (Ctrl-C,
    /// Ctrl-Z), Ctrl-V, software flow control (Ctrl-S/Ctrl-Q), CR→NL
    /// translation and output post-processing, and sets an 8-bit char
    /// size. Reads return after one byte or a 100 ms timeout.
    ///
    /// # Errors
    ///
    /// [`TermError::GetAttr`] if the current mode can't be read (stdin is
    /// not a terminal, for instance), [`TermError::SetAttr`] if the raw
    /// mode can't be applied.
    #[cfg(unix)]
    pub fn enable() -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();

        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
            return Err(TermError::GetAttr(io::Error::last_os_error()));
        }

        let raw = raw_termios(original);
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw) } != 0 {
            return Err(TermError::SetAttr(io::Error::last_os_error()));
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }
        install_panic_hook();

        tracing::debug!("raw mode enabled");
        Ok(Self { original })
    }

    #[cfg(not(unix))]
    pub fn enable() -> Result<Self> {
        Err(TermError::GetAttr(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode requires a unix terminal",
        )))
    }

    /// Restore the captured mode now instead of at drop.
    ///
    /// # Errors
    ///
    /// [`TermError::SetAttr`] if the restore fails.
    pub fn disable(self) -> Result<()> {
        let result = self.restore();
        std::mem::forget(self);
        result
    }

    #[cfg(unix)]
    fn restore(&self) -> Result<()> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const self.original) } != 0 {
            return Err(TermError::SetAttr(io::Error::last_os_error()));
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }

        tracing::debug!("raw mode disabled");
        Ok(())
    }

    #[cfg(not(unix))]
    fn restore(&self) -> Result<()> {
        Ok(())
    }
}

// libc::termios has no Debug impl without libc's `extra_traits` feature.
impl std::fmt::Debug for RawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMode").finish_non_exhaustive()
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Derive the raw-mode settings from the original ones.
#[cfg(unix)]
fn raw_termios(mut t: libc::termios) -> libc::termios {
    t.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_cflag |= libc::CS8;
    t.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    // VMIN=0, VTIME=1: return what's there, or nothing after 100 ms.
    t.c_cc[libc::VMIN] = 0;
    t.c_cc[libc::VTIME] = 1;
    t
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Cursor report parsing ───────────────────────────────────────

    #[test]
    fn parse_report_basic() {
        assert_eq!(
            parse_cursor_report(b"\x1b[24;80"),
            Some(Size { cols: 80, rows: 24 })
        );
    }

    #[test]
    fn parse_report_large() {
        assert_eq!(
            parse_cursor_report(b"\x1b[120;300"),
            Some(Size { cols: 300, rows: 120 })
        );
    }

    #[test]
    fn parse_report_rejects_missing_csi() {
        assert_eq!(parse_cursor_report(b"24;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b24;80"), None);
    }

    #[test]
    fn parse_report_rejects_missing_separator() {
        assert_eq!(parse_cursor_report(b"\x1b[2480"), None);
    }

    #[test]
    fn parse_report_rejects_garbage_numbers() {
        assert_eq!(parse_cursor_report(b"\x1b[a;b"), None);
        assert_eq!(parse_cursor_report(b"\x1b[;80"), None);
    }

    #[test]
    fn parse_report_empty() {
        assert_eq!(parse_cursor_report(b""), None);
    }

    // ── cursor_position probe ───────────────────────────────────────

    #[test]
    fn cursor_position_sends_dsr_and_reads_reply() {
        let mut out = Vec::new();
        let mut input = &b"\x1b[50;132Rleftover"[..];
        let size = cursor_position(&mut out, &mut input).unwrap();

        assert_eq!(size, Size { cols: 132, rows: 50 });
        assert_eq!(out, b"\x1b[6n");
        // Bytes after the terminating 'R' stay unread.
        assert_eq!(input, b"leftover");
    }

    #[test]
    fn cursor_position_times_out() {
        let mut out = Vec::new();
        let mut input = &b"\x1b[50"[..];
        assert!(matches!(
            cursor_position(&mut out, &mut input),
            Err(TermError::WindowSize)
        ));
    }

    #[test]
    fn cursor_position_caps_reply_length() {
        let mut out = Vec::new();
        let long = [b'9'; 64];
        let mut input = &long[..];
        assert!(cursor_position(&mut out, &mut input).is_err());
    }

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn ioctl_size_does_not_panic() {
        let _ = ioctl_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    #[test]
    fn window_size_without_tty_fails_cleanly() {
        // Under a test harness stdout is usually a pipe: ioctl fails and
        // the probe gets no reply.
        if ioctl_size().is_some() {
            return;
        }
        let mut out = Vec::new();
        let mut input = &b""[..];
        assert!(matches!(
            window_size(&mut out, &mut input),
            Err(TermError::WindowSize)
        ));
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    // ── Raw mode ────────────────────────────────────────────────────

    #[test]
    fn enable_off_tty_reports_getattr() {
        if is_tty() {
            return;
        }
        assert!(matches!(RawMode::enable(), Err(TermError::GetAttr(_))));
    }

    #[test]
    fn enable_disable_cycle_on_tty() {
        if !is_tty() {
            return;
        }
        let raw = RawMode::enable().unwrap();
        raw.disable().unwrap();
        let raw = RawMode::enable().unwrap();
        drop(raw);
    }

    #[cfg(unix)]
    #[test]
    fn raw_termios_flags() {
        let original: libc::termios = unsafe { std::mem::zeroed() };
        let mut cooked = original;
        cooked.c_lflag |= libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;
        cooked.c_iflag |= libc::ICRNL | libc::IXON;
        cooked.c_oflag |= libc::OPOST;

        let raw = raw_termios(cooked);
        assert_eq!(raw.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN), 0);
        assert_eq!(raw.c_iflag & (libc::ICRNL | libc::IXON), 0);
        assert_eq!(raw.c_oflag & libc::OPOST, 0);
        assert_eq!(raw.c_cflag & libc::CS8, libc::CS8);
        assert_eq!(raw.c_cc[libc::VMIN], 0);
        assert_eq!(raw.c_cc[libc::VTIME], 1);
    }

    // ── FdWriter ────────────────────────────────────────────────────

    /// Counts the `write()` calls that reach the wrapped writer.
    struct Counting<W> {
        inner: W,
        calls: usize,
    }

    impl<W: Write> Write for Counting<W> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    #[cfg(unix)]
    fn pipe() -> (libc::c_int, libc::c_int) {
        let mut fds = [0 as libc::c_int; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        (fds[0], fds[1])
    }

    #[cfg(unix)]
    #[test]
    fn frame_with_row_breaks_leaves_in_one_write() {
        use crate::output::OutputBuffer;

        let frame: &[u8] = b"\x1b[?25l\x1b[Hrow\x1b[K\r\n\x1b[7mstatus\x1b[m\r\n\x1b[Kmsg\x1b[1;1H\x1b[?25h";
        let (read_fd, write_fd) = pipe();

        let mut out = OutputBuffer::new();
        out.push_bytes(frame);
        let mut sink = Counting {
            inner: FdWriter::from_fd(write_fd),
            calls: 0,
        };
        out.write_once(&mut sink).unwrap();
        assert_eq!(sink.calls, 1);

        let mut got = vec![0u8; 256];
        let n = unsafe { libc::read(read_fd, got.as_mut_ptr().cast::<libc::c_void>(), got.len()) };
        got.truncate(usize::try_from(n).unwrap());
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        assert_eq!(got, frame);
    }

    #[test]
    fn line_buffered_stdout_would_split_a_frame() {
        use std::io::LineWriter;

        let mut sink = LineWriter::new(Counting {
            inner: Vec::new(),
            calls: 0,
        });
        sink.write_all(b"row\r\nmsg").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.get_ref().calls, 2);
    }

    #[cfg(unix)]
    #[test]
    fn fd_writer_reports_bad_fd() {
        let err = FdWriter::from_fd(-1).write(b"x").unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }

    #[test]
    fn fd_writer_flush_is_noop() {
        assert!(FdWriter::stdout().flush().is_ok());
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_shows_cursor_last() {
        assert!(EMERGENCY_RESTORE.starts_with(ansi::CLEAR_SCREEN));
        assert!(EMERGENCY_RESTORE.ends_with(ansi::CURSOR_SHOW));
    }
}
