// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal plumbing for kilo.
//
// Direct terminal control with no screen-management library: raw mode via
// termios, window size via ioctl (with a cursor-report fallback), a small
// escape-sequence key decoder, and the handful of VT100 sequences the
// editor emits. Frames are assembled in memory and leave in one write.

pub mod ansi;
pub mod error;
pub mod input;
pub mod output;
pub mod terminal;
