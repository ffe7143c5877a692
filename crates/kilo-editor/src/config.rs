//! Editor configuration.
//!
//! A handful of knobs the binary fills in from its command line before the
//! editor starts. Everything has a default, so `Config::default()` is a
//! working editor.
//!
//! | Field             | Default               | Meaning                                 |
//! |-------------------|-----------------------|-----------------------------------------|
//! | `tab_stop`        | 8                     | Columns between tab stops when rendering |
//! | `message_timeout` | 5 s                   | How long a status message stays visible |
//! | `help_message`    | `HELP: Ctrl-Q = quit` | Status message shown at startup         |

use std::time::Duration;

/// Default distance between tab stops.
pub const DEFAULT_TAB_STOP: usize = 8;

/// Default lifetime of a status message.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default startup message.
pub const DEFAULT_HELP_MESSAGE: &str = "HELP: Ctrl-Q = quit";

/// Runtime configuration for an [`Editor`](crate::editor::Editor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Columns between tab stops. Always at least 1.
    pub tab_stop: usize,
    /// How long a status message stays on the message bar.
    pub message_timeout: Duration,
    /// Status message set when the editor starts.
    pub help_message: String,
}

impl Config {
    /// Replace the tab stop, clamping to at least 1.
    #[must_use]
    pub fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = tab_stop.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            help_message: DEFAULT_HELP_MESSAGE.to_owned(),
        }
    }
}
