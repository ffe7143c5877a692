//! Editor errors.
//!
//! Every variant is fatal. Recoverable conditions (an unknown escape
//! sequence, an unbound key) never become errors in the first place.

use std::io;
use std::path::PathBuf;

use kilo_term::error::TermError;
use thiserror::Error;

/// A fatal editor failure.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The file named on the command line couldn't be opened or read.
    #[error("fopen {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The terminal failed underneath us.
    #[error(transparent)]
    Term(#[from] TermError),
}

/// Convenience alias for editor results.
pub type Result<T> = std::result::Result<T, EditorError>;
