//! Error type shared by the library and the `subsync` binary.
//!
//! Nothing that happens while rewriting a single line is an error: a
//! malformed time stamp is simply copied through. The variants here cover
//! I/O failures on the streams and configuration text that could not be
//! understood.
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for IO errors on the input or output stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The offset expression is neither a time stamp, a time stamp
    /// difference nor a number of milliseconds.
    #[error("invalid time offset {0:?}")]
    InvalidOffset(String),

    /// The scale expression is neither a known frame rate id, a time stamp
    /// ratio nor a real number.
    #[error("invalid scale ratio {0:?}")]
    InvalidScale(String),

    /// The chop range is not in the `N:M` form.
    #[error("invalid chop range {0:?}, expected N:M")]
    InvalidChop(String),

    /// The renumbering start is not a decimal number.
    #[error("invalid renumber start {0:?}")]
    InvalidRenumber(String),

    /// A second encoding name that is not in the known table was given
    /// while the user-defined slot already holds a different one.
    #[error("encoding {requested:?} cannot be used together with {registered:?}, only one encoding outside the known table is supported")]
    CodepageConflict {
        registered: String,
        requested: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
