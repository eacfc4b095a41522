//! Unified error type for hidmouse.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use core::fmt;

/// Top-level error type used across the library and firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // HID
    /// Inbound mouse report was shorter than the fixed layout.
    ShortReport {
        /// Number of bytes actually received.
        len: usize,
    },

    // Serial console
    /// Line contained nothing but whitespace.
    EmptyCommand,

    /// Line did not start with a known command letter.
    UnknownCommand,

    /// Command arguments were missing, malformed or out of range.
    InvalidArgument,

    /// Received line was not valid UTF-8.
    NotUtf8,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShortReport { len } => write!(f, "short mouse report ({len} bytes)"),
            Error::EmptyCommand => f.write_str("empty command"),
            Error::UnknownCommand => f.write_str("unknown command"),
            Error::InvalidArgument => f.write_str("invalid command argument"),
            Error::NotUtf8 => f.write_str("line is not valid UTF-8"),
            Error::BufferOverflow => f.write_str("buffer overflow"),
        }
    }
}
