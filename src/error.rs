//! Error types shared by the codecs.

use thiserror::Error;

/// Errors reported by the compression and decompression routines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Generic invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A codec parameter is outside its allowed range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: usize },

    /// A Huffman bit string contains something other than a bit or a separator.
    #[error("invalid bit {found:?} at position {position}")]
    InvalidBit { found: char, position: usize },

    /// The bit string ended in the middle of a code word.
    #[error("bit string ended inside a code word: {pending:?}")]
    IncompleteCode { pending: String },

    /// A bit prefix does not match any code in the table.
    #[error("no code word matches {0:?}")]
    UnknownCode(String),

    /// An LZ77 token points outside the current sliding window.
    #[error("token ({offset}, {length}) is outside a window of {window} symbols")]
    OffsetOutOfRange {
        offset: usize,
        length: usize,
        window: usize,
    },

    /// The textual LZ77 token list could not be parsed.
    #[error("malformed token at position {position}: {reason}")]
    MalformedToken {
        position: usize,
        reason: &'static str,
    },

    /// An LZW code that the decoder dictionary cannot resolve.
    #[error("unknown LZW code {code} (next free code is {next})")]
    UnknownLzwCode { code: usize, next: usize },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
