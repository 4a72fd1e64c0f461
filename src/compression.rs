//! Compression algorithms implementation.
//!
//! This module provides three lossless text codecs:
//! - Huffman coding (frequency table, prefix-free code table)
//! - LZ77 (sliding-window dictionary, `(offset, length, literal)` tokens)
//! - LZW (adaptive dictionary grown in a single pass)
//!
//! Every codec implements [`Codec`], so a caller can compress a string,
//! inspect the structured result and feed it back to `decompress`.
//!
//! # Examples
//!
//! ```rust
//! use textcodec::compression::{Codec, Huffman, Lz77, Lzw};
//!
//! let text = "abracadabra";
//! assert!(Huffman.round_trip(text).unwrap());
//! assert!(Lz77::default().round_trip(text).unwrap());
//! assert!(Lzw.round_trip(text).unwrap());
//! ```

use crate::error::Result;
use log::warn;

/// Outcome of a decompression.
///
/// `text` holds everything decoded before a failure, so a caller can still
/// show the partial output when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub text: String,
    pub success: bool,
}

impl Decompressed {
    /// Build the outcome from the decoded text and the decoder status.
    pub fn from_status(text: String, status: Result<()>) -> Self {
        match status {
            Ok(()) => Self {
                text,
                success: true,
            },
            Err(err) => {
                warn!("decompression failed after {} symbols: {}", text.chars().count(), err);
                Self {
                    text,
                    success: false,
                }
            }
        }
    }
}

/// Common contract for the text codecs.
pub trait Codec {
    /// Structured compression output (code words, tokens or codes plus tables).
    type Encoded;

    /// Compress the input text.
    fn compress(&self, input: &str) -> Result<Self::Encoded>;

    /// Decompress a previously produced result. Never panics on malformed data.
    fn decompress(&self, encoded: &Self::Encoded) -> Decompressed;

    /// Compress then decompress `input`, reporting whether the text survived.
    fn round_trip(&self, input: &str) -> Result<bool> {
        let encoded = self.compress(input)?;
        let decoded = self.decompress(&encoded);
        Ok(decoded.success && decoded.text == input)
    }
}

pub mod huffman;
pub use huffman::{
    build_code_table, build_frequency_table, build_huffman_tree, decode, encode, huffman_decode,
    huffman_encode, CodeTable, FrequencyEntry, Huffman, HuffmanEncoded, HuffmanNode, HuffmanTree,
};

pub mod lz77;
pub use lz77::{format_tokens, parse_tokens, Lz77, Lz77Config, Token};

pub mod lzw;
pub use lzw::{Lzw, LzwEncoded, ReverseDictionary};
