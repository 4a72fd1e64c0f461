//! LZ77 sliding-window compression over text.
//!
//! The dictionary is the most recently emitted text, at most
//! `dictionary_length` symbols long. The compressor grows a match one symbol at
//! a time while the extended match still occurs in the dictionary and its
//! length stays within `buffer_length`, then emits an `(offset, length, literal)`
//! token where `offset` is 1-based into the dictionary.
//!
//! # Offset selection
//!
//! When a match occurs at several places in the dictionary, the offset is the
//! first occurrence starting at or after 0-based position `length`; if there
//! is none, the first occurrence. The rule is fixed so token streams are
//! reproducible.

use log::{debug, trace};

use crate::compression::{Codec, Decompressed};
use crate::error::{Error, Result};

pub mod format;
pub use format::{format_tokens, parse_tokens};

/// An LZ77 token.
///
/// When a match is found, the token is:
///   (offset, length, next)
///
/// If no match is found, then offset and length are zero, and `next` is the literal.
/// A token without `next` marks the end of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub length: usize,
    pub next: Option<char>,
}

impl Token {
    /// A literal-only token `(0, 0, ch)`.
    pub fn literal(ch: char) -> Self {
        Self {
            offset: 0,
            length: 0,
            next: Some(ch),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.length == 0
    }
}

/// Window and look-ahead sizes for the LZ77 codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Config {
    dictionary_length: usize,
    buffer_length: usize,
}

impl Lz77Config {
    pub const DEFAULT_DICTIONARY_LENGTH: usize = 7;
    pub const DEFAULT_BUFFER_LENGTH: usize = 8;

    /// Both lengths must be at least 1.
    pub fn new(dictionary_length: usize, buffer_length: usize) -> Result<Self> {
        if dictionary_length == 0 {
            return Err(Error::InvalidParameter {
                name: "dictionary_length",
                value: dictionary_length,
            });
        }
        if buffer_length == 0 {
            return Err(Error::InvalidParameter {
                name: "buffer_length",
                value: buffer_length,
            });
        }
        Ok(Self {
            dictionary_length,
            buffer_length,
        })
    }

    /// Maximum number of symbols kept in the sliding window.
    pub fn dictionary_length(&self) -> usize {
        self.dictionary_length
    }

    /// Maximum match length.
    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }
}

impl Default for Lz77Config {
    fn default() -> Self {
        Self {
            dictionary_length: Self::DEFAULT_DICTIONARY_LENGTH,
            buffer_length: Self::DEFAULT_BUFFER_LENGTH,
        }
    }
}

/// Bounded dictionary of recently emitted symbols, trimmed from the front.
#[derive(Debug, Clone)]
struct SlidingWindow {
    symbols: Vec<char>,
    capacity: usize,
}

impl SlidingWindow {
    fn new(capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// First 0-based position `>= from` where `pattern` occurs.
    fn find_from(&self, pattern: &[char], from: usize) -> Option<usize> {
        if pattern.is_empty() || pattern.len() > self.symbols.len() {
            return None;
        }
        let last_start = self.symbols.len() - pattern.len();
        (from..=last_start).find(|&start| &self.symbols[start..start + pattern.len()] == pattern)
    }

    /// 1-based offset of `pattern` following the offset selection rule.
    fn select_offset(&self, pattern: &[char]) -> Option<usize> {
        self.find_from(pattern, pattern.len())
            .or_else(|| self.find_from(pattern, 0))
            .map(|start| start + 1)
    }

    /// The `length` symbols starting at 1-based `offset`.
    fn slice(&self, offset: usize, length: usize) -> Result<&[char]> {
        let out_of_range = || Error::OffsetOutOfRange {
            offset,
            length,
            window: self.symbols.len(),
        };
        let start = offset.checked_sub(1).ok_or_else(out_of_range)?;
        let end = start.checked_add(length).ok_or_else(out_of_range)?;
        self.symbols.get(start..end).ok_or_else(out_of_range)
    }

    /// Append a fragment and drop the oldest symbols beyond the capacity.
    fn extend(&mut self, fragment: &[char]) {
        self.symbols.extend_from_slice(fragment);
        if self.symbols.len() > self.capacity {
            let excess = self.symbols.len() - self.capacity;
            self.symbols.drain(..excess);
        }
    }
}

/// State of one compression call.
struct Compressor {
    window: SlidingWindow,
    buffer_length: usize,
    pending: Vec<char>,
    offset: usize,
    tokens: Vec<Token>,
}

impl Compressor {
    fn new(config: &Lz77Config) -> Self {
        Self {
            window: SlidingWindow::new(config.dictionary_length),
            buffer_length: config.buffer_length,
            pending: Vec::with_capacity(config.buffer_length),
            offset: 0,
            tokens: Vec::new(),
        }
    }

    fn push(&mut self, ch: char) {
        if self.window.is_empty() {
            self.emit(Token::literal(ch), &[ch]);
            return;
        }
        if self.pending.len() < self.buffer_length {
            self.pending.push(ch);
            if let Some(offset) = self.window.select_offset(&self.pending) {
                self.offset = offset;
                return;
            }
            self.pending.pop();
        }
        self.close(ch);
    }

    /// Emit the pending match with `next` as its literal.
    fn close(&mut self, next: char) {
        let token = if self.pending.is_empty() {
            Token::literal(next)
        } else {
            Token {
                offset: self.offset,
                length: self.pending.len(),
                next: Some(next),
            }
        };
        let mut fragment = std::mem::take(&mut self.pending);
        fragment.push(next);
        self.emit(token, &fragment);
    }

    fn emit(&mut self, token: Token, fragment: &[char]) {
        trace!(
            "token ({}, {}, {:?}) window {}",
            token.offset,
            token.length,
            token.next,
            self.window.len()
        );
        self.tokens.push(token);
        self.window.extend(fragment);
    }

    /// Flush a pending match: its last symbol becomes the literal.
    fn finish(mut self) -> Vec<Token> {
        if let Some(last) = self.pending.pop() {
            if !self.pending.is_empty() {
                // A prefix of the match occurs wherever the match does.
                self.offset = self
                    .window
                    .select_offset(&self.pending)
                    .unwrap_or(self.offset);
            }
            self.close(last);
        }
        self.tokens
    }
}

/// Compress `input` with the given window and look-ahead sizes.
///
/// # Example
///
/// ```
/// use textcodec::compression::lz77::{compress, Token};
///
/// let tokens = compress("ABABAB", 4, 4).unwrap();
/// assert_eq!(tokens[0], Token::literal('A'));
/// assert_eq!(tokens[1], Token::literal('B'));
/// ```
pub fn compress(input: &str, dictionary_length: usize, buffer_length: usize) -> Result<Vec<Token>> {
    let config = Lz77Config::new(dictionary_length, buffer_length)?;
    Ok(compress_with(input, &config))
}

/// Compress `input` with an already validated configuration.
pub fn compress_with(input: &str, config: &Lz77Config) -> Vec<Token> {
    let mut compressor = Compressor::new(config);
    for ch in input.chars() {
        compressor.push(ch);
    }
    let tokens = compressor.finish();
    debug!(
        "LZ77 compressed {} symbols into {} tokens",
        input.chars().count(),
        tokens.len()
    );
    tokens
}

/// Decompress a sequence of LZ77 tokens into the original text.
///
/// The window is rebuilt and trimmed with the same `dictionary_length` the
/// compressor used. A token referring outside the window is an error.
///
/// # Example
///
/// ```
/// use textcodec::compression::lz77::{compress, decompress};
///
/// let tokens = compress("abracadabra abracadabra", 16, 8).unwrap();
/// assert_eq!(decompress(&tokens, 16).unwrap(), "abracadabra abracadabra");
/// ```
pub fn decompress(tokens: &[Token], dictionary_length: usize) -> Result<String> {
    let mut output = String::new();
    decompress_into(tokens, dictionary_length, &mut output)?;
    Ok(output)
}

/// Parse the textual token list and decompress it.
pub fn decompress_text(text: &str, dictionary_length: usize) -> Result<String> {
    let tokens = parse_tokens(text)?;
    decompress(&tokens, dictionary_length)
}

fn decompress_into(tokens: &[Token], dictionary_length: usize, output: &mut String) -> Result<()> {
    if dictionary_length == 0 {
        return Err(Error::InvalidParameter {
            name: "dictionary_length",
            value: dictionary_length,
        });
    }
    let mut window = SlidingWindow::new(dictionary_length);
    let mut fragment = Vec::new();
    for token in tokens {
        fragment.clear();
        if token.length > 0 {
            fragment.extend_from_slice(window.slice(token.offset, token.length)?);
        }
        fragment.extend(token.next);
        output.extend(fragment.iter());
        window.extend(&fragment);
    }
    Ok(())
}

/// LZ77 codec with a fixed window configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz77 {
    pub config: Lz77Config,
}

impl Lz77 {
    pub fn new(config: Lz77Config) -> Self {
        Self { config }
    }
}

impl Codec for Lz77 {
    type Encoded = Vec<Token>;

    fn compress(&self, input: &str) -> Result<Vec<Token>> {
        Ok(compress_with(input, &self.config))
    }

    fn decompress(&self, tokens: &Vec<Token>) -> Decompressed {
        let mut text = String::new();
        let status = decompress_into(tokens, self.config.dictionary_length, &mut text);
        Decompressed::from_status(text, status)
    }
}
