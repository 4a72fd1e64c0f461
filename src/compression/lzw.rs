use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::compression::{Codec, Decompressed};
use crate::error::{Error, Result};

/// Code to pattern table produced by [`compress`].
///
/// Code `n` is stored at index `n - 1`. The first `seed_len` entries are the
/// single-symbol seed; the rest were added while encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseDictionary {
    patterns: Vec<String>,
    seed_len: usize,
}

impl ReverseDictionary {
    /// A dictionary holding only the seed, one entry per distinct symbol in
    /// first-seen order.
    pub fn from_seed<I: IntoIterator<Item = char>>(symbols: I) -> Self {
        let mut seen = HashSet::new();
        let patterns: Vec<String> = symbols
            .into_iter()
            .filter(|&ch| seen.insert(ch))
            .map(String::from)
            .collect();
        let seed_len = patterns.len();
        Self { patterns, seed_len }
    }

    /// Pattern stored under `code`.
    pub fn get(&self, code: usize) -> Option<&str> {
        let index = code.checked_sub(1)?;
        self.patterns.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of single-symbol seed entries.
    pub fn seed_len(&self) -> usize {
        self.seed_len
    }

    /// The seed entries as `(code, pattern)`.
    pub fn seed(&self) -> impl Iterator<Item = (usize, &str)> {
        self.iter().take(self.seed_len)
    }

    /// All entries as `(code, pattern)`, ascending by code.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| (index + 1, pattern.as_str()))
    }
}

/// Output of one LZW compression call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LzwEncoded {
    /// Full dictionary, kept for display. Decoding reads only its seed.
    pub dictionary: ReverseDictionary,
    pub codes: Vec<usize>,
}

impl LzwEncoded {
    /// Codes separated by spaces.
    pub fn format_codes(&self) -> String {
        self.codes
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pattern to code map plus its reverse, grown during one compression call.
struct DictionaryBuilder {
    codes: HashMap<String, usize>,
    reverse: ReverseDictionary,
}

impl DictionaryBuilder {
    fn seeded(input: &str) -> Self {
        let reverse = ReverseDictionary::from_seed(input.chars());
        let codes = reverse
            .iter()
            .map(|(code, pattern)| (pattern.to_string(), code))
            .collect();
        Self { codes, reverse }
    }

    fn code(&self, pattern: &str) -> Option<usize> {
        self.codes.get(pattern).copied()
    }

    fn insert(&mut self, pattern: String) {
        let code = self.reverse.patterns.len() + 1;
        trace!("dictionary {code}: {pattern:?}");
        self.codes.insert(pattern.clone(), code);
        self.reverse.patterns.push(pattern);
    }
}

/// Compresses the input text using the LZW algorithm.
///
/// # Details
///
/// The dictionary is seeded with one entry per distinct symbol of `input`,
/// codes starting at 1 in first-seen order. The current pattern is extended
/// while `pattern + symbol` is known; otherwise the code of the pattern is
/// emitted, `pattern + symbol` is added under the next code and the pattern
/// restarts from the symbol.
///
/// # Example
///
/// ```
/// use textcodec::compression::lzw::compress;
///
/// let encoded = compress("BANANA");
/// assert_eq!(encoded.codes, vec![1, 2, 3, 5, 2]);
/// assert_eq!(encoded.dictionary.get(5), Some("AN"));
/// ```
pub fn compress(input: &str) -> LzwEncoded {
    let mut dictionary = DictionaryBuilder::seeded(input);
    let mut codes = Vec::new();
    let mut current = String::new();

    for ch in input.chars() {
        current.push(ch);
        if dictionary.code(&current).is_some() {
            continue;
        }
        let new_pattern = current.clone();
        current.pop();
        // Every single symbol is seeded, so `current` is never empty here.
        if let Some(code) = dictionary.code(&current) {
            codes.push(code);
        }
        dictionary.insert(new_pattern);
        current.clear();
        current.push(ch);
    }
    if let Some(code) = dictionary.code(&current) {
        codes.push(code);
    }

    debug!(
        "LZW compressed {} symbols into {} codes, dictionary size {}",
        input.chars().count(),
        codes.len(),
        dictionary.reverse.len()
    );
    LzwEncoded {
        dictionary: dictionary.reverse,
        codes,
    }
}

/// Decompresses a sequence of LZW codes back into the original text.
///
/// # Details
///
/// Only the seed entries of `dictionary` are read. The rest is rebuilt in
/// step with the encoder: after each code, `previous + first symbol of
/// current` is added. A code equal to the next free code is the one the
/// encoder added on the previous step and resolves to
/// `previous + first symbol of previous`.
///
/// # Example
///
/// ```
/// use textcodec::compression::lzw::{compress, decompress};
///
/// let encoded = compress("TOBEORNOTTOBEORTOBEORNOT");
/// let text = decompress(&encoded.dictionary, &encoded.codes).unwrap();
/// assert_eq!(text, "TOBEORNOTTOBEORTOBEORNOT");
/// ```
pub fn decompress(dictionary: &ReverseDictionary, codes: &[usize]) -> Result<String> {
    let mut output = String::new();
    decompress_into(dictionary, codes, &mut output)?;
    Ok(output)
}

fn first_symbol(pattern: &str) -> Result<char> {
    pattern
        .chars()
        .next()
        .ok_or_else(|| Error::InvalidInput("empty LZW pattern".to_string()))
}

fn decompress_into(dictionary: &ReverseDictionary, codes: &[usize], output: &mut String) -> Result<()> {
    let mut patterns: Vec<String> = dictionary
        .seed()
        .map(|(_, pattern)| pattern.to_string())
        .collect();

    let Some((&first, rest)) = codes.split_first() else {
        return Ok(());
    };
    let mut previous = first
        .checked_sub(1)
        .and_then(|index| patterns.get(index))
        .cloned()
        .ok_or(Error::UnknownLzwCode {
            code: first,
            next: patterns.len() + 1,
        })?;
    output.push_str(&previous);

    for &code in rest {
        let next = patterns.len() + 1;
        let entry = if code == next {
            let mut entry = previous.clone();
            entry.push(first_symbol(&previous)?);
            entry
        } else {
            code.checked_sub(1)
                .and_then(|index| patterns.get(index))
                .cloned()
                .ok_or(Error::UnknownLzwCode { code, next })?
        };
        output.push_str(&entry);
        let mut new_pattern = previous;
        new_pattern.push(first_symbol(&entry)?);
        patterns.push(new_pattern);
        previous = entry;
    }
    Ok(())
}

/// LZW codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzw;

impl Codec for Lzw {
    type Encoded = LzwEncoded;

    fn compress(&self, input: &str) -> Result<LzwEncoded> {
        Ok(compress(input))
    }

    fn decompress(&self, encoded: &LzwEncoded) -> Decompressed {
        let mut text = String::new();
        let status = decompress_into(&encoded.dictionary, &encoded.codes, &mut text);
        Decompressed::from_status(text, status)
    }
}
