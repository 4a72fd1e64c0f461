use std::collections::{HashMap, VecDeque};

use bitvec::prelude::*;
use log::{debug, trace};

use crate::compression::{Codec, Decompressed};
use crate::error::{Error, Result};

/// Number of occurrences of one symbol in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub symbol: char,
    pub count: usize,
}

/// Represents a node in the Huffman tree.
///
/// Children are indices into the owning [`HuffmanTree`] arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A leaf node contains a character and its frequency.
    Leaf { ch: char, freq: usize },
    /// An internal node with left and right children and combined frequency.
    Internal {
        freq: usize,
        left: usize,
        right: usize,
    },
}

impl HuffmanNode {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// Link from a non-root node to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub index: usize,
    /// 0 for the lower-frequency child, 1 for the other.
    pub bit: u8,
}

/// Huffman tree stored as an arena of nodes addressed by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    parents: Vec<Option<ParentLink>>,
    leaves: HashMap<char, usize>,
    root: usize,
}

impl HuffmanTree {
    fn with_capacity(symbols: usize) -> Self {
        let capacity = symbols.saturating_mul(2).saturating_sub(1);
        Self {
            nodes: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
            leaves: HashMap::with_capacity(symbols),
            root: 0,
        }
    }

    fn push(&mut self, node: HuffmanNode) -> usize {
        self.nodes.push(node);
        self.parents.push(None);
        self.nodes.len() - 1
    }

    /// Index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Node at `index`, if any.
    pub fn node(&self, index: usize) -> Option<&HuffmanNode> {
        self.nodes.get(index)
    }

    /// Parent link of the node at `index`. `None` for the root.
    pub fn parent(&self, index: usize) -> Option<ParentLink> {
        self.parents.get(index).copied().flatten()
    }

    /// Total number of nodes, leaves and internal nodes alike.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves (distinct symbols).
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Distance from the leaf of `ch` to the root.
    pub fn depth_of(&self, ch: char) -> Option<usize> {
        let mut current = *self.leaves.get(&ch)?;
        let mut depth = 0;
        while let Some(link) = self.parent(current) {
            depth += 1;
            current = link.index;
        }
        Some(depth)
    }

    /// Code of the leaf at `leaf`, read from the root down.
    ///
    /// A tree made of a single leaf has no edges; that leaf gets the code "0".
    fn code_of(&self, leaf: usize) -> String {
        let mut bits = Vec::new();
        let mut current = leaf;
        while let Some(link) = self.parent(current) {
            bits.push(if link.bit == 0 { '0' } else { '1' });
            current = link.index;
        }
        if bits.is_empty() {
            return "0".to_string();
        }
        bits.iter().rev().collect()
    }
}

/// Mapping from symbol to its code word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: HashMap<char, String>,
}

impl CodeTable {
    /// Code word for `ch`.
    pub fn get(&self, ch: char) -> Option<&str> {
        self.codes.get(&ch).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.codes.iter().map(|(&ch, code)| (ch, code.as_str()))
    }

    /// Code word to symbol map used by the decoder.
    pub fn inverse(&self) -> HashMap<&str, char> {
        self.codes
            .iter()
            .map(|(&ch, code)| (code.as_str(), ch))
            .collect()
    }

    /// Length of the longest code word, 0 for an empty table.
    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(String::len).max().unwrap_or(0)
    }

    /// Whether no code word is a prefix of another (equal words count as prefixes).
    pub fn is_prefix_free(&self) -> bool {
        let mut codes: Vec<&str> = self.codes.values().map(String::as_str).collect();
        codes.sort_unstable();
        // After sorting, a prefix sorts directly before some word that extends it.
        codes.windows(2).all(|pair| !pair[1].starts_with(pair[0]))
    }
}

impl FromIterator<(char, String)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (char, String)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

/// Everything produced by one Huffman compression call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub code_table: CodeTable,
    /// One code word per input symbol, in input order.
    pub words: Vec<String>,
    /// Symbol counts, ascending by count, ties in first-seen order.
    pub frequencies: Vec<FrequencyEntry>,
}

impl HuffmanEncoded {
    /// All code words concatenated into one bit string.
    pub fn bit_string(&self) -> String {
        self.words.concat()
    }

    /// Number of bits in the encoded output.
    pub fn bit_len(&self) -> usize {
        self.words.iter().map(String::len).sum()
    }

    /// The encoded bits packed MSB-first into bytes.
    ///
    /// The final byte is zero-padded; `len()` of the result is the exact bit count.
    pub fn packed(&self) -> BitVec<u8, Msb0> {
        self.words
            .iter()
            .flat_map(|word| word.chars())
            .map(|bit| bit == '1')
            .collect()
    }

    /// Code words separated by spaces, terminated by `EOF`.
    pub fn format_words(&self) -> String {
        let mut out = String::new();
        for word in &self.words {
            out.push_str(word);
            out.push(' ');
        }
        out.push_str("EOF");
        out
    }
}

/// Build the frequency table of `input`.
///
/// Entries are sorted ascending by count; the sort is stable, so symbols with
/// equal counts stay in the order they first appear in the input.
pub fn build_frequency_table(input: &str) -> Vec<FrequencyEntry> {
    let mut index: HashMap<char, usize> = HashMap::new();
    let mut table: Vec<FrequencyEntry> = Vec::new();
    for ch in input.chars() {
        match index.get(&ch) {
            Some(&i) => table[i].count += 1,
            None => {
                index.insert(ch, table.len());
                table.push(FrequencyEntry {
                    symbol: ch,
                    count: 1,
                });
            }
        }
    }
    table.sort_by_key(|entry| entry.count);
    table
}

/// Build the Huffman tree given a frequency table.
/// Returns `None` if the frequency table is empty.
///
/// The two lowest nodes of the working list are merged until one node is
/// left. The first of the pair takes bit 0. A merged node is placed after
/// every node whose frequency does not exceed its own, which makes the tree
/// depend only on the order of `frequencies`.
pub fn build_huffman_tree(frequencies: &[FrequencyEntry]) -> Option<HuffmanTree> {
    let mut tree = HuffmanTree::with_capacity(frequencies.len());
    let mut working: VecDeque<usize> = VecDeque::with_capacity(frequencies.len());
    for entry in frequencies {
        let index = tree.push(HuffmanNode::Leaf {
            ch: entry.symbol,
            freq: entry.count,
        });
        tree.leaves.insert(entry.symbol, index);
        working.push_back(index);
    }
    working
        .make_contiguous()
        .sort_by_key(|&index| tree.nodes[index].freq());

    while working.len() > 1 {
        let (Some(left), Some(right)) = (working.pop_front(), working.pop_front()) else {
            break;
        };
        let freq = tree.nodes[left].freq() + tree.nodes[right].freq();
        let parent = tree.push(HuffmanNode::Internal { freq, left, right });
        tree.parents[left] = Some(ParentLink {
            index: parent,
            bit: 0,
        });
        tree.parents[right] = Some(ParentLink {
            index: parent,
            bit: 1,
        });
        trace!("merged nodes {left} and {right} into {parent} (freq {freq})");

        let at = working.partition_point(|&index| tree.nodes[index].freq() <= freq);
        working.insert(at, parent);
    }

    tree.root = working.pop_front()?;
    debug!(
        "built Huffman tree: {} leaves, {} nodes",
        tree.leaf_count(),
        tree.len()
    );
    Some(tree)
}

/// Build the code table mapping characters to their Huffman codes.
///
/// Each code is collected by following parent links from the leaf to the
/// root and reversing the bits. If the tree consists of a single leaf
/// (i.e. one unique symbol), the code "0" is assigned.
pub fn build_code_table(tree: &HuffmanTree) -> CodeTable {
    tree.leaves
        .iter()
        .map(|(&ch, &leaf)| (ch, tree.code_of(leaf)))
        .collect()
}

/// Encode the input string using the provided code table.
/// Each character is replaced with its Huffman code, one word per character.
pub fn encode(input: &str, code_table: &CodeTable) -> Result<Vec<String>> {
    input
        .chars()
        .map(|ch| {
            code_table
                .get(ch)
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidInput(format!("no Huffman code for {ch:?}")))
        })
        .collect()
}

/// Decode a bit string using the inverse of the code table.
///
/// Spaces and commas between bits are skipped. Fails when a character is not
/// a bit, when a prefix grows past the longest code without matching, or when
/// the input ends inside a code word.
///
/// # Example
///
/// ```
/// use textcodec::compression::huffman::{decode, huffman_encode};
///
/// let encoded = huffman_encode("mississippi").unwrap();
/// let decoded = decode(&encoded.bit_string(), &encoded.code_table).unwrap();
/// assert_eq!(decoded, "mississippi");
/// ```
pub fn decode(bits: &str, code_table: &CodeTable) -> Result<String> {
    let mut output = String::new();
    decode_into(bits, code_table, &mut output)?;
    Ok(output)
}

/// Decode a packed bit vector produced by [`HuffmanEncoded::packed`].
pub fn decode_packed(bits: &BitSlice<u8, Msb0>, code_table: &CodeTable) -> Result<String> {
    let text: String = bits.iter().map(|bit| if *bit { '1' } else { '0' }).collect();
    decode(&text, code_table)
}

fn decode_into(bits: &str, code_table: &CodeTable, output: &mut String) -> Result<()> {
    let inverse = code_table.inverse();
    let longest = code_table.max_code_len();
    let mut pending = String::new();

    for (position, ch) in bits.chars().enumerate() {
        match ch {
            '0' | '1' => pending.push(ch),
            ',' => continue,
            c if c.is_whitespace() => continue,
            found => return Err(Error::InvalidBit { found, position }),
        }
        if let Some(&symbol) = inverse.get(pending.as_str()) {
            output.push(symbol);
            pending.clear();
        } else if pending.len() >= longest {
            return Err(Error::UnknownCode(pending));
        }
    }

    if pending.is_empty() {
        Ok(())
    } else {
        Err(Error::IncompleteCode { pending })
    }
}

/// Convenience function: builds the Huffman tree from input, encodes the input,
/// and returns the code table, the code words and the frequency table.
///
/// An empty input yields an empty result.
pub fn huffman_encode(input: &str) -> Result<HuffmanEncoded> {
    let frequencies = build_frequency_table(input);
    let Some(tree) = build_huffman_tree(&frequencies) else {
        return Ok(HuffmanEncoded::default());
    };
    let code_table = build_code_table(&tree);
    let words = encode(input, &code_table)?;
    debug!(
        "Huffman encoded {} symbols into {} bits",
        words.len(),
        words.iter().map(String::len).sum::<usize>()
    );
    Ok(HuffmanEncoded {
        code_table,
        words,
        frequencies,
    })
}

/// Convenience function: decodes an encoded bit string with the given code table.
///
/// On failure the returned text holds the symbols decoded before the error.
pub fn huffman_decode(bits: &str, code_table: &CodeTable) -> Decompressed {
    let mut text = String::new();
    let status = decode_into(bits, code_table, &mut text);
    Decompressed::from_status(text, status)
}

/// Huffman codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Huffman;

impl Codec for Huffman {
    type Encoded = HuffmanEncoded;

    fn compress(&self, input: &str) -> Result<HuffmanEncoded> {
        huffman_encode(input)
    }

    fn decompress(&self, encoded: &HuffmanEncoded) -> Decompressed {
        huffman_decode(&encoded.bit_string(), &encoded.code_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(table: &[FrequencyEntry], ch: char) -> Option<usize> {
        table.iter().find(|e| e.symbol == ch).map(|e| e.count)
    }

    #[test]
    fn test_frequency_table() {
        let freq = build_frequency_table("aabccc");
        assert_eq!(count_of(&freq, 'a'), Some(2));
        assert_eq!(count_of(&freq, 'b'), Some(1));
        assert_eq!(count_of(&freq, 'c'), Some(3));
        let order: Vec<char> = freq.iter().map(|e| e.symbol).collect();
        assert_eq!(order, vec!['b', 'a', 'c']);
    }

    #[test]
    fn test_frequency_ties_keep_first_seen_order() {
        let freq = build_frequency_table("zyxzyx");
        let order: Vec<char> = freq.iter().map(|e| e.symbol).collect();
        assert_eq!(order, vec!['z', 'y', 'x']);
    }

    #[test]
    fn test_aaab() {
        let encoded = huffman_encode("AAAB").unwrap();
        assert_eq!(
            encoded.frequencies,
            vec![
                FrequencyEntry {
                    symbol: 'B',
                    count: 1
                },
                FrequencyEntry {
                    symbol: 'A',
                    count: 3
                },
            ]
        );
        let tree = build_huffman_tree(&encoded.frequencies).unwrap();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(tree.root()).map(HuffmanNode::freq), Some(4));
        assert_eq!(encoded.code_table.get('B'), Some("0"));
        assert_eq!(encoded.code_table.get('A'), Some("1"));
        assert_eq!(encoded.words, vec!["1", "1", "1", "0"]);
        assert_eq!(Huffman.decompress(&encoded).text, "AAAB");
    }

    #[test]
    fn test_merged_node_goes_after_equal_frequencies() {
        // b:1 and a:2 merge into 3, which is placed after c:3.
        let encoded = huffman_encode("aabccc").unwrap();
        assert_eq!(encoded.code_table.get('c'), Some("0"));
        assert_eq!(encoded.code_table.get('b'), Some("10"));
        assert_eq!(encoded.code_table.get('a'), Some("11"));
    }

    #[test]
    fn test_huffman_tree_and_code_table() {
        let input = "this is an example for huffman encoding";
        let freq = build_frequency_table(input);
        let tree = build_huffman_tree(&freq).expect("Tree should be built");
        let code_table = build_code_table(&tree);
        // Each character in input must have a code.
        for ch in input.chars() {
            assert!(code_table.get(ch).is_some(), "Missing code for '{}'", ch);
        }
        assert_eq!(code_table.len(), freq.len());
        assert!(code_table.is_prefix_free());
        for entry in &freq {
            let depth = tree.depth_of(entry.symbol).unwrap();
            assert_eq!(code_table.get(entry.symbol).unwrap().len(), depth);
        }
    }

    #[test]
    fn test_parent_links_reach_root() {
        let freq = build_frequency_table("abracadabra");
        let tree = build_huffman_tree(&freq).unwrap();
        assert!(tree.parent(tree.root()).is_none());
        for index in 0..tree.len() {
            if index != tree.root() {
                let link = tree.parent(index).unwrap();
                assert!(matches!(
                    tree.node(link.index),
                    Some(HuffmanNode::Internal { .. })
                ));
            }
        }
    }

    #[test]
    fn test_encode_decode() {
        let input = "huffman coding in rust is fun!";
        let encoded = huffman_encode(input).unwrap();
        let decoded = huffman_decode(&encoded.bit_string(), &encoded.code_table);
        assert!(decoded.success);
        assert_eq!(decoded.text, input);
    }

    #[test]
    fn test_single_character() {
        let input = "aaaaaaa";
        let encoded = huffman_encode(input).unwrap();
        // With a single symbol, the assigned code is "0" for each occurrence.
        assert_eq!(encoded.bit_string(), "0".repeat(input.len()));
        let decoded = huffman_decode(&encoded.bit_string(), &encoded.code_table);
        assert_eq!(decoded.text, input);
    }

    #[test]
    fn test_empty_input() {
        let encoded = huffman_encode("").unwrap();
        assert!(encoded.code_table.is_empty());
        assert!(encoded.words.is_empty());
        assert!(encoded.frequencies.is_empty());
        let decoded = Huffman.decompress(&encoded);
        assert!(decoded.success);
        assert_eq!(decoded.text, "");
    }

    #[test]
    fn test_separators_are_skipped() {
        let encoded = huffman_encode("AAAB").unwrap();
        assert_eq!(decode("1, 1, 1,\n0", &encoded.code_table).unwrap(), "AAAB");
    }

    #[test]
    fn test_incomplete_code() {
        let encoded = huffman_encode("aabccc").unwrap();
        // "1" alone is the start of both "10" and "11".
        let decoded = huffman_decode("0101", &encoded.code_table);
        assert!(!decoded.success);
        assert_eq!(decoded.text, "cb");
        assert_eq!(
            decode("0101", &encoded.code_table),
            Err(Error::IncompleteCode {
                pending: "1".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_bit() {
        let encoded = huffman_encode("AAAB").unwrap();
        assert_eq!(
            decode("1120", &encoded.code_table),
            Err(Error::InvalidBit {
                found: '2',
                position: 2
            })
        );
    }

    #[test]
    fn test_unknown_code() {
        let table: CodeTable = [('x', "00".to_string()), ('y', "01".to_string())]
            .into_iter()
            .collect();
        assert_eq!(
            decode("0011", &table),
            Err(Error::UnknownCode("11".to_string()))
        );
        assert!(!huffman_decode("1", &CodeTable::default()).success);
    }

    #[test]
    fn test_packed_bits() {
        let encoded = huffman_encode("aabccc").unwrap();
        // a a b c c c -> 11 11 10 0 0 0
        assert_eq!(encoded.bit_string(), "111110000");
        let packed = encoded.packed();
        assert_eq!(packed.len(), 9);
        assert_eq!(packed.as_raw_slice(), &[0b1111_1000, 0b0000_0000]);
        assert_eq!(
            decode_packed(&packed, &encoded.code_table).unwrap(),
            "aabccc"
        );
    }

    #[test]
    fn test_format_words() {
        let encoded = huffman_encode("AAAB").unwrap();
        assert_eq!(encoded.format_words(), "1 1 1 0 EOF");
    }

    #[test]
    fn test_prefix_free_detection() {
        let table: CodeTable = [('x', "0".to_string()), ('y', "01".to_string())]
            .into_iter()
            .collect();
        assert!(!table.is_prefix_free());
    }

    #[test]
    fn test_non_ascii() {
        let input = "这是一段测试，测试";
        assert!(Huffman.round_trip(input).unwrap());
    }
}
