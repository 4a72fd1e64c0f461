use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use textcodec::compression::{huffman, lz77, lzw};
use textcodec::{Codec, Huffman, Lz77, Lz77Config, Lzw};

const ALPHABETS: [&str; 4] = ["A", "AB", "ABCD", "aé€😀 ,()"];

fn random_text(rng: &mut ChaCha8Rng, alphabet: &[char], max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

fn samples(seed: u64, count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(count * ALPHABETS.len());
    for alphabet in ALPHABETS {
        let symbols: Vec<char> = alphabet.chars().collect();
        for _ in 0..count {
            out.push(random_text(&mut rng, &symbols, 200));
        }
    }
    out
}

#[test]
fn test_empty_input_all_codecs() {
    assert!(Huffman.round_trip("").unwrap());
    assert!(Lz77::default().round_trip("").unwrap());
    assert!(Lzw.round_trip("").unwrap());

    let decoded = Lzw.decompress(&Lzw.compress("").unwrap());
    assert!(decoded.success);
    assert!(decoded.text.is_empty());
}

#[test]
fn test_huffman_random_round_trip() {
    for input in samples(7, 40) {
        let encoded = huffman::huffman_encode(&input).unwrap();
        assert!(encoded.code_table.is_prefix_free(), "input {input:?}");
        assert_eq!(encoded.words.len(), input.chars().count());
        let decoded = Huffman.decompress(&encoded);
        assert!(decoded.success);
        assert_eq!(decoded.text, input);
    }
}

#[test]
fn test_lz77_random_round_trip() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for input in samples(13, 25) {
        let dictionary_length = rng.gen_range(1..=32);
        let buffer_length = rng.gen_range(1..=16);
        let codec = Lz77::new(Lz77Config::new(dictionary_length, buffer_length).unwrap());
        let tokens = codec.compress(&input).unwrap();
        assert!(tokens.iter().all(|t| t.length <= buffer_length));
        let decoded = codec.decompress(&tokens);
        assert!(
            decoded.success,
            "dictionary {dictionary_length}, buffer {buffer_length}"
        );
        assert_eq!(decoded.text, input);

        let text = lz77::format_tokens(&tokens);
        assert_eq!(lz77::parse_tokens(&text).unwrap(), tokens);
    }
}

#[test]
fn test_lzw_random_round_trip() {
    for input in samples(17, 40) {
        let encoded = lzw::compress(&input);
        let symbols = input.chars().count();
        assert!(encoded.dictionary.len() <= encoded.dictionary.seed_len() + symbols);

        let seed_only = lzw::ReverseDictionary::from_seed(input.chars());
        assert_eq!(lzw::decompress(&seed_only, &encoded.codes).unwrap(), input);
    }
}

#[test]
fn test_truncated_streams_fail_without_panicking() {
    let input = "the quick brown fox jumps over the lazy dog";

    let encoded = huffman::huffman_encode(input).unwrap();
    let bits = encoded.bit_string();
    let truncated = &bits[..bits.len() - 1];
    assert!(!huffman::huffman_decode(truncated, &encoded.code_table).success);

    let mut tokens = lz77::compress(input, 16, 8).unwrap();
    if let Some(last) = tokens.last_mut() {
        last.offset = 100;
        last.length = 3;
    }
    assert!(!Lz77::new(Lz77Config::new(16, 8).unwrap())
        .decompress(&tokens)
        .success);

    let mut encoded = lzw::compress(input);
    encoded.codes.push(10_000);
    assert!(!Lzw.decompress(&encoded).success);
}
