pub mod compression;
pub mod error;

pub use compression::{huffman, lz77, lzw, Codec, Decompressed, Huffman, Lz77, Lz77Config, Lzw};
pub use error::{Error, Result};
