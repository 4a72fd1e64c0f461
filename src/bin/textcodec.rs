//! Command line front end: compress a string, print the tables and the
//! encoded form, decompress it again and report whether that succeeded.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use textcodec::compression::{format_tokens, Codec, Huffman, Lz77, Lz77Config, Lzw};

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Huffman, LZ77 and LZW text compression",
    long_about = "
    Compresses a string with the chosen codec, prints the code tables, tokens or
    dictionary together with the encoded output, then decompresses the result.

    Without TEXT, lines are read from standard input until an empty line."
)]
struct Args {
    #[clap(subcommand)]
    codec: CodecArgs,

    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', global = true, default_value_t = 2)]
    v: u8,
}

#[derive(Subcommand, Debug)]
enum CodecArgs {
    /// Huffman coding
    Huffman {
        /// Text to compress
        text: Option<String>,
    },
    /// LZ77 sliding window coding
    Lz77 {
        /// Text to compress
        text: Option<String>,

        /// Maximum dictionary (window) length
        #[clap(long = "dict-len", default_value_t = Lz77Config::DEFAULT_DICTIONARY_LENGTH)]
        dict_len: usize,

        /// Maximum match length
        #[clap(long = "buffer-len", default_value_t = Lz77Config::DEFAULT_BUFFER_LENGTH)]
        buffer_len: usize,
    },
    /// LZW adaptive dictionary coding
    Lzw {
        /// Text to compress
        text: Option<String>,
    },
}

impl CodecArgs {
    fn text(&self) -> Option<&str> {
        match self {
            CodecArgs::Huffman { text } | CodecArgs::Lzw { text } => text.as_deref(),
            CodecArgs::Lz77 { text, .. } => text.as_deref(),
        }
    }
}

fn level_filter(v: u8) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn show_huffman(text: &str) -> textcodec::Result<bool> {
    let encoded = Huffman.compress(text)?;
    let decoded = Huffman.decompress(&encoded);
    print_decoded(&decoded.text, decoded.success);

    println!("\nCharacters (ascending frequency), counts, and codes:");
    for entry in &encoded.frequencies {
        let code = encoded.code_table.get(entry.symbol).unwrap_or_default();
        println!("{}, {}, {}", entry.symbol, entry.count, code);
    }
    println!("\nEncoded output:\n{}", encoded.format_words());

    let packed = encoded.packed();
    println!(
        "\nPacked: {} ({} bits)",
        hex::encode(packed.as_raw_slice()),
        packed.len()
    );
    Ok(decoded.success)
}

fn show_lz77(text: &str, config: Lz77Config) -> textcodec::Result<bool> {
    let codec = Lz77::new(config);
    let tokens = codec.compress(text)?;
    let decoded = codec.decompress(&tokens);
    print_decoded(&decoded.text, decoded.success);
    println!("\nTokens after compression:\n{}", format_tokens(&tokens));
    Ok(decoded.success)
}

fn show_lzw(text: &str) -> textcodec::Result<bool> {
    let encoded = Lzw.compress(text)?;
    println!("\nDictionary:");
    for (code, pattern) in encoded.dictionary.iter() {
        println!("{code}: {pattern}");
    }
    println!("\nEncoded string:\n{}", encoded.format_codes());
    let decoded = Lzw.decompress(&encoded);
    print_decoded(&decoded.text, decoded.success);
    Ok(decoded.success)
}

fn print_decoded(text: &str, success: bool) {
    if success {
        println!("\nSequence before compression:\n{text}");
    } else {
        println!("\nDecompression failed\n");
    }
}

fn run(codec: &CodecArgs, text: &str) -> textcodec::Result<bool> {
    info!("compressing {} symbols", text.chars().count());
    match codec {
        CodecArgs::Huffman { .. } => show_huffman(text),
        CodecArgs::Lz77 {
            dict_len,
            buffer_len,
            ..
        } => show_lz77(text, Lz77Config::new(*dict_len, *buffer_len)?),
        CodecArgs::Lzw { .. } => show_lzw(text),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = TermLogger::init(
        level_filter(args.v),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("logger unavailable: {err}");
    }

    let handle = |text: &str| match run(&args.codec, text) {
        Ok(ok) => ok,
        Err(err) => {
            error!("{err}");
            false
        }
    };

    let mut all_ok = true;
    if let Some(text) = args.codec.text() {
        all_ok = handle(text);
    } else {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("\nEnter string to compress (or press Enter to exit): ");
            // A failed flush only loses the prompt.
            let _ = io::stdout().flush();
            match lines.next() {
                Some(Ok(line)) if !line.trim().is_empty() => all_ok &= handle(&line),
                Some(Err(err)) => {
                    error!("reading input: {err}");
                    all_ok = false;
                    break;
                }
                _ => break,
            }
        }
    }

    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
