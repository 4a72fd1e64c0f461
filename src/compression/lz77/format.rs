//! Textual form of an LZ77 token list: `(0, 0, A), (1, 2, B), EOF`.

use std::fmt;

use super::Token;
use crate::error::{Error, Result};

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, ", self.offset, self.length)?;
        if let Some(ch) = self.next {
            write!(f, "{ch}")?;
        }
        f.write_str(")")
    }
}

/// Render tokens separated by `", "` and terminated by `EOF`.
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.to_string());
        out.push_str(", ");
    }
    out.push_str("EOF");
    out
}

/// Parse a token list produced by [`format_tokens`].
///
/// Anything between tokens is ignored, as is anything inside a number field
/// that is not a digit, `,` or `)`. The literal is the character after the
/// second comma (one separating space is skipped). An empty literal field,
/// `(3, 2, )`, is a token without literal; `(3, 2, ))` has literal `)`.
///
/// # Example
///
/// ```
/// use textcodec::compression::lz77::{parse_tokens, Token};
///
/// let tokens = parse_tokens("(0, 0, A), (1, 1, B), EOF").unwrap();
/// assert_eq!(tokens[0], Token::literal('A'));
/// assert_eq!(tokens[1].offset, 1);
/// ```
pub fn parse_tokens(text: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = TokenParser {
        chars: &chars,
        pos: 0,
    };
    let mut tokens = Vec::new();
    while parser.seek_open() {
        tokens.push(parser.token()?);
    }
    Ok(tokens)
}

struct TokenParser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl TokenParser<'_> {
    fn malformed(&self, reason: &'static str) -> Error {
        Error::MalformedToken {
            position: self.pos,
            reason,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Skip to just past the next `(`. False when none is left.
    fn seek_open(&mut self) -> bool {
        while let Some(ch) = self.bump() {
            if ch == '(' {
                return true;
            }
        }
        false
    }

    fn token(&mut self) -> Result<Token> {
        let offset = self.number()?;
        let length = self.number()?;
        let next = self.literal()?;
        Ok(Token {
            offset,
            length,
            next,
        })
    }

    /// Digits up to and including the closing comma.
    fn number(&mut self) -> Result<usize> {
        let mut value: Option<usize> = None;
        loop {
            let ch = self.bump().ok_or_else(|| self.malformed("unterminated token"))?;
            match ch {
                '0'..='9' => {
                    let digit = ch as usize - '0' as usize;
                    let next = value
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or_else(|| self.malformed("number too large"))?;
                    value = Some(next);
                }
                ',' => return value.ok_or_else(|| self.malformed("missing number")),
                '(' | ')' => return Err(self.malformed("missing field")),
                _ => {}
            }
        }
    }

    fn literal(&mut self) -> Result<Option<char>> {
        if self.peek() == Some(' ') {
            self.pos += 1;
        }
        let ch = self.bump().ok_or_else(|| self.malformed("unterminated token"))?;
        if ch == ')' && self.peek() != Some(')') {
            return Ok(None);
        }
        match self.bump() {
            Some(')') => Ok(Some(ch)),
            _ => Err(self.malformed("expected ')' after literal")),
        }
    }
}
