//! LC: the canonical, self-delimiting text encoding of values.
//!
//! | kind   | form                                   |
//! |--------|----------------------------------------|
//! | null   | `∅`                                    |
//! | bool   | `⊤` / `⊥`                              |
//! | int    | `ℤ` canonical decimal `;`              |
//! | float  | `ℝ` shortest round-trip text `;`       |
//! | string | `"` text with `\"` and `\\` escaped `"` |
//! | array  | `⟦` elements `⟧`                       |
//! | object | `⟨` (string key, value)* `⟩`           |
//!
//! Object keys are written in sorted order, so equal values always encode
//! to the same text. That text is what fingerprints are computed over.
//!
//! ```
//! use latent_foundation::Value;
//! use latent_space::lc::{decode_lc, encode_lc};
//!
//! let v = Value::array([Value::from("three"), Value::Bool(true), Value::Int(1), Value::Int(2)]);
//! let text = encode_lc(&v);
//! assert_eq!(text, "⟦\"three\"⊤ℤ1;ℤ2;⟧");
//! assert_eq!(decode_lc(&text).unwrap(), v);
//! ```

use std::fmt::Write;
use std::sync::Arc;

use latent_foundation::{Error, LtMap, Result, Value};

/// `null`
pub const NULL: char = '∅';
/// `true`
pub const TRUE: char = '⊤';
/// `false`
pub const FALSE: char = '⊥';
/// Integer marker.
pub const INT: char = 'ℤ';
/// Float marker.
pub const FLOAT: char = 'ℝ';
/// Terminates an integer or float.
pub const NUMBER_END: char = ';';
/// Opens and closes a string.
pub const QUOTE: char = '"';
/// Opens an array.
pub const ARRAY_OPEN: char = '⟦';
/// Closes an array.
pub const ARRAY_CLOSE: char = '⟧';
/// Opens an object.
pub const OBJECT_OPEN: char = '⟨';
/// Closes an object.
pub const OBJECT_CLOSE: char = '⟩';

/// Default nesting limit for [`decode_lc`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

// =============================================================================
// Encoding
// =============================================================================

/// Encodes a value. Total: every value has exactly one encoding.
#[must_use]
pub fn encode_lc(value: &Value) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: &Value, out: &mut String) {
    match value {
        Value::Nil => out.push(NULL),
        Value::Bool(true) => out.push(TRUE),
        Value::Bool(false) => out.push(FALSE),
        Value::Int(n) => {
            out.push(INT);
            let _ = write!(out, "{n}");
            out.push(NUMBER_END);
        }
        Value::Float(f) => {
            out.push(FLOAT);
            // Debug output is the shortest text that parses back to the same
            // bits, and always has a '.', 'e', "inf" or "NaN".
            let _ = write!(out, "{f:?}");
            out.push(NUMBER_END);
        }
        Value::String(s) => encode_string(s, out),
        Value::Vec(items) => {
            out.push(ARRAY_OPEN);
            for item in items {
                encode_into(item, out);
            }
            out.push(ARRAY_CLOSE);
        }
        Value::Map(entries) => {
            out.push(OBJECT_OPEN);
            for (key, item) in entries.iter() {
                encode_string(key, out);
                encode_into(item, out);
            }
            out.push(OBJECT_CLOSE);
        }
    }
}

fn encode_string(s: &str, out: &mut String) {
    out.push(QUOTE);
    for c in s.chars() {
        if c == QUOTE || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(QUOTE);
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a stream with the default nesting limit.
///
/// # Errors
///
/// `E_LC_DECODE` on malformed, truncated, non-canonical or trailing input.
pub fn decode_lc(input: &str) -> Result<Value> {
    LcDecoder::new(input).decode()
}

/// Decodes a stream, rejecting nesting deeper than `max_depth`.
///
/// # Errors
///
/// `E_LC_DECODE` on malformed, truncated, non-canonical or trailing input.
pub fn decode_lc_with_depth(input: &str, max_depth: usize) -> Result<Value> {
    LcDecoder::with_max_depth(input, max_depth).decode()
}

/// Streaming LC decoder over a string.
pub struct LcDecoder<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> LcDecoder<'a> {
    /// Creates a decoder with the default nesting limit.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    /// Creates a decoder with the given nesting limit.
    #[must_use]
    pub fn with_max_depth(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Decodes exactly one value spanning the whole input.
    ///
    /// # Errors
    ///
    /// `E_LC_DECODE` with the byte offset of the problem.
    pub fn decode(mut self) -> Result<Value> {
        let value = self.value()?;
        if self.pos < self.input.len() {
            return Err(Error::decode("trailing input after value", self.pos));
        }
        Ok(value)
    }

    /// Decodes the next value, leaving the cursor after it.
    ///
    /// # Errors
    ///
    /// `E_LC_DECODE` with the byte offset of the problem.
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        if self.pos >= self.input.len() {
            return Ok(None);
        }
        self.value().map(Some)
    }

    /// Current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn value(&mut self) -> Result<Value> {
        let start = self.pos;
        let Some(c) = self.bump() else {
            return Err(Error::decode("unexpected end of stream", start));
        };
        match c {
            NULL => Ok(Value::Nil),
            TRUE => Ok(Value::Bool(true)),
            FALSE => Ok(Value::Bool(false)),
            INT => self.int(),
            FLOAT => self.float(),
            QUOTE => self.string(start).map(Value::String),
            ARRAY_OPEN => {
                self.enter(start)?;
                let mut items = Vec::new();
                while !self.eat(ARRAY_CLOSE) {
                    items.push(self.value()?);
                }
                self.depth -= 1;
                Ok(Value::array(items))
            }
            OBJECT_OPEN => {
                self.enter(start)?;
                let mut entries = LtMap::new();
                let mut previous: Option<Arc<str>> = None;
                while !self.eat(OBJECT_CLOSE) {
                    let key_start = self.pos;
                    if !self.eat(QUOTE) {
                        return Err(self.error_at("expected string key", key_start));
                    }
                    let key = self.string(key_start)?;
                    if previous.as_ref().is_some_and(|prev| key <= *prev) {
                        return Err(Error::decode("object keys not in sorted order", key_start));
                    }
                    let item = self.value()?;
                    entries = entries.insert(key.clone(), item);
                    previous = Some(key);
                }
                self.depth -= 1;
                Ok(Value::Map(entries))
            }
            other => Err(Error::decode(format!("unexpected {other:?}"), start)),
        }
    }

    fn enter(&mut self, start: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::decode(
                format!("nesting deeper than {}", self.max_depth),
                start,
            ));
        }
        Ok(())
    }

    /// Returns the text up to the next `;` and consumes the `;`.
    fn number_text(&mut self) -> Result<(&'a str, usize)> {
        let start = self.pos;
        let rest = &self.input[start..];
        let Some(end) = rest.find(NUMBER_END) else {
            return Err(Error::decode("unterminated number", start));
        };
        self.pos = start + end + NUMBER_END.len_utf8();
        Ok((&rest[..end], start))
    }

    fn int(&mut self) -> Result<Value> {
        let (text, start) = self.number_text()?;
        if !is_canonical_int(text) {
            return Err(Error::decode(format!("non-canonical integer {text:?}"), start));
        }
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| Error::decode(format!("integer {text} out of range"), start))
    }

    fn float(&mut self) -> Result<Value> {
        let (text, start) = self.number_text()?;
        match text.parse::<f64>() {
            Ok(f) if is_canonical_float(text, f) => Ok(Value::Float(f)),
            _ => Err(Error::decode(format!("malformed float {text:?}"), start)),
        }
    }

    /// Reads a string body; the opening quote is already consumed.
    fn string(&mut self, start: usize) -> Result<Arc<str>> {
        let mut out = String::new();
        loop {
            let at = self.pos;
            match self.bump() {
                None => return Err(Error::decode("unterminated string", start)),
                Some(QUOTE) => return Ok(Arc::from(out)),
                Some('\\') => match self.bump() {
                    Some(c @ (QUOTE | '\\')) => out.push(c),
                    Some(_) => return Err(Error::decode("invalid escape", at)),
                    None => return Err(Error::decode("unterminated string", start)),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        let found = self.peek() == Some(expected);
        if found {
            self.pos += expected.len_utf8();
        }
        found
    }

    fn error_at(&self, message: &str, offset: usize) -> Error {
        if self.pos >= self.input.len() {
            Error::decode("unexpected end of stream", offset)
        } else {
            Error::decode(message, offset)
        }
    }
}

/// `0`, or an optional `-` then digits without a leading zero; never `-0`.
fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
        && text != "-0"
}

/// The text the encoder would write for `f`.
fn is_canonical_float(text: &str, f: f64) -> bool {
    format!("{f:?}") == text
}
