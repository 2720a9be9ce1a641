//! Lexer for the surface language.
//!
//! The lexer is permissive: it never fails. Whitespace and comments are
//! elided, characters it does not recognize are dropped, and an unterminated
//! string or comment simply runs to the end of input.

use crate::config::CompilerConfig;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Reserved words. Anything else that is not privileged lexes as an identifier.
pub const RESERVED_WORDS: &[&str] = &[
    "program", "block", "let", "local", "if", "else", "while", "for", "in", "return", "assert",
    "latent", "table", "value", "snapshot", "match", "guard", "batch", "resolve", "scope",
    "using", "collapse", "true", "false", "null", "new",
];

/// Operators, longest first so matching is greedy.
const OPERATORS: &[&str] = &[
    "!~=", "|>", "||", "&&", "==", "!=", "~=", "<=", ">=", "<", ">", "+", "-", "*", "/", "!",
    "=",
];

const SYMBOLS: &[char] = &['(', ')', '{', '}', '[', ']', ',', ';', ':', '.', '@'];

/// Lexer for surface source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Prefixes that promote an identifier to a keyword.
    prefixes: Vec<String>,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer with the default configuration.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::with_config(source, &CompilerConfig::default())
    }

    /// Creates a new lexer using the privileged prefixes from `config`.
    #[must_use]
    pub fn with_config(source: &'src str, config: &CompilerConfig) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            prefixes: config.privileged_prefixes.clone(),
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let start = self.position;
            let start_line = self.line;
            let start_column = self.column;

            let Some(c) = self.peek_char() else {
                return Token::new(
                    TokenKind::Eof,
                    "",
                    Span::point(start, start_line, start_column),
                );
            };

            let scanned = match c {
                '"' => Some(self.scan_string()),
                '{' if self.at_blob_start() => Some(self.scan_blob()),
                c if c.is_ascii_digit() => Some(self.scan_number()),
                c if c.is_ascii_alphabetic() || c == '_' => Some(self.scan_word()),
                c if SYMBOLS.contains(&c) => {
                    self.advance();
                    Some((TokenKind::Symbol, c.to_string()))
                }
                _ => self.scan_operator(),
            };

            match scanned {
                Some((kind, text)) => {
                    let span = Span::new(start, self.position, start_line, start_column);
                    return Token::new(kind, text, span);
                }
                None => {
                    // Unrecognized character: drop it and keep going.
                    self.advance();
                }
            }
        }
    }

    /// Tokenizes all source and returns a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        Lexer::new(source).collect_all()
    }

    /// Drains this lexer into a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn collect_all(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Skips whitespace, `//` comments, and `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek_char(), self.peek_char_n(1)) {
                (Some(c), _) if c.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    while !self.rest.is_empty() && !self.rest.starts_with("*/") {
                        self.advance();
                    }
                    // Consume the closing "*/" if present.
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Scans a string literal, keeping escapes verbatim.
    fn scan_string(&mut self) -> (TokenKind, String) {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    text.push(c);
                    self.advance();
                    if let Some(escaped) = self.peek_char() {
                        text.push(escaped);
                        self.advance();
                    }
                }
                c => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        (TokenKind::Str, text)
    }

    /// Returns true at `{` immediately followed by digits then `:`.
    fn at_blob_start(&self) -> bool {
        let mut chars = self.rest.chars().skip(1).peekable();
        let mut digits = 0;
        while chars.peek().is_some_and(char::is_ascii_digit) {
            chars.next();
            digits += 1;
        }
        digits > 0 && chars.peek() == Some(&':')
    }

    /// Consumes a brace-balanced run as one opaque blob.
    ///
    /// Braces inside quoted strings do not count.
    fn scan_blob(&mut self) -> (TokenKind, String) {
        let start = self.position;
        let mut depth = 0usize;
        let mut in_string = false;
        while let Some(c) = self.peek_char() {
            self.advance();
            if in_string {
                match c {
                    '\\' => self.advance(),
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        (TokenKind::Blob, self.source[start..self.position].to_string())
    }

    /// Scans a number. A `.` followed by a digit makes it a float.
    fn scan_number(&mut self) -> (TokenKind, String) {
        let start = self.position;
        let mut has_dot = false;

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.'
                && !has_dot
                && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let kind = if has_dot {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        (kind, self.source[start..self.position].to_string())
    }

    /// Scans an identifier or keyword.
    fn scan_word(&mut self) -> (TokenKind, String) {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.position];

        let kind = if RESERVED_WORDS.contains(&word)
            || self.prefixes.iter().any(|p| word.starts_with(p.as_str()))
        {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        (kind, word.to_string())
    }

    /// Scans the longest operator at the cursor.
    fn scan_operator(&mut self) -> Option<(TokenKind, String)> {
        let op = OPERATORS.iter().find(|op| self.rest.starts_with(**op))?;
        for _ in 0..op.chars().count() {
            self.advance();
        }
        Some((TokenKind::Op, (*op).to_string()))
    }
}

/// Tokenizes `source` with the default configuration.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::tokenize_all(source)
}
