// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Converts SQL source text into a flat token stream.
//!
//! Structurally this is a thin driver that slices tokens out of the
//! source and tags them with a range, but the
//! matching itself can't be a `logos`-derived compile-time DFA: which
//! words are keywords, which characters delimit identifiers, and which
//! prefixes introduce typed string literals are all per-dialect *runtime*
//! knobs, so we hand-roll the scan and build the longest-match trie once
//! per [`Tokenizer`] construction from the active [`TokenizerSettings`].

mod settings;
mod token;
mod trie;

pub use settings::TokenizerSettings;
pub use token::{Token, TokenKind};
pub use trie::Lexeme;

use text_size::{TextRange, TextSize};
use trie::Trie;

use crate::error::{Diagnostic, TokenError};

/// Tokenizes `source` under `settings`.
pub struct Tokenizer<'a> {
    settings: &'a TokenizerSettings,
    trie: Trie,
    source: &'a str,
    chars: Vec<char>,
    /// `byte_offsets[i]` is the byte offset of `chars[i]`;
    /// `byte_offsets[chars.len()]` is `source.len()`.
    byte_offsets: Vec<u32>,
    pos: usize,
    line: usize,
    col: usize,
    pending_comments: Vec<String>,
    tokens: Vec<Token>,
    /// True when the next keyword, if a command keyword, should trigger
    /// command mode (we're at the start of a statement).
    at_statement_boundary: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, settings: &'a TokenizerSettings) -> Self {
        let mut chars = Vec::with_capacity(source.len());
        let mut byte_offsets = Vec::with_capacity(source.len() + 1);
        for (byte, c) in source.char_indices() {
            chars.push(c);
            byte_offsets.push(byte as u32);
        }
        byte_offsets.push(source.len() as u32);

        Self {
            settings,
            trie: settings.build_trie(),
            source,
            chars,
            byte_offsets,
            pos: 0,
            line: 1,
            col: 1,
            pending_comments: Vec::new(),
            tokens: Vec::new(),
            at_statement_boundary: true,
        }
    }

    /// Tokens produced so far; inspectable even after a `TokenError`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenError> {
        while !self.at_eof() {
            self.skip_whitespace();
            if self.at_eof() {
                break;
            }

            let was_boundary = self.at_statement_boundary;
            let start = self.checkpoint();
            let c = self.chars[self.pos];

            let kind = if c.is_ascii_digit() {
                self.scan_number(start)?
            } else if let Some(&(open, _)) = self.settings.identifiers.iter().find(|(o, _)| *o == c) {
                self.scan_delimited_identifier(open, start)?
            } else if let Some((len, lexeme)) = self.trie.longest_match(&self.chars, self.pos) {
                let lexeme = lexeme.clone();
                self.apply_lexeme(lexeme, len, start)?
            } else {
                self.scan_variable(start)?
            };

            if let Some(kind) = kind {
                if was_boundary && kind.is_command() {
                    self.enter_command_mode()?;
                }
                self.at_statement_boundary = matches!(kind, TokenKind::Semicolon | TokenKind::Begin);
            }
        }

        if !self.pending_comments.is_empty() {
            if let Some(last) = self.tokens.last_mut() {
                last.comments.append(&mut self.pending_comments);
            }
        }

        let eof_range = TextRange::new(self.byte_at(self.pos), self.byte_at(self.pos));
        self.tokens.push(Token::eof(eof_range, self.line, self.col));

        Ok(self.tokens)
    }

    // -- low-level cursor helpers -------------------------------------

    fn at_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn byte_at(&self, pos: usize) -> TextSize {
        TextSize::from(self.byte_offsets[pos.min(self.byte_offsets.len() - 1)])
    }

    /// A cursor snapshot to compute a token's range/line/col from.
    fn checkpoint(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.col)
    }

    fn restore(&mut self, cp: (usize, usize, usize)) {
        self.pos = cp.0;
        self.line = cp.1;
        self.col = cp.2;
    }

    /// Advances one char, tracking line/column; `\r\n` counts as a single
    /// newline.
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        match c {
            '\r' if self.chars.get(self.pos) == Some(&'\n') => {}
            '\n' => {
                self.line += 1;
                self.col = 1;
            }
            _ => self.col += 1,
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    // -- token emission -------------------------------------------------

    fn push_token(&mut self, kind: TokenKind, text: String, start: (usize, usize, usize)) -> TokenKind {
        let range = TextRange::new(self.byte_at(start.0), self.byte_at(self.pos));
        self.push_token_at(kind, text, range, start.1, start.2);
        kind
    }

    fn push_token_at(&mut self, kind: TokenKind, text: String, range: TextRange, line: usize, col: usize) {
        if kind == TokenKind::Semicolon && !self.pending_comments.is_empty() {
            if let Some(prev) = self.tokens.last_mut() {
                prev.comments.append(&mut self.pending_comments);
            } else {
                self.pending_comments.clear();
            }
        }
        let comments = std::mem::take(&mut self.pending_comments);
        self.tokens.push(Token { kind, text, line, column: col, range, comments });
    }

    fn error(&self, description: impl Into<String>, start: (usize, usize, usize)) -> TokenError {
        let at = self.byte_at(start.0);
        let len = usize::from(self.byte_at(self.pos)) - usize::from(at);
        TokenError(Diagnostic::new(description, self.source, at, len.max(1)))
    }

    // -- scanning branches ------------------------------------------------

    fn apply_lexeme(
        &mut self,
        lexeme: Lexeme,
        len: usize,
        start: (usize, usize, usize),
    ) -> Result<Option<TokenKind>, TokenError> {
        for _ in 0..len {
            self.bump();
        }

        match lexeme {
            Lexeme::Token(kind) => {
                let text = self.slice(usize::from(self.byte_at(start.0)), usize::from(self.byte_at(self.pos))).to_string();
                Ok(Some(self.push_token(kind, text, start)))
            }
            Lexeme::LineComment => {
                let body_start = self.pos;
                while !matches!(self.peek(), None | Some('\n')) {
                    self.bump();
                }
                let body = self.chars[body_start..self.pos].iter().collect();
                self.pending_comments.push(body);
                Ok(None)
            }
            Lexeme::BlockComment { end } => {
                let body = self.consume_to_delimiter(end, self.settings.nested_comments, start)?;
                self.pending_comments.push(body);
                Ok(None)
            }
            Lexeme::Quote { end, kind } => {
                let raw = matches!(kind, TokenKind::RawString);
                let body = self.consume_quoted_body(end, raw, start)?;
                Ok(Some(self.push_token(kind, body, start)))
            }
        }
    }

    /// Consumes chars up to (and including) `end`, optionally honoring
    /// nested comment delimiters (`nested_comments`).
    fn consume_to_delimiter(&mut self, end: &str, nested: bool, start: (usize, usize, usize)) -> Result<String, TokenError> {
        let end_chars: Vec<char> = end.chars().collect();
        let body_start = self.pos;
        let mut depth = 1usize;

        loop {
            if self.at_eof() {
                return Err(self.error("unterminated comment", start));
            }
            if self.matches_here(&end_chars) {
                for _ in 0..end_chars.len() {
                    self.bump();
                }
                depth -= 1;
                if depth == 0 {
                    let body_end = self.pos - end_chars.len();
                    return Ok(self.chars[body_start..body_end].iter().collect());
                }
                continue;
            }
            if nested && self.matches_here(&['/', '*']) {
                for _ in 0..2 {
                    self.bump();
                }
                depth += 1;
                continue;
            }
            self.bump();
        }
    }

    fn matches_here(&self, pat: &[char]) -> bool {
        pat.iter().enumerate().all(|(i, c)| self.peek_at(i) == Some(*c))
    }

    /// Consumes a quoted/delimited body, honoring `string_escapes` and a
    /// doubled-delimiter escape (`''` inside `'...'`). Raw strings skip
    /// un-escaping.
    fn consume_quoted_body(&mut self, end: &str, raw: bool, start: (usize, usize, usize)) -> Result<String, TokenError> {
        let end_chars: Vec<char> = end.chars().collect();
        let mut body = String::new();

        loop {
            if self.at_eof() {
                return Err(self.error("unterminated string", start));
            }
            if self.matches_here(&end_chars) {
                // A doubled end delimiter (`''`) is a literal escaped char.
                if end_chars.len() == 1 && self.peek_at(1) == Some(end_chars[0]) {
                    self.bump();
                    self.bump();
                    body.push(end_chars[0]);
                    continue;
                }
                for _ in 0..end_chars.len() {
                    self.bump();
                }
                return Ok(body);
            }
            if !raw {
                if let Some(escape) = self.peek().filter(|c| self.settings.string_escapes.contains(c)) {
                    if let Some(next) = self.peek_at(1) {
                        self.bump();
                        self.bump();
                        body.push(*self.settings.unescaped_sequences.get(&next).unwrap_or(&next));
                        continue;
                    }
                    let _ = escape;
                }
            }
            body.push(self.bump().unwrap());
        }
    }

    fn scan_delimited_identifier(&mut self, open: char, start: (usize, usize, usize)) -> Result<Option<TokenKind>, TokenError> {
        let close = self
            .settings
            .identifiers
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, c)| *c)
            .unwrap_or(open);
        self.bump();
        let body_start = self.pos;
        loop {
            if self.at_eof() {
                return Err(self.error("unterminated identifier", start));
            }
            if self.peek() == Some(close) {
                if self.peek_at(1) == Some(close) {
                    // doubled-close escape, e.g. `""` inside `"..."`.
                    self.bump();
                    self.bump();
                    continue;
                }
                let body: String = self.chars[body_start..self.pos].iter().collect();
                self.bump();
                return Ok(Some(self.push_token(TokenKind::Identifier, unescape_doubled(&body, close), start)));
            }
            self.bump();
        }
    }

    /// Scans a numeric literal: optional `0b`/`0x` prefix, digits, optional
    /// fractional part and exponent, then an optional trailing alphabetic
    /// suffix (a typed-literal marker like `1 BIT` or `'abc' :: TEXT`
    /// shorthand).
    fn scan_number(&mut self, start: (usize, usize, usize)) -> Result<Option<TokenKind>, TokenError> {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('b') | Some('B')) && self.settings.bit_number_prefix {
            self.bump();
            self.bump();
            if !matches!(self.peek(), Some('0') | Some('1')) {
                return Err(self.error("invalid binary literal", start));
            }
            while matches!(self.peek(), Some('0') | Some('1')) {
                self.bump();
            }
        } else if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) && self.settings.hex_number_prefix {
            self.bump();
            self.bump();
            if !matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                return Err(self.error("invalid hex literal", start));
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.bump();
            }
        } else {
            self.consume_digits();
            if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
                self.bump();
                self.consume_digits();
            }
            if matches!(self.peek(), Some('e') | Some('E')) {
                let save = self.checkpoint();
                self.bump();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.bump();
                }
                if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.consume_digits();
                } else {
                    self.restore(save);
                }
            }
        }

        let numeric_end = self.checkpoint();
        let suffix_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.bump();
        }

        if self.pos > suffix_start {
            let suffix: String = self.chars[suffix_start..self.pos].iter().collect();
            if let Some(&kind) = self.settings.numeric_literals.get(&suffix.to_ascii_uppercase()) {
                let number_text = self.slice(usize::from(self.byte_at(start.0)), usize::from(self.byte_at(numeric_end.0))).to_string();
                self.push_token_at(
                    TokenKind::Number,
                    number_text,
                    TextRange::new(self.byte_at(start.0), self.byte_at(numeric_end.0)),
                    start.1,
                    start.2,
                );
                let zero_width = TextRange::new(self.byte_at(numeric_end.0), self.byte_at(numeric_end.0));
                self.push_token_at(TokenKind::DColon, "::".to_string(), zero_width, numeric_end.1, numeric_end.2);
                return Ok(Some(self.push_token(kind, suffix, numeric_end)));
            }
            if !self.settings.identifiers_can_start_with_digit {
                self.restore(numeric_end);
            }
        }

        let text = self.slice(usize::from(self.byte_at(start.0)), usize::from(self.byte_at(self.pos))).to_string();
        let kind = if self.pos > numeric_end.0 { TokenKind::Var } else { TokenKind::Number };
        Ok(Some(self.push_token(kind, text, start)))
    }

    fn consume_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit())
            || (self.settings.numbers_can_be_underscore_separated
                && self.peek() == Some('_')
                && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()))
        {
            self.bump();
        }
    }

    fn scan_variable(&mut self, start: (usize, usize, usize)) -> Result<Option<TokenKind>, TokenError> {
        if self.at_eof() {
            return Ok(None);
        }
        let body_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
            self.bump();
        }
        if self.pos == body_start {
            // A single unrecognized character; consume it so we make
            // progress and report it as an error token.
            self.bump();
            let text = self.slice(usize::from(self.byte_at(start.0)), usize::from(self.byte_at(self.pos))).to_string();
            return Err(self.error(format!("unexpected character '{text}'"), start));
        }
        let text: String = self.chars[body_start..self.pos].iter().collect();
        let kind = self
            .settings
            .keywords
            .get(&text.to_ascii_uppercase())
            .copied()
            .unwrap_or(TokenKind::Var);
        Ok(Some(self.push_token(kind, text, start)))
    }

    /// Consumes the rest of the statement as a single opaque STRING token
    /// (used for dialect pass-through commands like `SHOW ...`).
    fn enter_command_mode(&mut self) -> Result<(), TokenError> {
        let idx = self.tokens.len() - 1;
        let start_byte = self.tokens[idx].range.start();
        let line = self.tokens[idx].line;
        let col = self.tokens[idx].column;
        let comments = std::mem::take(&mut self.tokens[idx].comments);

        while !self.at_eof() && self.peek() != Some(';') {
            self.bump();
        }

        let end_byte = self.byte_at(self.pos);
        let text = self.source[usize::from(start_byte)..usize::from(end_byte)].trim_end().to_string();
        self.tokens.truncate(idx);
        self.push_token_at(TokenKind::Str, text, TextRange::new(start_byte, end_byte), line, col);
        self.tokens[idx].comments = comments;
        Ok(())
    }
}

/// Un-doubles an escaped close delimiter (`""` -> `"`) inside a delimited
/// identifier body.
fn unescape_doubled(body: &str, close: char) -> String {
    let doubled: String = [close, close].iter().collect();
    if body.contains(close) {
        body.replace(&doubled, &close.to_string())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::generic::generic_tokenizer_settings;

    fn tokens(input: &str) -> Vec<Token> {
        let settings = generic_tokenizer_settings();
        Tokenizer::new(input, &settings).tokenize().unwrap()
    }

    #[test]
    fn lex_ident() {
        let toks = tokens("hello");
        assert_eq!(toks[0].kind, TokenKind::Var);
        assert_eq!(toks[0].text, "hello");
    }

    #[test]
    fn lex_quoted_ident() {
        let toks = tokens("\"Foo Bar\"");
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].text, "Foo Bar");
    }

    #[test]
    fn lex_doubled_quote_escape() {
        let toks = tokens("'it''s'");
        assert_eq!(toks[0].kind, TokenKind::Str);
        assert_eq!(toks[0].text, "it's");
    }

    #[test]
    fn comment_attachment() {
        let toks = tokens("SELECT /*c1*/ 1 -- trailing");
        assert!(toks[0].comments.is_empty());
        assert_eq!(toks[1].comments, vec!["c1".to_string(), " trailing".to_string()]);
    }

    #[test]
    fn semicolon_steals_trailing_comment() {
        let toks = tokens("SELECT 1; -- done");
        let semi = toks.iter().find(|t| t.kind == TokenKind::Semicolon).unwrap();
        assert!(semi.comments.is_empty());
        let one = toks.iter().find(|t| t.text == "1").unwrap();
        assert_eq!(one.comments, vec![" done".to_string()]);
    }
}
