// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Per-dialect tokenizer configuration.
//!
//! A [`Dialect`](crate::dialect::Dialect) builds one of these and hands it
//! to [`crate::lexer::Tokenizer`]; everything that varies between vendors
//! (quoting style, comment markers, which bare words are keywords) lives
//! here rather than on the token type itself.

use std::collections::HashMap;

use super::token::TokenKind;
use super::trie::{Lexeme, Trie};

#[derive(Debug, Clone)]
pub struct TokenizerSettings {
    /// Identifier delimiter pairs, e.g. `('"', '"')`, `('`', '`')`, `('[', ']')`.
    pub identifiers: Vec<(char, char)>,
    /// String delimiter pairs, e.g. `('\'', '\'')`.
    pub quotes: Vec<(char, char)>,
    /// Chars that introduce an escape sequence inside a string body.
    pub string_escapes: Vec<char>,
    /// Escaped-char -> literal-char substitutions recognized after an
    /// escape char (e.g. `n` -> `\n`). Characters absent from this map
    /// pass through the escape unchanged (so `\'` -> `'`, `\\` -> `\`).
    pub unescaped_sequences: HashMap<char, char>,
    /// Case-insensitive prefixes that introduce a bit-string literal,
    /// e.g. `"b"` in `b'0101'`.
    pub bit_string_prefixes: Vec<&'static str>,
    /// Case-insensitive prefixes that introduce a hex-string literal,
    /// e.g. `"x"` in `x'1A'`.
    pub hex_string_prefixes: Vec<&'static str>,
    /// Case-insensitive prefixes that introduce a raw (no-escape) string,
    /// e.g. `"r"` in `r'\d+'`.
    pub raw_string_prefixes: Vec<&'static str>,
    /// Case-insensitive prefixes that introduce a national-charset string,
    /// e.g. `"n"` in `n'abc'`.
    pub national_string_prefixes: Vec<&'static str>,
    /// Line comment markers, e.g. `"--"`, `"#"`.
    pub line_comments: Vec<&'static str>,
    /// Block comment delimiter pair, e.g. `("/*", "*/")`.
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Whether `/* ... /* ... */ ... */` nests rather than closing on the
    /// first `*/`.
    pub nested_comments: bool,
    /// Uppercase keyword text -> token kind.
    pub keywords: HashMap<String, TokenKind>,
    /// Multi-character operators that aren't otherwise derivable from
    /// `single_tokens`, e.g. `"<="`, `"::"`, `"||"`.
    pub operators: Vec<(&'static str, TokenKind)>,
    /// Single-character punctuation/operator tokens.
    pub single_tokens: Vec<(char, TokenKind)>,
    /// Whether `0b`/`0x` numeric prefixes are recognized.
    pub bit_number_prefix: bool,
    pub hex_number_prefix: bool,
    /// Uppercase suffix -> type keyword, for typed numeric literals like
    /// `1 BIT`, emitted as `NUMBER :: <keyword>`.
    pub numeric_literals: HashMap<String, TokenKind>,
    pub numbers_can_be_underscore_separated: bool,
    pub identifiers_can_start_with_digit: bool,
}

impl TokenizerSettings {
    /// Builds the longest-match trie for this configuration: quotes,
    /// typed-string prefixes, comment markers, and all punctuation.
    pub fn build_trie(&self) -> Trie {
        tracing::trace!(
            quotes = self.quotes.len(),
            operators = self.operators.len(),
            keywords = self.keywords.len(),
            "building tokenizer trie"
        );
        let mut trie = Trie::new();

        for (open, close) in &self.quotes {
            let end: &'static str = Box::leak(close.to_string().into_boxed_str());
            trie.insert(&open.to_string(), Lexeme::Quote { end, kind: TokenKind::Str });
        }
        for prefix in &self.bit_string_prefixes {
            self.insert_typed_prefix(&mut trie, prefix, TokenKind::BitString);
        }
        for prefix in &self.hex_string_prefixes {
            self.insert_typed_prefix(&mut trie, prefix, TokenKind::HexString);
        }
        for prefix in &self.raw_string_prefixes {
            self.insert_typed_prefix(&mut trie, prefix, TokenKind::RawString);
        }
        for prefix in &self.national_string_prefixes {
            self.insert_typed_prefix(&mut trie, prefix, TokenKind::NationalString);
        }
        if let Some((start, end)) = self.block_comment {
            trie.insert(start, Lexeme::BlockComment { end });
        }
        for marker in &self.line_comments {
            trie.insert(marker, Lexeme::LineComment);
        }
        for (op, kind) in &self.operators {
            trie.insert(op, Lexeme::Token(*kind));
        }
        for (c, kind) in &self.single_tokens {
            trie.insert(&c.to_string(), Lexeme::Token(*kind));
        }

        trie
    }

    fn insert_typed_prefix(&self, trie: &mut Trie, prefix: &str, kind: TokenKind) {
        for (open, close) in &self.quotes {
            let key = format!("{prefix}{open}");
            let end: &'static str = Box::leak(close.to_string().into_boxed_str());
            trie.insert(&key, Lexeme::Quote { end, kind });
            trie.insert(&key.to_ascii_uppercase(), Lexeme::Quote { end, kind });
        }
    }
}

impl Default for TokenizerSettings {
    /// The ANSI baseline: single-quoted strings, double-quoted
    /// identifiers, `--`/`/* */` comments, standard operator set. Dialects
    /// start from this and override only what differs.
    fn default() -> Self {
        use TokenKind::*;

        let keywords: HashMap<String, TokenKind> = [
            ("SELECT", Select), ("FROM", From), ("WHERE", Where), ("GROUP", Group),
            ("BY", By), ("HAVING", Having), ("ORDER", Order), ("LIMIT", Limit),
            ("OFFSET", Offset), ("WITH", With), ("RECURSIVE", Recursive), ("AS", As),
            ("ASC", Asc), ("DESC", Desc), ("NULLS", Nulls), ("FIRST", First), ("LAST", Last),
            ("JOIN", Join), ("INNER", Inner), ("LEFT", Left), ("RIGHT", Right), ("FULL", Full),
            ("OUTER", Outer), ("CROSS", Cross), ("NATURAL", Natural), ("SEMI", Semi),
            ("ANTI", Anti), ("ON", On), ("USING", Using),
            ("UNION", Union), ("INTERSECT", Intersect), ("EXCEPT", Except), ("ALL", All),
            ("DISTINCT", Distinct),
            ("CASE", Case), ("WHEN", When), ("THEN", Then), ("ELSE", Else), ("END", End), ("IF", If),
            ("NULL", Null), ("TRUE", True), ("FALSE", False), ("NOT", Not), ("AND", And),
            ("OR", Or), ("IS", Is), ("IN", In), ("BETWEEN", Between), ("LIKE", Like),
            ("ILIKE", Ilike), ("EXISTS", Exists),
            ("CAST", Cast), ("TRY_CAST", TryCast), ("EXTRACT", Extract), ("INTERVAL", Interval),
            ("OVER", Over), ("PARTITION", Partition), ("WINDOW", Window), ("ROWS", Rows),
            ("RANGE", Range), ("UNBOUNDED", Unbounded), ("PRECEDING", Preceding),
            ("FOLLOWING", Following), ("CURRENT", Current), ("ROW", Row), ("QUALIFY", Qualify),
            ("COUNT", Count), ("SUM", Sum), ("AVG", Avg), ("MIN", Min), ("MAX", Max),
            ("COALESCE", Coalesce), ("ANY", Any), ("SOME", Some),
            ("INT", Int), ("INTEGER", Integer), ("SMALLINT", SmallInt), ("BIGINT", BigInt),
            ("TINYINT", TinyInt), ("FLOAT", Float), ("DOUBLE", Double), ("PRECISION", Precision),
            ("DECIMAL", Decimal), ("NUMERIC", Numeric), ("REAL", Real), ("VARCHAR", Varchar),
            ("CHAR", Char), ("TEXT", Text), ("STRING", String_), ("BOOLEAN", Boolean),
            ("BOOL", Bool), ("DATE", Date), ("TIME", Time), ("TIMESTAMP", Timestamp),
            ("DATETIME", Datetime), ("BLOB", Blob), ("BYTES", Bytes), ("JSON", Json),
            ("ARRAY", Array), ("STRUCT", Struct), ("VARIANT", Variant),
            ("SHOW", Show), ("EXPLAIN", Explain), ("CALL", Call), ("VACUUM", Vacuum),
            ("BEGIN", Begin),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let single_tokens = vec![
            ('(', LParen), (')', RParen), ('[', LBracket), (']', RBracket),
            (',', Comma), (';', Semicolon), ('+', Plus), ('-', Minus),
            ('*', Star), ('/', Slash), ('%', Percent), ('=', Eq),
            ('<', Lt), ('>', Gt), ('&', Amp), ('^', Caret), ('~', Tilde),
            ('|', Pipe), (':', Colon),
        ];

        let operators = vec![
            ("<=", Lte), (">=", Gte), ("<>", Neq), ("!=", Neq),
            ("::", DColon), ("||", DPipe), (":=", Assign), ("->", Arrow),
        ];

        Self {
            identifiers: vec![('"', '"')],
            quotes: vec![('\'', '\'')],
            string_escapes: vec!['\\'],
            unescaped_sequences: [('n', '\n'), ('t', '\t'), ('r', '\r'), ('0', '\0')].into_iter().collect(),
            bit_string_prefixes: vec![],
            hex_string_prefixes: vec!["x", "X"],
            raw_string_prefixes: vec![],
            national_string_prefixes: vec!["n", "N"],
            line_comments: vec!["--"],
            block_comment: Some(("/*", "*/")),
            nested_comments: false,
            keywords,
            operators,
            single_tokens,
            bit_number_prefix: false,
            hex_number_prefix: true,
            numeric_literals: HashMap::new(),
            numbers_can_be_underscore_separated: true,
            identifiers_can_start_with_digit: false,
        }
    }
}
