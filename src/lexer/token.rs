// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Token kinds produced by the [`crate::lexer::Tokenizer`].
//!
//! This set cannot be fixed at compile time the way a `logos`-derived enum
//! would: which bare words count as keywords is a per-dialect runtime knob.
//! So `TokenKind` stays a plain enum and the keyword *mapping* lives in
//! [`crate::lexer::TokenizerSettings::keywords`] instead of on the type.

use std::fmt;
use text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // --- punctuation --------------------------------------------------
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Colon,
    DColon,
    Arrow,
    Assign,

    // --- operators -------------------------------------------------
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pipe,
    DPipe,
    Amp,
    Caret,
    Tilde,

    // --- literals / names -------------------------------------------
    Number,
    Str,
    BitString,
    HexString,
    NationalString,
    RawString,
    HeredocString,
    Identifier,
    Var,

    // --- keywords: query shape ---------------------------------------
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Limit,
    Offset,
    With,
    Recursive,
    As,
    Asc,
    Desc,
    Nulls,
    First,
    Last,

    // --- keywords: joins ----------------------------------------------
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    Semi,
    Anti,
    On,
    Using,

    // --- keywords: set operators ---------------------------------------
    Union,
    Intersect,
    Except,
    All,
    Distinct,

    // --- keywords: case/control -----------------------------------------
    Case,
    When,
    Then,
    Else,
    End,
    If,

    // --- keywords: literals/logic ---------------------------------------
    Null,
    True,
    False,
    Not,
    And,
    Or,
    Is,
    In,
    Between,
    Like,
    Ilike,
    Exists,

    // --- keywords: types/casts -------------------------------------------
    Cast,
    TryCast,
    Extract,
    Interval,

    // --- keywords: windows ------------------------------------------------
    Over,
    Partition,
    Window,
    Rows,
    Range,
    Unbounded,
    Preceding,
    Following,
    Current,
    Row,
    Qualify,

    // --- keywords: aggregates / known functions --------------------------
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Coalesce,
    Any,
    Some,

    // --- keywords: data types ---------------------------------------------
    Int,
    Integer,
    SmallInt,
    BigInt,
    TinyInt,
    Float,
    Float64,
    Int64,
    Double,
    Precision,
    Decimal,
    Numeric,
    Real,
    Varchar,
    Char,
    Text,
    String_,
    Boolean,
    Bool,
    Date,
    Time,
    Timestamp,
    Datetime,
    Blob,
    Bytes,
    Json,
    Array,
    Struct,
    Variant,

    // --- keywords: dialect-specific odds & ends ---------------------------
    Div,
    Mod,
    Top,

    // --- command-mode keywords --------------------------------------------
    Show,
    Exec,
    Execute,
    Explain,
    Call,
    Vacuum,
    Begin,

    /// Fallback for any bare word that matched neither a keyword nor an
    /// identifier-continuation rule; the tokenizer never emits this for
    /// valid input, it exists so `TokenError` recovery can still produce a
    /// token stream.
    Error,

    /// Synthetic end-of-input marker; never present in the byte stream.
    Eof,
}

impl TokenKind {
    /// True for the bare keywords that trigger command mode (a
    /// dialect-native statement passed through as a single opaque string).
    pub fn is_command(self) -> bool {
        matches!(
            self,
            Self::Show | Self::Exec | Self::Execute | Self::Explain | Self::Call | Self::Vacuum
        )
    }

    /// The set of tokens that may stand in for a bare identifier: `Var` and
    /// `Identifier` themselves, plus keywords that aren't reserved in the
    /// position of an alias, data type name, or window-frame unit. Deliberately
    /// an allow-list rather than an exclude-list: the clause/join/logical
    /// keywords that introduce new syntax (`FROM`, `JOIN`, `WHERE`, `AND`, ...)
    /// must never be mistaken for an implicit alias, and an exclude-list is
    /// too easy to under-populate as the keyword set grows.
    pub fn is_id_var(self) -> bool {
        matches!(
            self,
            Self::Var
                | Self::Identifier
                | Self::Int
                | Self::Integer
                | Self::SmallInt
                | Self::BigInt
                | Self::TinyInt
                | Self::Float
                | Self::Float64
                | Self::Int64
                | Self::Double
                | Self::Precision
                | Self::Decimal
                | Self::Numeric
                | Self::Real
                | Self::Varchar
                | Self::Char
                | Self::Text
                | Self::String_
                | Self::Boolean
                | Self::Bool
                | Self::Date
                | Self::Time
                | Self::Timestamp
                | Self::Datetime
                | Self::Blob
                | Self::Bytes
                | Self::Json
                | Self::Array
                | Self::Struct
                | Self::Variant
                | Self::Count
                | Self::Sum
                | Self::Avg
                | Self::Min
                | Self::Max
                | Self::Coalesce
                | Self::Any
                | Self::Some
                | Self::First
                | Self::Last
                | Self::Current
                | Self::Row
                | Self::Top
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An immutable lexed token, carrying enough metadata to reconstruct the
/// original text and to report positional errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub range: TextRange,
    pub comments: Vec<String>,
}

impl Token {
    pub fn eof(at: TextRange, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
            column,
            range: at,
            comments: Vec::new(),
        }
    }
}
