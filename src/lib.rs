// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! `sqlcross`: tokenize, parse, and regenerate SQL across vendor dialects.
//!
//! ```
//! let sql = sqlcross::transpile("SELECT a FROM t WHERE a ILIKE 'x%'", Some("postgres"), Some("mysql")).unwrap();
//! assert_eq!(sql, vec!["SELECT a FROM t WHERE a LIKE 'x%'".to_string()]);
//! ```

pub mod ast;
pub mod dialect;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;

pub use ast::{Arg, ExprId, ExprKind, Tree};
pub use error::{ErrorLevel, Result, SqlglotError};

use lexer::Tokenizer;
use parser::Parser;

/// Parses `sql` (which may contain several `;`-separated statements) under
/// `dialect`, returning one tree root per statement.
pub fn parse(sql: &str, dialect: Option<&str>) -> Result<(Tree, Vec<ExprId>)> {
    parse_with_error_level(sql, dialect, ErrorLevel::Immediate)
}

pub fn parse_with_error_level(sql: &str, dialect: Option<&str>, error_level: ErrorLevel) -> Result<(Tree, Vec<ExprId>)> {
    let dialect = dialect::get_or_raise(dialect)?;
    let settings = dialect.tokenizer_settings();
    let tokens = Tokenizer::new(sql, &settings).tokenize()?;
    let (tree, roots) = Parser::new(&tokens, sql, error_level).parse_all()?;
    Ok((tree, roots))
}

/// Parses `sql` as exactly one statement.
pub fn parse_one(sql: &str, dialect: Option<&str>) -> Result<(Tree, ExprId)> {
    let (tree, mut roots) = parse(sql, dialect)?;
    let root = roots.pop().ok_or_else(|| SqlglotError::Generate(error::GenerateError("no statement to parse".to_string())))?;
    Ok((tree, root))
}

/// Parses `sql` under `read_dialect` and regenerates it under
/// `write_dialect` (defaulting both to the base dialect when omitted),
/// one output string per input statement.
pub fn transpile(sql: &str, read_dialect: Option<&str>, write_dialect: Option<&str>) -> Result<Vec<String>> {
    let (tree, roots) = parse(sql, read_dialect)?;
    let write = dialect::get_or_raise(write_dialect)?;
    roots
        .into_iter()
        .map(|root| generator::generate(&tree, root, write).map_err(SqlglotError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trip() {
        let out = transpile("SELECT a, b FROM t WHERE a > 1", None, None).unwrap();
        assert_eq!(out, vec!["SELECT a, b FROM t WHERE a > 1".to_string()]);
    }

    #[test]
    fn ilike_rewrites_for_mysql() {
        let out = transpile("SELECT 1 FROM t WHERE a ILIKE 'x'", Some("postgres"), Some("mysql")).unwrap();
        assert_eq!(out, vec!["SELECT 1 FROM t WHERE a LIKE 'x'".to_string()]);
    }

    #[test]
    fn boolean_literal_for_tsql() {
        let out = transpile("SELECT TRUE", None, Some("tsql")).unwrap();
        assert_eq!(out, vec!["SELECT 1".to_string()]);
    }

    #[test]
    fn unknown_dialect_errors() {
        assert!(parse("SELECT 1", Some("not-a-real-dialect")).is_err());
    }

    #[test]
    fn comma_join_round_trips_under_generic() {
        let out = transpile("SELECT a FROM t1, t2 WHERE t1.id = t2.id", None, None).unwrap();
        assert_eq!(out, vec!["SELECT a FROM t1, t2 WHERE t1.id = t2.id".to_string()]);
    }

    #[test]
    fn comma_join_becomes_cross_join_for_hive() {
        let out = transpile("SELECT a FROM t1, t2", None, Some("hive")).unwrap();
        assert_eq!(out, vec!["SELECT a FROM t1 CROSS JOIN t2".to_string()]);
    }

    #[test]
    fn hive_rewrites_date_sub_to_date_add() {
        let out = transpile("SELECT DATE_SUB(a, 7)", None, Some("hive")).unwrap();
        assert_eq!(out, vec!["SELECT DATE_ADD(a, 7 * -1)".to_string()]);
    }

    #[test]
    fn quoted_identifiers_survive_a_dialect_switch() {
        let out = transpile("SELECT `a` FROM `b`", Some("mysql"), Some("postgres")).unwrap();
        assert_eq!(out, vec!["SELECT \"a\" FROM \"b\"".to_string()]);
    }

    #[test]
    fn unquoted_identifiers_stay_bare_across_a_dialect_switch() {
        let out = transpile("SELECT a FROM b", Some("mysql"), Some("postgres")).unwrap();
        assert_eq!(out, vec!["SELECT a FROM b".to_string()]);
    }

    #[test]
    fn parenthesized_type_map_ignores_the_source_cast_params() {
        let out = transpile("SELECT CAST(x AS DECIMAL(5, 2))", None, Some("duckdb")).unwrap();
        assert_eq!(out, vec!["SELECT CAST(x AS DECIMAL(18, 3))".to_string()]);
    }

    #[test]
    fn duckdb_text_cast_drops_its_parameter() {
        let out = transpile("SELECT CAST(x AS TEXT(10))", None, Some("duckdb")).unwrap();
        assert_eq!(out, vec!["SELECT CAST(x AS TEXT)".to_string()]);
    }

    #[test]
    fn identify_always_quotes_every_identifier() {
        let (tree, root) = parse_one("SELECT a FROM t", None).unwrap();
        let postgres = dialect::get_or_raise(Some("postgres")).unwrap();
        let mut opts = postgres.generator_options();
        opts.identify = generator::Identify::Always;
        let sql = generator::generate_with_options(&tree, root, postgres, &opts).unwrap();
        assert_eq!(sql, "SELECT \"a\" FROM \"t\"");
    }
}
