// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Dialect registry: each vendor is a [`Dialect`] impl supplying a
//! [`TokenizerSettings`](crate::lexer::TokenizerSettings) and a
//! [`GeneratorOptions`](crate::generator::GeneratorOptions), plus the small
//! set of name-mapping tables and AST rewrites that actually differ between
//! vendors. The rest of the pipeline (tokenizer, parser, generator) is
//! dialect-agnostic and reads these tables through the trait.

pub mod bigquery;
pub mod duckdb;
pub mod generic;
pub mod hive;
pub mod mysql;
pub mod others;
pub mod postgres;
pub mod tsql;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Result, SqlglotError};
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

/// A SQL vendor's tokenizer configuration, generation options, and the
/// handful of rewrite hooks the generator consults before emitting a node.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn tokenizer_settings(&self) -> TokenizerSettings;

    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::default()
    }

    /// `CANONICAL_NAME -> dialect spelling`, e.g. generic `"ARRAY_REMOVE"`
    /// to DuckDB's `"LIST_FILTER"`. Looked up case-insensitively by the
    /// generator when emitting an `Anonymous` function call.
    fn function_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// `CANONICAL_TYPE -> dialect spelling`, e.g. generic `"INT"` to
    /// BigQuery's `"INT64"`.
    fn type_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Renders a boolean literal. Most dialects spell `TRUE`/`FALSE`
    /// verbatim; T-SQL has no boolean type and uses `1`/`0`.
    fn boolean_literal(&self, value: bool) -> String {
        if value { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    /// Whether `ILIKE` is a distinct operator from `LIKE`. MySQL's
    /// collation-driven `LIKE` is already case-insensitive and has no
    /// `ILIKE` keyword, so it loses the `I`.
    fn supports_ilike(&self) -> bool {
        true
    }

    /// Strips qualifiers an assembled join-kind string doesn't support.
    /// DuckDB has no `SEMI`/`ANTI` join syntax and treats both as a plain
    /// join, dropping the qualifier from the emitted text.
    fn strip_join_kind(&self, kind: String) -> String {
        kind
    }

    /// Whether every join must carry an explicit `ON`/`USING` condition.
    /// Hive rejects a join with neither.
    fn requires_join_condition(&self) -> bool {
        false
    }

    /// Whether a comma-separated `FROM a, b` must be spelled out as an
    /// explicit `CROSS JOIN` rather than left as a literal comma. Hive has
    /// no implicit comma-join.
    fn comma_join_as_cross(&self) -> bool {
        false
    }

    /// Rewrites an anonymous function call before the generic
    /// [`Dialect::function_name_map`] lookup runs. Returns `Some(sql)` to
    /// short-circuit with a fully assembled call, `None` to fall through to
    /// the name map. Hive has no `DATE_SUB`, only `DATE_ADD` with a negated
    /// interval.
    fn rewrite_call(&self, name: &str, args: &[String]) -> Option<String> {
        let _ = (name, args);
        None
    }

    /// Whether a bare type name's parameters should be dropped rather than
    /// rendered, e.g. DuckDB's `TEXT` is parameterless.
    fn strips_type_params(&self, type_name: &str) -> bool {
        let _ = type_name;
        false
    }
}

static REGISTRY: Lazy<HashMap<&'static str, Box<dyn Dialect>>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Box<dyn Dialect>> = HashMap::new();
    let mut register = |d: Box<dyn Dialect>| {
        tracing::debug!(dialect = d.name(), "registering dialect");
        m.insert(d.name(), d);
    };

    register(Box::new(generic::Generic));
    register(Box::new(postgres::Postgres));
    register(Box::new(mysql::MySql));
    register(Box::new(bigquery::BigQuery));
    register(Box::new(duckdb::DuckDb));
    register(Box::new(hive::Hive));
    register(Box::new(tsql::TSql));
    for d in others::dialects() {
        register(d);
    }

    tracing::info!(count = m.len(), "dialect registry initialized");
    m
});

/// Resolves a dialect by name, case-insensitively. An empty or missing
/// name resolves to [`generic::Generic`], the base dialect.
#[tracing::instrument(level = "debug")]
pub fn get_or_raise(name: Option<&str>) -> Result<&'static dyn Dialect> {
    let key = name.unwrap_or("generic").to_ascii_lowercase();
    let key = if key.is_empty() { "generic".to_string() } else { key };
    REGISTRY.get(key.as_str()).map(|b| b.as_ref()).ok_or_else(|| {
        tracing::warn!(requested = %key, "unknown dialect");
        SqlglotError::UnknownDialect(key.clone())
    })
}
