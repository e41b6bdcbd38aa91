// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! DuckDB has no `SEMI`/`ANTI` join syntax; [`Dialect::strip_join_kind`]
//! drops those qualifiers down to a plain join. `TEXT` is parameterless,
//! stripped via [`Dialect::strips_type_params`]. A handful of list
//! functions are renamed through the name maps below.

use super::Dialect;
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

pub struct DuckDb;

impl Dialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }

    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::default()
    }

    fn function_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("ARRAY_REMOVE", "LIST_FILTER")]
    }

    fn type_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("DECIMAL", "DECIMAL(18, 3)")]
    }

    fn strip_join_kind(&self, kind: String) -> String {
        kind.replace("SEMI ", "").replace("ANTI ", "")
    }

    fn strips_type_params(&self, type_name: &str) -> bool {
        type_name.eq_ignore_ascii_case("TEXT")
    }
}
