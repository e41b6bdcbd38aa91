// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Lighter-weight dialect registrations: enough identifier/quoting
//! configuration to round-trip, without a full override table per vendor.

use super::Dialect;
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

pub struct Snowflake;
impl Dialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }
}

pub struct Redshift;
impl Dialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }
}

pub struct Sqlite;
impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        let mut s = TokenizerSettings::default();
        s.identifiers.push(('[', ']'));
        s
    }
}

pub struct Oracle;
impl Dialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }
    fn type_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("TEXT", "VARCHAR2(4000)")]
    }
}

pub struct ClickHouse;
impl Dialect for ClickHouse {
    fn name(&self) -> &'static str {
        "clickhouse"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }
    fn function_name_map(&self) -> &'static [(&'static str, &'static str)] {
        // TODO: ClickHouse's mixed-case builtins (isNaN, toString, ...)
        // need a case-preserving map, not this uppercase-keyed table.
        &[]
    }
}

pub struct Presto;
impl Dialect for Presto {
    fn name(&self) -> &'static str {
        "presto"
    }
    fn tokenizer_settings(&self) -> TokenizerSettings {
        TokenizerSettings::default()
    }
}

pub fn dialects() -> Vec<Box<dyn Dialect>> {
    vec![
        Box::new(Snowflake),
        Box::new(Redshift),
        Box::new(Sqlite),
        Box::new(Oracle),
        Box::new(ClickHouse),
        Box::new(Presto),
    ]
}
