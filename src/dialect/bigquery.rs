// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

use super::Dialect;
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

pub struct BigQuery;

impl Dialect for BigQuery {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn tokenizer_settings(&self) -> TokenizerSettings {
        let mut s = TokenizerSettings::default();
        s.identifiers = vec![('`', '`')];
        s
    }

    fn generator_options(&self) -> GeneratorOptions {
        let mut o = GeneratorOptions::default();
        o.identifier_quote = '`';
        o
    }

    fn type_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("INT", "INT64"), ("BIGINT", "INT64"), ("FLOAT", "FLOAT64"), ("DOUBLE", "FLOAT64"), ("TEXT", "STRING")]
    }
}
