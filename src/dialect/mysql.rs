// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

use super::Dialect;
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn tokenizer_settings(&self) -> TokenizerSettings {
        let mut s = TokenizerSettings::default();
        s.identifiers = vec![('`', '`')];
        // MySQL has no ILIKE; case-insensitive LIKE is collation-driven.
        s.keywords.remove("ILIKE");
        s
    }

    fn generator_options(&self) -> GeneratorOptions {
        let mut o = GeneratorOptions::default();
        o.identifier_quote = '`';
        o
    }

    fn supports_ilike(&self) -> bool {
        false
    }
}
