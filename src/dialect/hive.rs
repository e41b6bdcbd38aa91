// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Hive requires an explicit `ON`/`USING` for every join
//! ([`Dialect::requires_join_condition`]) and has no implicit comma-join
//! ([`Dialect::comma_join_as_cross`] spells it out as `CROSS JOIN`); it has
//! no `TRY_CAST`, and rewrites `DATE_SUB(a, b)` to `DATE_ADD(a, b * -1)`
//! via [`Dialect::rewrite_call`].

use super::Dialect;
use crate::generator::GeneratorOptions;
use crate::lexer::TokenizerSettings;

pub struct Hive;

impl Dialect for Hive {
    fn name(&self) -> &'static str {
        "hive"
    }

    fn tokenizer_settings(&self) -> TokenizerSettings {
        let mut s = TokenizerSettings::default();
        s.keywords.remove("TRY_CAST");
        s
    }

    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions::default()
    }

    fn function_name_map(&self) -> &'static [(&'static str, &'static str)] {
        &[("TRY_CAST", "CAST")]
    }

    fn requires_join_condition(&self) -> bool {
        true
    }

    fn comma_join_as_cross(&self) -> bool {
        true
    }

    fn rewrite_call(&self, name: &str, args: &[String]) -> Option<String> {
        if name.eq_ignore_ascii_case("DATE_SUB") && args.len() == 2 {
            Some(format!("DATE_ADD({}, {} * -1)", args[0], args[1]))
        } else {
            None
        }
    }
}
