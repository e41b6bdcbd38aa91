// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! File-driven identity check: every fixture under `tests/fixtures/identity`
//! should parse and regenerate back to itself under the generic dialect.

use std::path::Path;

fn check(path: &Path) -> datatest_stable::Result<()> {
    let sql = std::fs::read_to_string(path)?.trim().to_string();
    let out = sqlcross::transpile(&sql, None, None)?;
    pretty_assertions::assert_eq!(out.join("; "), sql);
    Ok(())
}

datatest_stable::harness!(check, "tests/fixtures/identity", r"^.*\.sql$");
