// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Regenerates SQL text from a [`Tree`], dispatching per [`ExprKind`].
//! Each dialect supplies quoting/name-mapping overrides through the
//! [`Dialect`](crate::dialect::Dialect) trait; the assembly logic below is
//! shared.

use crate::ast::{kind::keys, ExprId, ExprKind, Tree};
use crate::dialect::Dialect;
use crate::error::GenerateError;

/// `identify` generator option: when to quote an identifier that wasn't
/// already quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identify {
    /// Quote only identifiers the parser marked as quoted in the source.
    Never,
    /// Quote every identifier.
    Always,
    /// Quote an identifier only if lowercasing it would change it, i.e. it
    /// wouldn't round-trip unquoted under case-insensitive resolution.
    Safe,
}

impl Default for Identify {
    fn default() -> Self {
        Identify::Never
    }
}

/// `normalize_functions` generator option: case to render named-function
/// keywords in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCase {
    Upper,
    Lower,
    Preserve,
}

impl Default for FunctionCase {
    fn default() -> Self {
        FunctionCase::Upper
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub pretty: bool,
    pub pad: usize,
    pub identify: Identify,
    pub normalize: bool,
    pub normalize_functions: FunctionCase,
    pub leading_comma: bool,
    pub identifier_quote: char,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            pad: 2,
            identify: Identify::Never,
            normalize: false,
            normalize_functions: FunctionCase::Upper,
            leading_comma: false,
            identifier_quote: '"',
        }
    }
}

/// Generates SQL text for the subtree rooted at `id`, using `dialect`'s own
/// [`GeneratorOptions`].
pub fn generate(tree: &Tree, id: ExprId, dialect: &dyn Dialect) -> Result<String, GenerateError> {
    let opts = dialect.generator_options();
    generate_with_options(tree, id, dialect, &opts)
}

/// Generates SQL text for the subtree rooted at `id`, overriding the
/// dialect's default [`GeneratorOptions`] (e.g. to force `identify`,
/// `pretty`, or `leading_comma` regardless of what the dialect normally
/// requests).
pub fn generate_with_options(tree: &Tree, id: ExprId, dialect: &dyn Dialect, opts: &GeneratorOptions) -> Result<String, GenerateError> {
    Gen { tree, dialect, opts }.emit(id)
}

struct Gen<'a> {
    tree: &'a Tree,
    dialect: &'a dyn Dialect,
    opts: &'a GeneratorOptions,
}

fn closing_quote(open: char) -> char {
    match open {
        '[' => ']',
        '(' => ')',
        '{' => '}',
        c => c,
    }
}

impl<'a> Gen<'a> {
    fn emit(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let sql = match node.kind {
            ExprKind::Select => self.select(id)?,
            ExprKind::Subquery => format!("({})", self.emit(self.req(id, keys::THIS)?)?),
            ExprKind::Paren => format!("({})", self.emit(self.req(id, keys::THIS)?)?),
            ExprKind::Tuple => {
                let items = self.emit_list(id, keys::EXPRESSIONS)?;
                format!("({})", items.join(", "))
            }
            ExprKind::Union | ExprKind::Intersect | ExprKind::Except => self.set_op(id, node.kind)?,
            ExprKind::Cte => self.cte(id)?,
            ExprKind::Column => self.column(id)?,
            ExprKind::Table => self.table(id)?,
            ExprKind::Identifier => self.identifier(id),
            ExprKind::Star => "*".to_string(),
            ExprKind::Literal => self.literal(id),
            ExprKind::Boolean => self.boolean(node.bool_arg(keys::THIS)),
            ExprKind::Null => "NULL".to_string(),
            ExprKind::DataType => self.data_type(id)?,
            ExprKind::Cast => format!("CAST({} AS {})", self.emit(self.req(id, keys::THIS)?)?, self.emit(self.req(id, keys::TYPE)?)?),
            ExprKind::TryCast => format!("TRY_CAST({} AS {})", self.emit(self.req(id, keys::THIS)?)?, self.emit(self.req(id, keys::TYPE)?)?),
            ExprKind::Case => self.case(id)?,
            ExprKind::If => self.if_expr(id)?,
            ExprKind::Between => self.between(id)?,
            ExprKind::In => self.in_expr(id)?,
            ExprKind::Like => self.like(id)?,
            ExprKind::Exists => format!("EXISTS{}", self.emit(self.req(id, keys::THIS)?)?),
            ExprKind::Window => self.window(id)?,
            ExprKind::Interval => format!("INTERVAL {} {}", self.emit(self.req(id, keys::THIS)?)?, self.text(id, keys::UNIT).unwrap_or_default()),
            ExprKind::Extract => format!("EXTRACT({} FROM {})", self.text(id, keys::UNIT).unwrap_or_default(), self.emit(self.req(id, keys::EXPRESSION)?)?),
            ExprKind::Binary => self.binary(id)?,
            ExprKind::Unary => format!("{}{}", self.text(id, keys::KIND).unwrap_or_default(), self.emit(self.req(id, keys::THIS)?)?),
            ExprKind::Not => format!("NOT {}", self.emit(self.req(id, keys::THIS)?)?),
            ExprKind::Is => format!("{} IS{} {}", self.emit(self.req(id, keys::THIS)?)?, if node.bool_arg(keys::NOT_) { " NOT" } else { "" }, self.emit(self.req(id, keys::EXPRESSION)?)?),
            ExprKind::Anonymous => self.anonymous(id)?,
            ExprKind::Alias => self.alias(id)?,
            ExprKind::Dot => format!("{}.{}", self.emit(self.req(id, keys::THIS)?)?, self.emit(self.req(id, keys::EXPRESSION)?)?),
            ExprKind::Count => self.known_fn(id, "COUNT")?,
            ExprKind::Sum => self.known_fn(id, "SUM")?,
            ExprKind::Avg => self.known_fn(id, "AVG")?,
            ExprKind::Min => self.known_fn(id, "MIN")?,
            ExprKind::Max => self.known_fn(id, "MAX")?,
            ExprKind::Coalesce => self.known_fn(id, "COALESCE")?,
            ExprKind::Ordered => self.ordered(id)?,
            other => {
                return Err(GenerateError(format!("node kind {other} cannot be generated standalone")));
            }
        };
        Ok(sql)
    }

    fn req(&self, id: ExprId, key: &str) -> Result<ExprId, GenerateError> {
        self.tree.get(id).node_arg(key).ok_or_else(|| GenerateError(format!("missing required arg '{key}' on {}", self.tree.get(id).kind)))
    }

    fn text(&self, id: ExprId, key: &str) -> Option<String> {
        self.tree.get(id).text(key).map(str::to_string)
    }

    fn emit_list(&self, id: ExprId, key: &str) -> Result<Vec<String>, GenerateError> {
        self.tree.get(id).list_arg(key).iter().map(|&c| self.emit(c)).collect()
    }

    /// Joins an already-indented projection list in pretty mode: one item
    /// per line, comma leading or trailing per [`GeneratorOptions::leading_comma`].
    fn projection_list(&self, items: &[String]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let indent = " ".repeat(self.opts.pad);
        if self.opts.leading_comma {
            let mut sql = items[0].clone();
            for item in &items[1..] {
                sql.push_str(&format!("\n{indent}, {item}"));
            }
            sql
        } else {
            items.join(&format!(",\n{indent}"))
        }
    }

    fn identifier(&self, id: ExprId) -> String {
        let name = self.text(id, keys::THIS).unwrap_or_default();
        let quoted_in_source = self.tree.get(id).bool_arg(keys::QUOTED);
        self.quote_text(&name, quoted_in_source)
    }

    /// Core identifier-quoting logic shared by [`Gen::identifier`] (which
    /// knows whether the source quoted it) and plain-text spots like a
    /// table alias (which don't carry that flag).
    fn quote_text(&self, name: &str, quoted_in_source: bool) -> String {
        let normalized = name.to_ascii_lowercase();
        let quote = match self.opts.identify {
            Identify::Always => true,
            Identify::Never => quoted_in_source,
            Identify::Safe => quoted_in_source || normalized != name,
        };
        if quote {
            self.quote(name)
        } else if self.opts.normalize {
            normalized
        } else {
            name.to_string()
        }
    }

    fn quote(&self, name: &str) -> String {
        let open = self.opts.identifier_quote;
        let close = closing_quote(open);
        let doubled: String = [close, close].iter().collect();
        format!("{open}{}{close}", name.replace(close, &doubled))
    }

    fn literal(&self, id: ExprId) -> String {
        let text = self.tree.get(id).this().unwrap_or_default();
        if self.tree.get(id).bool_arg("is_string") {
            format!("'{}'", text.replace('\'', "''"))
        } else {
            text.to_string()
        }
    }

    fn boolean(&self, value: bool) -> String {
        self.dialect.boolean_literal(value)
    }

    fn data_type(&self, id: ExprId) -> Result<String, GenerateError> {
        let name = self.text(id, keys::THIS).unwrap_or_default();
        let mapped = self
            .dialect
            .type_name_map()
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(&name))
            .map(|(_, to)| to.to_string())
            .unwrap_or_else(|| name.clone());
        if self.dialect.strips_type_params(&name) {
            return Ok(mapped);
        }
        let args = self.tree.get(id).list_arg(keys::EXPRESSIONS);
        if args.is_empty() || mapped.contains('(') {
            Ok(mapped)
        } else {
            let parts: Vec<String> = args.iter().map(|&a| self.emit(a)).collect::<Result<_, _>>()?;
            Ok(format!("{mapped}({})", parts.join(", ")))
        }
    }

    fn column(&self, id: ExprId) -> Result<String, GenerateError> {
        let this = self.emit(self.req(id, keys::THIS)?)?;
        Ok(match self.tree.get(id).node_arg(keys::TABLE) {
            Some(table) => format!("{}.{}", self.emit(table)?, this),
            None => this,
        })
    }

    fn table(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let mut parts = Vec::new();
        if let Some(db) = node.node_arg(keys::DB) {
            parts.push(self.emit(db)?);
        }
        parts.push(self.emit(self.req(id, keys::THIS)?)?);
        let mut sql = parts.join(".");
        if let Some(alias) = node.text(keys::ALIAS) {
            sql = format!("{sql} AS {}", self.quote_text(alias, false));
        }
        Ok(sql)
    }

    fn alias(&self, id: ExprId) -> Result<String, GenerateError> {
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let alias = self.emit(self.req(id, keys::ALIAS)?)?;
        Ok(format!("{this} AS {alias}"))
    }

    fn ordered(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let mut sql = self.emit(self.req(id, keys::THIS)?)?;
        sql.push_str(if node.bool_arg(keys::DESC) { " DESC" } else { " ASC" });
        if node.args().any(|(k, _)| k == keys::NULLS_FIRST) {
            sql.push_str(if node.bool_arg(keys::NULLS_FIRST) { " NULLS FIRST" } else { " NULLS LAST" });
        }
        Ok(sql)
    }

    fn binary(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let op = node.text(keys::KIND).unwrap_or_default().to_string();
        let lhs = self.emit(self.req(id, keys::THIS)?)?;
        let rhs = self.emit(self.req(id, keys::EXPRESSION)?)?;
        Ok(format!("{lhs} {op} {rhs}"))
    }

    fn like(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let not = if node.bool_arg(keys::NOT_) { "NOT " } else { "" };
        let op = if node.bool_arg("ilike") && self.dialect.supports_ilike() { "ILIKE" } else { "LIKE" };
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let expr = self.emit(self.req(id, keys::EXPRESSION)?)?;
        Ok(format!("{this} {not}{op} {expr}"))
    }

    fn between(&self, id: ExprId) -> Result<String, GenerateError> {
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let low = self.emit(self.req(id, keys::LOW)?)?;
        let high = self.emit(self.req(id, keys::HIGH)?)?;
        let not = if self.tree.get(id).bool_arg(keys::NOT_) { "NOT " } else { "" };
        Ok(format!("{this} {not}BETWEEN {low} AND {high}"))
    }

    fn in_expr(&self, id: ExprId) -> Result<String, GenerateError> {
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let not = if self.tree.get(id).bool_arg(keys::NOT_) { "NOT " } else { "" };
        if let Some(query) = self.tree.get(id).node_arg(keys::QUERY) {
            Ok(format!("{this} {not}IN {}", self.emit(query)?))
        } else {
            let items = self.emit_list(id, keys::EXPRESSIONS)?;
            Ok(format!("{this} {not}IN ({})", items.join(", ")))
        }
    }

    fn case(&self, id: ExprId) -> Result<String, GenerateError> {
        let mut sql = String::from("CASE");
        if let Some(operand) = self.tree.get(id).node_arg(keys::THIS) {
            sql.push(' ');
            sql.push_str(&self.emit(operand)?);
        }
        for &if_id in self.tree.get(id).list_arg(keys::IFS) {
            let cond = self.emit(self.req(if_id, keys::THIS)?)?;
            let then = self.emit(self.req(if_id, keys::EXPRESSION)?)?;
            sql.push_str(&format!(" WHEN {cond} THEN {then}"));
        }
        if let Some(default) = self.tree.get(id).node_arg(keys::DEFAULT) {
            sql.push_str(&format!(" ELSE {}", self.emit(default)?));
        }
        sql.push_str(" END");
        Ok(sql)
    }

    fn if_expr(&self, id: ExprId) -> Result<String, GenerateError> {
        let cond = self.emit(self.req(id, keys::THIS)?)?;
        let then = self.emit(self.req(id, keys::EXPRESSION)?)?;
        match self.tree.get(id).node_arg(keys::DEFAULT) {
            Some(default) => Ok(format!("IF({cond}, {then}, {})", self.emit(default)?)),
            None => Ok(format!("IF({cond}, {then})")),
        }
    }

    fn window(&self, id: ExprId) -> Result<String, GenerateError> {
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let mut parts = Vec::new();
        let partitions = self.tree.get(id).list_arg("partition_by");
        if !partitions.is_empty() {
            let items: Vec<String> = partitions.iter().map(|&p| self.emit(p)).collect::<Result<_, _>>()?;
            parts.push(format!("PARTITION BY {}", items.join(", ")));
        }
        if let Some(order) = self.tree.get(id).node_arg(keys::ORDER) {
            parts.push(self.emit(order)?);
        }
        Ok(format!("{this} OVER ({})", parts.join(" ")))
    }

    fn anonymous(&self, id: ExprId) -> Result<String, GenerateError> {
        let name = self.text(id, keys::THIS).unwrap_or_default();
        let args = self.emit_list(id, keys::EXPRESSIONS)?;
        if let Some(sql) = self.dialect.rewrite_call(&name, &args) {
            return Ok(sql);
        }
        let mapped = self
            .dialect
            .function_name_map()
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(&name))
            .map(|(_, to)| to.to_string())
            .unwrap_or(name);
        Ok(format!("{mapped}({})", args.join(", ")))
    }

    fn function_case(&self, name: &str) -> String {
        match self.opts.normalize_functions {
            FunctionCase::Upper => name.to_ascii_uppercase(),
            FunctionCase::Lower => name.to_ascii_lowercase(),
            FunctionCase::Preserve => name.to_string(),
        }
    }

    fn known_fn(&self, id: ExprId, name: &str) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let distinct = if node.bool_arg(keys::DISTINCT) { "DISTINCT " } else { "" };
        let args = match node.node_arg(keys::THIS) {
            Some(star) if self.tree.get(star).kind == ExprKind::Star => "*".to_string(),
            _ => self.emit_list(id, keys::EXPRESSIONS)?.join(", "),
        };
        Ok(format!("{}({distinct}{args})", self.function_case(name)))
    }

    fn set_op(&self, id: ExprId, kind: ExprKind) -> Result<String, GenerateError> {
        let op = match kind {
            ExprKind::Union => "UNION",
            ExprKind::Intersect => "INTERSECT",
            ExprKind::Except => "EXCEPT",
            _ => unreachable!(),
        };
        let all = if self.tree.get(id).bool_arg(keys::DISTINCT) { "" } else { " ALL" };
        let lhs = self.emit(self.req(id, keys::THIS)?)?;
        let rhs = self.emit(self.req(id, keys::EXPRESSION)?)?;
        Ok(format!("{lhs} {op}{all} {rhs}"))
    }

    fn cte(&self, id: ExprId) -> Result<String, GenerateError> {
        let alias = self.emit(self.req(id, keys::ALIAS)?)?;
        let query = self.emit(self.req(id, keys::THIS)?)?;
        Ok(format!("{alias} AS ({query})"))
    }

    fn select(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let mut clauses = Vec::new();

        if let Some(with) = node.node_arg(keys::WITH) {
            clauses.push(self.emit(with)?);
        }

        let distinct = if node.bool_arg(keys::DISTINCT) { " DISTINCT" } else { "" };
        let projections = self.emit_list(id, keys::EXPRESSIONS)?;
        if self.opts.pretty {
            let indent = " ".repeat(self.opts.pad);
            clauses.push(format!("SELECT{distinct}\n{indent}{}", self.projection_list(&projections)));
        } else {
            clauses.push(format!("SELECT{distinct} {}", projections.join(", ")));
        }

        if let Some(from) = node.node_arg(keys::FROM) {
            let mut from_sql = format!("FROM {}", self.emit(from)?);
            let mut explicit_joins = Vec::new();
            for &join in node.list_arg(keys::JOINS) {
                let is_comma = self.tree.get(join).text(keys::METHOD) == Some("COMMA");
                if is_comma && !self.dialect.comma_join_as_cross() {
                    from_sql.push_str(&format!(", {}", self.emit(self.req(join, keys::THIS)?)?));
                } else if is_comma {
                    // No implicit comma-join in this dialect; spell it out as a CROSS JOIN.
                    explicit_joins.push(format!("CROSS JOIN {}", self.emit(self.req(join, keys::THIS)?)?));
                } else {
                    explicit_joins.push(self.join(join)?);
                }
            }
            clauses.push(from_sql);
            clauses.extend(explicit_joins);
        }
        if let Some(where_) = node.node_arg(keys::WHERE) {
            clauses.push(format!("WHERE {}", self.emit(where_)?));
        }
        let groups = node.list_arg(keys::GROUP);
        if !groups.is_empty() {
            let items: Vec<String> = groups.iter().map(|&g| self.emit(g)).collect::<Result<_, _>>()?;
            clauses.push(format!("GROUP BY {}", items.join(", ")));
        }
        if let Some(having) = node.node_arg(keys::HAVING) {
            clauses.push(format!("HAVING {}", self.emit(having)?));
        }
        let order = node.list_arg(keys::ORDER);
        if !order.is_empty() {
            let items: Vec<String> = order.iter().map(|&o| self.emit(o)).collect::<Result<_, _>>()?;
            clauses.push(format!("ORDER BY {}", items.join(", ")));
        }
        if let Some(limit) = node.node_arg(keys::LIMIT) {
            clauses.push(format!("LIMIT {}", self.emit(limit)?));
        }
        if let Some(offset) = node.node_arg(keys::OFFSET) {
            clauses.push(format!("OFFSET {}", self.emit(offset)?));
        }

        let separator = if self.opts.pretty { "\n" } else { " " };
        Ok(clauses.join(separator))
    }

    fn join(&self, id: ExprId) -> Result<String, GenerateError> {
        let node = self.tree.get(id);
        let side = node.text(keys::SIDE).map(str::to_string);
        let method = node.text(keys::METHOD).map(str::to_string);
        let mut kind = match (&side, &method) {
            (Some(side), Some(method)) => format!("{side} {method} JOIN"),
            (Some(side), None) => format!("{side} JOIN"),
            (None, Some(method)) => format!("{method} JOIN"),
            (None, None) => "JOIN".to_string(),
        };
        kind = self.dialect.strip_join_kind(kind);
        let this = self.emit(self.req(id, keys::THIS)?)?;
        let mut sql = format!("{kind} {this}");
        if let Some(on) = node.node_arg(keys::ON) {
            sql.push_str(&format!(" ON {}", self.emit(on)?));
        } else if !node.list_arg(keys::USING_).is_empty() {
            let items = self.emit_list(id, keys::USING_)?;
            sql.push_str(&format!(" USING ({})", items.join(", ")));
        } else if self.dialect.requires_join_condition() {
            return Err(GenerateError(format!("{} requires an explicit join condition", self.dialect.name())));
        }
        Ok(sql)
    }
}
