// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Recursive-descent, precedence-climbing parser. Builds a [`Tree`] node
//! per construct rather than a lossless green tree, driven by the usual
//! `bump`/`expect`/`eat`/`at` cursor primitives.

use crate::ast::{kind::keys, ExprId, ExprKind, Tree};
use crate::error::{Diagnostic, ErrorLevel, ParseError};
use crate::lexer::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
    tree: Tree,
    errors: Vec<Diagnostic>,
    error_level: ErrorLevel,
}

type PResult<T> = Result<T, ()>;

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str, error_level: ErrorLevel) -> Self {
        Self { tokens, source, pos: 0, tree: Tree::new(), errors: Vec::new(), error_level }
    }

    /// Parses every statement in the token stream, split on `;`.
    pub fn parse_all(mut self) -> Result<(Tree, Vec<ExprId>), ParseError> {
        let mut roots = Vec::new();
        while !self.at(TokenKind::Eof) {
            while self.eat(TokenKind::Semicolon) {}
            if self.at(TokenKind::Eof) {
                break;
            }
            match self.statement() {
                Ok(id) => roots.push(id),
                Err(()) => {
                    if self.error_level == ErrorLevel::Immediate {
                        return Err(ParseError { errors: std::mem::take(&mut self.errors) });
                    }
                    tracing::debug!(pos = self.pos, error_level = ?self.error_level, "recovering to next statement after parse error");
                    self.recover_to_semicolon();
                }
            }
        }

        if !self.errors.is_empty() && self.error_level != ErrorLevel::Warn && self.error_level != ErrorLevel::Ignore {
            return Err(ParseError { errors: self.errors });
        }

        Ok((self.tree, roots))
    }

    fn recover_to_semicolon(&mut self) {
        while !self.at(TokenKind::Eof) && !self.at(TokenKind::Semicolon) {
            self.pos += 1;
        }
    }

    // -- cursor helpers ---------------------------------------------------

    fn cur(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    fn at_keyword(&self, text: &str) -> bool {
        self.cur().text.eq_ignore_ascii_case(text)
    }

    fn bump(&mut self) -> Token {
        let t = self.cur().clone();
        if !self.at(TokenKind::Eof) {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {what}, found '{}'", self.cur().text)))
        }
    }

    fn error(&mut self, description: impl Into<String>) {
        let at = self.cur().range.start();
        let len = usize::from(self.cur().range.end()) - usize::from(at);
        self.errors.push(Diagnostic::new(description, self.source, at, len.max(1)));
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.tree.alloc(kind)
    }

    // -- statement ----------------------------------------------------------

    fn statement(&mut self) -> PResult<ExprId> {
        self.query()
    }

    /// A full query: optional `WITH`, a set-operator chain of selects.
    fn query(&mut self) -> PResult<ExprId> {
        let with = if self.at(TokenKind::With) { Some(self.with_clause()?) } else { None };
        let mut left = self.select_or_paren()?;
        if let Some(with) = with {
            self.tree.set_node(left, keys::WITH, with);
        }

        loop {
            let kind = if self.at(TokenKind::Union) {
                ExprKind::Union
            } else if self.at(TokenKind::Intersect) {
                ExprKind::Intersect
            } else if self.at(TokenKind::Except) {
                ExprKind::Except
            } else {
                break;
            };
            self.bump();
            let distinct = !self.eat(TokenKind::All);
            self.eat(TokenKind::Distinct);
            let right = self.select_or_paren()?;
            let node = self.alloc(kind);
            self.tree.set_node(node, keys::THIS, left);
            self.tree.set_node(node, keys::EXPRESSION, right);
            self.tree.set_bool(node, keys::DISTINCT, distinct);
            left = node;
        }

        Ok(left)
    }

    fn select_or_paren(&mut self) -> PResult<ExprId> {
        if self.eat(TokenKind::LParen) {
            let inner = self.query()?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }
        self.select_stmt()
    }

    fn with_clause(&mut self) -> PResult<ExprId> {
        self.expect(TokenKind::With, "WITH")?;
        let node = self.alloc(ExprKind::With);
        let recursive = self.eat(TokenKind::Recursive);
        self.tree.set_bool(node, keys::RECURSIVE, recursive);

        let mut ctes = Vec::new();
        loop {
            let alias = self.identifier_node()?;
            self.expect(TokenKind::As, "AS")?;
            self.expect(TokenKind::LParen, "'('")?;
            let query = self.query()?;
            self.expect(TokenKind::RParen, "')'")?;
            let cte = self.alloc(ExprKind::Cte);
            self.tree.set_node(cte, keys::ALIAS, alias);
            self.tree.set_node(cte, keys::THIS, query);
            ctes.push(cte);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.tree.set_list(node, keys::CTES, ctes);
        Ok(node)
    }

    fn select_stmt(&mut self) -> PResult<ExprId> {
        self.expect(TokenKind::Select, "SELECT")?;
        let node = self.alloc(ExprKind::Select);

        let distinct = self.eat(TokenKind::Distinct);
        if distinct {
            self.tree.set_bool(node, keys::DISTINCT, true);
        }
        self.eat(TokenKind::All);

        let mut projections = Vec::new();
        loop {
            projections.push(self.projection()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.tree.set_list(node, keys::EXPRESSIONS, projections);

        if self.eat(TokenKind::From) {
            let from = self.table_source()?;
            self.tree.set_node(node, keys::FROM, from);

            let mut joins = Vec::new();
            loop {
                if self.eat(TokenKind::Comma) {
                    let this = self.table_source()?;
                    let join = self.alloc(ExprKind::Join);
                    self.tree.set_text(join, keys::METHOD, "COMMA");
                    self.tree.set_node(join, keys::THIS, this);
                    joins.push(join);
                    continue;
                }
                match self.try_join()? {
                    Some(join) => joins.push(join),
                    None => break,
                }
            }
            if !joins.is_empty() {
                self.tree.set_list(node, keys::JOINS, joins);
            }
        }

        if self.eat(TokenKind::Where) {
            let expr = self.expr()?;
            self.tree.set_node(node, keys::WHERE, expr);
        }

        if self.eat(TokenKind::Group) {
            self.expect(TokenKind::By, "BY")?;
            let mut groups = Vec::new();
            loop {
                groups.push(self.expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.tree.set_list(node, keys::GROUP, groups);
        }

        if self.eat(TokenKind::Having) {
            let expr = self.expr()?;
            self.tree.set_node(node, keys::HAVING, expr);
        }

        if self.eat(TokenKind::Order) {
            self.expect(TokenKind::By, "BY")?;
            let mut order = Vec::new();
            loop {
                order.push(self.ordered_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.tree.set_list(node, keys::ORDER, order);
        }

        if self.eat(TokenKind::Limit) {
            let expr = self.expr()?;
            self.tree.set_node(node, keys::LIMIT, expr);
        }
        if self.eat(TokenKind::Offset) {
            let expr = self.expr()?;
            self.tree.set_node(node, keys::OFFSET, expr);
        }

        Ok(node)
    }

    fn ordered_expr(&mut self) -> PResult<ExprId> {
        let this = self.expr()?;
        let node = self.alloc(ExprKind::Ordered);
        self.tree.set_node(node, keys::THIS, this);
        let desc = if self.eat(TokenKind::Desc) {
            true
        } else {
            self.eat(TokenKind::Asc);
            false
        };
        self.tree.set_bool(node, keys::DESC, desc);
        if self.eat(TokenKind::Nulls) {
            let first = if self.eat(TokenKind::First) {
                true
            } else {
                self.expect(TokenKind::Last, "LAST")?;
                false
            };
            self.tree.set_bool(node, keys::NULLS_FIRST, first);
        }
        Ok(node)
    }

    /// A projection item: `expr`, `expr AS alias`, or bare `*`.
    fn projection(&mut self) -> PResult<ExprId> {
        if self.at(TokenKind::Star) {
            self.bump();
            return Ok(self.alloc(ExprKind::Star));
        }
        let expr = self.expr()?;
        if self.eat(TokenKind::As) {
            let alias = self.identifier_node()?;
            let node = self.alloc(ExprKind::Alias);
            self.tree.set_node(node, keys::THIS, expr);
            self.tree.set_node(node, keys::ALIAS, alias);
            return Ok(node);
        }
        if self.cur().kind.is_id_var() && !self.at(TokenKind::From) {
            let alias = self.identifier_node()?;
            let node = self.alloc(ExprKind::Alias);
            self.tree.set_node(node, keys::THIS, expr);
            self.tree.set_node(node, keys::ALIAS, alias);
            return Ok(node);
        }
        Ok(expr)
    }

    fn table_source(&mut self) -> PResult<ExprId> {
        if self.eat(TokenKind::LParen) {
            let inner = self.query()?;
            self.expect(TokenKind::RParen, "')'")?;
            let node = self.alloc(ExprKind::Subquery);
            self.tree.set_node(node, keys::THIS, inner);
            if self.eat(TokenKind::As) || self.cur().kind.is_id_var() {
                let alias = self.identifier_node()?;
                self.tree.set_node(node, keys::ALIAS, alias);
            }
            return Ok(node);
        }
        self.table_ref()
    }

    fn table_ref(&mut self) -> PResult<ExprId> {
        let node = self.alloc(ExprKind::Table);
        let first = self.identifier_node()?;
        if self.eat(TokenKind::Dot) {
            let name = self.identifier_node()?;
            self.tree.set_node(node, keys::DB, first);
            self.tree.set_node(node, keys::THIS, name);
        } else {
            self.tree.set_node(node, keys::THIS, first);
        }
        if self.eat(TokenKind::As) {
            let alias = self.expect_ident_text()?;
            self.tree.set_text(node, keys::ALIAS, alias);
        } else if self.cur().kind.is_id_var() {
            let alias = self.expect_ident_text()?;
            self.tree.set_text(node, keys::ALIAS, alias);
        }
        Ok(node)
    }

    /// Attempts to parse a join; returns `Ok(None)` and rewinds if the
    /// lookahead isn't a join keyword (comma-joins are handled by the
    /// caller re-entering `FROM`'s loop, not here).
    fn try_join(&mut self) -> PResult<Option<ExprId>> {
        let checkpoint = self.pos;
        let side = if self.eat(TokenKind::Left) {
            Some("LEFT")
        } else if self.eat(TokenKind::Right) {
            Some("RIGHT")
        } else if self.eat(TokenKind::Full) {
            Some("FULL")
        } else {
            None
        };
        self.eat(TokenKind::Outer);

        let method = if self.eat(TokenKind::Inner) {
            Some("INNER")
        } else if self.eat(TokenKind::Cross) {
            Some("CROSS")
        } else if self.eat(TokenKind::Semi) {
            Some("SEMI")
        } else if self.eat(TokenKind::Anti) {
            Some("ANTI")
        } else {
            None
        };
        self.eat(TokenKind::Natural);

        if !self.eat(TokenKind::Join) {
            if side.is_none() && method.is_none() {
                self.pos = checkpoint;
                return Ok(None);
            }
            self.error("expected JOIN".to_string());
            self.pos = checkpoint;
            return Err(());
        }

        let node = self.alloc(ExprKind::Join);
        if let Some(side) = side {
            self.tree.set_text(node, keys::SIDE, side);
        }
        if let Some(method) = method {
            self.tree.set_text(node, keys::METHOD, method);
        }
        let this = self.table_source()?;
        self.tree.set_node(node, keys::THIS, this);

        if self.eat(TokenKind::On) {
            let cond = self.expr()?;
            self.tree.set_node(node, keys::ON, cond);
        } else if self.eat(TokenKind::Using) {
            self.expect(TokenKind::LParen, "'('")?;
            let mut cols = Vec::new();
            loop {
                cols.push(self.identifier_node()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            self.tree.set_list(node, keys::USING_, cols);
        }

        Ok(Some(node))
    }

    fn identifier_node(&mut self) -> PResult<ExprId> {
        let token = self.expect_ident()?;
        let node = self.alloc(ExprKind::Identifier);
        self.tree.set_text(node, keys::THIS, token.text);
        self.tree.set_bool(node, keys::QUOTED, token.kind == TokenKind::Identifier);
        Ok(node)
    }

    /// Bumps and returns an identifier-like token, preserving its kind so
    /// callers can tell a delimited identifier from a bare word.
    fn expect_ident(&mut self) -> PResult<Token> {
        if self.at(TokenKind::Identifier) || self.at(TokenKind::Var) || self.cur().kind.is_id_var() {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected identifier, found '{}'", self.cur().text)))
        }
    }

    fn expect_ident_text(&mut self) -> PResult<String> {
        Ok(self.expect_ident()?.text)
    }

    // -- expressions, lowest to highest precedence ------------------------

    fn expr(&mut self) -> PResult<ExprId> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> PResult<ExprId> {
        let mut left = self.and_expr()?;
        while self.eat(TokenKind::Or) {
            let right = self.and_expr()?;
            left = self.binary_node(left, "OR", right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> PResult<ExprId> {
        let mut left = self.not_expr()?;
        while self.eat(TokenKind::And) {
            let right = self.not_expr()?;
            left = self.binary_node(left, "AND", right);
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> PResult<ExprId> {
        if self.eat(TokenKind::Not) {
            let inner = self.not_expr()?;
            let node = self.alloc(ExprKind::Not);
            self.tree.set_node(node, keys::THIS, inner);
            return Ok(node);
        }
        self.comparison()
    }

    /// Comparisons and the `IS`/`IN`/`BETWEEN`/`LIKE` family, all at one
    /// precedence level with an optional leading `NOT` for each.
    fn comparison(&mut self) -> PResult<ExprId> {
        let left = self.bitor()?;

        if self.eat(TokenKind::Is) {
            let not = self.eat(TokenKind::Not);
            let rhs = if self.at(TokenKind::Null) {
                self.bump();
                self.alloc(ExprKind::Null)
            } else {
                self.bitor()?
            };
            let node = self.alloc(ExprKind::Is);
            self.tree.set_node(node, keys::THIS, left);
            self.tree.set_node(node, keys::EXPRESSION, rhs);
            self.tree.set_bool(node, keys::NOT_, not);
            return Ok(node);
        }

        let not = self.eat(TokenKind::Not);
        if self.eat(TokenKind::Between) {
            let low = self.bitor()?;
            self.expect(TokenKind::And, "AND")?;
            let high = self.bitor()?;
            let node = self.alloc(ExprKind::Between);
            self.tree.set_node(node, keys::THIS, left);
            self.tree.set_node(node, keys::LOW, low);
            self.tree.set_node(node, keys::HIGH, high);
            self.tree.set_bool(node, keys::NOT_, not);
            return Ok(node);
        }
        if self.eat(TokenKind::In) {
            self.expect(TokenKind::LParen, "'('")?;
            let node = self.alloc(ExprKind::In);
            self.tree.set_node(node, keys::THIS, left);
            self.tree.set_bool(node, keys::NOT_, not);
            if self.at(TokenKind::Select) || self.at(TokenKind::With) {
                let query = self.query()?;
                self.tree.set_node(node, keys::QUERY, query);
            } else {
                let mut items = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        items.push(self.expr()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.tree.set_list(node, keys::EXPRESSIONS, items);
            }
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(node);
        }
        if self.at(TokenKind::Like) || self.at(TokenKind::Ilike) {
            let ilike = self.at(TokenKind::Ilike);
            self.bump();
            let rhs = self.bitor()?;
            let node = self.alloc(ExprKind::Like);
            self.tree.set_node(node, keys::THIS, left);
            self.tree.set_node(node, keys::EXPRESSION, rhs);
            self.tree.set_bool(node, keys::NOT_, not);
            self.tree.set_bool(node, "ilike", ilike);
            return Ok(node);
        }
        if not {
            return Err(self.error("expected BETWEEN, IN or LIKE after NOT".to_string()));
        }

        for (kind, op) in [
            (TokenKind::Eq, "="),
            (TokenKind::Neq, "<>"),
            (TokenKind::Lt, "<"),
            (TokenKind::Lte, "<="),
            (TokenKind::Gt, ">"),
            (TokenKind::Gte, ">="),
        ] {
            if self.at(kind) {
                self.bump();
                let rhs = self.bitor()?;
                return Ok(self.binary_node(left, op, rhs));
            }
        }

        Ok(left)
    }

    fn bitor(&mut self) -> PResult<ExprId> {
        let mut left = self.bitand()?;
        while self.at(TokenKind::Pipe) {
            self.bump();
            let right = self.bitand()?;
            left = self.binary_node(left, "|", right);
        }
        Ok(left)
    }

    fn bitand(&mut self) -> PResult<ExprId> {
        let mut left = self.concat()?;
        while self.at(TokenKind::Amp) {
            self.bump();
            let right = self.concat()?;
            left = self.binary_node(left, "&", right);
        }
        Ok(left)
    }

    fn concat(&mut self) -> PResult<ExprId> {
        let mut left = self.additive()?;
        while self.at(TokenKind::DPipe) {
            self.bump();
            let right = self.additive()?;
            left = self.binary_node(left, "||", right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> PResult<ExprId> {
        let mut left = self.term()?;
        loop {
            let op = if self.at(TokenKind::Plus) {
                "+"
            } else if self.at(TokenKind::Minus) {
                "-"
            } else {
                break;
            };
            self.bump();
            let right = self.term()?;
            left = self.binary_node(left, op, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> PResult<ExprId> {
        let mut left = self.unary()?;
        loop {
            let op = if self.at(TokenKind::Star) {
                "*"
            } else if self.at(TokenKind::Slash) {
                "/"
            } else if self.at(TokenKind::Percent) || self.at(TokenKind::Mod) {
                "%"
            } else if self.at(TokenKind::Div) {
                "DIV"
            } else {
                break;
            };
            self.bump();
            let right = self.unary()?;
            left = self.binary_node(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<ExprId> {
        if self.at(TokenKind::Minus) || self.at(TokenKind::Plus) || self.at(TokenKind::Tilde) {
            let op = self.bump().text;
            let operand = self.unary()?;
            let node = self.alloc(ExprKind::Unary);
            self.tree.set_text(node, keys::KIND, op);
            self.tree.set_node(node, keys::THIS, operand);
            return Ok(node);
        }
        self.cast_postfix()
    }

    /// Parses a primary expression, then any trailing `::type` casts
    /// (postfix cast shorthand) and `.member` dotted access.
    fn cast_postfix(&mut self) -> PResult<ExprId> {
        let mut node = self.primary()?;
        loop {
            if self.eat(TokenKind::DColon) {
                let ty = self.data_type()?;
                let cast = self.alloc(ExprKind::Cast);
                self.tree.set_node(cast, keys::THIS, node);
                self.tree.set_node(cast, keys::TYPE, ty);
                node = cast;
                continue;
            }
            if self.at(TokenKind::Dot) && self.peek_is_id_var(1) {
                self.bump();
                let field = self.identifier_node()?;
                let dot = self.alloc(ExprKind::Dot);
                self.tree.set_node(dot, keys::THIS, node);
                self.tree.set_node(dot, keys::EXPRESSION, field);
                node = dot;
                continue;
            }
            break;
        }
        Ok(node)
    }

    fn peek_is_id_var(&self, offset: usize) -> bool {
        self.tokens.get(self.pos + offset).map(|t| t.kind.is_id_var()).unwrap_or(false)
    }

    fn primary(&mut self) -> PResult<ExprId> {
        match self.cur().kind {
            TokenKind::Number => {
                let text = self.bump().text;
                let node = self.alloc(ExprKind::Literal);
                self.tree.set_text(node, keys::THIS, text);
                Ok(node)
            }
            TokenKind::Str | TokenKind::NationalString | TokenKind::RawString | TokenKind::BitString | TokenKind::HexString => {
                let text = self.bump().text;
                let node = self.alloc(ExprKind::Literal);
                self.tree.set_text(node, keys::THIS, text);
                self.tree.set_bool(node, "is_string", true);
                Ok(node)
            }
            TokenKind::Null => {
                self.bump();
                Ok(self.alloc(ExprKind::Null))
            }
            TokenKind::True => {
                self.bump();
                let node = self.alloc(ExprKind::Boolean);
                self.tree.set_bool(node, keys::THIS, true);
                Ok(node)
            }
            TokenKind::False => {
                self.bump();
                let node = self.alloc(ExprKind::Boolean);
                self.tree.set_bool(node, keys::THIS, false);
                Ok(node)
            }
            TokenKind::Star => {
                self.bump();
                Ok(self.alloc(ExprKind::Star))
            }
            TokenKind::LParen => self.paren_or_tuple_or_subquery(),
            TokenKind::Case => self.case_expr(),
            TokenKind::Cast => self.cast_expr(false),
            TokenKind::TryCast => self.cast_expr(true),
            TokenKind::If => self.if_expr(),
            TokenKind::Extract => self.extract_expr(),
            TokenKind::Interval => self.interval_expr(),
            TokenKind::Exists => self.exists_expr(),
            TokenKind::Count => self.known_call(ExprKind::Count),
            TokenKind::Sum => self.known_call(ExprKind::Sum),
            TokenKind::Avg => self.known_call(ExprKind::Avg),
            TokenKind::Min => self.known_call(ExprKind::Min),
            TokenKind::Max => self.known_call(ExprKind::Max),
            TokenKind::Coalesce => self.known_call(ExprKind::Coalesce),
            TokenKind::Identifier => self.column_or_call(),
            kind if kind.is_id_var() => self.column_or_call(),
            _ => Err(self.error(format!("unexpected token '{}'", self.cur().text))),
        }
    }

    fn paren_or_tuple_or_subquery(&mut self) -> PResult<ExprId> {
        self.bump();
        if self.at(TokenKind::Select) || self.at(TokenKind::With) {
            let query = self.query()?;
            self.expect(TokenKind::RParen, "')'")?;
            let node = self.alloc(ExprKind::Subquery);
            self.tree.set_node(node, keys::THIS, query);
            return Ok(node);
        }

        let first = self.expr()?;
        if self.eat(TokenKind::Comma) {
            let mut items = vec![first];
            loop {
                items.push(self.expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            let node = self.alloc(ExprKind::Tuple);
            self.tree.set_list(node, keys::EXPRESSIONS, items);
            return Ok(node);
        }
        self.expect(TokenKind::RParen, "')'")?;
        let node = self.alloc(ExprKind::Paren);
        self.tree.set_node(node, keys::THIS, first);
        Ok(node)
    }

    fn case_expr(&mut self) -> PResult<ExprId> {
        self.bump();
        let node = self.alloc(ExprKind::Case);
        if !self.at(TokenKind::When) {
            let operand = self.expr()?;
            self.tree.set_node(node, keys::THIS, operand);
        }
        let mut ifs = Vec::new();
        while self.eat(TokenKind::When) {
            let cond = self.expr()?;
            self.expect(TokenKind::Then, "THEN")?;
            let then = self.expr()?;
            let if_node = self.alloc(ExprKind::If);
            self.tree.set_node(if_node, keys::THIS, cond);
            self.tree.set_node(if_node, keys::EXPRESSION, then);
            ifs.push(if_node);
        }
        self.tree.set_list(node, keys::IFS, ifs);
        if self.eat(TokenKind::Else) {
            let default = self.expr()?;
            self.tree.set_node(node, keys::DEFAULT, default);
        }
        self.expect(TokenKind::End, "END")?;
        Ok(node)
    }

    fn cast_expr(&mut self, try_cast: bool) -> PResult<ExprId> {
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let this = self.expr()?;
        self.expect(TokenKind::As, "AS")?;
        let ty = self.data_type()?;
        self.expect(TokenKind::RParen, "')'")?;
        let node = self.alloc(if try_cast { ExprKind::TryCast } else { ExprKind::Cast });
        self.tree.set_node(node, keys::THIS, this);
        self.tree.set_node(node, keys::TYPE, ty);
        Ok(node)
    }

    fn if_expr(&mut self) -> PResult<ExprId> {
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.expr()?;
        self.expect(TokenKind::Comma, "','")?;
        let then = self.expr()?;
        let node = self.alloc(ExprKind::If);
        self.tree.set_node(node, keys::THIS, cond);
        self.tree.set_node(node, keys::EXPRESSION, then);
        if self.eat(TokenKind::Comma) {
            let default = self.expr()?;
            self.tree.set_node(node, keys::DEFAULT, default);
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(node)
    }

    fn extract_expr(&mut self) -> PResult<ExprId> {
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let unit = self.expect_ident_text()?;
        self.expect(TokenKind::From, "FROM")?;
        let expr = self.expr()?;
        self.expect(TokenKind::RParen, "')'")?;
        let node = self.alloc(ExprKind::Extract);
        self.tree.set_text(node, keys::UNIT, unit);
        self.tree.set_node(node, keys::EXPRESSION, expr);
        Ok(node)
    }

    fn interval_expr(&mut self) -> PResult<ExprId> {
        self.bump();
        let this = self.primary()?;
        let node = self.alloc(ExprKind::Interval);
        self.tree.set_node(node, keys::THIS, this);
        if self.cur().kind.is_id_var() {
            let unit = self.bump().text;
            self.tree.set_text(node, keys::UNIT, unit);
        }
        Ok(node)
    }

    fn exists_expr(&mut self) -> PResult<ExprId> {
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let query = self.query()?;
        self.expect(TokenKind::RParen, "')'")?;
        let subquery = self.alloc(ExprKind::Subquery);
        self.tree.set_node(subquery, keys::THIS, query);
        let node = self.alloc(ExprKind::Exists);
        self.tree.set_node(node, keys::THIS, subquery);
        Ok(node)
    }

    fn known_call(&mut self, kind: ExprKind) -> PResult<ExprId> {
        self.bump();
        self.expect(TokenKind::LParen, "'('")?;
        let node = self.alloc(kind);
        let distinct = self.eat(TokenKind::Distinct);
        if distinct {
            self.tree.set_bool(node, keys::DISTINCT, true);
        }
        if kind == ExprKind::Count && self.at(TokenKind::Star) {
            self.bump();
            let star = self.alloc(ExprKind::Star);
            self.tree.set_node(node, keys::THIS, star);
        } else if !self.at(TokenKind::RParen) {
            let mut args = Vec::new();
            loop {
                args.push(self.expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.tree.set_list(node, keys::EXPRESSIONS, args);
        }
        self.expect(TokenKind::RParen, "')'")?;
        if self.eat(TokenKind::Over) {
            return self.window_over(node);
        }
        Ok(node)
    }

    /// An identifier that may turn out to be a column, a dotted
    /// `table.column`, or a function call, disambiguated by whether `(`
    /// immediately follows.
    fn column_or_call(&mut self) -> PResult<ExprId> {
        let name_token = self.bump();

        if self.at(TokenKind::LParen) {
            self.bump();
            let node = self.alloc(ExprKind::Anonymous);
            self.tree.set_text(node, keys::THIS, name_token.text);
            if !self.at(TokenKind::RParen) {
                let mut args = Vec::new();
                loop {
                    args.push(self.expr()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.tree.set_list(node, keys::EXPRESSIONS, args);
            }
            self.expect(TokenKind::RParen, "')'")?;
            if self.eat(TokenKind::Over) {
                return self.window_over(node);
            }
            return Ok(node);
        }

        if self.at(TokenKind::Dot) && self.peek_is_id_var(1) {
            self.bump();
            let table_id = self.alloc(ExprKind::Identifier);
            self.tree.set_text(table_id, keys::THIS, name_token.text);
            self.tree.set_bool(table_id, keys::QUOTED, name_token.kind == TokenKind::Identifier);
            let col_token = self.expect_ident()?;
            let col_id = self.alloc(ExprKind::Identifier);
            self.tree.set_text(col_id, keys::THIS, col_token.text);
            self.tree.set_bool(col_id, keys::QUOTED, col_token.kind == TokenKind::Identifier);
            let column = self.alloc(ExprKind::Column);
            self.tree.set_node(column, keys::THIS, col_id);
            self.tree.set_node(column, keys::TABLE, table_id);
            return Ok(column);
        }

        let ident = self.alloc(ExprKind::Identifier);
        self.tree.set_text(ident, keys::THIS, name_token.text);
        self.tree.set_bool(ident, keys::QUOTED, name_token.kind == TokenKind::Identifier);
        let column = self.alloc(ExprKind::Column);
        self.tree.set_node(column, keys::THIS, ident);
        Ok(column)
    }

    fn window_over(&mut self, func: ExprId) -> PResult<ExprId> {
        self.expect(TokenKind::LParen, "'('")?;
        let node = self.alloc(ExprKind::Window);
        self.tree.set_node(node, keys::THIS, func);

        if self.eat(TokenKind::Partition) {
            self.expect(TokenKind::By, "BY")?;
            let mut parts = Vec::new();
            loop {
                parts.push(self.expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.tree.set_list(node, "partition_by", parts);
        }
        if self.eat(TokenKind::Order) {
            self.expect(TokenKind::By, "BY")?;
            let mut order = Vec::new();
            loop {
                order.push(self.ordered_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            let order_node = self.alloc(ExprKind::Order);
            self.tree.set_list(order_node, keys::EXPRESSIONS, order);
            self.tree.set_node(node, keys::ORDER, order_node);
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(node)
    }

    fn data_type(&mut self) -> PResult<ExprId> {
        let name = self.expect_ident_text()?;
        let node = self.alloc(ExprKind::DataType);
        self.tree.set_text(node, keys::THIS, name.to_ascii_uppercase());
        if self.eat(TokenKind::LParen) {
            let mut args = Vec::new();
            loop {
                let arg_token = self.expect(TokenKind::Number, "a type parameter")?;
                let lit = self.alloc(ExprKind::Literal);
                self.tree.set_text(lit, keys::THIS, arg_token.text);
                args.push(lit);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            self.tree.set_list(node, keys::EXPRESSIONS, args);
        }
        Ok(node)
    }

    fn binary_node(&mut self, lhs: ExprId, op: &'static str, rhs: ExprId) -> ExprId {
        let node = self.alloc(ExprKind::Binary);
        self.tree.set_text(node, keys::KIND, op);
        self.tree.set_node(node, keys::THIS, lhs);
        self.tree.set_node(node, keys::EXPRESSION, rhs);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::generic::Generic;
    use crate::dialect::Dialect;
    use crate::lexer::Tokenizer;

    fn parse(sql: &str) -> (Tree, ExprId) {
        let dialect = Generic;
        let settings = dialect.tokenizer_settings();
        let tokens = Tokenizer::new(sql, &settings).tokenize().unwrap();
        let (tree, roots) = Parser::new(&tokens, sql, ErrorLevel::Immediate).parse_all().unwrap();
        (tree, roots[0])
    }

    #[test]
    fn parses_simple_select() {
        let (tree, root) = parse("SELECT 1");
        assert_eq!(tree.get(root).kind, ExprKind::Select);
    }

    #[test]
    fn parses_where_and_order() {
        let (tree, root) = parse("SELECT a FROM t WHERE a > 1 ORDER BY a DESC");
        assert!(tree.get(root).node_arg(keys::WHERE).is_some());
        assert_eq!(tree.get(root).list_arg(keys::ORDER).len(), 1);
    }

    #[test]
    fn count_star_is_typed() {
        let (tree, root) = parse("SELECT COUNT(*) FROM t");
        let proj = tree.get(root).list_arg(keys::EXPRESSIONS)[0];
        assert_eq!(tree.get(proj).kind, ExprKind::Count);
    }

    #[test]
    fn not_between_sets_flag() {
        let (tree, root) = parse("SELECT a FROM t WHERE a NOT BETWEEN 1 AND 2");
        let where_id = tree.get(root).node_arg(keys::WHERE).unwrap();
        assert_eq!(tree.get(where_id).kind, ExprKind::Between);
        assert!(tree.get(where_id).bool_arg(keys::NOT_));
    }
}
