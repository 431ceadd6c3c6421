/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Expression parser.
//!
//! Recursive descent over the token stream produced by [`super::lexer`].
//! Precedence, loosest first: relation, `+ -`, `* /` and juxtaposition,
//! unary `-`, `^` (right-associative), superscript exponents, primaries.

use crate::ast::{BinOp, Expr, Formula, InequalityKind, Relation, SourceSpan};
use crate::diagnostics::SyntaxError;

use super::lexer::{Token, TokenKind};

/// Nesting limit for parentheses, bars, unary chains and exponents.
const MAX_NESTING: usize = 128;

/// Relational operator found between the two sides of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelOp {
    Equals,
    Inequality(InequalityKind),
}

/// Parsed formula plus where its relational operator sat, if any.
pub(super) struct ParsedFormula {
    pub(super) formula: Formula,
    pub(super) relation_span: Option<SourceSpan>,
}

/// Cursor over lexed tokens.
pub(super) struct Parser<'t> {
    source: &'t str,
    tokens: &'t [Token],
    pos: usize,
    // Open `|` groups in the current parenthesis level.
    abs_depth: usize,
    nesting: usize,
}

impl<'t> Parser<'t> {
    pub(super) fn new(source: &'t str, tokens: &'t [Token]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            abs_depth: 0,
            nesting: 0,
        }
    }

    /// Parses `expr [relop expr]` and requires the whole input to be used.
    pub(super) fn formula(&mut self) -> Result<ParsedFormula, SyntaxError> {
        let lhs = self.expr()?;
        let Some((op, op_span)) = self.relational() else {
            self.expect_end()?;
            return Ok(ParsedFormula {
                formula: Formula::Expr(lhs),
                relation_span: None,
            });
        };

        let rhs = self.expr()?;
        if self.relational().is_some() {
            self.pos -= 1;
            return Err(self.error_here(
                "Syntax error: only one relational operator is allowed",
            ));
        }
        self.expect_end()?;

        let relation = match op {
            RelOp::Equals => Relation::equation(lhs, rhs),
            RelOp::Inequality(kind) => Relation::inequality(lhs, rhs, kind),
        };
        Ok(ParsedFormula {
            formula: Formula::Relation(relation),
            relation_span: Some(op_span),
        })
    }

    /// Top-level expression parser.
    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        self.descend()?;
        let expr = self.parse_add_sub()?;
        self.nesting -= 1;
        Ok(expr)
    }

    /// Parses left-associative `+`/`-`.
    fn parse_add_sub(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_mul_div()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Subtract,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_mul_div()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// Parses left-associative `*`/`/` and implicit multiplication.
    fn parse_mul_div(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let (op, right) = match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    (BinOp::Multiply, self.parse_unary()?)
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    (BinOp::Divide, self.parse_unary()?)
                }
                // `2x`, `x(x+1)`, `3|x|`: the factor binds at power level,
                // so `2x^2` is `2*(x^2)` and `x -1` stays a subtraction.
                _ if self.starts_implicit_factor() => (BinOp::Multiply, self.parse_power()?),
                _ => break,
            };
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    /// Parses unary minus chains like `--x`.
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if self.peek_kind() == Some(&TokenKind::Minus) {
            self.pos += 1;
            self.descend()?;
            let inner = self.parse_unary()?;
            self.nesting -= 1;
            return Ok(Expr::negate(inner));
        }
        self.parse_power()
    }

    /// Parses `base ^ exponent`; the exponent may itself be signed or a power.
    fn parse_power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.parse_postfix()?;
        if self.peek_kind() != Some(&TokenKind::Caret) {
            return Ok(base);
        }
        self.pos += 1;
        self.descend()?;
        let exponent = self.parse_unary()?;
        self.nesting -= 1;
        Ok(Expr::pow(base, exponent))
    }

    /// Parses trailing superscript exponents (`x²`, `x²³`, `x⁻¹`).
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        while let Some(exponent) = self.superscript() {
            expr = Expr::pow(expr, Expr::number(exponent));
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some(token) = self.advance() else {
            return Err(self.error_at_end("Syntax error: unexpected end of input"));
        };
        match &token.kind {
            TokenKind::Number(value) => Ok(Expr::number(*value)),
            TokenKind::Variable(name) => Ok(Expr::variable(name.clone())),
            TokenKind::Function(name) => {
                // `sin²(x)` squares the call result.
                let mut exponents = Vec::new();
                while let Some(exponent) = self.superscript() {
                    exponents.push(exponent);
                }
                if self.peek_kind() != Some(&TokenKind::LParen) {
                    return Err(self.error_here(format!(
                        "Syntax error: expected '(' after function '{name}'"
                    )));
                }
                let arguments = self.call_arguments()?;
                let call = Expr::call(name.clone(), arguments);
                Ok(exponents
                    .into_iter()
                    .fold(call, |acc, exponent| Expr::pow(acc, Expr::number(exponent))))
            }
            TokenKind::Unregistered(name) => {
                if self.peek_kind() == Some(&TokenKind::LParen) {
                    let arguments = self.call_arguments()?;
                    Ok(Expr::call(name.clone(), arguments))
                } else {
                    Ok(Expr::variable(name.clone()))
                }
            }
            TokenKind::Ambiguous(name) => Err(self.error_at(
                token,
                format!("Syntax error: '{name}' is registered as both a variable and a function"),
            )),
            TokenKind::LParen => {
                let saved = std::mem::take(&mut self.abs_depth);
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                self.abs_depth = saved;
                Ok(inner)
            }
            TokenKind::Bar => {
                self.abs_depth += 1;
                let inner = self.expr()?;
                self.expect(&TokenKind::Bar, "closing '|'")?;
                self.abs_depth -= 1;
                Ok(Expr::abs(inner))
            }
            TokenKind::Superscript(_) => Err(self.error_at(
                token,
                "Syntax error: superscript exponent without a base",
            )),
            _ => Err(self.error_at(
                token,
                format!("Syntax error: unexpected '{}'", token.text),
            )),
        }
    }

    /// Parses `( [expr {, expr}] )` after a function name.
    fn call_arguments(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let saved = std::mem::take(&mut self.abs_depth);
        let mut arguments = Vec::new();
        if self.peek_kind() != Some(&TokenKind::RParen) {
            loop {
                arguments.push(self.expr()?);
                if self.peek_kind() == Some(&TokenKind::Comma) {
                    self.pos += 1;
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')' or ','")?;
        self.abs_depth = saved;
        Ok(arguments)
    }

    /// Returns whether the next token can start an implicitly multiplied
    /// factor.
    fn starts_implicit_factor(&self) -> bool {
        match self.peek_kind() {
            Some(
                TokenKind::Number(_)
                | TokenKind::Variable(_)
                | TokenKind::Function(_)
                | TokenKind::Ambiguous(_)
                | TokenKind::Unregistered(_)
                | TokenKind::LParen,
            ) => true,
            // Inside `|...|` a bar closes the group instead of opening one.
            Some(TokenKind::Bar) => self.abs_depth == 0,
            _ => false,
        }
    }

    fn relational(&mut self) -> Option<(RelOp, SourceSpan)> {
        let token = self.peek()?;
        let op = match token.kind {
            TokenKind::Equals => RelOp::Equals,
            TokenKind::Inequality(kind) => RelOp::Inequality(kind),
            _ => return None,
        };
        let span = token.span.clone();
        self.pos += 1;
        Some((op, span))
    }

    fn superscript(&mut self) -> Option<f64> {
        match self.peek_kind() {
            Some(TokenKind::Superscript(exponent)) => {
                let exponent = *exponent;
                self.pos += 1;
                Some(exponent)
            }
            _ => None,
        }
    }

    fn descend(&mut self) -> Result<(), SyntaxError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.error_here("Syntax error: expression is nested too deeply"));
        }
        Ok(())
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(token) if &token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.error_at(
                token,
                format!("Syntax error: expected {what}, found '{}'", token.text),
            )),
            None => Err(self.error_at_end(format!("Syntax error: expected {what}"))),
        }
    }

    fn expect_end(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error_at(
                token,
                format!("Syntax error: unexpected '{}'", token.text),
            )),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError::from_span(message, self.source, &token.span)
    }

    /// Anchors an error at the next token, or at the end of input.
    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        match self.peek() {
            Some(next) => self.error_at(next, message),
            None => self.error_at_end(message),
        }
    }

    fn error_at_end(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::from_span(message, self.source, &end_of_input(self.source))
    }
}

/// Zero-width span just past the last character of `source`.
pub(super) fn end_of_input(source: &str) -> SourceSpan {
    let line = source.matches('\n').count() + 1;
    let last_line = source.rsplit('\n').next().unwrap_or("");
    SourceSpan {
        start: source.len(),
        end: source.len(),
        line,
        column: last_line.chars().count() + 1,
    }
}
