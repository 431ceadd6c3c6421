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

//! Parser for plottable formulas.
//!
//! The grammar supports:
//! - decimal literals (`2`, `2.5`, `.5`) without sign or exponent
//! - registered variables, constants and functions, matched longest first
//! - binary `+ - * /`, right-associative `^` and unary `-`
//! - implicit multiplication by juxtaposition (`2x`, `xy`, `3(x+1)`)
//! - superscript exponents (`x²`, `x⁻¹`, `sin²(x)`)
//! - absolute value bars (`|x - 1|`)
//! - at most one relational operator (`=`, `<`, `<=`/`≤`, `>`, `>=`/`≥`,
//!   `!=`/`≠`)
//!
//! Names that are not registered still parse: followed by `(` they become a
//! call, otherwise a variable. Resolving them is left to evaluation or
//! compilation, which reports what is unknown.

mod expr;
mod lexer;

pub use self::lexer::{Token, TokenKind};

use crate::ast::{Expr, Formula, Relation, Span};
use crate::diagnostics::SyntaxError;
use nom::{IResult, error::VerboseError};

use self::expr::{Parser, end_of_input};
use self::lexer::{NameTable, tokenize as lex};

type PResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Parses `source` into an expression or a relation.
///
/// `variables` and `functions` are the names the lexer recognizes as whole
/// tokens. A name present in both sets is rejected where it is used.
#[tracing::instrument(level = "trace", skip(variables, functions))]
pub fn parse<V, F>(source: &str, variables: V, functions: F) -> Result<Formula, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    Ok(parse_formula(source, variables, functions)?.formula)
}

/// Parses `source` and requires a bare expression.
pub fn parse_expr<V, F>(source: &str, variables: V, functions: F) -> Result<Expr, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let parsed = parse_formula(source, variables, functions)?;
    match (parsed.formula, parsed.relation_span) {
        (Formula::Expr(expr), _) => Ok(expr),
        (Formula::Relation(_), Some(span)) => Err(SyntaxError::from_span(
            "Syntax error: expected an expression, found a relation",
            source,
            &span,
        )),
        (Formula::Relation(_), None) => Err(SyntaxError::message_only(
            crate::diagnostics::ErrorKind::Syntax,
            "Syntax error: expected an expression, found a relation",
        )),
    }
}

/// Parses `source` and requires a relation.
pub fn parse_relation<V, F>(
    source: &str,
    variables: V,
    functions: F,
) -> Result<Relation, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    match parse(source, variables, functions)? {
        Formula::Relation(relation) => Ok(relation),
        Formula::Expr(_) => Err(SyntaxError::from_span(
            "Syntax error: expected a relational operator",
            source,
            &end_of_input(source),
        )),
    }
}

/// Parses `source` and requires an equation (`lhs = rhs`).
///
/// The result is always [`Relation::Equation`].
pub fn parse_equation<V, F>(
    source: &str,
    variables: V,
    functions: F,
) -> Result<Relation, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let parsed = parse_formula(source, variables, functions)?;
    match (parsed.formula, parsed.relation_span) {
        (Formula::Relation(relation @ Relation::Equation { .. }), _) => Ok(relation),
        (Formula::Relation(Relation::Inequality { .. }), Some(span)) => Err(
            SyntaxError::from_span("Syntax error: expected '='", source, &span),
        ),
        _ => Err(SyntaxError::from_span(
            "Syntax error: expected '='",
            source,
            &end_of_input(source),
        )),
    }
}

/// Splits `source` into tokens against the given name sets.
pub fn tokenize<V, F>(source: &str, variables: V, functions: F) -> Result<Vec<Token>, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    lex(source, &NameTable::new(variables, functions))
}

/// Lexes the registered names into tokens, then runs the descent parser.
fn parse_formula<V, F>(
    source: &str,
    variables: V,
    functions: F,
) -> Result<expr::ParsedFormula, SyntaxError>
where
    V: IntoIterator,
    V::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let names = NameTable::new(variables, functions);
    let tokens = lex(source, &names)?;
    tracing::trace!(tokens = tokens.len(), "tokenized formula");
    Parser::new(source, &tokens).formula()
}
