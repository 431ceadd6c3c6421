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

//! Tokenizer.
//!
//! Identifiers are classified while lexing against caller-supplied name
//! sets. The longest registered name that prefixes the remaining input wins,
//! which is what lets `xy` read as `x` followed by `y` when both are
//! variables. Runs of identifier characters that start with no registered
//! name become [`TokenKind::Unregistered`] and are resolved (or rejected)
//! later. So does a run followed by `(` that registered names cannot spell
//! out whole: `sinh(x)` is a call to an unknown `sinh`, not `sin` times `h`.

use crate::ast::{InequalityKind, SourceSpan, Span};
use crate::diagnostics::{ErrorKind, SyntaxError};
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, digit0, digit1, multispace0},
    combinator::{cut, map, map_opt, map_res, opt, recognize, value},
    error::{ErrorKind as NomErrorKind, ParseError, VerboseError, VerboseErrorKind, context},
    sequence::{pair, preceded},
};

use super::PResult;

/// Token payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Decimal literal.
    Number(f64),
    /// Registered variable or constant name.
    Variable(String),
    /// Registered function name.
    Function(String),
    /// Name registered both as a variable and as a function.
    Ambiguous(String),
    /// Identifier run matching no registered name.
    Unregistered(String),
    /// Superscript exponent run (`²`, `⁻¹`, ...), already decoded.
    Superscript(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Bar,
    /// `=`
    Equals,
    /// `<`, `<=`/`≤`, `>`, `>=`/`≥`, `!=`/`≠`
    Inequality(InequalityKind),
}

/// One lexed token with its literal text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameClass {
    Variable,
    Function,
    Ambiguous,
}

/// Registered names, longest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct NameTable {
    entries: Vec<(String, NameClass)>,
}

impl NameTable {
    pub(crate) fn new<V, F>(variables: V, functions: F) -> Self
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let mut entries: Vec<(String, NameClass)> = Vec::new();
        for name in variables {
            let name = name.as_ref();
            if !name.is_empty() && !entries.iter().any(|(n, _)| n == name) {
                entries.push((name.to_string(), NameClass::Variable));
            }
        }
        for name in functions {
            let name = name.as_ref();
            if name.is_empty() {
                continue;
            }
            match entries.iter_mut().find(|(n, _)| n == name) {
                Some((_, class)) if *class == NameClass::Variable => {
                    *class = NameClass::Ambiguous;
                }
                Some(_) => {}
                None => entries.push((name.to_string(), NameClass::Function)),
            }
        }
        // Longest match first; ties broken by name so lexing is deterministic.
        entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { entries }
    }

    /// Returns whether `word` splits entirely into registered names.
    fn spells(&self, word: &str) -> bool {
        let mut reachable = vec![false; word.len() + 1];
        reachable[0] = true;
        for start in 0..word.len() {
            // Only offsets reached by whole names are char boundaries.
            if !reachable[start] {
                continue;
            }
            for (name, _) in &self.entries {
                if word[start..].starts_with(name.as_str()) {
                    reachable[start + name.len()] = true;
                }
            }
        }
        reachable[word.len()]
    }
}

/// Line and column of the previous token start.
///
/// Columns are counted from the previous token rather than the start of the
/// line, which keeps long single-line inputs linear.
struct ColumnCursor {
    offset: usize,
    line: u32,
    column: usize,
}

impl ColumnCursor {
    fn new() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn column_of(&mut self, at: Span<'_>, source: &str) -> usize {
        let offset = at.location_offset();
        let line = at.location_line();
        if line == self.line {
            self.column += source[self.offset..offset].chars().count();
        } else {
            self.column = at.get_utf8_column();
        }
        self.offset = offset;
        self.line = line;
        self.column
    }
}

/// Splits `source` into tokens.
pub(crate) fn tokenize(source: &str, names: &NameTable) -> Result<Vec<Token>, SyntaxError> {
    let mut input = Span::new(source);
    let mut tokens = Vec::new();
    let mut columns = ColumnCursor::new();
    loop {
        input = match multispace0::<_, VerboseError<Span<'_>>>(input) {
            Ok((rest, _)) => rest,
            Err(_) => input,
        };
        if input.fragment().is_empty() {
            break;
        }
        match token(input, names) {
            Ok((rest, kind)) => {
                let start = input.location_offset();
                let end = rest.location_offset();
                let span = SourceSpan {
                    start,
                    end,
                    line: input.location_line() as usize,
                    column: columns.column_of(input, source),
                };
                tokens.push(Token {
                    kind,
                    text: source[start..end].to_string(),
                    span,
                });
                input = rest;
            }
            // `cut` points inside a token (malformed superscript run).
            Err(nom::Err::Failure(err)) => return Err(lex_error_to_syntax_error(err, source)),
            Err(_) => return Err(unexpected_character(input, source)),
        }
    }
    Ok(tokens)
}

fn lex_error_to_syntax_error(err: VerboseError<Span<'_>>, source: &str) -> SyntaxError {
    // Prefer the innermost context label when one was recorded.
    let anchor = err
        .errors
        .iter()
        .find(|(_, kind)| matches!(kind, VerboseErrorKind::Context(_)))
        .or_else(|| err.errors.first());
    let Some((span, kind)) = anchor else {
        return SyntaxError::message_only(ErrorKind::Syntax, "Syntax error");
    };
    let detail = match kind {
        VerboseErrorKind::Context(ctx) => format!("Syntax error: expected {ctx}"),
        VerboseErrorKind::Char(c) => format!("Syntax error: expected '{c}'"),
        VerboseErrorKind::Nom(kind) => format!("Syntax error near {kind:?}"),
    };
    let span = SourceSpan::from_bounds(*span, *span);
    SyntaxError::from_span(detail, source, &span)
}

fn unexpected_character(at: Span<'_>, source: &str) -> SyntaxError {
    let found = at.fragment().chars().next().unwrap_or(' ');
    let span = SourceSpan {
        start: at.location_offset(),
        end: at.location_offset() + found.len_utf8(),
        line: at.location_line() as usize,
        column: at.get_utf8_column(),
    };
    SyntaxError::from_span(
        format!("Syntax error: unexpected character '{found}'"),
        source,
        &span,
    )
}

/// Lexes one token at the current position (whitespace already skipped).
fn token<'a>(input: Span<'a>, names: &NameTable) -> PResult<'a, TokenKind> {
    alt((
        |i: Span<'a>| unregistered_call(i, names),
        |i: Span<'a>| registered_name(i, names),
        number,
        superscript,
        relational,
        punctuation,
        unregistered_identifier,
    ))
    .parse(input)
}

/// Matches an identifier run used as a call that registered names cannot
/// spell out, so the compiler reports it as an unknown function.
fn unregistered_call<'a>(input: Span<'a>, names: &NameTable) -> PResult<'a, TokenKind> {
    let (rest, kind) = unregistered_identifier(input)?;
    let called = rest
        .fragment()
        .trim_start_matches([' ', '\t', '\r', '\n'])
        .starts_with('(');
    match kind {
        TokenKind::Unregistered(run) if called && !names.spells(&run) => {
            Ok((rest, TokenKind::Unregistered(run)))
        }
        _ => Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            NomErrorKind::Verify,
        ))),
    }
}

/// Matches the longest registered name prefixing the input.
fn registered_name<'a>(input: Span<'a>, names: &NameTable) -> PResult<'a, TokenKind> {
    for (name, class) in &names.entries {
        if let Ok((rest, _)) = tag::<_, _, VerboseError<Span<'a>>>(name.as_str())(input) {
            let kind = match class {
                NameClass::Variable => TokenKind::Variable(name.clone()),
                NameClass::Function => TokenKind::Function(name.clone()),
                NameClass::Ambiguous => TokenKind::Ambiguous(name.clone()),
            };
            return Ok((rest, kind));
        }
    }
    Err(nom::Err::Error(VerboseError::from_error_kind(
        input,
        NomErrorKind::Tag,
    )))
}

/// Parses `digits[.digits]` or `.digits`.
///
/// No sign and no exponent suffix: `-` is always an operator and `2e`
/// stays a juxtaposition with the constant `e`.
fn number(input: Span<'_>) -> PResult<'_, TokenKind> {
    map_res(
        recognize(alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        ))),
        |s: Span<'_>| s.fragment().parse::<f64>().map(TokenKind::Number),
    )
    .parse(input)
}

/// Parses a superscript exponent run with optional leading `⁻`.
fn superscript(input: Span<'_>) -> PResult<'_, TokenKind> {
    alt((
        map(
            preceded(
                char('⁻'),
                // A lone `⁻` is malformed rather than "not a superscript".
                cut(context(
                    "superscript digit after '⁻'",
                    take_while1(is_superscript_digit),
                )),
            ),
            |digits: Span<'_>| TokenKind::Superscript(-superscript_value(digits)),
        ),
        map(take_while1(is_superscript_digit), |digits: Span<'_>| {
            TokenKind::Superscript(superscript_value(digits))
        }),
    ))
    .parse(input)
}

fn superscript_value(digits: Span<'_>) -> f64 {
    digits
        .fragment()
        .chars()
        .filter_map(superscript_digit)
        .fold(0.0, |acc, digit| acc * 10.0 + digit)
}

fn is_superscript_digit(c: char) -> bool {
    superscript_digit(c).is_some()
}

fn superscript_digit(c: char) -> Option<f64> {
    let digit = match c {
        '⁰' => 0.0,
        '¹' => 1.0,
        '²' => 2.0,
        '³' => 3.0,
        '⁴' => 4.0,
        '⁵' => 5.0,
        '⁶' => 6.0,
        '⁷' => 7.0,
        '⁸' => 8.0,
        '⁹' => 9.0,
        _ => return None,
    };
    Some(digit)
}

/// Parses relational operators, two-character spellings first.
fn relational(input: Span<'_>) -> PResult<'_, TokenKind> {
    use InequalityKind::*;
    alt((
        value(TokenKind::Inequality(LessThanOrEqual), alt((tag("<="), tag("≤")))),
        value(TokenKind::Inequality(GreaterThanOrEqual), alt((tag(">="), tag("≥")))),
        value(TokenKind::Inequality(NotEqual), alt((tag("!="), tag("≠")))),
        value(TokenKind::Inequality(LessThan), tag("<")),
        value(TokenKind::Inequality(GreaterThan), tag(">")),
        value(TokenKind::Equals, tag("=")),
    ))
    .parse(input)
}

/// Parses single-character operators and grouping punctuation.
fn punctuation(input: Span<'_>) -> PResult<'_, TokenKind> {
    map_opt(anychar, |c| {
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' | '−' => TokenKind::Minus,
            '*' | '×' | '·' => TokenKind::Star,
            '/' | '÷' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '|' => TokenKind::Bar,
            _ => return None,
        };
        Some(kind)
    })
    .parse(input)
}

/// Parses identifier runs that matched no registered name.
fn unregistered_identifier(input: Span<'_>) -> PResult<'_, TokenKind> {
    map(
        recognize(pair(
            take_while1(is_ident_start),
            take_while(is_ident_continue),
        )),
        |s: Span<'_>| TokenKind::Unregistered(s.fragment().to_string()),
    )
    .parse(input)
}

/// Returns whether a char can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Returns whether a char can continue an identifier.
///
/// Only ASCII digits: superscript digits are numeric too and must stay
/// exponents.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphabetic() || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str, variables: &[&str], functions: &[&str]) -> Vec<TokenKind> {
        let names = NameTable::new(variables, functions);
        tokenize(source, &names)
            .expect("tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn splits_registered_names_by_longest_match() {
        assert_eq!(
            kinds("xy", &["x", "y"], &[]),
            [
                TokenKind::Variable("x".into()),
                TokenKind::Variable("y".into())
            ]
        );
        assert_eq!(
            kinds("exp(ex)", &["e", "x"], &["exp"]),
            [
                TokenKind::Function("exp".into()),
                TokenKind::LParen,
                TokenKind::Variable("e".into()),
                TokenKind::Variable("x".into()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn classifies_ambiguous_and_unregistered_names() {
        assert_eq!(
            kinds("f + foo", &["f"], &["f"]),
            [
                TokenKind::Ambiguous("f".into()),
                TokenKind::Plus,
                TokenKind::Unregistered("foo".into()),
            ]
        );
    }

    #[test]
    fn unspellable_runs_before_a_paren_stay_whole() {
        let funcs = ["sin", "atan"];
        assert_eq!(
            kinds("sinh(x)", &["x"], &funcs),
            [
                TokenKind::Unregistered("sinh".into()),
                TokenKind::LParen,
                TokenKind::Variable("x".into()),
                TokenKind::RParen,
            ]
        );
        assert_eq!(
            kinds("atan2 (x", &["x"], &funcs)[0],
            TokenKind::Unregistered("atan2".into())
        );
        // Runs that registered names spell out still split.
        assert_eq!(
            kinds("xy(1)", &["x", "y"], &funcs)[..2],
            [
                TokenKind::Variable("x".into()),
                TokenKind::Variable("y".into())
            ]
        );
        assert_eq!(
            kinds("sin(x)", &["x"], &funcs)[0],
            TokenKind::Function("sin".into())
        );
        // Without a paren the prefix match is unchanged.
        assert_eq!(
            kinds("sinh", &[], &funcs)[0],
            TokenKind::Function("sin".into())
        );
    }

    #[test]
    fn decodes_numbers_and_superscripts() {
        assert_eq!(
            kinds("2.5x⁻¹² .5", &["x"], &[]),
            [
                TokenKind::Number(2.5),
                TokenKind::Variable("x".into()),
                TokenKind::Superscript(-12.0),
                TokenKind::Number(0.5),
            ]
        );
    }

    #[test]
    fn lexes_relational_spellings() {
        use InequalityKind::*;
        assert_eq!(
            kinds("<= ≤ >= ≥ != ≠ < > =", &[], &[]),
            [
                TokenKind::Inequality(LessThanOrEqual),
                TokenKind::Inequality(LessThanOrEqual),
                TokenKind::Inequality(GreaterThanOrEqual),
                TokenKind::Inequality(GreaterThanOrEqual),
                TokenKind::Inequality(NotEqual),
                TokenKind::Inequality(NotEqual),
                TokenKind::Inequality(LessThan),
                TokenKind::Inequality(GreaterThan),
                TokenKind::Equals,
            ]
        );
    }

    #[test]
    fn records_text_and_positions() {
        let names = NameTable::new(["x"], ["sqrt"]);
        let tokens = tokenize("  sqrt(x)\n+ 10", &names).expect("tokenize");
        assert_eq!(tokens[0].text, "sqrt");
        assert_eq!(tokens[0].span.start, 2);
        assert_eq!(tokens[0].span.column, 3);
        let last = tokens.last().expect("tokens");
        assert_eq!(last.text, "10");
        assert_eq!(last.span.line, 2);
        assert_eq!(last.span.column, 3);
    }

    #[test]
    fn columns_count_characters_on_long_lines() {
        let names = NameTable::new(["x"], Vec::<String>::new());
        let source = format!("{} ÷ x\n  x", vec!["x"; 5000].join(" + "));
        let tokens = tokenize(&source, &names).expect("tokenize");
        let divide = &tokens[tokens.len() - 3];
        assert_eq!(divide.text, "÷");
        assert_eq!(divide.span.column, 5000 * 4 - 3 + 2);
        assert_eq!(divide.span.start, 5000 * 4 - 3 + 1);
        let after = &tokens[tokens.len() - 2];
        assert_eq!(after.span.column, divide.span.column + 2);
        assert_eq!(after.span.start, divide.span.start + '÷'.len_utf8() + 1);
        let last = tokens.last().expect("tokens");
        assert_eq!((last.span.line, last.span.column), (2, 3));
    }

    #[test]
    fn rejects_malformed_superscript_run() {
        let names = NameTable::new(["x"], Vec::<String>::new());
        let err = tokenize("x⁻ + 1", &names).expect_err("lone minus glyph");
        assert!(err.message.contains("superscript digit"), "{}", err.message);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn rejects_unknown_characters() {
        let names = NameTable::new(["x"], Vec::<String>::new());
        let err = tokenize("x $ 1", &names).expect_err("bad char");
        assert_eq!(err.message, "Syntax error: unexpected character '$'");
        assert_eq!(err.offset, Some(2));
        assert_eq!(err.pointer, "  ^");
    }
}
