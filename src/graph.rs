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

//! Relation compilation into plottable graphs.
//!
//! An equation that already gives `y` explicitly (`y = f(x)` or
//! `f(x) = y`) becomes an explicit graph sampled along `x`. Every other
//! relation becomes a predicate over `(x, y)` built from the difference of
//! its two sides.

use crate::ast::{InequalityKind, Relation};
use crate::compiler::{compile_binary, compile_unary};
use crate::diagnostics::SyntaxError;
use crate::env::Environment;
use crate::parser::parse_relation;
use crate::program::{BinaryFunction, UnaryFunction};
use crate::resolve::solved_for;

/// Distance from zero still treated as equal when testing equations.
pub const EQUALITY_TOLERANCE: f64 = 1e-8;

const X: &str = "x";
const Y: &str = "y";

/// How a predicate graph turns `lhs - rhs` into a truth value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruthRule {
    /// `|d| < EQUALITY_TOLERANCE`
    NearZero,
    /// `d < 0`
    Negative,
    /// `d <= 0`
    NonPositive,
    /// `d > 0`
    Positive,
    /// `d >= 0`
    NonNegative,
    /// `|d| >= EQUALITY_TOLERANCE`
    AwayFromZero,
}

impl TruthRule {
    fn for_relation(relation: &Relation) -> Self {
        match relation {
            Relation::Equation { .. } => TruthRule::NearZero,
            Relation::Inequality { kind, .. } => match kind {
                InequalityKind::LessThan => TruthRule::Negative,
                InequalityKind::LessThanOrEqual => TruthRule::NonPositive,
                InequalityKind::GreaterThan => TruthRule::Positive,
                InequalityKind::GreaterThanOrEqual => TruthRule::NonNegative,
                InequalityKind::NotEqual => TruthRule::AwayFromZero,
            },
        }
    }

    /// Applies the rule to a signed difference. `NaN` satisfies nothing.
    #[inline]
    pub fn holds(self, difference: f64) -> bool {
        match self {
            TruthRule::NearZero => difference.abs() < EQUALITY_TOLERANCE,
            TruthRule::Negative => difference < 0.0,
            TruthRule::NonPositive => difference <= 0.0,
            TruthRule::Positive => difference > 0.0,
            TruthRule::NonNegative => difference >= 0.0,
            TruthRule::AwayFromZero => difference.abs() >= EQUALITY_TOLERANCE,
        }
    }
}

/// Compiled shape of a relation.
#[derive(Debug, Clone)]
pub enum Graph {
    /// Blank input; renders nothing.
    Empty,
    /// `y` as a function of `x`.
    Explicit(UnaryFunction),
    /// Region or curve where `rule` holds for `lhs - rhs`.
    Predicate {
        difference: BinaryFunction,
        rule: TruthRule,
    },
}

/// A relation compiled for plotting, together with its source text.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    source: String,
    graph: Graph,
}

impl CompiledGraph {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.graph, Graph::Empty)
    }

    /// Returns `y` at `x` for explicit graphs, `None` otherwise.
    #[inline]
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        match &self.graph {
            Graph::Explicit(function) => Some(function.evaluate(x)),
            Graph::Empty | Graph::Predicate { .. } => None,
        }
    }

    /// Returns whether `(x, y)` lies on the graph.
    ///
    /// Explicit graphs compare against `f(x)` with [`EQUALITY_TOLERANCE`].
    #[inline]
    pub fn satisfies(&self, x: f64, y: f64) -> bool {
        match &self.graph {
            Graph::Empty => false,
            Graph::Explicit(function) => TruthRule::NearZero.holds(y - function.evaluate(x)),
            Graph::Predicate { difference, rule } => rule.holds(difference.evaluate(x, y)),
        }
    }
}

/// Compiles relation `text` over the free variables `x` and `y`.
///
/// Blank text yields an empty graph. A bare expression, an unknown name or
/// a bad call is reported as a [`SyntaxError`]; nothing partial is returned.
#[tracing::instrument(level = "debug", skip(env))]
pub fn compile_relation(text: &str, env: &Environment) -> Result<CompiledGraph, SyntaxError> {
    if text.trim().is_empty() {
        tracing::debug!("blank relation, nothing to plot");
        return Ok(CompiledGraph {
            source: text.to_string(),
            graph: Graph::Empty,
        });
    }

    let variables = [X, Y]
        .into_iter()
        .chain(env.constants().keys().map(String::as_str));
    let relation = parse_relation(text, variables, env.functions().names())?;

    let graph = if let Some(solution) = solved_for(&relation, Y) {
        let program = compile_unary(solution, X, env.constants(), env.functions())?;
        tracing::debug!(
            instructions = program.code().len(),
            max_stack_depth = program.max_stack_depth(),
            "compiled explicit graph"
        );
        Graph::Explicit(UnaryFunction::new(program))
    } else {
        let rule = TruthRule::for_relation(&relation);
        let program = compile_binary(
            &relation.difference(),
            X,
            Y,
            env.constants(),
            env.functions(),
        )?;
        tracing::debug!(
            ?rule,
            instructions = program.code().len(),
            max_stack_depth = program.max_stack_depth(),
            "compiled predicate graph"
        );
        Graph::Predicate {
            difference: BinaryFunction::new(program),
            rule,
        }
    };

    Ok(CompiledGraph {
        source: text.to_string(),
        graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_rules_match_their_operators() {
        assert!(TruthRule::NearZero.holds(5e-9));
        assert!(!TruthRule::NearZero.holds(1e-8));
        assert!(TruthRule::AwayFromZero.holds(1e-8));
        assert!(TruthRule::NonPositive.holds(0.0));
        assert!(!TruthRule::Negative.holds(0.0));
        assert!(TruthRule::NonNegative.holds(-0.0));
        assert!(!TruthRule::Positive.holds(f64::NAN));
        assert!(!TruthRule::AwayFromZero.holds(f64::NAN));
    }

    #[test]
    fn blank_text_is_an_empty_graph() {
        let graph = compile_relation("  \t\n", &Environment::standard()).expect("compile");
        assert!(graph.is_empty());
        assert_eq!(graph.evaluate(1.0), None);
        assert!(!graph.satisfies(0.0, 0.0));
    }

    #[test]
    fn mirrored_explicit_form_is_detected() {
        let graph = compile_relation("x^2 - 1 = y", &Environment::standard()).expect("compile");
        assert!(matches!(graph.graph(), Graph::Explicit(_)));
        assert_eq!(graph.evaluate(3.0), Some(8.0));
        assert!(graph.satisfies(3.0, 8.0));
        assert_eq!(graph.source(), "x^2 - 1 = y");
    }

    #[test]
    fn not_equal_uses_the_tolerance() {
        let graph = compile_relation("x != y", &Environment::standard()).expect("compile");
        assert!(matches!(
            graph.graph(),
            Graph::Predicate {
                rule: TruthRule::AwayFromZero,
                ..
            }
        ));
        assert!(!graph.satisfies(1.0, 1.0 + 1e-9));
        assert!(graph.satisfies(1.0, 1.1));
    }

    #[test]
    fn bare_expressions_are_rejected() {
        let err = compile_relation("x + 1", &Environment::standard()).expect_err("no relation");
        assert_eq!(err.kind, crate::ErrorKind::Syntax);
    }
}
