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

//! Constant folding.

use crate::ast::Expr;
use crate::env::FunctionRegistry;
use std::collections::HashMap;

/// Replaces every subtree whose value is fixed by `constants` with a
/// [`Expr::Number`].
///
/// Calls fold only when the function is registered, accepts the argument
/// count and supports constant evaluation. Anything else is left for the
/// compiler to report.
pub fn fold(expr: &Expr, constants: &HashMap<String, f64>, functions: &FunctionRegistry) -> Expr {
    fold_with(expr, &|name| constants.get(name).copied(), functions)
}

/// Returns the value of `expr` when it folds to a single number.
pub fn constant_value(
    expr: &Expr,
    constants: &HashMap<String, f64>,
    functions: &FunctionRegistry,
) -> Option<f64> {
    match fold(expr, constants, functions) {
        Expr::Number(value) => Some(value),
        _ => None,
    }
}

/// Folds with an arbitrary constant lookup (used to let parameters shadow
/// constants).
///
/// Walks the tree in post-order with an explicit stack so long operator
/// chains do not grow the call stack.
pub(crate) fn fold_with(
    expr: &Expr,
    lookup: &dyn Fn(&str) -> Option<f64>,
    functions: &FunctionRegistry,
) -> Expr {
    let mut folded: Vec<Expr> = Vec::new();
    for node in expr.post_order() {
        let result = match node {
            Expr::Number(value) => Expr::Number(*value),
            Expr::Variable(name) => lookup(name).map_or_else(|| node.clone(), Expr::Number),
            Expr::Negate(_) => match pop(&mut folded) {
                Expr::Number(value) => Expr::Number(-value),
                other => Expr::negate(other),
            },
            Expr::AbsoluteValue(_) => match pop(&mut folded) {
                Expr::Number(value) => Expr::Number(value.abs()),
                other => Expr::abs(other),
            },
            Expr::BinaryOp { kind, .. } => {
                let right = pop(&mut folded);
                let left = pop(&mut folded);
                match (left, right) {
                    (Expr::Number(l), Expr::Number(r)) => Expr::Number(kind.apply(l, r)),
                    (left, right) => Expr::binary(*kind, left, right),
                }
            }
            Expr::FunctionCall { name, arguments } => {
                let base = folded.len().saturating_sub(arguments.len());
                let arguments = folded.split_off(base);
                fold_call(name, arguments, functions)
            }
        };
        folded.push(result);
    }
    pop(&mut folded)
}

fn fold_call(name: &str, arguments: Vec<Expr>, functions: &FunctionRegistry) -> Expr {
    let foldable = functions.get(name).filter(|function| {
        function.supports_constant_eval() && function.accepts_arity(arguments.len())
    });
    if let Some(function) = foldable {
        let values: Option<Vec<f64>> = arguments
            .iter()
            .map(|arg| match arg {
                Expr::Number(value) => Some(*value),
                _ => None,
            })
            .collect();
        if let Some(values) = values {
            return Expr::Number(function.evaluate(&values));
        }
    }
    Expr::call(name, arguments)
}

// Post-order guarantees every operand was pushed before its parent.
fn pop(folded: &mut Vec<Expr>) -> Expr {
    folded.pop().unwrap_or(Expr::Number(f64::NAN))
}
