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

//! Explicit-form detection for equations.

use crate::ast::{Expr, Relation};

/// Returns the side of `relation` that gives `variable` explicitly.
///
/// Succeeds when `relation` is an equation, one side is exactly
/// `Variable(variable)` and the other side never mentions `variable`. The
/// left side is checked first. No rearranging or folding is attempted, so
/// `2y = x` is not solved.
pub fn solved_for<'a>(relation: &'a Relation, variable: &str) -> Option<&'a Expr> {
    let Relation::Equation { lhs, rhs } = relation else {
        return None;
    };
    let is_target = |side: &Expr| matches!(side, Expr::Variable(name) if name == variable);
    if is_target(lhs) && rhs.is_independent_of(variable) {
        return Some(rhs);
    }
    if is_target(rhs) && lhs.is_independent_of(variable) {
        return Some(lhs);
    }
    None
}
