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

//! Tree-walking evaluator.
//!
//! This is the reference semantics for everything else in the crate: the
//! constant folder and the stack machine use the same arithmetic helpers in
//! the same order, so their results match this evaluator bit for bit.

use crate::ast::{BinOp, Expr};
use crate::diagnostics::SyntaxError;
use crate::env::{Builtin, Environment};
use std::collections::HashMap;
use thiserror::Error;

/// Call name that squares the sine of its argument.
const SQUARED_SINE: &str = "sin²";

/// Failure while evaluating a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("invalid use of {name}() with {found} arguments")]
    ArityMismatch { name: String, found: usize },
}

/// Evaluates `expr` with variables taken from `bindings`.
///
/// Calls dispatch on the built-in catalogue (see [`Builtin`]) plus the `√`
/// and `sin²` spellings.
pub fn evaluate(expr: &Expr, bindings: &HashMap<String, f64>) -> Result<f64, EvalError> {
    walk(expr, |name| bindings.get(name).copied(), call_builtin)
}

/// Evaluates `expr` against `bindings` first, then the constants and
/// functions of `env`.
pub fn evaluate_in(
    expr: &Expr,
    bindings: &HashMap<String, f64>,
    env: &Environment,
) -> Result<f64, EvalError> {
    walk(
        expr,
        |name| bindings.get(name).copied().or_else(|| env.constant(name)),
        |name, args| call_env(env, name, args),
    )
}

/// Post-order walk with an explicit value stack.
fn walk<V, C>(expr: &Expr, lookup: V, call: C) -> Result<f64, EvalError>
where
    V: Fn(&str) -> Option<f64>,
    C: Fn(&str, &[f64]) -> Result<f64, EvalError>,
{
    let mut stack: Vec<f64> = Vec::new();
    for node in expr.post_order() {
        let value = match node {
            Expr::Number(value) => *value,
            Expr::Variable(name) => {
                lookup(name).ok_or_else(|| EvalError::UnboundVariable(name.clone()))?
            }
            Expr::Negate(_) => -pop(&mut stack),
            Expr::AbsoluteValue(_) => pop(&mut stack).abs(),
            Expr::BinaryOp { kind, .. } => {
                let right = pop(&mut stack);
                let left = pop(&mut stack);
                kind.apply(left, right)
            }
            Expr::FunctionCall { name, arguments } => {
                let start = stack.len().saturating_sub(arguments.len());
                let value = call(name, &stack[start..])?;
                stack.truncate(start);
                value
            }
        };
        stack.push(value);
    }
    Ok(pop(&mut stack))
}

// Post-order guarantees every operand was pushed first.
fn pop(stack: &mut Vec<f64>) -> f64 {
    stack.pop().unwrap_or(f64::NAN)
}

fn call_builtin(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    if name == SQUARED_SINE {
        let [arg] = args else {
            return Err(arity_mismatch(name, args));
        };
        return Ok(BinOp::Power.apply(arg.sin(), 2.0));
    }
    let builtin =
        Builtin::from_name(name).ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
    if !builtin.accepts_arity(args.len()) {
        return Err(arity_mismatch(name, args));
    }
    Ok(builtin.apply(args))
}

fn call_env(env: &Environment, name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let function = env
        .functions()
        .get(name)
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
    if !function.accepts_arity(args.len()) {
        return Err(arity_mismatch(name, args));
    }
    Ok(function.evaluate(args))
}

fn arity_mismatch(name: &str, args: &[f64]) -> EvalError {
    EvalError::ArityMismatch {
        name: name.to_string(),
        found: args.len(),
    }
}

/// A one-variable function evaluated by walking its tree on every call.
///
/// Slower than [`crate::UnaryFunction`] but needs no compilation step, so
/// unresolved names only show up when a point is evaluated.
#[derive(Debug, Clone)]
pub struct ParsedFunction {
    expr: Expr,
    variable: String,
    env: Environment,
}

impl ParsedFunction {
    pub fn new(expr: Expr, variable: impl Into<String>, env: Environment) -> Self {
        Self {
            expr,
            variable: variable.into(),
            env,
        }
    }

    /// Parses `text` as an expression of `variable` over `env`.
    pub fn parse(text: &str, variable: &str, env: &Environment) -> Result<Self, SyntaxError> {
        let variables = std::iter::once(variable).chain(env.constants().keys().map(String::as_str));
        let expr = crate::parser::parse_expr(text, variables, env.functions().names())?;
        Ok(Self::new(expr, variable, env.clone()))
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Evaluates the function at `value`. The variable shadows constants.
    pub fn evaluate(&self, value: f64) -> Result<f64, EvalError> {
        walk(
            &self.expr,
            |name| {
                if name == self.variable {
                    Some(value)
                } else {
                    self.env.constant(name)
                }
            },
            |name, args| call_env(&self.env, name, args),
        )
    }
}
