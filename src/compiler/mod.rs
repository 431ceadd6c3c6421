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

//! Lowering from folded trees into stack-machine programs.
//!
//! The tree is constant-folded first (parameters shadow constants), then
//! walked once with an explicit work stack. Every emitted value records the
//! operand-stack depth it needed, and the root's depth becomes
//! [`Program::max_stack_depth`].

mod builtins;
mod context;
mod expr;

use crate::ast::Expr;
use crate::diagnostics::SyntaxError;
use crate::env::{Builtin, EnvFunction, Environment, FunctionRegistry, NativeFunction};
use crate::fold::fold_with;
use crate::program::{BinaryFunction, Instruction, Program, UnaryFunction};
use std::collections::HashMap;
use thiserror::Error;

use self::context::LowerContext;

/// Semantic failure while lowering a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A variable is neither a parameter nor a constant.
    #[error("unresolved variable '{0}'")]
    UnresolvedVariable(String),
    /// A called function is not registered.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    /// A function rejected the number of arguments it was given.
    #[error("invalid use of {name}() with {found} arguments")]
    ArityMismatch { name: String, found: usize },
}

/// Compiles `expr` as a function of `param`.
pub fn compile_unary(
    expr: &Expr,
    param: &str,
    constants: &HashMap<String, f64>,
    functions: &FunctionRegistry,
) -> Result<Program, CompileError> {
    compile_program(expr, &[param], constants, functions)
}

/// Compiles `expr` as a function of `(p1, p2)`.
pub fn compile_binary(
    expr: &Expr,
    p1: &str,
    p2: &str,
    constants: &HashMap<String, f64>,
    functions: &FunctionRegistry,
) -> Result<Program, CompileError> {
    compile_program(expr, &[p1, p2], constants, functions)
}

/// Parses `text` as an expression of `variable` and compiles it.
pub fn compile_unary_function(
    text: &str,
    variable: &str,
    env: &Environment,
) -> Result<UnaryFunction, SyntaxError> {
    let expr = parse_with_params(text, &[variable], env)?;
    let program = compile_unary(&expr, variable, env.constants(), env.functions())?;
    Ok(UnaryFunction::new(program))
}

/// Parses `text` as an expression of `(v1, v2)` and compiles it.
pub fn compile_binary_function(
    text: &str,
    v1: &str,
    v2: &str,
    env: &Environment,
) -> Result<BinaryFunction, SyntaxError> {
    let expr = parse_with_params(text, &[v1, v2], env)?;
    let program = compile_binary(&expr, v1, v2, env.constants(), env.functions())?;
    Ok(BinaryFunction::new(program))
}

fn parse_with_params(text: &str, params: &[&str], env: &Environment) -> Result<Expr, SyntaxError> {
    let variables = params
        .iter()
        .copied()
        .chain(env.constants().keys().map(String::as_str));
    crate::parser::parse_expr(text, variables, env.functions().names())
}

fn compile_program(
    expr: &Expr,
    params: &[&str],
    constants: &HashMap<String, f64>,
    functions: &FunctionRegistry,
) -> Result<Program, CompileError> {
    let lookup = |name: &str| {
        if params.contains(&name) {
            None
        } else {
            constants.get(name).copied()
        }
    };
    let folded = fold_with(expr, &lookup, functions);

    let mut ctx = LowerContext::new(params, constants, functions);
    let depth = ctx.lower_expr(&folded)?;
    let program = ctx.finish(depth);
    tracing::trace!(
        arity = program.arity(),
        instructions = program.code().len(),
        max_stack_depth = program.max_stack_depth(),
        "compiled program"
    );
    Ok(program)
}
