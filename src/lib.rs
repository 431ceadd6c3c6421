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

//! Parser, constant folder and stack-machine compiler for plottable
//! equations and inequalities.
//!
//! This crate provides:
//! - A lexer/parser for infix math with implicit multiplication, unicode
//!   superscripts, absolute-value bars and caller-registered names.
//! - A tree-walking evaluator that defines the reference semantics.
//! - Constant folding and compilation into flat stack-machine programs with
//!   a statically known stack depth.
//! - Relation compilation into explicit (`y = f(x)`) or predicate graphs.
//! - Source diagnostics with line/column/caret output.
//!
//! # Pipeline
//!
//! 1. Lex and parse text into an [`Expr`] or [`Relation`].
//! 2. Fold every constant subtree into a number.
//! 3. Lower the folded tree into a [`Program`].
//! 4. Run the program through [`Machine`] or the zero-allocation
//!    [`UnaryFunction`] / [`BinaryFunction`] wrappers.
//!
//! # Example
//!
//! ```
//! use relplot::{Environment, compile_relation};
//!
//! let env = Environment::standard();
//! let parabola = compile_relation("y = x^2", &env).unwrap();
//! assert_eq!(parabola.evaluate(3.0), Some(9.0));
//!
//! let disc = compile_relation("x^2 + y^2 <= 25", &env).unwrap();
//! assert!(disc.satisfies(3.0, 4.0));
//! assert!(!disc.satisfies(4.0, 4.0));
//! ```

mod ast;
mod compiler;
mod diagnostics;
mod env;
mod eval;
mod fold;
mod graph;
mod parser;
mod program;
mod resolve;

pub use ast::{
    BinOp, Children, Expr, Formula, InequalityKind, PostOrder, PreOrder, Relation, SourceSpan,
};
pub use compiler::{
    CompileError, compile_binary, compile_binary_function, compile_unary, compile_unary_function,
};
pub use diagnostics::{ErrorKind, SyntaxError};
pub use env::{Arity, Builtin, EnvFunction, Environment, FunctionRegistry, NativeFn, NativeFunction};
pub use eval::{EvalError, ParsedFunction, evaluate, evaluate_in};
pub use fold::{constant_value, fold};
pub use graph::{CompiledGraph, EQUALITY_TOLERANCE, Graph, TruthRule, compile_relation};
pub use parser::{
    Token, TokenKind, parse, parse_equation, parse_expr, parse_relation, tokenize,
};
pub use program::{BinaryFunction, Instruction, Machine, Program, UnaryFunction};
pub use resolve::solved_for;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod tests;
