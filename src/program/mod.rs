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

//! Stack-machine programs and the callables built on them.
//!
//! A [`Program`] is a flat instruction list with no jumps. Every instruction
//! pops a fixed number of operands and pushes one result, so the compiler
//! can compute the deepest the operand stack will ever get and store it on
//! the program. Evaluation then runs on a stack of exactly that size.

mod machine;

pub use machine::Machine;

use crate::ast::BinOp;
use crate::env::{Builtin, NativeFunction};
use std::fmt;
use std::sync::Arc;

use self::machine::execute;

/// Operand stacks up to this depth live on the native call stack.
const INLINE_STACK: usize = 32;

/// One stack-machine instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Push a literal.
    Push(f64),
    /// Push parameter `slot`.
    Load(usize),
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Abs,
    Floor,
    Ceil,
    /// Round half up to an integer, then widen back to `f64`.
    Round,
    Signum,
    Sqrt,
    Exp,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    /// Pairwise NaN-propagating minimum.
    Min,
    /// Pairwise NaN-propagating maximum.
    Max,
    /// Pop `argc` arguments, call native function `index`, push the result.
    CallNative { index: usize, argc: usize },
}

impl Instruction {
    /// Arithmetic instruction for a binary operator.
    pub fn binary(op: BinOp) -> Self {
        match op {
            BinOp::Add => Instruction::Add,
            BinOp::Subtract => Instruction::Sub,
            BinOp::Multiply => Instruction::Mul,
            BinOp::Divide => Instruction::Div,
            BinOp::Power => Instruction::Pow,
        }
    }

    /// Intrinsic for a built-in. `min`/`max` map to their pairwise form.
    pub fn builtin(builtin: Builtin) -> Self {
        match builtin {
            Builtin::Floor => Instruction::Floor,
            Builtin::Ceil => Instruction::Ceil,
            Builtin::Round => Instruction::Round,
            Builtin::Abs => Instruction::Abs,
            Builtin::Signum => Instruction::Signum,
            Builtin::Sqrt => Instruction::Sqrt,
            Builtin::Exp => Instruction::Exp,
            Builtin::Sin => Instruction::Sin,
            Builtin::Cos => Instruction::Cos,
            Builtin::Tan => Instruction::Tan,
            Builtin::Asin => Instruction::Asin,
            Builtin::Acos => Instruction::Acos,
            Builtin::Atan => Instruction::Atan,
            Builtin::Min => Instruction::Min,
            Builtin::Max => Instruction::Max,
        }
    }

    fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::Load(_) => "load",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mul => "mul",
            Instruction::Div => "div",
            Instruction::Pow => "pow",
            Instruction::Neg => "neg",
            Instruction::Abs => "abs",
            Instruction::Floor => "floor",
            Instruction::Ceil => "ceil",
            Instruction::Round => "round",
            Instruction::Signum => "signum",
            Instruction::Sqrt => "sqrt",
            Instruction::Exp => "exp",
            Instruction::Sin => "sin",
            Instruction::Cos => "cos",
            Instruction::Tan => "tan",
            Instruction::Asin => "asin",
            Instruction::Acos => "acos",
            Instruction::Atan => "atan",
            Instruction::Min => "min",
            Instruction::Max => "max",
            Instruction::CallNative { .. } => "call",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "push {value}"),
            Instruction::Load(slot) => write!(f, "load ${slot}"),
            Instruction::CallNative { index, argc } => write!(f, "call #{index}/{argc}"),
            other => f.write_str(other.mnemonic()),
        }
    }
}

/// Compiled, immutable stack-machine program.
///
/// Only the compiler builds programs, which is what makes
/// [`Program::max_stack_depth`] trustworthy.
#[derive(Debug, Clone)]
pub struct Program {
    code: Vec<Instruction>,
    arity: usize,
    max_stack_depth: usize,
    natives: Vec<NativeFunction>,
}

impl Program {
    pub(crate) fn new(
        code: Vec<Instruction>,
        arity: usize,
        max_stack_depth: usize,
        natives: Vec<NativeFunction>,
    ) -> Self {
        Self {
            code,
            arity,
            max_stack_depth,
            natives,
        }
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Number of parameters the program loads from.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Deepest operand stack any evaluation can reach.
    pub fn max_stack_depth(&self) -> usize {
        self.max_stack_depth
    }

    /// Native functions referenced by [`Instruction::CallNative`].
    pub fn natives(&self) -> &[NativeFunction] {
        &self.natives
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "; arity {}, max stack depth {}",
            self.arity, self.max_stack_depth
        )?;
        for (idx, instruction) in self.code.iter().enumerate() {
            writeln!(f, "{idx:04}  {instruction}")?;
        }
        Ok(())
    }
}

/// Runs `program` without touching the heap when its stack fits inline.
#[inline]
fn run_inline(program: &Program, params: &[f64]) -> f64 {
    let depth = program.max_stack_depth();
    if depth <= INLINE_STACK {
        let mut stack = [0.0; INLINE_STACK];
        execute(program, params, &mut stack[..depth])
    } else {
        let mut stack = vec![0.0; depth];
        execute(program, params, &mut stack)
    }
}

/// Compiled `f64 -> f64` function.
#[derive(Debug, Clone)]
pub struct UnaryFunction {
    program: Arc<Program>,
}

impl UnaryFunction {
    pub(crate) fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Evaluates the function at `x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        run_inline(&self.program, &[x])
    }
}

/// Compiled `(f64, f64) -> f64` function.
#[derive(Debug, Clone)]
pub struct BinaryFunction {
    program: Arc<Program>,
}

impl BinaryFunction {
    pub(crate) fn new(program: Program) -> Self {
        Self {
            program: Arc::new(program),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Evaluates the function at `(x, y)`.
    #[inline]
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        run_inline(&self.program, &[x, y])
    }
}
