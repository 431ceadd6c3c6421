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

//! Program interpreter.

use crate::ast::BinOp;
use crate::env::{max, min, round, signum};

use super::{Instruction, Program};

/// Reusable interpreter state.
///
/// Holding a `Machine` across calls keeps its operand stack allocated, so a
/// hot loop over many points allocates at most once.
#[derive(Debug, Default)]
pub struct Machine {
    stack: Vec<f64>,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `program` with `params` bound to its parameter slots.
    ///
    /// Missing parameters read as `NaN`.
    pub fn run(&mut self, program: &Program, params: &[f64]) -> f64 {
        let depth = program.max_stack_depth();
        if self.stack.len() < depth {
            self.stack.resize(depth, 0.0);
        }
        execute(program, params, &mut self.stack[..depth])
    }
}

/// Executes `program` on `stack`, which must hold at least
/// `program.max_stack_depth()` slots.
pub(super) fn execute(program: &Program, params: &[f64], stack: &mut [f64]) -> f64 {
    let mut sp = 0;
    for instruction in program.code() {
        match *instruction {
            Instruction::Push(value) => push(stack, &mut sp, value),
            Instruction::Load(slot) => {
                let value = params.get(slot).copied().unwrap_or(f64::NAN);
                push(stack, &mut sp, value);
            }
            Instruction::Add => binary(stack, &mut sp, BinOp::Add),
            Instruction::Sub => binary(stack, &mut sp, BinOp::Subtract),
            Instruction::Mul => binary(stack, &mut sp, BinOp::Multiply),
            Instruction::Div => binary(stack, &mut sp, BinOp::Divide),
            Instruction::Pow => binary(stack, &mut sp, BinOp::Power),
            Instruction::Neg => unary(stack, sp, |a| -a),
            Instruction::Abs => unary(stack, sp, f64::abs),
            Instruction::Floor => unary(stack, sp, f64::floor),
            Instruction::Ceil => unary(stack, sp, f64::ceil),
            Instruction::Round => unary(stack, sp, round),
            Instruction::Signum => unary(stack, sp, signum),
            Instruction::Sqrt => unary(stack, sp, f64::sqrt),
            Instruction::Exp => unary(stack, sp, f64::exp),
            Instruction::Sin => unary(stack, sp, f64::sin),
            Instruction::Cos => unary(stack, sp, f64::cos),
            Instruction::Tan => unary(stack, sp, f64::tan),
            Instruction::Asin => unary(stack, sp, f64::asin),
            Instruction::Acos => unary(stack, sp, f64::acos),
            Instruction::Atan => unary(stack, sp, f64::atan),
            Instruction::Min => pairwise(stack, &mut sp, min),
            Instruction::Max => pairwise(stack, &mut sp, max),
            Instruction::CallNative { index, argc } => {
                let base = sp - argc;
                let value = program
                    .natives()
                    .get(index)
                    .map_or(f64::NAN, |native| native.call(&stack[base..sp]));
                sp = base;
                push(stack, &mut sp, value);
            }
        }
    }
    if sp == 0 { f64::NAN } else { stack[sp - 1] }
}

#[inline(always)]
fn push(stack: &mut [f64], sp: &mut usize, value: f64) {
    stack[*sp] = value;
    *sp += 1;
}

#[inline(always)]
fn unary(stack: &mut [f64], sp: usize, f: impl FnOnce(f64) -> f64) {
    let top = &mut stack[sp - 1];
    *top = f(*top);
}

#[inline(always)]
fn binary(stack: &mut [f64], sp: &mut usize, op: BinOp) {
    pairwise(stack, sp, |left, right| op.apply(left, right));
}

#[inline(always)]
fn pairwise(stack: &mut [f64], sp: &mut usize, f: impl FnOnce(f64, f64) -> f64) {
    let right = stack[*sp - 1];
    let left = stack[*sp - 2];
    stack[*sp - 2] = f(left, right);
    *sp -= 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Arity, NativeFunction};

    #[test]
    fn runs_arithmetic_in_stack_order() {
        // (x - 3) / 2
        let program = Program::new(
            vec![
                Instruction::Load(0),
                Instruction::Push(3.0),
                Instruction::Sub,
                Instruction::Push(2.0),
                Instruction::Div,
            ],
            1,
            2,
            Vec::new(),
        );
        let mut machine = Machine::new();
        assert_eq!(machine.run(&program, &[7.0]), 2.0);
        assert_eq!(machine.run(&program, &[3.0]), 0.0);
        assert!(machine.run(&program, &[]).is_nan());
    }

    #[test]
    fn intrinsics_share_the_evaluator_helpers() {
        let program = Program::new(
            vec![
                Instruction::Load(0),
                Instruction::Round,
                Instruction::Load(1),
                Instruction::Signum,
                Instruction::Max,
            ],
            2,
            2,
            Vec::new(),
        );
        let mut machine = Machine::new();
        assert_eq!(machine.run(&program, &[-2.5, -0.0]), -0.0);
        assert_eq!(machine.run(&program, &[2.5, -4.0]), 3.0);
        // round(NaN) saturates to zero, signum(NaN) stays NaN.
        assert_eq!(machine.run(&program, &[f64::NAN, 1.0]), 1.0);
        assert!(machine.run(&program, &[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn native_calls_consume_their_arguments() {
        let hypot = NativeFunction::new(Arity::Exactly(2), |args| args[0].hypot(args[1]));
        let program = Program::new(
            vec![
                Instruction::Push(1.0),
                Instruction::Load(0),
                Instruction::Load(1),
                Instruction::CallNative { index: 0, argc: 2 },
                Instruction::Add,
            ],
            2,
            3,
            vec![hypot],
        );
        assert_eq!(Machine::new().run(&program, &[3.0, 4.0]), 6.0);
    }
}
