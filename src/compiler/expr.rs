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

//! Expression lowering.

use super::*;

/// Pending lowering work.
///
/// Lowering runs over an explicit stack so long operator chains do not grow
/// the call stack. Operand stack depths travel on a parallel stack of
/// `usize`, one entry per value the emitted code leaves behind.
pub(super) enum Task<'e> {
    /// Lower a subtree, leaving one value.
    Lower(&'e Expr),
    /// Emit an instruction that rewrites the top value in place.
    Unary(Instruction),
    /// Emit an instruction that combines the top two values.
    Binary(Instruction),
    /// Emit a native call over the top `argc` values.
    CallNative {
        name: &'e str,
        native: NativeFunction,
        argc: usize,
    },
}

impl LowerContext<'_> {
    /// Lowers `expr` and returns the stack depth it needs.
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<usize, CompileError> {
        let mut tasks = vec![Task::Lower(expr)];
        let mut depths: Vec<usize> = Vec::new();
        while let Some(task) = tasks.pop() {
            match task {
                Task::Lower(node) => self.lower_node(node, &mut tasks, &mut depths)?,
                Task::Unary(instruction) => self.emit(instruction),
                Task::Binary(instruction) => {
                    // The left result stays on the stack while the right side runs.
                    let right = depths.pop().unwrap_or(0);
                    let left = depths.pop().unwrap_or(0);
                    self.emit(instruction);
                    depths.push(left.max(1 + right));
                }
                Task::CallNative { name, native, argc } => {
                    // Argument `i` was lowered with `i` earlier results below it.
                    let base = depths.len().saturating_sub(argc);
                    let depth = depths
                        .drain(base..)
                        .enumerate()
                        .fold(1, |depth, (idx, arg)| depth.max(idx + arg));
                    let index = self.native_slot(name, &native);
                    self.emit(Instruction::CallNative { index, argc });
                    depths.push(depth);
                }
            }
        }
        Ok(depths.pop().unwrap_or(0))
    }

    /// Emits leaves directly and schedules everything else.
    ///
    /// Tasks pop in reverse push order, so operands are pushed last.
    fn lower_node<'e>(
        &mut self,
        node: &'e Expr,
        tasks: &mut Vec<Task<'e>>,
        depths: &mut Vec<usize>,
    ) -> Result<(), CompileError> {
        match node {
            Expr::Number(value) => {
                self.emit(Instruction::Push(*value));
                depths.push(1);
            }
            Expr::Variable(name) => {
                let instruction = self.resolve_variable(name)?;
                self.emit(instruction);
                depths.push(1);
            }
            Expr::Negate(inner) => {
                tasks.push(Task::Unary(Instruction::Neg));
                tasks.push(Task::Lower(inner));
            }
            Expr::AbsoluteValue(inner) => {
                tasks.push(Task::Unary(Instruction::Abs));
                tasks.push(Task::Lower(inner));
            }
            Expr::BinaryOp { kind, left, right } => {
                tasks.push(Task::Binary(Instruction::binary(*kind)));
                tasks.push(Task::Lower(right));
                tasks.push(Task::Lower(left));
            }
            Expr::FunctionCall { name, arguments } => self.schedule_call(name, arguments, tasks)?,
        }
        Ok(())
    }
}
