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

//! Lowering for environment function calls.

use super::expr::Task;
use super::*;

impl LowerContext<'_> {
    /// Schedules a call after checking the name and argument count.
    ///
    /// Emission depends on the descriptor:
    /// - unary built-ins become one intrinsic after their argument
    /// - `min`/`max` become a left fold of pairwise instructions
    /// - native functions become [`Instruction::CallNative`]
    pub(super) fn schedule_call<'e>(
        &mut self,
        name: &'e str,
        args: &'e [Expr],
        tasks: &mut Vec<Task<'e>>,
    ) -> Result<(), CompileError> {
        let functions = self.functions;
        let function = functions
            .get(name)
            .ok_or_else(|| CompileError::UnknownFunction(name.to_string()))?;
        expect_arity(function, name, args)?;

        match function {
            EnvFunction::Builtin(builtin) => {
                let Some((first, rest)) = args.split_first() else {
                    return Err(arity_mismatch(name, args));
                };
                let instruction = Instruction::builtin(*builtin);
                match builtin {
                    Builtin::Min | Builtin::Max => {
                        for arg in rest.iter().rev() {
                            tasks.push(Task::Binary(instruction));
                            tasks.push(Task::Lower(arg));
                        }
                    }
                    _ => tasks.push(Task::Unary(instruction)),
                }
                tasks.push(Task::Lower(first));
            }
            EnvFunction::Native(native) => {
                tasks.push(Task::CallNative {
                    name,
                    native: native.clone(),
                    argc: args.len(),
                });
                tasks.extend(args.iter().rev().map(Task::Lower));
            }
        }
        Ok(())
    }
}

/// Checks `args` against the descriptor's arity rule.
fn expect_arity(function: &EnvFunction, name: &str, args: &[Expr]) -> Result<(), CompileError> {
    if function.accepts_arity(args.len()) {
        Ok(())
    } else {
        Err(arity_mismatch(name, args))
    }
}

fn arity_mismatch(name: &str, args: &[Expr]) -> CompileError {
    CompileError::ArityMismatch {
        name: name.to_string(),
        found: args.len(),
    }
}
