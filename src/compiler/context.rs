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

//! Lowering context and emitted-code state.

use super::*;

/// Lowering context for one program.
///
/// Holds the parameter slots, name lookups, emitted instructions and the
/// native functions the program calls.
pub(super) struct LowerContext<'a> {
    pub(super) params: &'a [&'a str],
    pub(super) constants: &'a HashMap<String, f64>,
    pub(super) functions: &'a FunctionRegistry,
    pub(super) code: Vec<Instruction>,
    pub(super) natives: Vec<NativeFunction>,
    native_slots: HashMap<String, usize>,
}

impl<'a> LowerContext<'a> {
    pub(super) fn new(
        params: &'a [&'a str],
        constants: &'a HashMap<String, f64>,
        functions: &'a FunctionRegistry,
    ) -> Self {
        Self {
            params,
            constants,
            functions,
            code: Vec::new(),
            natives: Vec::new(),
            native_slots: HashMap::new(),
        }
    }

    pub(super) fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    /// Resolves a variable to a parameter load or a constant push.
    ///
    /// Parameters win over constants with the same name.
    pub(super) fn resolve_variable(&self, name: &str) -> Result<Instruction, CompileError> {
        if let Some(slot) = self.params.iter().position(|param| *param == name) {
            return Ok(Instruction::Load(slot));
        }
        self.constants
            .get(name)
            .map(|value| Instruction::Push(*value))
            .ok_or_else(|| CompileError::UnresolvedVariable(name.to_string()))
    }

    /// Returns the native-table index for `name`, adding it on first use.
    pub(super) fn native_slot(&mut self, name: &str, native: &NativeFunction) -> usize {
        if let Some(index) = self.native_slots.get(name) {
            return *index;
        }
        let index = self.natives.len();
        self.natives.push(native.clone());
        self.native_slots.insert(name.to_string(), index);
        index
    }

    /// Finalizes lowering and produces a [`Program`].
    pub(super) fn finish(self, max_stack_depth: usize) -> Program {
        Program::new(self.code, self.params.len(), max_stack_depth, self.natives)
    }
}
