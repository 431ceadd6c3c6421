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

//! Caller-supplied evaluation environment: named constants and the function
//! registry.
//!
//! Nothing here is global. Each parse/compile request receives the
//! environment it should resolve names against, so different call sites can
//! expose different constants and functions.

mod builtins;

pub use builtins::Builtin;
pub(crate) use builtins::{max, min, round, signum};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Argument-count rule of an environment function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments.
    Exactly(usize),
    /// At least `n` arguments.
    AtLeast(usize),
}

impl Arity {
    /// Returns whether `count` arguments satisfy the rule.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

/// Signature of a caller-provided native function.
pub type NativeFn = dyn Fn(&[f64]) -> f64 + Send + Sync;

/// A function implemented by the caller in Rust.
///
/// Compiled programs call it through [`crate::Instruction::CallNative`] with
/// the arguments taken straight from the operand stack.
#[derive(Clone)]
pub struct NativeFunction {
    arity: Arity,
    func: Arc<NativeFn>,
    pure: bool,
}

impl NativeFunction {
    /// Wraps `func` with an arity rule. Native functions are assumed pure.
    pub fn new<F>(arity: Arity, func: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        Self {
            arity,
            func: Arc::new(func),
            pure: true,
        }
    }

    /// Marks the function as impure so calls are never constant-folded.
    pub fn impure(mut self) -> Self {
        self.pure = false;
        self
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_pure(&self) -> bool {
        self.pure
    }

    /// Invokes the function.
    #[inline]
    pub fn call(&self, args: &[f64]) -> f64 {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("arity", &self.arity)
            .field("pure", &self.pure)
            .finish_non_exhaustive()
    }
}

/// Function descriptor stored in a [`FunctionRegistry`].
///
/// A descriptor answers three questions: which argument counts it accepts,
/// how to evaluate it on numbers, and how to lower it to instructions (the
/// compiler picks the emission rule from the variant).
#[derive(Debug, Clone)]
pub enum EnvFunction {
    Builtin(Builtin),
    Native(NativeFunction),
}

impl EnvFunction {
    /// Returns whether the function can be called with `count` arguments.
    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            EnvFunction::Builtin(builtin) => builtin.accepts_arity(count),
            EnvFunction::Native(native) => native.arity().accepts(count),
        }
    }

    /// Evaluates the function on already-checked arguments.
    pub fn evaluate(&self, args: &[f64]) -> f64 {
        match self {
            EnvFunction::Builtin(builtin) => builtin.apply(args),
            EnvFunction::Native(native) => native.call(args),
        }
    }

    /// Returns whether a call with constant arguments may be folded.
    pub fn supports_constant_eval(&self) -> bool {
        match self {
            EnvFunction::Builtin(_) => true,
            EnvFunction::Native(native) => native.is_pure(),
        }
    }
}

impl From<Builtin> for EnvFunction {
    fn from(value: Builtin) -> Self {
        EnvFunction::Builtin(value)
    }
}

impl From<NativeFunction> for EnvFunction {
    fn from(value: NativeFunction) -> Self {
        EnvFunction::Native(value)
    }
}

/// Name → function descriptor mapping.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, EnvFunction>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every [`Builtin`] under its canonical name.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for builtin in Builtin::ALL {
            registry.insert(builtin.name(), builtin);
        }
        registry
    }

    /// Registers (or replaces) a function.
    pub fn insert(&mut self, name: impl Into<String>, function: impl Into<EnvFunction>) {
        self.functions.insert(name.into(), function.into());
    }

    pub fn get(&self, name: &str) -> Option<&EnvFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }
}

/// Constants plus functions available to an expression.
///
/// The two free plot variables `x` and `y` are not part of the environment.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    constants: HashMap<String, f64>,
    functions: FunctionRegistry,
}

impl Environment {
    /// An environment with no constants and no functions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All built-ins plus `pi`/`π`, `tau`/`τ` and `e`.
    pub fn standard() -> Self {
        Self::empty()
            .with_functions(FunctionRegistry::standard())
            .with_constant("pi", std::f64::consts::PI)
            .with_constant("π", std::f64::consts::PI)
            .with_constant("tau", std::f64::consts::TAU)
            .with_constant("τ", std::f64::consts::TAU)
            .with_constant("e", std::f64::consts::E)
    }

    /// Adds or replaces a named constant.
    pub fn with_constant(mut self, name: impl Into<String>, value: f64) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    /// Adds or replaces a function.
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: impl Into<EnvFunction>,
    ) -> Self {
        self.functions.insert(name, function);
        self
    }

    /// Registers a Rust closure as a pure environment function.
    pub fn with_native<F>(self, name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.with_function(name, NativeFunction::new(arity, func))
    }

    /// Replaces the whole function registry.
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn constants(&self) -> &HashMap<String, f64> {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
