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

//! Built-in function catalogue and the scalar helpers shared by every
//! evaluation path.

/// Built-in environment functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Floor,
    Ceil,
    Round,
    Abs,
    Signum,
    Sqrt,
    Exp,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Min,
    Max,
}

impl Builtin {
    /// Every built-in, in catalogue order.
    pub const ALL: [Builtin; 15] = [
        Builtin::Floor,
        Builtin::Ceil,
        Builtin::Round,
        Builtin::Abs,
        Builtin::Signum,
        Builtin::Sqrt,
        Builtin::Exp,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Asin,
        Builtin::Acos,
        Builtin::Atan,
        Builtin::Min,
        Builtin::Max,
    ];

    /// Registry name of the function.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Round => "round",
            Builtin::Abs => "abs",
            Builtin::Signum => "signum",
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Asin => "asin",
            Builtin::Acos => "acos",
            Builtin::Atan => "atan",
            Builtin::Min => "min",
            Builtin::Max => "max",
        }
    }

    /// Looks up a built-in by name. `√` is accepted as an alias of `sqrt`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "√" {
            return Some(Builtin::Sqrt);
        }
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Returns whether the function can be called with `count` arguments.
    pub fn accepts_arity(self, count: usize) -> bool {
        match self {
            Builtin::Min | Builtin::Max => count >= 1,
            _ => count == 1,
        }
    }

    /// Evaluates the function on already-checked arguments.
    ///
    /// `min`/`max` fold left to right, matching the pairwise instruction
    /// sequence the compiler emits.
    pub fn apply(self, args: &[f64]) -> f64 {
        let Some((&first, rest)) = args.split_first() else {
            return f64::NAN;
        };
        match self {
            Builtin::Min => rest.iter().fold(first, |acc, &v| min(acc, v)),
            Builtin::Max => rest.iter().fold(first, |acc, &v| max(acc, v)),
            _ => self.apply_unary(first),
        }
    }

    /// Single-argument application. For `min`/`max` this is the identity.
    #[inline]
    pub fn apply_unary(self, a: f64) -> f64 {
        match self {
            Builtin::Floor => a.floor(),
            Builtin::Ceil => a.ceil(),
            Builtin::Round => round(a),
            Builtin::Abs => a.abs(),
            Builtin::Signum => signum(a),
            Builtin::Sqrt => a.sqrt(),
            Builtin::Exp => a.exp(),
            Builtin::Sin => a.sin(),
            Builtin::Cos => a.cos(),
            Builtin::Tan => a.tan(),
            Builtin::Asin => a.asin(),
            Builtin::Acos => a.acos(),
            Builtin::Atan => a.atan(),
            Builtin::Min | Builtin::Max => a,
        }
    }
}

/// Rounds half up, then narrows to a saturating 64-bit integer and widens
/// back. `NaN` becomes `0`.
#[inline]
pub fn round(a: f64) -> f64 {
    let floor = a.floor();
    let rounded = if a - floor >= 0.5 { floor + 1.0 } else { floor };
    // `as` saturates at the i64 range and maps NaN to zero.
    rounded as i64 as f64
}

/// Sign of `a`; zeros and `NaN` are returned unchanged.
#[inline]
pub fn signum(a: f64) -> f64 {
    if a == 0.0 || a.is_nan() {
        a
    } else {
        1.0_f64.copysign(a)
    }
}

/// Minimum that propagates `NaN`.
#[inline]
pub fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a == b && a == 0.0 {
        // -0.0 sorts below +0.0.
        if a.is_sign_negative() { a } else { b }
    } else if a < b {
        a
    } else {
        b
    }
}

/// Maximum that propagates `NaN`.
#[inline]
pub fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a == b && a == 0.0 {
        if a.is_sign_positive() { a } else { b }
    } else if a > b {
        a
    } else {
        b
    }
}
