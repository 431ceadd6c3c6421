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

//! Property-based tests for evaluation and compilation.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::{
    BinOp, Builtin, Environment, Expr, Instruction, Machine, Program, compile_unary, evaluate_in,
};

fn same_value(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

/// Replays the program's stack effects and returns the deepest point.
fn simulated_peak(program: &Program) -> usize {
    let mut depth = 0usize;
    let mut peak = 0usize;
    for instruction in program.code() {
        let pops = match instruction {
            Instruction::Push(_) | Instruction::Load(_) => 0,
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Pow
            | Instruction::Min
            | Instruction::Max => 2,
            Instruction::CallNative { argc, .. } => *argc,
            _ => 1,
        };
        depth = depth - pops + 1;
        peak = peak.max(depth);
    }
    peak
}

// Strategy for leaves: literals, the parameter and an environment constant.
fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (-10.0f64..10.0).prop_map(Expr::number),
        Just(Expr::variable("x")),
        Just(Expr::variable("pi")),
    ]
}

fn binop() -> impl Strategy<Value = BinOp> {
    prop::sample::select(vec![
        BinOp::Add,
        BinOp::Subtract,
        BinOp::Multiply,
        BinOp::Divide,
        BinOp::Power,
    ])
}

fn unary_builtin() -> impl Strategy<Value = &'static str> {
    let names: Vec<&'static str> = Builtin::ALL
        .into_iter()
        .filter(|builtin| !matches!(builtin, Builtin::Min | Builtin::Max))
        .map(Builtin::name)
        .collect();
    prop::sample::select(names)
}

// Strategy for random trees mixing every node kind.
fn expr_tree() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(8, 128, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Expr::negate),
            inner.clone().prop_map(Expr::abs),
            (binop(), inner.clone(), inner.clone())
                .prop_map(|(op, left, right)| Expr::binary(op, left, right)),
            (unary_builtin(), inner.clone()).prop_map(|(name, arg)| Expr::call(name, vec![arg])),
            (
                prop::sample::select(vec!["min", "max"]),
                prop::collection::vec(inner, 1..5)
            )
                .prop_map(|(name, args)| Expr::call(name, args)),
        ]
    })
}

proptest! {
    #[test]
    fn compiled_programs_match_the_evaluator(expr in expr_tree(), x in -20.0f64..20.0) {
        let env = Environment::standard();
        let program = compile_unary(&expr, "x", env.constants(), env.functions())
            .expect("every generated tree compiles");
        let bindings = HashMap::from([("x".to_string(), x)]);
        let expected = evaluate_in(&expr, &bindings, &env).expect("every generated tree evaluates");
        let actual = Machine::new().run(&program, &[x]);
        prop_assert!(
            same_value(expected, actual),
            "{expr}: evaluator {expected} vs program {actual}"
        );
    }

    #[test]
    fn static_stack_depth_is_the_exact_peak(expr in expr_tree()) {
        let env = Environment::standard();
        let program = compile_unary(&expr, "x", env.constants(), env.functions())
            .expect("every generated tree compiles");
        prop_assert_eq!(simulated_peak(&program), program.max_stack_depth());
    }

    #[test]
    fn deep_right_nesting_stays_in_bounds(depth in 1usize..300, x in -5.0f64..5.0) {
        // x - (x - (x - ... (x - 1)))
        let mut expr = Expr::number(1.0);
        for _ in 0..depth {
            expr = Expr::sub(Expr::variable("x"), expr);
        }
        let env = Environment::standard();
        let program = compile_unary(&expr, "x", env.constants(), env.functions())
            .expect("compile");
        prop_assert_eq!(program.max_stack_depth(), depth + 1);

        let bindings = HashMap::from([("x".to_string(), x)]);
        let expected = evaluate_in(&expr, &bindings, &env).expect("evaluate");
        let function = crate::UnaryFunction::new(program);
        prop_assert!(same_value(expected, function.evaluate(x)));
    }
}
