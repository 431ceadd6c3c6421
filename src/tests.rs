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

//! Crate scenario tests.

use super::*;
use std::collections::HashMap;

const VARS: [&str; 2] = ["x", "y"];

fn std_env() -> Environment {
    Environment::standard()
}

fn install_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn first_caret_column(pointer: &str) -> Option<usize> {
    pointer.chars().position(|ch| ch == '^').map(|idx| idx + 1)
}

/// Evaluates `source` at `x` through both the tree walker and a compiled
/// program and checks they agree.
fn eval_both(source: &str, x: f64) -> f64 {
    let env = std_env();
    let function = compile_unary_function(source, "x", &env).expect("compile");
    let expr = ParsedFunction::parse(source, "x", &env).expect("parse");
    let interpreted = expr.evaluate(x).expect("evaluate");
    let compiled = function.evaluate(x);
    assert_eq!(
        interpreted.to_bits(),
        compiled.to_bits(),
        "{source}: evaluator and program disagree"
    );
    compiled
}

#[test]
fn precedence_matches_arithmetic_convention() {
    assert_eq!(eval_both("2 + 3 * 4", 0.0), 14.0);
    assert_eq!(eval_both("2^3^2", 0.0), 512.0);
    assert_eq!(eval_both("2x", 5.0), 10.0);
    assert_eq!(eval_both("-2^2", 0.0), -4.0);
    assert_eq!(eval_both("(2 + 3) * 4", 0.0), 20.0);
    assert_eq!(eval_both("12 / 2 / 3", 0.0), 2.0);
    assert_eq!(eval_both("2|x - 5|", 1.0), 8.0);
    assert_eq!(eval_both("3x² − 1", 2.0), 11.0);
}

#[test]
fn superscripts_desugar_to_powers() {
    let formula = parse("x²", VARS, ["sin"]).expect("parse");
    assert_eq!(
        formula,
        Formula::Expr(Expr::pow(Expr::variable("x"), Expr::number(2.0)))
    );
    let formula = parse("x⁻¹", VARS, ["sin"]).expect("parse");
    assert_eq!(
        formula,
        Formula::Expr(Expr::pow(Expr::variable("x"), Expr::number(-1.0)))
    );
    assert_eq!(eval_both("x⁻¹", 4.0), 0.25);
    assert_eq!(eval_both("sin²(x) + cos²(x)", 0.7), {
        let (s, c) = (0.7_f64.sin(), 0.7_f64.cos());
        s.powf(2.0) + c.powf(2.0)
    });
}

#[test]
fn solved_for_finds_explicit_sides() {
    let functions = FunctionRegistry::standard();
    let names: Vec<&str> = functions.names().collect();

    let relation = parse_equation("y = x^2", VARS, &names).expect("parse");
    assert_eq!(
        solved_for(&relation, "y"),
        Some(&Expr::pow(Expr::variable("x"), Expr::number(2.0)))
    );

    let relation = parse_equation("x^2 + y^2 = 25", VARS, &names).expect("parse");
    assert_eq!(solved_for(&relation, "y"), None);

    let relation = parse_equation("y = y + 1", VARS, &names).expect("parse");
    assert_eq!(solved_for(&relation, "y"), None);

    let relation = parse_equation("sin(x) = y", VARS, &names).expect("parse");
    assert_eq!(
        solved_for(&relation, "y"),
        Some(&Expr::call("sin", vec![Expr::variable("x")]))
    );
}

#[test]
fn parabola_compiles_to_an_explicit_graph() {
    install_tracing();
    let graph = compile_relation("y = x^2", &std_env()).expect("compile");
    let Graph::Explicit(function) = graph.graph() else {
        panic!("expected explicit graph, got {:?}", graph.graph());
    };
    assert_eq!(function.program().arity(), 1);
    assert_eq!(graph.evaluate(3.0), Some(9.0));
    assert_eq!(graph.evaluate(-0.5), Some(0.25));
}

#[test]
fn circle_compiles_to_an_equality_predicate() {
    install_tracing();
    let graph = compile_relation("x^2 + y^2 = 25", &std_env()).expect("compile");
    assert!(matches!(
        graph.graph(),
        Graph::Predicate {
            rule: TruthRule::NearZero,
            ..
        }
    ));
    assert!(graph.satisfies(3.0, 4.0));
    assert!(graph.satisfies(-5.0, 0.0));
    assert!(!graph.satisfies(0.0, 0.0));
    assert_eq!(graph.evaluate(3.0), None);
}

#[test]
fn half_plane_compiles_to_a_strict_predicate() {
    let graph = compile_relation("y > x", &std_env()).expect("compile");
    assert!(graph.satisfies(0.0, 1.0));
    assert!(!graph.satisfies(1.0, 0.0));
    assert!(!graph.satisfies(1.0, 1.0));

    let graph = compile_relation("y ≤ |x|", &std_env()).expect("compile");
    assert!(graph.satisfies(-2.0, 2.0));
    assert!(!graph.satisfies(-2.0, 2.5));
}

#[test]
fn constants_and_functions_come_from_the_environment() {
    let env = std_env()
        .with_constant("k", 3.0)
        .with_native("clamp01", Arity::Exactly(1), |args| args[0].clamp(0.0, 1.0));
    let graph = compile_relation("y = k clamp01(x) + pi", &env).expect("compile");
    assert_eq!(graph.evaluate(2.0), Some(3.0 + std::f64::consts::PI));

    // The same text without `k` has nothing to resolve it against.
    let err = compile_relation("y = k x", &std_env()).expect_err("unresolved");
    assert_eq!(err.kind, ErrorKind::UnresolvedVariable);
}

#[test]
fn unknown_names_and_bad_arity_fail_compilation() {
    let env = std_env();

    let err = compile_relation("y = sqrt(1, 2)", &env).expect_err("arity");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert_eq!(err.message, "invalid use of sqrt() with 2 arguments");

    let err = compile_relation("y = foo(1)", &env).expect_err("unknown function");
    assert_eq!(err.kind, ErrorKind::UnknownFunction);
    assert_eq!(err.message, "unknown function 'foo'");

    let err = compile_relation("y = z + 1", &env).expect_err("unresolved variable");
    assert_eq!(err.kind, ErrorKind::UnresolvedVariable);
    assert_eq!(err.message, "unresolved variable 'z'");
    assert_eq!(err.offset, None);
    assert_eq!(err.to_string(), "unresolved variable 'z'");

    let err = compile_unary_function("sqrt(1, 2)", "x", &env).expect_err("arity");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
}

#[test]
fn unregistered_names_sharing_a_builtin_prefix_are_unknown_functions() {
    let env = std_env();

    let err = compile_relation("y = sinh(x)", &env).expect_err("sinh");
    assert_eq!(err.kind, ErrorKind::UnknownFunction);
    assert_eq!(err.message, "unknown function 'sinh'");

    let err = compile_relation("y = atan2(x, 1)", &env).expect_err("atan2");
    assert_eq!(err.kind, ErrorKind::UnknownFunction);
    assert_eq!(err.message, "unknown function 'atan2'");

    let env = env.with_native("sinh", Arity::Exactly(1), |args| args[0].sinh());
    let graph = compile_relation("y = sinh (x)", &env).expect("registered sinh");
    assert_eq!(graph.evaluate(0.0), Some(0.0));
}

#[test]
fn long_flat_chains_compile_and_evaluate() {
    let env = std_env();
    let terms = 3000;

    let sum = format!("y = {}", vec!["x"; terms].join(" + "));
    let graph = compile_relation(&sum, &env).expect("long sum");
    assert_eq!(graph.evaluate(1.0), Some(terms as f64));

    let product = format!("y = {}", vec!["x"; terms].join(" "));
    let graph = compile_relation(&product, &env).expect("long product");
    assert_eq!(graph.evaluate(1.0), Some(1.0));

    let err = compile_relation(&format!("{sum} + z"), &env).expect_err("unresolved");
    assert_eq!(err.kind, ErrorKind::UnresolvedVariable);

    let err = compile_relation(&format!("{sum} ++ 1"), &env).expect_err("syntax");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.message, "Syntax error: unexpected '+'");
    assert_eq!(err.column, sum.chars().count() + 3);
}

#[test]
fn syntax_errors_point_at_the_offending_text() {
    let source = "y = x ++ 1";
    let err = compile_relation(source, &std_env()).expect_err("syntax");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.message, "Syntax error: unexpected '+'");
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 8);
    assert_eq!(err.snippet, source);
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
    assert!(err.to_string().contains(" --> line 1, column 8"));

    let source = "y = (x +\n  2";
    let err = compile_relation(source, &std_env()).expect_err("unbalanced");
    assert_eq!(err.message, "Syntax error: expected ')'");
    assert_eq!(err.line, 2);
    assert_eq!(err.snippet, "  2");
}

#[test]
fn compiled_relations_are_reusable_across_threads() {
    let graph = compile_relation("y = 2x + 1", &std_env()).expect("compile");
    let handles: Vec<_> = (0..4_u32)
        .map(|worker| {
            let graph = graph.clone();
            std::thread::spawn(move || graph.evaluate(f64::from(worker)))
        })
        .collect();
    for (worker, handle) in handles.into_iter().enumerate() {
        let value = handle.join().expect("worker");
        assert_eq!(value, Some(2.0 * worker as f64 + 1.0));
    }
}

#[test]
fn machine_and_inline_evaluation_agree() {
    let env = std_env();
    let function = compile_binary_function("max(x, y, 1) - min(x, y)", "x", "y", &env)
        .expect("compile");
    let mut machine = Machine::new();
    for (x, y) in [(0.0, 0.0), (2.0, -3.0), (-1.5, 4.0)] {
        assert_eq!(
            machine.run(function.program(), &[x, y]),
            function.evaluate(x, y)
        );
    }
    assert_eq!(function.evaluate(2.0, -3.0), 5.0);
}

#[test]
fn tree_views_and_display_round_trip() {
    let formula = parse("2x^2 + |y| >= 1", VARS, Vec::<String>::new()).expect("parse");
    let Formula::Relation(relation) = &formula else {
        panic!("expected relation");
    };
    assert_eq!(relation.to_string(), "2 * x ^ 2 + |y| >= 1");
    let reparsed = parse(&relation.to_string(), VARS, Vec::<String>::new()).expect("reparse");
    assert_eq!(reparsed, formula);

    assert_eq!(
        relation.lhs().render_tree(),
        "Add\n├─ Multiply\n│  ├─ 2\n│  └─ Power\n│     ├─ x\n│     └─ 2\n└─ AbsoluteValue\n   └─ y\n"
    );
}

#[test]
fn folding_and_evaluation_share_constants() {
    let env = std_env();
    let expr = parse_expr("tau / 2 + x", ["x", "tau"], Vec::<String>::new()).expect("parse");
    let folded = fold(&expr, env.constants(), env.functions());
    assert_eq!(
        folded,
        Expr::add(Expr::number(std::f64::consts::PI), Expr::variable("x"))
    );
    assert_eq!(
        constant_value(&Expr::variable("tau"), env.constants(), env.functions()),
        Some(std::f64::consts::TAU)
    );
    let bindings = HashMap::from([("x".to_string(), 1.0)]);
    assert_eq!(
        evaluate_in(&expr, &bindings, &env),
        Ok(std::f64::consts::PI + 1.0)
    );
    assert_eq!(
        evaluate(&expr, &bindings),
        Err(EvalError::UnboundVariable("tau".to_string()))
    );
}

#[test]
fn folded_non_finite_values_print_as_parsable_text() {
    let env = std_env();
    let expr = parse_expr("1/0 + x * (0/0)", ["x"], Vec::<String>::new()).expect("parse");
    let folded = fold(&expr, env.constants(), env.functions());
    assert_eq!(folded.to_string(), "1 / 0 + x * (0 / 0)");

    let reparsed = parse_expr(&folded.to_string(), ["x"], Vec::<String>::new()).expect("reparse");
    let bindings = HashMap::from([("x".to_string(), 2.0)]);
    let value = evaluate(&reparsed, &bindings).expect("evaluate");
    assert!(value.is_nan());

    let negative = fold(
        &parse_expr("-1/0 * x", ["x"], Vec::<String>::new()).expect("parse"),
        env.constants(),
        env.functions(),
    );
    assert_eq!(negative.to_string(), "-1 / 0 * x");
    let reparsed = parse_expr(&negative.to_string(), ["x"], Vec::<String>::new()).expect("reparse");
    assert_eq!(evaluate(&reparsed, &bindings), Ok(f64::NEG_INFINITY));
}
