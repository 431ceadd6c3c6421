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

//! Expression and relation trees produced by the parser.
//!
//! Trees carry no source positions: once text has been parsed successfully
//! every later stage (folding, solving, compilation) works on plain values,
//! so two parses of equivalent text compare equal.

use nom_locate::LocatedSpan;
use std::collections::BTreeSet;
use std::fmt;

/// Lexer input span type carrying byte offsets and line/column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Source range and anchor position for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a source span from lexer start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            line: start.location_line() as usize,
            column: start.get_utf8_column(),
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Subtract,
    /// Multiplication (`*` or juxtaposition).
    Multiply,
    /// Division (`/`).
    Divide,
    /// Exponentiation (`^` or a superscript suffix).
    Power,
}

impl BinOp {
    /// Applies the operator with IEEE-754 double semantics.
    ///
    /// Every evaluation path (tree walker, folder, interpreter) goes through
    /// this so results agree bit for bit.
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinOp::Add => left + right,
            BinOp::Subtract => left - right,
            BinOp::Multiply => left * right,
            BinOp::Divide => left / right,
            BinOp::Power => left.powf(right),
        }
    }

    /// Returns the operator glyph used when printing.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Power => "^",
        }
    }

    fn name(self) -> &'static str {
        match self {
            BinOp::Add => "Add",
            BinOp::Subtract => "Subtract",
            BinOp::Multiply => "Multiply",
            BinOp::Divide => "Divide",
            BinOp::Power => "Power",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Subtract => 1,
            BinOp::Multiply | BinOp::Divide => 2,
            BinOp::Power => 4,
        }
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// Variable or named constant reference.
    Variable(String),
    /// Unary negation.
    Negate(Box<Expr>),
    /// Absolute value (`|expr|`).
    AbsoluteValue(Box<Expr>),
    /// Binary operation.
    BinaryOp {
        /// Operator kind.
        kind: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Environment function call.
    FunctionCall {
        /// Function name.
        name: String,
        /// Call arguments in source order.
        arguments: Vec<Expr>,
    },
}

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn negate(operand: Expr) -> Self {
        Expr::Negate(Box::new(operand))
    }

    pub fn abs(operand: Expr) -> Self {
        Expr::AbsoluteValue(Box::new(operand))
    }

    pub fn binary(kind: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Add, left, right)
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Subtract, left, right)
    }

    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Multiply, left, right)
    }

    pub fn div(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Divide, left, right)
    }

    pub fn pow(left: Expr, right: Expr) -> Self {
        Self::binary(BinOp::Power, left, right)
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            name: name.into(),
            arguments,
        }
    }

    /// Returns the direct children of this node, left to right.
    pub fn children(&self) -> Children<'_> {
        match self {
            Expr::Number(_) | Expr::Variable(_) => Children::new(None, None, &[]),
            Expr::Negate(inner) | Expr::AbsoluteValue(inner) => {
                Children::new(Some(inner), None, &[])
            }
            Expr::BinaryOp { left, right, .. } => Children::new(Some(left), Some(right), &[]),
            Expr::FunctionCall { arguments, .. } => Children::new(None, None, arguments),
        }
    }

    /// Lazily walks the tree, yielding each node before its children.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            root: Some(self),
            stack: Vec::new(),
        }
    }

    /// Lazily walks the tree, yielding each node after all of its children.
    pub fn post_order(&self) -> PostOrder<'_> {
        PostOrder {
            stack: vec![(self, self.children())],
        }
    }

    /// Visits every node before its children, stopping at the first error.
    pub fn try_visit_pre_order<E, F>(&self, visit: &mut F) -> Result<(), E>
    where
        F: FnMut(&Expr) -> Result<(), E>,
    {
        self.pre_order().try_for_each(|node| visit(node))
    }

    /// Visits every node after its children, stopping at the first error.
    pub fn try_visit_post_order<E, F>(&self, visit: &mut F) -> Result<(), E>
    where
        F: FnMut(&Expr) -> Result<(), E>,
    {
        self.post_order().try_for_each(|node| visit(node))
    }

    /// Collects the names of every variable referenced in the tree.
    pub fn free_variables(&self) -> BTreeSet<&str> {
        self.post_order()
            .filter_map(|node| match node {
                Expr::Variable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns whether `name` never occurs as a variable in the tree.
    pub fn is_independent_of(&self, name: &str) -> bool {
        !self
            .post_order()
            .any(|node| matches!(node, Expr::Variable(v) if v == name))
    }

    /// Short label used by [`Expr::render_tree`].
    pub fn description(&self) -> String {
        match self {
            Expr::Number(value) => value.to_string(),
            Expr::Variable(name) => name.clone(),
            Expr::Negate(_) => "Negate".to_string(),
            Expr::AbsoluteValue(_) => "AbsoluteValue".to_string(),
            Expr::BinaryOp { kind, .. } => kind.name().to_string(),
            Expr::FunctionCall { name, .. } => format!("{name}()"),
        }
    }

    /// Renders the tree with box-drawing guides, one node per line.
    ///
    /// ```text
    /// Add
    /// ├─ 2
    /// └─ Multiply
    ///    ├─ 3
    ///    └─ x
    /// ```
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.description());
        out.push('\n');
        render_children(self, "", &mut out);
        out
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::BinaryOp { kind, .. } => kind.precedence(),
            Expr::Negate(_) => 3,
            // Non-finite literals print as a division.
            Expr::Number(value) if !value.is_finite() => 2,
            // A negative literal prints with a leading `-` and so binds like negation.
            Expr::Number(value) if value.is_sign_negative() => 3,
            _ => 5,
        }
    }
}

fn render_children(node: &Expr, prefix: &str, out: &mut String) {
    let mut children = node.children().peekable();
    while let Some(child) = children.next() {
        let last = children.peek().is_none();
        out.push_str(prefix);
        out.push_str(if last { "└─ " } else { "├─ " });
        out.push_str(&child.description());
        out.push('\n');
        let nested = format!("{prefix}{}", if last { "   " } else { "│  " });
        render_children(child, &nested, out);
    }
}

/// Prints infix text that the parser reads back. Infinite and NaN literals,
/// which folding can produce, print as `1 / 0`, `-1 / 0` and `0 / 0`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) if value.is_nan() => write!(f, "0 / 0"),
            Expr::Number(value) if value.is_infinite() => {
                let sign = if value.is_sign_negative() { "-" } else { "" };
                write!(f, "{sign}1 / 0")
            }
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Variable(name) => write!(f, "{name}"),
            Expr::Negate(inner) => {
                if inner.precedence() <= 3 {
                    write!(f, "-({inner})")
                } else {
                    write!(f, "-{inner}")
                }
            }
            Expr::AbsoluteValue(inner) => write!(f, "|{inner}|"),
            Expr::BinaryOp { kind, left, right } => {
                let prec = kind.precedence();
                // Power is right-associative, everything else left-associative.
                let (left_parens, right_parens) = if *kind == BinOp::Power {
                    (left.precedence() <= prec, right.precedence() < 3)
                } else {
                    (left.precedence() < prec, right.precedence() <= prec)
                };
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", kind.symbol())?;
                write_operand(f, right, right_parens)
            }
            Expr::FunctionCall { name, arguments } => {
                write!(f, "{name}(")?;
                for (idx, arg) in arguments.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Iterator over the direct children of an [`Expr`].
#[derive(Debug, Clone)]
pub struct Children<'a> {
    first: Option<&'a Expr>,
    second: Option<&'a Expr>,
    rest: std::slice::Iter<'a, Expr>,
}

impl<'a> Children<'a> {
    fn new(first: Option<&'a Expr>, second: Option<&'a Expr>, rest: &'a [Expr]) -> Self {
        Self {
            first,
            second,
            rest: rest.iter(),
        }
    }
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.first.take() {
            return Some(first);
        }
        if let Some(second) = self.second.take() {
            return Some(second);
        }
        self.rest.next()
    }
}

/// Lazy pre-order traversal, see [`Expr::pre_order`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a> {
    root: Option<&'a Expr>,
    stack: Vec<Children<'a>>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.stack.push(root.children());
            return Some(root);
        }
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(child) => {
                    self.stack.push(child.children());
                    return Some(child);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Lazy post-order traversal, see [`Expr::post_order`].
#[derive(Debug, Clone)]
pub struct PostOrder<'a> {
    stack: Vec<(&'a Expr, Children<'a>)>,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (_, children) = self.stack.last_mut()?;
            match children.next() {
                Some(child) => self.stack.push((child, child.children())),
                None => {
                    let (node, _) = self.stack.pop()?;
                    return Some(node);
                }
            }
        }
    }
}

/// Inequality operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InequalityKind {
    /// `<`
    LessThan,
    /// `<=` or `≤`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=` or `≥`
    GreaterThanOrEqual,
    /// `!=` or `≠`
    NotEqual,
}

impl InequalityKind {
    /// Returns the ASCII spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            InequalityKind::LessThan => "<",
            InequalityKind::LessThanOrEqual => "<=",
            InequalityKind::GreaterThan => ">",
            InequalityKind::GreaterThanOrEqual => ">=",
            InequalityKind::NotEqual => "!=",
        }
    }
}

/// Equation or inequality between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// `lhs = rhs`
    Equation { lhs: Expr, rhs: Expr },
    /// `lhs <op> rhs`
    Inequality {
        lhs: Expr,
        rhs: Expr,
        kind: InequalityKind,
    },
}

impl Relation {
    pub fn equation(lhs: Expr, rhs: Expr) -> Self {
        Relation::Equation { lhs, rhs }
    }

    pub fn inequality(lhs: Expr, rhs: Expr, kind: InequalityKind) -> Self {
        Relation::Inequality { lhs, rhs, kind }
    }

    pub fn lhs(&self) -> &Expr {
        match self {
            Relation::Equation { lhs, .. } | Relation::Inequality { lhs, .. } => lhs,
        }
    }

    pub fn rhs(&self) -> &Expr {
        match self {
            Relation::Equation { rhs, .. } | Relation::Inequality { rhs, .. } => rhs,
        }
    }

    /// Returns the signed difference `lhs - rhs` used for implicit plotting.
    pub fn difference(&self) -> Expr {
        Expr::sub(self.lhs().clone(), self.rhs().clone())
    }

    /// Post-order traversal over both sides, left side first.
    pub fn post_order(&self) -> impl Iterator<Item = &Expr> {
        self.lhs().post_order().chain(self.rhs().post_order())
    }

    /// Returns whether `name` occurs on neither side.
    pub fn is_independent_of(&self, name: &str) -> bool {
        self.lhs().is_independent_of(name) && self.rhs().is_independent_of(name)
    }

    fn symbol(&self) -> &'static str {
        match self {
            Relation::Equation { .. } => "=",
            Relation::Inequality { kind, .. } => kind.symbol(),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs(), self.symbol(), self.rhs())
    }
}

/// Result of parsing free-form input: a bare expression or a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Expr(Expr),
    Relation(Relation),
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Expr(expr) => write!(f, "{expr}"),
            Formula::Relation(relation) => write!(f, "{relation}"),
        }
    }
}
