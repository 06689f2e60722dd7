//! Boolean formula AST used by the oracle.
//!
//! Variables are 0-indexed. A model is a slice of booleans, one per variable.
use std::fmt;

use crate::statement::{Claim, Comparator, Parity, Statement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(bool),
    Var(usize),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Iff(Box<Expr>, Box<Expr>),
    Xor(Box<Expr>, Box<Expr>),
    /// The number of true variables compares to `k`.
    Count {
        vars: Vec<usize>,
        cmp: Comparator,
        k: usize,
    },
    /// The number of true variables is odd (or even).
    Parity { vars: Vec<usize>, odd: bool },
}

impl Expr {
    pub fn var(index: usize) -> Self {
        Expr::Var(index)
    }

    pub fn not(value: Self) -> Self {
        match value {
            Expr::Const(b) => Expr::Const(!b),
            Expr::Not(inner) => *inner,
            _ => Expr::Not(Box::new(value)),
        }
    }

    pub fn and(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(items.into_iter().collect())
    }

    pub fn or(items: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(items.into_iter().collect())
    }

    pub fn iff(lhs: Self, rhs: Self) -> Self {
        Expr::Iff(Box::new(lhs), Box::new(rhs))
    }

    pub fn xor(lhs: Self, rhs: Self) -> Self {
        Expr::Xor(Box::new(lhs), Box::new(rhs))
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Expr::Or(vec![Expr::not(lhs), rhs])
    }

    pub fn count(vars: impl IntoIterator<Item = usize>, cmp: Comparator, k: usize) -> Self {
        Expr::Count {
            vars: vars.into_iter().collect(),
            cmp,
            k,
        }
    }

    /// Evaluates the formula under a model.
    ///
    /// # Panics
    ///
    /// Panics if a variable is outside the model.
    pub fn eval(&self, model: &[bool]) -> bool {
        match self {
            Expr::Const(b) => *b,
            Expr::Var(i) => model[*i],
            Expr::Not(inner) => !inner.eval(model),
            Expr::And(items) => items.iter().all(|e| e.eval(model)),
            Expr::Or(items) => items.iter().any(|e| e.eval(model)),
            Expr::Iff(a, b) => a.eval(model) == b.eval(model),
            Expr::Xor(a, b) => a.eval(model) != b.eval(model),
            Expr::Count { vars, cmp, k } => cmp.test(vars.iter().filter(|&&v| model[v]).count(), *k),
            Expr::Parity { vars, odd } => (vars.iter().filter(|&&v| model[v]).count() % 2 == 1) == *odd,
        }
    }

    /// Largest variable index plus one.
    pub fn num_vars(&self) -> usize {
        match self {
            Expr::Const(_) => 0,
            Expr::Var(i) => i + 1,
            Expr::Not(inner) => inner.num_vars(),
            Expr::And(items) | Expr::Or(items) => items.iter().map(Expr::num_vars).max().unwrap_or(0),
            Expr::Iff(a, b) | Expr::Xor(a, b) => a.num_vars().max(b.num_vars()),
            Expr::Count { vars, .. } | Expr::Parity { vars, .. } => vars.iter().map(|v| v + 1).max().unwrap_or(0),
        }
    }
}

/// Encodes a statement over liar variables: variable `i` is "person `i` is a liar".
impl From<&Statement> for Expr {
    fn from(statement: &Statement) -> Self {
        let w = Expr::var;
        match statement.claim() {
            &Claim::IfThen { a, b } => Expr::implies(w(a), w(b)),
            &Claim::IfNotThen { a, b } | &Claim::AtLeastOne { a, b } => Expr::or([w(a), w(b)]),
            &Claim::BothOrNeither { a, b } => Expr::iff(w(a), w(b)),
            &Claim::ExactlyOne { a, b } => Expr::xor(w(a), w(b)),
            &Claim::AtMostOne { a, b } => Expr::not(Expr::and([w(a), w(b)])),
            &Claim::Neither { a, b } => Expr::and([Expr::not(w(a)), Expr::not(w(b))]),
            Claim::Count { scope, cmp, count } => Expr::count(scope.iter().copied(), *cmp, *count),
            Claim::Parity { scope, parity } => Expr::Parity {
                vars: scope.clone(),
                odd: *parity == Parity::Odd,
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, op: &str, items: &[Expr]) -> fmt::Result {
            write!(f, "{}(", op)?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            write!(f, ")")
        }
        match self {
            Expr::Const(b) => write!(f, "{}", b),
            Expr::Var(i) => write!(f, "x{}", i),
            Expr::Not(inner) => write!(f, "~{}", inner),
            Expr::And(items) => list(f, "and", items),
            Expr::Or(items) => list(f, "or", items),
            Expr::Iff(a, b) => write!(f, "iff({}, {})", a, b),
            Expr::Xor(a, b) => write!(f, "xor({}, {})", a, b),
            Expr::Count { vars, cmp, k } => write!(f, "count{:?}({:?}, {})", cmp, vars, k),
            Expr::Parity { vars, odd } => write!(f, "{}({:?})", if *odd { "odd" } else { "even" }, vars),
        }
    }
}
