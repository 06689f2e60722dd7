//! Reduced ordered BDDs with complement edges.
//!
//! A small manager-centric BDD: every operation goes through [`Bdd`], which
//! hash-conses nodes so that each boolean function over a fixed variable order
//! has exactly one [`Ref`]. Nodes live in a vector; index `1` is the terminal,
//! and negation is a sign bit on the reference, so `one = @1` and `zero = ~@1`.
//!
//! Variables are 1-indexed (0 is reserved for the terminal). Smaller variables
//! are closer to the root.
//!
//! Canonicity invariant of [`Bdd::mk_node`]: the high edge of a stored node is
//! never negated, and a node never has equal children.
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::ops::Neg;

use log::debug;
use num_bigint::BigUint;

use super::{Formula, SatBackend};
use crate::expr::Expr;

/// A possibly negated reference to a BDD node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ref(i32);

impl Ref {
    pub const fn positive(index: u32) -> Self {
        Self(index as i32)
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    /// Return the index of the referenced node.
    pub const fn index(self) -> usize {
        self.0.unsigned_abs() as usize
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", if self.is_negated() { "~" } else { "" }, self.index())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

pub struct Bdd {
    nodes: RefCell<Vec<Node>>,
    unique: RefCell<HashMap<Node, u32>>,
    cache: RefCell<HashMap<(Ref, Ref, Ref), Ref>>,
    pub zero: Ref,
    pub one: Ref,
}

impl Default for Bdd {
    fn default() -> Self {
        // Index 0 is unused so that every valid reference is non-zero.
        let placeholder = Node {
            variable: 0,
            low: Ref(0),
            high: Ref(0),
        };
        let one = Ref::positive(1);
        let terminal = Node {
            variable: 0,
            low: one,
            high: one,
        };
        Self {
            nodes: RefCell::new(vec![placeholder, terminal]),
            unique: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
            zero: -one,
            one,
        }
    }
}

impl std::fmt::Debug for Bdd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("nodes", &self.num_nodes())
            .field("cache", &self.cache.borrow().len())
            .finish()
    }
}

impl Bdd {
    /// Number of allocated nodes, including the terminal.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len() - 1
    }

    pub fn variable(&self, index: usize) -> u32 {
        self.nodes.borrow()[index].variable
    }
    pub fn low(&self, index: usize) -> Ref {
        self.nodes.borrow()[index].low
    }
    pub fn high(&self, index: usize) -> Ref {
        self.nodes.borrow()[index].high
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.low(node.index());
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.high(node.index());
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        self.is_zero(node) || self.is_one(node)
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");

        // Handle canonicity
        if high.is_negated() {
            return -self.mk_node(v, -low, -high);
        }

        // Handle duplicates
        if low == high {
            return low;
        }

        let node = Node { variable: v, low, high };
        if let Some(&i) = self.unique.borrow().get(&node) {
            return Ref::positive(i);
        }
        let mut nodes = self.nodes.borrow_mut();
        let i = nodes.len() as u32;
        nodes.push(node);
        self.unique.borrow_mut().insert(node, i);
        Ref::positive(i)
    }

    pub fn mk_var(&self, v: u32) -> Ref {
        assert_ne!(v, 0, "Variable index should not be zero");
        self.mk_node(v, self.zero, self.one)
    }

    fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        if self.is_terminal(node) || v < self.variable(node.index()) {
            return (node, node);
        }
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if self.is_one(f) {
            return g;
        }
        if self.is_zero(f) {
            return h;
        }
        if g == h {
            return g;
        }
        if self.is_one(g) && self.is_zero(h) {
            return f;
        }
        if self.is_zero(g) && self.is_one(h) {
            return -f;
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        if g == f {
            return self.apply_ite(f, self.one, h);
        }
        if h == f {
            return self.apply_ite(f, g, self.zero);
        }
        if g == -f {
            return self.apply_ite(f, self.zero, h);
        }
        if h == -f {
            return self.apply_ite(f, g, self.one);
        }

        // Make sure the first two pointers (f and g) are regular (not negated)
        let (mut f, mut g, mut h) = (f, g, h);

        // ite(~F,G,H) => ite(F,H,G)
        if f.is_negated() {
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }

        // ite(F,~G,H) => ~ite(F,G,~H)
        let mut n = false;
        if g.is_negated() {
            n = true;
            g = -g;
            h = -h;
        }

        let key = (f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            return if n { -res } else { res };
        }

        // Determine the top variable:
        let mut m = self.variable(f.index());
        for x in [g, h] {
            let v = self.variable(x.index());
            if v != 0 {
                m = m.min(v);
            }
        }
        assert_ne!(m, 0);

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0);
        let t = self.apply_ite(f1, g1, h1);

        let res = self.mk_node(m, e, t);
        self.cache.borrow_mut().insert(key, res);

        if n {
            -res
        } else {
            res
        }
    }

    pub fn apply_not(&self, f: Ref) -> Ref {
        -f
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, self.one, v)
    }

    pub fn apply_xor(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, -v, v)
    }

    pub fn apply_eq(&self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, -v)
    }

    pub fn apply_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        nodes.into_iter().fold(self.one, |acc, x| self.apply_and(acc, x))
    }

    pub fn apply_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        nodes.into_iter().fold(self.zero, |acc, x| self.apply_or(acc, x))
    }

    /// Cardinality constraint: true iff `accept(number of true variables in vars)`.
    ///
    /// Built bottom-up as a layered counter, one layer per variable.
    pub fn mk_counter(&self, vars: &[u32], accept: impl Fn(usize) -> bool) -> Ref {
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        vars.dedup();
        let m = vars.len();

        // layer[c] = function of the remaining variables, given c of the earlier ones are true
        let mut layer: Vec<Ref> = (0..=m)
            .map(|c| if accept(c) { self.one } else { self.zero })
            .collect();
        for p in (0..m).rev() {
            layer = (0..=p).map(|c| self.mk_node(vars[p], layer[c], layer[c + 1])).collect();
        }
        layer[0]
    }

    /// Builds the BDD of a formula; formula variable `i` is BDD variable `i + 1`.
    pub fn build(&self, expr: &Expr) -> Ref {
        let var = |i: usize| i as u32 + 1;
        match expr {
            Expr::Const(true) => self.one,
            Expr::Const(false) => self.zero,
            Expr::Var(i) => self.mk_var(var(*i)),
            Expr::Not(inner) => self.apply_not(self.build(inner)),
            Expr::And(items) => self.apply_and_many(items.iter().map(|e| self.build(e))),
            Expr::Or(items) => self.apply_or_many(items.iter().map(|e| self.build(e))),
            Expr::Iff(a, b) => self.apply_eq(self.build(a), self.build(b)),
            Expr::Xor(a, b) => self.apply_xor(self.build(a), self.build(b)),
            Expr::Count { vars, cmp, k } => {
                let vars: Vec<u32> = vars.iter().map(|&v| var(v)).collect();
                self.mk_counter(&vars, |c| cmp.test(c, *k))
            }
            Expr::Parity { vars, odd } => {
                let vars: Vec<u32> = vars.iter().map(|&v| var(v)).collect();
                self.mk_counter(&vars, |c| (c % 2 == 1) == *odd)
            }
        }
    }

    /// Returns one satisfying model over `num_vars` variables, if any exists.
    ///
    /// Walks down the BDD preferring the high branch; variables skipped on the path are false.
    pub fn one_sat(&self, node: Ref, num_vars: usize) -> Option<Vec<bool>> {
        if self.is_zero(node) {
            return None;
        }

        let mut model = vec![false; num_vars];
        let mut current = node;
        while !self.is_one(current) {
            let v = self.variable(current.index()) as usize;
            let high = self.high_node(current);
            if !self.is_zero(high) {
                model[v - 1] = true;
                current = high;
            } else {
                current = self.low_node(current);
            }
        }
        Some(model)
    }

    /// Number of models over `num_vars` variables.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let mut cache = HashMap::new();
        let max = BigUint::from(1u32) << num_vars;
        self.sat_count_rec(node, &max, &mut cache)
    }

    fn sat_count_rec(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let low = self.low(node.index());
        let high = self.high(node.index());

        let count_low = self.sat_count_rec(low, max, cache);
        let count_high = self.sat_count_rec(high, max, cache);

        let count: BigUint = (count_low + count_high) >> 1;
        let count = if node.is_negated() { max - count } else { count };

        cache.insert(node, count.clone());
        count
    }
}

/// Satisfiability through a fresh BDD per query.
#[derive(Debug, Default, Copy, Clone)]
pub struct BddBackend;

impl BddBackend {
    fn compile(formula: &Formula) -> (Bdd, Ref) {
        let bdd = Bdd::default();
        let f = bdd.apply_and_many(formula.constraints().iter().map(|c| bdd.build(c)));
        debug!("Compiled {} constraints into {} BDD nodes", formula.constraints().len(), bdd.num_nodes());
        (bdd, f)
    }
}

impl SatBackend for BddBackend {
    fn solve(&self, formula: &Formula) -> Option<Vec<bool>> {
        let (bdd, f) = Self::compile(formula);
        bdd.one_sat(f, formula.num_vars())
    }

    fn count_models(&self, formula: &Formula) -> BigUint {
        let (bdd, f) = Self::compile(formula);
        bdd.sat_count(f, formula.num_vars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Comparator;

    #[test]
    fn test_terminals() {
        let bdd = Bdd::default();
        assert_eq!(bdd.zero, -bdd.one);
        assert!(bdd.is_one(bdd.apply_and(bdd.one, bdd.one)));
        assert!(bdd.is_zero(bdd.apply_and(bdd.one, bdd.zero)));
    }

    #[test]
    fn test_hash_consing() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let f = bdd.apply_and(x, y);
        let g = bdd.apply_and(y, x);
        assert_eq!(f, g);
        assert_eq!(bdd.apply_or(-x, -y), -f);
        assert_eq!(bdd.apply_xor(x, x), bdd.zero);
        assert_eq!(bdd.apply_eq(x, x), bdd.one);
    }

    #[test]
    fn test_canonical_high_edge() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let f = bdd.apply_xor(x, y);
        for i in 2..=bdd.num_nodes() {
            assert!(!bdd.high(i).is_negated());
        }
        assert!(!bdd.is_terminal(f));
    }

    #[test]
    fn test_ite() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1);
        let y = bdd.mk_var(2);
        let z = bdd.mk_var(3);
        let f = bdd.apply_ite(x, y, z);
        let x_and_y = bdd.apply_and(x, y);
        let not_x_and_z = bdd.apply_and(-x, z);
        assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z));
        assert_eq!(f, bdd.mk_node(1, z, y));
    }

    #[test]
    fn test_counter() {
        let bdd = Bdd::default();
        let exactly_two = bdd.mk_counter(&[3, 1, 2], |c| c == 2);
        assert_eq!(bdd.sat_count(exactly_two, 3), BigUint::from(3u32));
        let odd = bdd.mk_counter(&[1, 2, 3, 4], |c| c % 2 == 1);
        assert_eq!(bdd.sat_count(odd, 4), BigUint::from(8u32));
        assert_eq!(bdd.mk_counter(&[], |c| c == 0), bdd.one);
    }

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::default();
        // x1 ∧ ¬x2 ∧ ¬x3
        let f = bdd.apply_and_many([bdd.mk_var(1), -bdd.mk_var(2), -bdd.mk_var(3)]);
        assert_eq!(bdd.one_sat(f, 3), Some(vec![true, false, false]));
        assert_eq!(bdd.one_sat(bdd.zero, 3), None);
        assert_eq!(bdd.one_sat(bdd.one, 2), Some(vec![false, false]));
    }

    #[test]
    fn test_sat_count_with_skipped_vars() {
        let bdd = Bdd::default();
        let f = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(3));
        assert_eq!(bdd.sat_count(f, 3), BigUint::from(6u32));
        assert_eq!(bdd.sat_count(-f, 3), BigUint::from(2u32));
    }

    #[test]
    fn test_build_matches_eval() {
        let e = Expr::and([
            Expr::xor(Expr::var(0), Expr::var(2)),
            Expr::count([0, 1, 2, 3], Comparator::AtMost, 2),
            Expr::Parity {
                vars: vec![1, 3],
                odd: false,
            },
        ]);
        let bdd = Bdd::default();
        let f = bdd.build(&e);
        let models = (0..16u32)
            .filter(|j| {
                let model: Vec<bool> = (0..4).map(|i| (j >> i) & 1 == 1).collect();
                e.eval(&model)
            })
            .count();
        assert_eq!(bdd.sat_count(f, 4), BigUint::from(models));
        let model = bdd.one_sat(f, 4).unwrap();
        assert!(e.eval(&model));
    }
}
