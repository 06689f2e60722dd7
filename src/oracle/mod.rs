//! Independent verification of finished puzzles.
//!
//! The [`Oracle`] re-derives the puzzle's constraints from its bundles alone,
//! without knowing the intended answer, and asks a [`SatBackend`] about them.
//!
//! Encoding over `N` people: variable `i` (for `i < N`) is "person `i` is a
//! liar". With the shill rule on, variable `N + i` is "person `i` is the
//! shill", every shill is not a liar, and there is exactly one shill. Each
//! speaker with a non-empty bundle contributes
//!
//! ```text
//! (all statements hold) <=> ¬liar(i)                 without the shill rule
//! (all statements hold) <=> ¬liar(i) ∧ ¬shill(i)     with the shill rule
//! ```
//!
//! A puzzle is accepted only if this formula has exactly one model.
use log::debug;
use num_bigint::BigUint;

use crate::bundle::Bundle;
use crate::cache::TruthTable;
use crate::expr::Expr;
use crate::puzzle::Puzzle;
use crate::statement::Comparator;
use crate::types::Assignment;

pub mod bdd;
pub mod brute;
pub mod difficulty;

pub use self::bdd::BddBackend;
pub use self::brute::BruteForce;

/// A conjunction of constraints over `num_vars` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_vars: usize,
    constraints: Vec<Expr>,
}

impl Formula {
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            constraints: Vec::new(),
        }
    }

    /// Adds a constraint.
    ///
    /// # Panics
    ///
    /// Panics if the constraint uses a variable beyond `num_vars`.
    pub fn push(&mut self, constraint: Expr) {
        assert!(
            constraint.num_vars() <= self.num_vars,
            "Constraint {} exceeds {} variables",
            constraint,
            self.num_vars
        );
        self.constraints.push(constraint);
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn constraints(&self) -> &[Expr] {
        &self.constraints
    }

    pub fn eval(&self, model: &[bool]) -> bool {
        self.constraints.iter().all(|c| c.eval(model))
    }

    /// Excludes exactly `model` from the solutions.
    pub fn block(&mut self, model: &[bool]) {
        assert_eq!(model.len(), self.num_vars, "Model size mismatch");
        let clause = model
            .iter()
            .enumerate()
            .map(|(i, &value)| if value { Expr::not(Expr::var(i)) } else { Expr::var(i) });
        self.constraints.push(Expr::or(clause));
    }
}

/// A satisfiability engine.
pub trait SatBackend {
    /// Returns any model of the formula, or `None` if it is unsatisfiable.
    fn solve(&self, formula: &Formula) -> Option<Vec<bool>>;

    /// Returns true if the formula has exactly one model.
    ///
    /// Finds one model, blocks it and checks that nothing else remains.
    fn is_unique(&self, formula: &Formula) -> bool {
        match self.solve(formula) {
            None => false,
            Some(model) => {
                let mut blocked = formula.clone();
                blocked.block(&model);
                self.solve(&blocked).is_none()
            }
        }
    }

    /// Number of models, by repeated blocking.
    fn count_models(&self, formula: &Formula) -> BigUint {
        let mut formula = formula.clone();
        let mut count = BigUint::ZERO;
        while let Some(model) = self.solve(&formula) {
            count += 1u32;
            formula.block(&model);
        }
        count
    }
}

/// A consistent reading of a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub liars: Assignment,
    pub shill: Option<usize>,
}

impl Solution {
    fn from_model(model: &[bool], num_people: usize, shill: bool) -> Self {
        let liars = Assignment::new(model[..num_people].to_vec());
        let shill = if shill {
            model[num_people..2 * num_people].iter().position(|&s| s)
        } else {
            None
        };
        Self { liars, shill }
    }
}

/// Builds the constraint formula of a set of bundles.
pub fn encode(bundles: &[Bundle], shill: bool) -> Formula {
    let n = bundles.len();
    let liar = Expr::var;
    let shill_var = |i: usize| Expr::var(n + i);
    let mut formula = Formula::new(if shill { 2 * n } else { n });

    for (i, bundle) in bundles.iter().enumerate() {
        if bundle.is_empty() {
            continue;
        }
        let all_true = Expr::and(bundle.iter().map(Expr::from));
        let honest = if shill {
            Expr::and([Expr::not(liar(i)), Expr::not(shill_var(i))])
        } else {
            Expr::not(liar(i))
        };
        formula.push(Expr::iff(all_true, honest));
    }

    if shill {
        for i in 0..n {
            formula.push(Expr::implies(shill_var(i), Expr::not(liar(i))));
        }
        formula.push(Expr::count(n..2 * n, Comparator::Exactly, 1));
    }
    formula
}

/// Verifies puzzles and scores their difficulty.
#[derive(Debug, Default, Clone)]
pub struct Oracle<B = BddBackend> {
    backend: B,
}

impl Oracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: SatBackend> Oracle<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    fn formula(&self, puzzle: &Puzzle) -> Formula {
        let formula = encode(&puzzle.bundles, puzzle.has_shill);
        debug!(
            "Encoded puzzle with {} people into {} constraints over {} variables",
            puzzle.num_people(),
            formula.constraints().len(),
            formula.num_vars()
        );
        formula
    }

    /// Any consistent reading of the puzzle.
    pub fn find_one_solution(&self, puzzle: &Puzzle) -> Option<Solution> {
        let model = self.backend.solve(&self.formula(puzzle))?;
        Some(Solution::from_model(&model, puzzle.num_people(), puzzle.has_shill))
    }

    /// Returns true if the puzzle has exactly one consistent reading.
    pub fn is_uniquely_satisfiable(&self, puzzle: &Puzzle) -> bool {
        self.backend.is_unique(&self.formula(puzzle))
    }

    /// Number of consistent readings.
    pub fn count_solutions(&self, puzzle: &Puzzle) -> BigUint {
        self.backend.count_models(&self.formula(puzzle))
    }

    /// Heuristic difficulty; `f64::INFINITY` for an unsatisfiable puzzle.
    ///
    /// Uses the hypothesis reduction history when a truth table for the
    /// puzzle's population is given, statement density otherwise.
    pub fn estimate_difficulty(&self, puzzle: &Puzzle, table: Option<&TruthTable>) -> f64 {
        if self.find_one_solution(puzzle).is_none() {
            return f64::INFINITY;
        }
        match table {
            Some(table) if table.num_people() == puzzle.num_people() => {
                difficulty::from_history(&puzzle.bundles, puzzle.has_shill, table)
            }
            _ => difficulty::from_density(&puzzle.bundles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::Puzzle;
    use crate::statement::Statement;

    use test_log::test;

    fn two_person_puzzle() -> Puzzle {
        Puzzle::new(
            vec![
                Bundle::new(vec![Statement::if_then(1, 0)]),
                Bundle::new(vec![Statement::both_or_neither(0, 1)]),
            ],
            false,
        )
    }

    #[test]
    fn test_two_person_unique() {
        let puzzle = two_person_puzzle();
        let oracle = Oracle::new();
        assert!(oracle.is_uniquely_satisfiable(&puzzle));
        let solution = oracle.find_one_solution(&puzzle).unwrap();
        assert_eq!(solution.liars, Assignment::new(vec![false, false]));
        assert_eq!(solution.shill, None);
        assert_eq!(oracle.count_solutions(&puzzle), BigUint::from(1u32));

        let brute = Oracle::with_backend(BruteForce);
        assert!(brute.is_uniquely_satisfiable(&puzzle));
        assert_eq!(brute.find_one_solution(&puzzle), Some(solution));
    }

    #[test]
    fn test_block() {
        let mut formula = Formula::new(2);
        formula.block(&[true, false]);
        assert!(!formula.eval(&[true, false]));
        assert!(formula.eval(&[true, true]));
        assert!(formula.eval(&[false, false]));
    }

    #[test]
    fn test_not_unique() {
        // Both speakers say "at least one of us is a liar": each is truthful iff the other lies.
        let puzzle = Puzzle::new(
            vec![
                Bundle::new(vec![Statement::at_least_one(0, 1)]),
                Bundle::new(vec![Statement::at_least_one(0, 1)]),
            ],
            false,
        );
        let oracle = Oracle::new();
        assert!(!oracle.is_uniquely_satisfiable(&puzzle));
        // Any liar makes the claim true, which forces both to be truthful.
        assert_eq!(oracle.count_solutions(&puzzle), BigUint::ZERO);
        assert_eq!(oracle.find_one_solution(&puzzle), None);
        assert_eq!(oracle.estimate_difficulty(&puzzle, None), f64::INFINITY);
    }

    #[test]
    fn test_silent_speakers_unconstrained() {
        let puzzle = Puzzle::new(vec![Bundle::default(), Bundle::default(), Bundle::default()], false);
        assert_eq!(Oracle::new().count_solutions(&puzzle), BigUint::from(8u32));
        assert_eq!(
            Oracle::with_backend(BruteForce).count_solutions(&puzzle),
            BigUint::from(8u32)
        );
    }

    #[test]
    fn test_shill_encoding() {
        // Nobody speaks: 3 people, shill any non-liar.
        let formula = encode(&[Bundle::default(), Bundle::default(), Bundle::default()], true);
        assert_eq!(formula.num_vars(), 6);
        // For each shill s, the other two people are free: 3 * 4.
        assert_eq!(BddBackend.count_models(&formula), BigUint::from(12u32));
        assert_eq!(BruteForce.count_models(&formula), BigUint::from(12u32));
    }

    #[test]
    fn test_shill_solution() {
        // 0: "neither 1 nor 2 is a liar"  1: "0 is a liar"  2: "exactly one of 0 and 1 is a liar"
        let bundles = vec![
            Bundle::new(vec![Statement::neither(1, 2)]),
            Bundle::new(vec![Statement::count([0], Comparator::Exactly, 1)]),
            Bundle::new(vec![Statement::exactly_one(0, 1)]),
        ];
        let puzzle = Puzzle::new(bundles, true);
        let oracle = Oracle::with_backend(BruteForce);
        let bdd_count = Oracle::new().count_solutions(&puzzle);
        assert_eq!(oracle.count_solutions(&puzzle), bdd_count);
        if let Some(solution) = oracle.find_one_solution(&puzzle) {
            let shill = solution.shill.unwrap();
            assert!(!solution.liars.is_liar(shill));
        }
    }

    #[test]
    fn test_default_count_by_blocking() {
        struct Blocking;
        impl SatBackend for Blocking {
            fn solve(&self, formula: &Formula) -> Option<Vec<bool>> {
                BruteForce.solve(formula)
            }
        }
        let mut formula = Formula::new(3);
        formula.push(Expr::count([0, 1, 2], Comparator::AtLeast, 2));
        assert_eq!(Blocking.count_models(&formula), BigUint::from(4u32));
        assert!(!Blocking.is_unique(&formula));
    }
}
