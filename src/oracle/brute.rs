//! Exhaustive satisfiability over all models.

use num_bigint::BigUint;

use super::{Formula, SatBackend};

/// Largest formula [`BruteForce`] accepts.
pub const MAX_VARS: usize = 24;

/// Tries every model in index order. Only for small formulas.
#[derive(Debug, Default, Copy, Clone)]
pub struct BruteForce;

impl BruteForce {
    fn models(formula: &Formula) -> impl Iterator<Item = Vec<bool>> + '_ {
        let n = formula.num_vars();
        assert!(n <= MAX_VARS, "Brute force supports at most {} variables, got {}", MAX_VARS, n);
        (0..1usize << n)
            .map(move |j| (0..n).map(|i| (j >> i) & 1 == 1).collect::<Vec<_>>())
            .filter(|model| formula.eval(model))
    }
}

impl SatBackend for BruteForce {
    fn solve(&self, formula: &Formula) -> Option<Vec<bool>> {
        Self::models(formula).next()
    }

    fn count_models(&self, formula: &Formula) -> BigUint {
        BigUint::from(Self::models(formula).count())
    }
}
