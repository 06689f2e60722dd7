//! Difficulty heuristics. Higher is harder; not used for correctness.

use crate::assemble::Hypotheses;
use crate::bundle::Bundle;
use crate::cache::TruthTable;

const STATEMENT_WEIGHT: f64 = 0.5;
const PEOPLE_WEIGHT: f64 = 1.0;
const SLOW_REDUCTION_WEIGHT: f64 = 5.0;
const NARROW_WEIGHT: f64 = 2.0;

/// Score from the hypothesis reduction history.
///
/// Replays the bundles in speaker order over fresh hypotheses and combines
/// the statement count, the population size, how slowly each bundle narrows
/// the hypotheses on average, and `log2` of the smallest hypothesis count
/// above one seen along the way. Returns `f64::INFINITY` if nothing survives.
pub fn from_history(bundles: &[Bundle], shill: bool, table: &TruthTable) -> f64 {
    assert_eq!(bundles.len(), table.num_people(), "Truth table population mismatch");

    let mut hypotheses = Hypotheses::new(table, shill);
    let mut narrowest = hypotheses.count();
    let mut reductions = Vec::new();
    for (speaker, bundle) in bundles.iter().enumerate() {
        if bundle.is_empty() {
            continue;
        }
        let before = hypotheses.count();
        hypotheses = hypotheses.restrict(speaker, &table.all_true_mask(bundle), table);
        let after = hypotheses.count();
        if before > 0 {
            reductions.push((before - after) as f64 / before as f64);
        }
        if after > 1 {
            narrowest = narrowest.min(after);
        }
    }

    if hypotheses.count() == 0 {
        return f64::INFINITY;
    }

    let statements = bundles.iter().map(Bundle::len).sum::<usize>() as f64;
    let mean_reduction = if reductions.is_empty() {
        0.0
    } else {
        reductions.iter().sum::<f64>() / reductions.len() as f64
    };
    STATEMENT_WEIGHT * statements
        + PEOPLE_WEIGHT * bundles.len() as f64
        + SLOW_REDUCTION_WEIGHT * (1.0 - mean_reduction)
        + NARROW_WEIGHT * (narrowest.max(1) as f64).log2()
}

/// Score from statement density alone.
pub fn from_density(bundles: &[Bundle]) -> f64 {
    let people = bundles.len() as f64;
    if people == 0.0 {
        return 0.0;
    }
    let statements = bundles.iter().map(Bundle::len).sum::<usize>() as f64;
    people * (1.0 + statements / people)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Statement;

    fn two_person() -> Vec<Bundle> {
        vec![
            Bundle::new(vec![Statement::if_then(1, 0)]),
            Bundle::new(vec![Statement::both_or_neither(0, 1)]),
        ]
    }

    #[test]
    fn test_history_score() {
        let table = TruthTable::new(2);
        let score = from_history(&two_person(), false, &table);
        // Speaker 0 narrows 4 -> 1 (reduction 0.75), speaker 1 keeps 1 (reduction 0).
        // 0.5 * 2 + 1.0 * 2 + 5 * (1 - 0.375) + 2 * log2(4)
        let expected = 1.0 + 2.0 + 5.0 * 0.625 + 4.0;
        assert!((score - expected).abs() < 1e-9, "score = {}", score);
    }

    #[test]
    fn test_unsatisfiable_is_infinite() {
        let table = TruthTable::new(2);
        let bundles = vec![
            Bundle::new(vec![Statement::at_least_one(0, 1)]),
            Bundle::new(vec![Statement::at_least_one(0, 1)]),
        ];
        assert_eq!(from_history(&bundles, false, &table), f64::INFINITY);
    }

    #[test]
    fn test_density() {
        assert_eq!(from_density(&two_person()), 4.0);
        assert_eq!(from_density(&[]), 0.0);
    }

    #[test]
    fn test_more_statements_score_higher() {
        let table = TruthTable::new(2);
        let mut longer = two_person();
        longer[1] = Bundle::new(vec![Statement::both_or_neither(0, 1), Statement::at_most_one(0, 1)]);
        assert!(from_density(&longer) > from_density(&two_person()));
        // Same reduction history, one more statement: exactly 0.5 higher.
        let base = from_history(&two_person(), false, &table);
        let extra = from_history(&longer, false, &table);
        assert!(extra > base);
        assert!((extra - base - 0.5).abs() < 1e-9, "{} vs {}", extra, base);
    }
}
