//! Statement bundles and per-speaker candidate generation.
//!
//! A [`Bundle`] is the ordered list of statements attributed to one speaker.
//! For truth purposes it is a conjunction; the order only matters for
//! rendering.
//!
//! [`candidate_bundles`] lists the bundles a speaker could say under a target:
//! truthful speakers need every statement true, liars and the shill need at
//! least one false statement. Every candidate goes through two filters:
//!
//! - [`has_contradiction`]: a lying bundle with two mutually exclusive
//!   statements gives the speaker away and is rejected;
//! - [`filter_redundant`]: a statement implied by another statement of the
//!   bundle is dropped.
use std::collections::{BTreeSet, HashSet};

use log::debug;
use rand::prelude::*;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::cache::TruthTable;
use crate::config::GenerationConfig;
use crate::library::Library;
use crate::mask::Mask;
use crate::statement::{Statement, StatementKind};
use crate::types::Target;
use crate::utils::{binomial, Combinations};

/// Admissible pools smaller than this are enumerated exhaustively.
pub const EXHAUSTIVE_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle(Vec<Statement>);

impl Bundle {
    pub fn new(statements: Vec<Statement>) -> Self {
        Bundle(statements)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }

    /// Distinct statement kinds used in the bundle.
    pub fn kinds(&self) -> BTreeSet<StatementKind> {
        self.0.iter().map(Statement::kind).collect()
    }

    /// Returns true if the first two statements mention the same two people.
    pub fn reuses_same_pair(&self) -> bool {
        match self.0.as_slice() {
            [first, second, ..] => {
                let people = first.referenced_people();
                people.len() == 2 && people == second.referenced_people()
            }
            _ => false,
        }
    }

    /// Sum of the complexity weights.
    pub fn complexity(&self) -> u32 {
        self.0.iter().map(Statement::complexity_weight).sum()
    }
}

impl<'a> IntoIterator for &'a Bundle {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Statement>> for Bundle {
    fn from(statements: Vec<Statement>) -> Self {
        Bundle(statements)
    }
}

/// Returns true if two statements can never hold together.
pub fn has_contradiction(statements: &[Statement], table: &TruthTable) -> bool {
    let masks: Vec<_> = statements.iter().map(|s| table.truth_mask(s)).collect();
    for i in 0..masks.len() {
        for j in i + 1..masks.len() {
            if masks[i].is_disjoint(&masks[j]) {
                return true;
            }
        }
    }
    false
}

/// Drops every statement implied by another kept statement.
///
/// If `A`'s truth mask is a subset of `B`'s, `B` adds nothing once `A` is said,
/// so `B` goes. Among statements with equal masks the first one stays.
/// The result has no two comparable masks, so filtering it again is a no-op,
/// and its conjunction holds on exactly the same assignments as the input.
pub fn filter_redundant(statements: &[Statement], table: &TruthTable) -> Vec<Statement> {
    let mut kept: Vec<(Statement, Mask)> = Vec::with_capacity(statements.len());
    for s in statements {
        let mask = table.truth_mask(s).into_owned();
        if kept.iter().any(|(_, k)| k.is_subset(&mask)) {
            continue;
        }
        kept.retain(|(_, k)| !mask.is_subset(k));
        kept.push((s.clone(), mask));
    }
    kept.into_iter().map(|(s, _)| s).collect()
}

/// Checks the role constraint and both filters; returns the filtered bundle if accepted.
fn accept(statements: Vec<Statement>, must_lie: bool, target_index: usize, table: &TruthTable, min: usize) -> Option<Bundle> {
    let all_true = statements.iter().all(|s| s.evaluate_index(target_index));
    if must_lie == all_true {
        return None;
    }
    if must_lie && has_contradiction(&statements, table) {
        return None;
    }
    let filtered = filter_redundant(&statements, table);
    if filtered.len() < min {
        return None;
    }
    Some(Bundle(filtered))
}

/// Lists the bundles `speaker` could say under `target`.
///
/// Bundle sizes range over the configured bounds. When fewer than
/// [`EXHAUSTIVE_LIMIT`] statements are admissible, or a size has no more
/// combinations than `pool_size`, every combination is tried; otherwise
/// `pool_size` random combinations are drawn per size.
///
/// Bundles whose first two statements are about the same two people are
/// dropped when other candidates remain.
pub fn candidate_bundles<R: Rng + ?Sized>(
    speaker: usize,
    target: &Target,
    library: &Library,
    table: &TruthTable,
    config: &GenerationConfig,
    rng: &mut R,
) -> Vec<Bundle> {
    let admissible: Vec<&Statement> = library
        .iter()
        .filter(|s| config.allow_self_reference || !s.references(speaker))
        .collect();
    let must_lie = target.role(speaker).must_contain_falsehood();
    let target_index = target.assignment.index();
    let min = config.min_statements;

    let mut seen = HashSet::new();
    let mut bundles = Vec::new();
    let mut consider = |picked: Vec<usize>| {
        let statements = picked.into_iter().map(|i| admissible[i].clone()).collect();
        if let Some(bundle) = accept(statements, must_lie, target_index, table, min) {
            if seen.insert(bundle.clone()) {
                bundles.push(bundle);
            }
        }
    };

    for size in config.min_statements..=config.max_statements {
        if size > admissible.len() {
            break;
        }
        if admissible.len() < EXHAUSTIVE_LIMIT || binomial(admissible.len(), size) <= config.pool_size as u64 {
            Combinations::new(admissible.len(), size).for_each(&mut consider);
        } else {
            for _ in 0..config.pool_size {
                consider(index::sample(rng, admissible.len(), size).into_vec());
            }
        }
    }

    if min >= 2 && bundles.iter().any(|b| !b.reuses_same_pair()) {
        bundles.retain(|b| !b.reuses_same_pair());
    }

    debug!(
        "Speaker {} ({:?}): {} candidate bundles from {} admissible statements",
        speaker,
        target.role(speaker),
        bundles.len(),
        admissible.len()
    );
    bundles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Comparator;
    use crate::types::Assignment;

    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn setup(n: usize) -> (Library, TruthTable) {
        let library = Library::build(&GenerationConfig::new(n));
        let table = TruthTable::build(&library);
        (library, table)
    }

    #[test]
    fn test_contradiction() {
        let table = TruthTable::new(3);
        let contradictory = [Statement::neither(1, 2), Statement::at_least_one(1, 2)];
        assert!(has_contradiction(&contradictory, &table));
        let compatible = [Statement::neither(1, 2), Statement::if_then(1, 2)];
        assert!(!has_contradiction(&compatible, &table));
    }

    #[test]
    fn test_filter_redundant() {
        let table = TruthTable::new(3);
        // "exactly one" implies "at least one", so the weaker statement goes.
        let bundle = [Statement::at_least_one(1, 2), Statement::exactly_one(1, 2)];
        assert_eq!(filter_redundant(&bundle, &table), vec![Statement::exactly_one(1, 2)]);

        let independent = [Statement::if_then(0, 1), Statement::if_then(1, 2)];
        assert_eq!(filter_redundant(&independent, &table), independent.to_vec());

        // Logically equivalent statements: the first is kept.
        let same = [Statement::if_not_then(0, 1), Statement::at_least_one(0, 1)];
        assert_eq!(filter_redundant(&same, &table), vec![Statement::if_not_then(0, 1)]);
    }

    #[test]
    fn test_filter_preserves_conjunction() {
        let table = TruthTable::new(4);
        let bundle = [
            Statement::count([0, 1, 2, 3], Comparator::AtMost, 3),
            Statement::count([0, 1, 2, 3], Comparator::Exactly, 1),
            Statement::at_most_one(0, 3),
        ];
        let filtered = filter_redundant(&bundle, &table);
        assert_eq!(filtered, vec![Statement::count([0, 1, 2, 3], Comparator::Exactly, 1)]);
        assert_eq!(table.all_true_mask(&filtered), table.all_true_mask(&bundle));
    }

    proptest! {
        #[test]
        fn prop_filter_idempotent(picks in proptest::collection::vec(0..200usize, 1..6)) {
            let library = Library::build(&GenerationConfig::new(4));
            let table = TruthTable::build(&library);
            let bundle: Vec<Statement> = picks.iter().map(|&i| library.statements()[i % library.len()].clone()).collect();
            let once = filter_redundant(&bundle, &table);
            let twice = filter_redundant(&once, &table);
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(table.all_true_mask(&once), table.all_true_mask(&bundle));
        }
    }

    #[test]
    fn test_truthful_and_liar_candidates() {
        let (library, table) = setup(4);
        let config = GenerationConfig::new(4).with_statements(2, 3);
        let target = Target::new(Assignment::new(vec![false, true, false, true]), None);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for speaker in 0..4 {
            let bundles = candidate_bundles(speaker, &target, &library, &table, &config, &mut rng);
            assert!(!bundles.is_empty());
            for bundle in &bundles {
                assert!(bundle.len() >= 2 && bundle.len() <= 3);
                assert!(bundle.iter().all(|s| !s.references(speaker)));
                let all_true = bundle.iter().all(|s| s.evaluate(&target.assignment));
                if target.assignment.is_liar(speaker) {
                    assert!(!all_true);
                    assert!(!has_contradiction(bundle.statements(), &table));
                } else {
                    assert!(all_true);
                }
                assert_eq!(filter_redundant(bundle.statements(), &table), bundle.statements());
            }
        }
    }

    #[test]
    fn test_small_size_enumerated() {
        // Single statements from a large library: fewer combinations than the pool.
        let config = GenerationConfig::new(6).with_statements(1, 1).with_pool_size(1000);
        let (library, table) = setup(6);
        let target = Target::new(Assignment::new(vec![false; 6]), None);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let bundles = candidate_bundles(0, &target, &library, &table, &config, &mut rng);
        let expected = library
            .iter()
            .filter(|s| !s.references(0) && s.evaluate(&target.assignment))
            .count();
        assert!(expected >= EXHAUSTIVE_LIMIT);
        assert_eq!(bundles.len(), expected);
    }

    #[test]
    fn test_contradictory_pool_yields_nothing() {
        let library = Library::from_statements(3, vec![Statement::neither(1, 2), Statement::at_least_one(1, 2)]);
        let table = TruthTable::build(&library);
        let config = GenerationConfig::new(3);
        let target = Target::new(Assignment::new(vec![true, false, false]), None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(candidate_bundles(0, &target, &library, &table, &config, &mut rng).is_empty());
    }

    #[test]
    fn test_shill_must_lie() {
        let library = Library::from_statements(
            3,
            vec![Statement::neither(1, 2), Statement::if_then(1, 2), Statement::exactly_one(1, 2)],
        );
        let table = TruthTable::build(&library);
        let config = GenerationConfig::new(3).with_shill(true);
        let target = Target::new(Assignment::new(vec![false, false, false]), Some(0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bundles = candidate_bundles(0, &target, &library, &table, &config, &mut rng);
        assert!(!bundles.is_empty());
        for bundle in &bundles {
            assert!(bundle.iter().any(|s| !s.evaluate(&target.assignment)));
        }
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let (library, table) = setup(6);
        let config = GenerationConfig::new(6).with_statements(2, 3).with_pool_size(30);
        let target = Target::new(Assignment::from_index(6, 0b100101), None);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            candidate_bundles(1, &target, &library, &table, &config, &mut rng)
        };
        let first = run(42);
        assert!(!first.is_empty());
        assert!(first.len() <= 60);
        assert_eq!(first, run(42));
    }

    #[test]
    fn test_pair_reuse_preference() {
        let library = Library::from_statements(
            4,
            vec![Statement::if_then(1, 2), Statement::if_then(2, 1), Statement::if_then(2, 3)],
        );
        let table = TruthTable::build(&library);
        let config = GenerationConfig::new(4);
        let target = Target::new(Assignment::new(vec![false; 4]), None);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bundles = candidate_bundles(0, &target, &library, &table, &config, &mut rng);
        assert!(!bundles.is_empty());
        assert!(bundles.iter().all(|b| !b.reuses_same_pair()));
    }

    #[test]
    fn test_kinds() {
        let bundle = Bundle::new(vec![Statement::if_then(0, 1), Statement::if_then(1, 2), Statement::neither(0, 2)]);
        assert_eq!(bundle.kinds().len(), 2);
        assert_eq!(bundle.complexity(), 4);
        assert!(!bundle.reuses_same_pair());
        assert!(Bundle::new(vec![Statement::if_then(0, 1), Statement::neither(1, 0)]).reuses_same_pair());
    }
}
