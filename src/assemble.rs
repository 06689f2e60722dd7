//! Greedy uniqueness assembly.
//!
//! The assembler tracks the set of hypotheses still consistent with the
//! bundles committed so far and drives it down to the target alone.
//!
//! Assigning bundle `B` to speaker `i` keeps exactly the assignments in
//!
//! ```text
//! compat(i, B) = (truthful(i) ∩ T(B)) ∪ (liar(i) ∩ ¬T(B))
//! ```
//!
//! where `T(B)` is the mask of assignments on which every statement of `B`
//! holds. With the shill rule on, the shill's identity is part of the
//! hypothesis too: [`Hypotheses`] then keeps one slice per possible shill `s`,
//! restricted to assignments where `s` is not a liar, and inside slice `s`
//! speaker `s` is constrained to `¬T(B)` instead.
//!
//! Phase 1 repeatedly commits the (speaker, bundle) pair that eliminates the
//! most hypotheses while keeping the target. Phase 2 gives every remaining
//! speaker the first bundle that keeps the target. Ties in phase 1 are broken
//! by the configured randomness: at `0.0` the first best candidate in speaker
//! and pool order wins; above it, any candidate within `(1 - randomness)` of
//! the best count is drawn uniformly.
use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use rand::prelude::*;
use rand::seq::index;

use crate::bundle::{filter_redundant, Bundle};
use crate::cache::TruthTable;
use crate::config::GenerationConfig;
use crate::mask::Mask;
use crate::statement::StatementKind;
use crate::types::Target;

/// Hypotheses that survive the bundles assigned so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypotheses {
    /// One slice without the shill rule, otherwise slice `s` = "person `s` is the shill".
    slices: Vec<Mask>,
    shill: bool,
}

impl Hypotheses {
    /// Every hypothesis of the assignment space.
    pub fn new(table: &TruthTable, shill: bool) -> Self {
        let slices = if shill {
            (0..table.num_people()).map(|s| table.truthful_mask(s).clone()).collect()
        } else {
            vec![table.full_mask()]
        };
        Self { slices, shill }
    }

    /// Number of live (assignment, shill) hypotheses.
    pub fn count(&self) -> usize {
        self.slices.iter().map(Mask::len).sum()
    }

    fn slice_of(&self, target: &Target) -> Option<usize> {
        if self.shill {
            target.shill
        } else {
            Some(0)
        }
    }

    /// Returns true if the target is still possible.
    pub fn contains(&self, target: &Target) -> bool {
        self.slice_of(target)
            .is_some_and(|s| self.slices[s].contains(target.assignment.index()))
    }

    /// Returns true if the target is the only hypothesis left.
    pub fn is_singleton(&self, target: &Target) -> bool {
        self.count() == 1 && self.contains(target)
    }

    /// Hypotheses left after `speaker` says a bundle whose all-true mask is `all_true`.
    pub fn restrict(&self, speaker: usize, all_true: &Mask, table: &TruthTable) -> Self {
        let compat = compatibility_mask(speaker, all_true, table);
        let lying = !all_true;
        let slices = self
            .slices
            .iter()
            .enumerate()
            .map(|(s, slice)| {
                if self.shill && s == speaker {
                    slice & &lying
                } else {
                    slice & &compat
                }
            })
            .collect();
        Self {
            slices,
            shill: self.shill,
        }
    }

    /// The live liar assignments per shill slice.
    pub fn slices(&self) -> &[Mask] {
        &self.slices
    }
}

/// Assignments consistent with `speaker` saying a bundle whose all-true mask is `all_true`.
pub fn compatibility_mask(speaker: usize, all_true: &Mask, table: &TruthTable) -> Mask {
    let honest = table.truthful_mask(speaker) & all_true;
    let lying = table.liar_mask(speaker) & &!all_true;
    &honest | &lying
}

/// Why an assembly attempt was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// No candidate keeps the target and eliminates anything.
    Stuck { remaining: usize },
    /// Everybody spoke but more than the target survives.
    NotUnique { remaining: usize },
    /// No candidate of this speaker keeps the target.
    NoFill { speaker: usize },
    /// This speaker's final bundle is below the minimum size.
    TooFewStatements { speaker: usize },
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchFailure::Stuck { remaining } => {
                write!(f, "no improving bundle with {} hypotheses left", remaining)
            }
            SearchFailure::NotUnique { remaining } => {
                write!(f, "all speakers assigned with {} hypotheses left", remaining)
            }
            SearchFailure::NoFill { speaker } => write!(f, "no bundle keeps the target for speaker {}", speaker),
            SearchFailure::TooFewStatements { speaker } => {
                write!(f, "bundle of speaker {} is below the minimum size", speaker)
            }
        }
    }
}

/// A successful assembly.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// One bundle per speaker, in speaker order.
    pub bundles: Vec<Bundle>,
    /// Live hypothesis count initially and after each commit.
    pub trace: Vec<usize>,
    /// Speakers in the order their bundles were committed.
    pub order: Vec<usize>,
}

/// Indices into `candidates` considered in one step, at most `pool_size` of them.
fn pool<R: Rng + ?Sized>(len: usize, pool_size: usize, rng: &mut R) -> Vec<usize> {
    if len > pool_size {
        index::sample(rng, len, pool_size).into_vec()
    } else {
        (0..len).collect()
    }
}

fn adds_new_kind(bundle: &Bundle, claimed: &BTreeSet<StatementKind>) -> bool {
    bundle.iter().any(|s| !claimed.contains(&s.kind()))
}

/// Assembles one bundle per speaker so that the target is the unique solution.
///
/// `candidates[i]` are the bundles speaker `i` may say (see
/// [`candidate_bundles`][crate::bundle::candidate_bundles]).
pub fn assemble<R: Rng + ?Sized>(
    target: &Target,
    candidates: &[Vec<Bundle>],
    table: &TruthTable,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Assembly, SearchFailure> {
    let n = table.num_people();
    assert_eq!(candidates.len(), n, "Need candidate bundles for every speaker");

    let all_true: Vec<Vec<Mask>> = candidates
        .iter()
        .map(|bundles| bundles.iter().map(|b| table.all_true_mask(b)).collect())
        .collect();
    let admissible = |bundle: &Bundle, claimed: &BTreeSet<StatementKind>| {
        bundle.len() >= config.min_statements && (!config.require_diversity || adds_new_kind(bundle, claimed))
    };

    let mut hypotheses = Hypotheses::new(table, config.allow_shill);
    let mut assigned: Vec<Option<Bundle>> = vec![None; n];
    let mut claimed = BTreeSet::new();
    let mut trace = vec![hypotheses.count()];
    let mut order = Vec::with_capacity(n);

    // Phase 1: drive the hypotheses down to the target.
    while !hypotheses.is_singleton(target) && assigned.iter().any(Option::is_none) {
        let before = hypotheses.count();
        let mut options: Vec<(usize, usize, usize)> = Vec::new();
        for speaker in (0..n).filter(|&i| assigned[i].is_none()) {
            for idx in pool(candidates[speaker].len(), config.pool_size, rng) {
                if !admissible(&candidates[speaker][idx], &claimed) {
                    continue;
                }
                let next = hypotheses.restrict(speaker, &all_true[speaker][idx], table);
                if !next.contains(target) {
                    continue;
                }
                let eliminated = before - next.count();
                if eliminated > 0 {
                    options.push((speaker, idx, eliminated));
                }
            }
        }

        let Some(best) = options.iter().map(|&(_, _, e)| e).max() else {
            return Err(SearchFailure::Stuck { remaining: before });
        };
        let picked = if config.randomness == 0.0 {
            options.iter().copied().find(|&(_, _, e)| e == best)
        } else {
            let threshold = (((1.0 - config.randomness) * best as f64).ceil() as usize).max(1);
            let eligible: Vec<_> = options.iter().copied().filter(|&(_, _, e)| e >= threshold).collect();
            eligible.choose(rng).copied()
        };
        let (speaker, idx, eliminated) = picked.ok_or(SearchFailure::Stuck { remaining: before })?;

        hypotheses = hypotheses.restrict(speaker, &all_true[speaker][idx], table);
        let bundle = candidates[speaker][idx].clone();
        claimed.extend(bundle.kinds());
        debug!(
            "Committed speaker {} ({} statements): eliminated {}, {} left",
            speaker,
            bundle.len(),
            eliminated,
            hypotheses.count()
        );
        assigned[speaker] = Some(bundle);
        order.push(speaker);
        trace.push(hypotheses.count());
    }

    if !hypotheses.is_singleton(target) {
        return Err(SearchFailure::NotUnique {
            remaining: hypotheses.count(),
        });
    }

    // Phase 2: every remaining speaker still has to speak.
    for speaker in 0..n {
        if assigned[speaker].is_some() {
            continue;
        }
        let found = pool(candidates[speaker].len(), config.pool_size, rng)
            .into_iter()
            .filter(|&idx| admissible(&candidates[speaker][idx], &claimed))
            .map(|idx| (idx, hypotheses.restrict(speaker, &all_true[speaker][idx], table)))
            .find(|(_, next)| next.contains(target));
        let Some((idx, next)) = found else {
            return Err(SearchFailure::NoFill { speaker });
        };
        hypotheses = next;
        let bundle = candidates[speaker][idx].clone();
        claimed.extend(bundle.kinds());
        debug!("Filled speaker {} with {} statements", speaker, bundle.len());
        assigned[speaker] = Some(bundle);
        order.push(speaker);
        trace.push(hypotheses.count());
    }

    if !hypotheses.is_singleton(target) {
        return Err(SearchFailure::NotUnique {
            remaining: hypotheses.count(),
        });
    }

    let mut bundles = Vec::with_capacity(n);
    for (speaker, bundle) in assigned.into_iter().enumerate() {
        let bundle = bundle.ok_or(SearchFailure::NoFill { speaker })?;
        let filtered = filter_redundant(bundle.statements(), table);
        if filtered.len() < config.min_statements {
            return Err(SearchFailure::TooFewStatements { speaker });
        }
        bundles.push(Bundle::new(filtered));
    }
    Ok(Assembly { bundles, trace, order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::candidate_bundles;
    use crate::library::Library;
    use crate::statement::Statement;
    use crate::types::Assignment;

    use rand_chacha::ChaCha8Rng;

    fn candidates_for(
        target: &Target,
        library: &Library,
        table: &TruthTable,
        config: &GenerationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Vec<Bundle>> {
        (0..config.num_people)
            .map(|i| candidate_bundles(i, target, library, table, config, rng))
            .collect()
    }

    /// Brute-force count of assignments consistent with all bundles.
    fn consistent(bundles: &[Bundle], n: usize) -> Vec<usize> {
        (0..1 << n)
            .filter(|&j| {
                let a = Assignment::from_index(n, j);
                bundles
                    .iter()
                    .enumerate()
                    .all(|(i, b)| b.iter().all(|s| s.evaluate(&a)) == !a.is_liar(i))
            })
            .collect()
    }

    #[test]
    fn test_compatibility_mask() {
        let table = TruthTable::new(2);
        // Speaker 0 says "1 is a liar".
        let all_true = table.all_true_mask(&[Statement::count([1], crate::statement::Comparator::Exactly, 1)]);
        let compat = compatibility_mask(0, &all_true, &table);
        // Consistent: 0 truthful and 1 liar (0b10), or 0 liar and 1 truthful (0b01).
        assert_eq!(compat.iter().collect::<Vec<_>>(), vec![0b01, 0b10]);
    }

    #[test]
    fn test_hypotheses_with_shill() {
        let table = TruthTable::new(3);
        let hypotheses = Hypotheses::new(&table, true);
        // Each of 3 shills, with 4 assignments where the shill is not a liar.
        assert_eq!(hypotheses.count(), 12);
        let target = Target::new(Assignment::new(vec![true, false, false]), Some(1));
        assert!(hypotheses.contains(&target));

        // Speaker 1 says something true everywhere: impossible for the shill slice.
        let tautology = table.full_mask();
        let next = hypotheses.restrict(1, &tautology, &table);
        assert!(!next.contains(&target));
        assert!(next.slices()[1].is_empty());
    }

    #[test]
    fn test_assembles_unique_puzzle() {
        let config = GenerationConfig::new(4).with_statements(1, 2).with_pool_size(40);
        let library = Library::build(&config);
        let table = TruthTable::build(&library);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut successes = 0;
        for index in [0b0000, 0b0101, 0b1110, 0b0010] {
            let target = Target::new(Assignment::from_index(4, index), None);
            let candidates = candidates_for(&target, &library, &table, &config, &mut rng);
            if let Ok(assembly) = assemble(&target, &candidates, &table, &config, &mut rng) {
                successes += 1;
                assert_eq!(assembly.bundles.len(), 4);
                assert!(assembly.bundles.iter().all(|b| !b.is_empty()));
                assert_eq!(consistent(&assembly.bundles, 4), vec![index]);
                assert_eq!(assembly.trace.first(), Some(&16));
                assert_eq!(assembly.trace.last(), Some(&1));
                assert!(assembly.trace.windows(2).all(|w| w[0] >= w[1]));
            }
        }
        assert!(successes > 0);
    }

    #[test]
    fn test_deterministic_without_randomness() {
        let config = GenerationConfig::new(4).with_statements(1, 2).with_pool_size(1000);
        let library = Library::build(&config);
        let table = TruthTable::build(&library);
        let target = Target::new(Assignment::from_index(4, 0b1001), None);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let candidates = candidates_for(&target, &library, &table, &config, &mut rng);

        let first = assemble(&target, &candidates, &table, &config, &mut ChaCha8Rng::seed_from_u64(1));
        let second = assemble(&target, &candidates, &table, &config, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(first.map(|a| a.bundles), second.map(|a| a.bundles));
    }

    #[test]
    fn test_stuck_without_candidates() {
        let table = TruthTable::new(2);
        let config = GenerationConfig::new(2).with_statements(1, 1);
        let target = Target::new(Assignment::new(vec![false, false]), None);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = assemble(&target, &[vec![], vec![]], &table, &config, &mut rng);
        assert_eq!(result.unwrap_err(), SearchFailure::Stuck { remaining: 4 });
    }

    #[test]
    fn test_two_person_boundary() {
        let table = TruthTable::new(2);
        let config = GenerationConfig::new(2).with_statements(1, 1);
        let target = Target::new(Assignment::new(vec![false, false]), None);
        let candidates = vec![
            vec![Bundle::new(vec![Statement::if_then(1, 0)])],
            vec![Bundle::new(vec![Statement::both_or_neither(0, 1)])],
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let assembly = assemble(&target, &candidates, &table, &config, &mut rng).unwrap();
        assert_eq!(consistent(&assembly.bundles, 2), vec![0]);
    }

    #[test]
    fn test_diversity() {
        let config = GenerationConfig::new(4)
            .with_statements(1, 2)
            .with_pool_size(200)
            .with_diversity(true);
        let library = Library::build(&config);
        let table = TruthTable::build(&library);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut successes = 0;
        for index in 0..16 {
            let target = Target::new(Assignment::from_index(4, index), None);
            let candidates = candidates_for(&target, &library, &table, &config, &mut rng);
            let Ok(assembly) = assemble(&target, &candidates, &table, &config, &mut rng) else {
                continue;
            };
            successes += 1;
            let mut sorted = assembly.order.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3]);
            let mut claimed = BTreeSet::new();
            for &speaker in &assembly.order {
                let bundle = &assembly.bundles[speaker];
                assert!(adds_new_kind(bundle, &claimed), "speaker {} repeats claimed kinds", speaker);
                claimed.extend(bundle.kinds());
            }
            assert_eq!(consistent(&assembly.bundles, 4), vec![index]);
        }
        assert!(successes > 0);
    }
}
