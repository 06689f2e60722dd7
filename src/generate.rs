//! Generation orchestrator.
//!
//! Each attempt draws a target, lists candidate bundles for every speaker,
//! assembles them and asks the [`Oracle`] to confirm uniqueness. The first
//! confirmed puzzle is returned; exhausting the attempts yields `None`.
use log::{debug, info, warn};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::assemble::assemble;
use crate::bundle::candidate_bundles;
use crate::cache::TruthTable;
use crate::config::GenerationConfig;
use crate::error::ConfigError;
use crate::library::Library;
use crate::oracle::{BddBackend, Oracle, SatBackend};
use crate::puzzle::Puzzle;
use crate::types::{space_size, Assignment, Target};

/// Draws a target honoring the liar bounds, and a shill among the non-liars
/// when the shill rule is on.
///
/// Returns `None` if no assignment satisfies the bounds.
pub fn choose_target<R: Rng + ?Sized>(config: &GenerationConfig, rng: &mut R) -> Option<Target> {
    let n = config.num_people;
    let (min, max) = config.liar_bounds();
    let admissible: Vec<usize> = (0..space_size(n))
        .filter(|&j| (min..=max).contains(&(j.count_ones() as usize)))
        .collect();
    let assignment = Assignment::from_index(n, *admissible.choose(rng)?);
    let shill = if config.allow_shill {
        let honest: Vec<usize> = assignment.truthful_people().collect();
        Some(*honest.choose(rng)?)
    } else {
        None
    };
    Some(Target::new(assignment, shill))
}

/// Generates puzzles from a shared library and truth table.
pub struct Generator<'a, B = BddBackend> {
    config: GenerationConfig,
    library: &'a Library,
    table: &'a TruthTable,
    oracle: Oracle<B>,
}

impl<'a> Generator<'a> {
    pub fn new(config: GenerationConfig, library: &'a Library, table: &'a TruthTable) -> Result<Self, ConfigError> {
        Self::with_oracle(config, library, table, Oracle::new())
    }
}

impl<'a, B: SatBackend> Generator<'a, B> {
    /// Creates a generator that verifies with the given oracle.
    pub fn with_oracle(
        config: GenerationConfig,
        library: &'a Library,
        table: &'a TruthTable,
        oracle: Oracle<B>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for size in [table.num_people(), library.num_people()] {
            if size != config.num_people {
                return Err(ConfigError::TableSize {
                    table: size,
                    config: config.num_people,
                });
            }
        }
        Ok(Self {
            config,
            library,
            table,
            oracle,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn oracle(&self) -> &Oracle<B> {
        &self.oracle
    }

    /// One generation attempt for a fixed target.
    pub fn attempt<R: Rng + ?Sized>(&self, target: &Target, rng: &mut R) -> Option<Puzzle> {
        let n = self.config.num_people;
        let candidates: Vec<_> = (0..n)
            .map(|speaker| candidate_bundles(speaker, target, self.library, self.table, &self.config, rng))
            .collect();
        if let Some(speaker) = candidates.iter().position(Vec::is_empty) {
            debug!("No candidate bundles for speaker {} under {}", speaker, target.assignment);
            return None;
        }

        let assembly = match assemble(target, &candidates, self.table, &self.config, rng) {
            Ok(assembly) => assembly,
            Err(failure) => {
                debug!("Assembly for {} failed: {}", target.assignment, failure);
                return None;
            }
        };

        let puzzle = Puzzle::new(assembly.bundles, self.config.allow_shill);
        if !self.oracle.is_uniquely_satisfiable(&puzzle) {
            warn!(
                "Oracle rejected assembled puzzle for {}: {}",
                target.assignment,
                puzzle.to_short_string()
            );
            return None;
        }
        match self.oracle.find_one_solution(&puzzle) {
            Some(solution) if solution.liars == target.assignment && solution.shill == target.shill => {}
            other => {
                warn!("Oracle solution {:?} differs from target {:?}", other, target);
                return None;
            }
        }

        let difficulty = self.oracle.estimate_difficulty(&puzzle, Some(self.table));
        Some(
            puzzle
                .with_solution(target.assignment.clone(), target.shill)
                .with_difficulty(difficulty),
        )
    }

    /// Generates one puzzle, or `None` once `max_attempts` targets have failed.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Puzzle> {
        for attempt in 1..=self.config.max_attempts {
            let Some(target) = choose_target(&self.config, rng) else {
                debug!("Attempt {}: no target satisfies the liar bounds", attempt);
                continue;
            };
            debug!("Attempt {}: target {} (shill {:?})", attempt, target.assignment, target.shill);
            if let Some(puzzle) = self.attempt(&target, rng) {
                info!(
                    "Generated puzzle for N={} after {} attempts: {} statements, difficulty {:.2}",
                    self.config.num_people,
                    attempt,
                    puzzle.num_statements(),
                    puzzle.difficulty
                );
                return Some(puzzle);
            }
        }
        info!(
            "No puzzle for N={} after {} attempts",
            self.config.num_people, self.config.max_attempts
        );
        None
    }
}

impl<'a, B: SatBackend + Sync> Generator<'a, B> {
    /// Generates `count` puzzles on `workers` scoped threads.
    ///
    /// Worker `w` uses a `ChaCha8Rng` seeded with `seed + w` and produces
    /// puzzles `w, w + workers, ...`, so results depend only on the seed and
    /// the worker count.
    pub fn generate_batch(&self, count: usize, workers: usize, seed: u64) -> Vec<Option<Puzzle>> {
        let workers = workers.clamp(1, count.max(1));
        let mut results: Vec<Option<Puzzle>> = vec![None; count];
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    scope.spawn(move || {
                        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(w as u64));
                        (w..count)
                            .step_by(workers)
                            .map(|i| (i, self.generate(&mut rng)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(produced) => {
                        for (i, puzzle) in produced {
                            results[i] = puzzle;
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
        results
    }
}
