//! # liars-rs: Truth-teller and liar puzzles in Rust
//!
//! **`liars-rs`** generates short logic puzzles of the classic "village of
//! knights and knaves" kind. There are `N` villagers, and each is either
//! truthful or a liar. Every villager says a small bundle of statements about
//! who is a liar. The reader must find the one assignment under which every
//! truth-teller's bundle is entirely true and every liar's bundle is not.
//!
//! ## How it works
//!
//! - **Statements** ([`statement`]) are boolean claims over the unknown liar
//!   vector: pairwise relations ("if A is a liar, then B is a liar") and
//!   counting claims ("exactly 2 liars among A, B, and C").
//! - **Truth tables** ([`cache`]) precompute, for every statement, the bitmask
//!   of the `2^N` assignments on which it holds, so the search works on plain
//!   bitwise AND/OR over [`Mask`][crate::mask::Mask]s.
//! - **Assembly** ([`assemble`]) picks a target assignment and greedily hands
//!   out bundles until the target is the only consistent assignment left.
//! - **Verification** ([`oracle`]) re-encodes the finished puzzle as a boolean
//!   formula and checks with a BDD that it has exactly one model. The oracle
//!   is the acceptance gate: nothing it has not confirmed is returned.
//!
//! ## Basic Usage
//!
//! ```rust
//! use liars_rs::cache::TruthTable;
//! use liars_rs::config::GenerationConfig;
//! use liars_rs::generate::Generator;
//! use liars_rs::library::Library;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // 1. Build the statement library and its truth table (once per N)
//! let config = GenerationConfig::new(3).with_statements(1, 2).with_max_attempts(200);
//! let library = Library::build(&config);
//! let table = TruthTable::build(&library);
//!
//! // 2. Generate a puzzle
//! let generator = Generator::new(config, &library, &table).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let puzzle = generator.generate(&mut rng).expect("no puzzle found");
//!
//! // 3. The oracle agrees with the hidden answer
//! let solution = generator.oracle().find_one_solution(&puzzle).unwrap();
//! assert_eq!(Some(solution.liars), puzzle.solution);
//! println!("{}", puzzle.render());
//! ```
//!
//! ## Core Components
//!
//! - **[`generate`]**: The [`Generator`][crate::generate::Generator] orchestrator and parallel batches.
//! - **[`bundle`]**: Candidate bundles with contradiction and redundancy filtering.
//! - **[`oracle`]**: The [`SatBackend`][crate::oracle::SatBackend] trait, the BDD backend and difficulty scores.
//! - **[`puzzle`]**: Finished puzzles and their JSON record.

pub mod assemble;
pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod expr;
pub mod generate;
pub mod library;
pub mod mask;
pub mod oracle;
pub mod puzzle;
pub mod statement;
pub mod types;
pub mod utils;
