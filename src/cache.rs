//! Truth-table cache: one [`Mask`] per statement.
//!
//! For a population of `N` people the table evaluates every library statement
//! on all `2^N` assignments once. Bit `j` of a statement's mask is set iff the
//! statement holds under assignment `j`. The table also keeps, per speaker,
//! the partition of the assignment space into "truthful" and "liar" halves.
//!
//! The table is read-only after construction and can be shared between
//! threads. Lookups of statements that were not in the library are computed
//! on the fly and counted as misses.
//!
//! Persistence uses a JSON record holding `N` and the masks as decimal
//! strings. Loading checks `N` against the requested population size.
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::library::Library;
use crate::mask::Mask;
use crate::statement::Statement;
use crate::types::{space_size, MAX_PEOPLE};

pub struct TruthTable {
    num_people: usize,
    masks: HashMap<String, Mask>,
    truthful: Vec<Mask>,
    liar: Vec<Mask>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TruthTable {
    /// Creates a table with role masks only.
    pub fn new(num_people: usize) -> Self {
        let width = space_size(num_people);
        let liar: Vec<Mask> = (0..num_people)
            .map(|i| Mask::from_fn(width, |j| (j >> i) & 1 == 1))
            .collect();
        let truthful = liar.iter().map(|m| !m).collect();
        Self {
            num_people,
            masks: HashMap::new(),
            truthful,
            liar,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Evaluates every statement of the library on every assignment.
    pub fn build(library: &Library) -> Self {
        let mut table = Self::new(library.num_people());
        for statement in library {
            let mask = table.compute(statement);
            table.masks.insert(statement.id().to_string(), mask);
        }
        info!(
            "Built truth table for N={}: {} statements over {} assignments",
            table.num_people,
            table.masks.len(),
            table.width()
        );
        table
    }

    fn compute(&self, statement: &Statement) -> Mask {
        assert!(
            statement.max_person() < self.num_people,
            "Statement {} references a person outside N={}",
            statement,
            self.num_people
        );
        Mask::from_fn(self.width(), |j| statement.evaluate_index(j))
    }

    pub fn num_people(&self) -> usize {
        self.num_people
    }

    /// Width of every mask (`2^N`).
    pub fn width(&self) -> usize {
        space_size(self.num_people)
    }

    /// Number of cached statements.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Cached mask for a canonical identifier.
    pub fn get(&self, id: &str) -> Option<&Mask> {
        self.masks.get(id)
    }

    /// Truth mask of a statement, computed on the fly if it is not cached.
    pub fn truth_mask(&self, statement: &Statement) -> Cow<'_, Mask> {
        match self.masks.get(statement.id()) {
            Some(mask) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Cow::Borrowed(mask)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Cow::Owned(self.compute(statement))
            }
        }
    }

    /// Assignments under which every statement holds.
    pub fn all_true_mask<'a>(&self, statements: impl IntoIterator<Item = &'a Statement>) -> Mask {
        let mut mask = self.full_mask();
        for statement in statements {
            mask &= &*self.truth_mask(statement);
        }
        mask
    }

    pub fn full_mask(&self) -> Mask {
        Mask::full(self.width())
    }

    /// Assignments in which `speaker` is not a liar.
    pub fn truthful_mask(&self, speaker: usize) -> &Mask {
        &self.truthful[speaker]
    }

    /// Assignments in which `speaker` is a liar.
    pub fn liar_mask(&self, speaker: usize) -> &Mask {
        &self.liar[speaker]
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn to_record(&self) -> TableRecord {
        TableRecord {
            num_people: self.num_people,
            truth_masks: self
                .masks
                .iter()
                .map(|(id, mask)| (id.clone(), mask.to_biguint().to_string()))
                .collect(),
        }
    }

    /// Rebuilds a table from its record.
    ///
    /// Fails with [`CacheError::Mismatch`] if the record was built for another `N`.
    pub fn from_record(record: TableRecord, requested: usize) -> Result<Self, CacheError> {
        if record.num_people != requested {
            return Err(CacheError::Mismatch {
                stored: record.num_people,
                requested,
            });
        }
        if record.num_people > MAX_PEOPLE {
            return Err(CacheError::Format(format!("Unsupported N={}", record.num_people)));
        }
        let mut table = Self::new(requested);
        let width = table.width();
        for (id, value) in record.truth_masks {
            let mask = value
                .parse::<BigUint>()
                .ok()
                .and_then(|v| Mask::from_biguint(width, &v))
                .ok_or_else(|| CacheError::Format(format!("Invalid mask for {}: {:?}", id, value)))?;
            table.masks.insert(id, mask);
        }
        Ok(table)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CacheError> {
        let content = serde_json::to_string_pretty(&self.to_record())?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, requested: usize) -> Result<Self, CacheError> {
        let content = fs::read_to_string(path)?;
        let record: TableRecord = serde_json::from_str(&content)?;
        Self::from_record(record, requested)
    }

    /// Loads the table at `path` unless `rebuild` is set, otherwise builds and saves it.
    ///
    /// A missing file, a record for another `N`, an unreadable record or one
    /// lacking statements of `library` all lead to a rebuild; other I/O errors
    /// are returned.
    pub fn load_or_build<P: AsRef<Path>>(path: P, library: &Library, rebuild: bool) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if !rebuild {
            match Self::load(path, library.num_people()) {
                Ok(table) => {
                    let missing = library.iter().filter(|s| table.get(s.id()).is_none()).count();
                    if missing == 0 {
                        debug!("Loaded truth table with {} statements from {}", table.len(), path.display());
                        return Ok(table);
                    }
                    warn!(
                        "Discarding truth table at {}: {} of {} library statements missing",
                        path.display(),
                        missing,
                        library.len()
                    );
                }
                Err(CacheError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                    debug!("No truth table at {}", path.display());
                }
                Err(e @ (CacheError::Mismatch { .. } | CacheError::Format(_))) => {
                    warn!("Discarding truth table at {}: {}", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }
        let table = Self::build(library);
        table.save(path)?;
        Ok(table)
    }
}

impl std::fmt::Debug for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TruthTable")
            .field("num_people", &self.num_people)
            .field("statements", &self.masks.len())
            .finish()
    }
}

/// Persistent form of a [`TruthTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    #[serde(rename = "N")]
    pub num_people: usize,
    /// Canonical identifier to mask, as a decimal integer.
    pub truth_masks: BTreeMap<String, String>,
}
