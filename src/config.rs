//! Generation parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MAX_PEOPLE;

/// Configuration for puzzle generation.
///
/// Immutable once handed to a [`Generator`][crate::generate::Generator].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Population size `N`.
    pub num_people: usize,
    /// Minimum statements per speaker
    pub min_statements: usize,
    /// Maximum statements per speaker
    pub max_statements: usize,
    /// Whether a speaker may mention themselves.
    pub allow_self_reference: bool,
    /// Whether count and parity statements are in the library.
    pub allow_count_statements: bool,
    /// Number of target assignments tried before giving up.
    pub max_attempts: usize,
    /// Number of sampled bundles per size, and the per-speaker cap on candidates
    /// considered in one greedy step.
    pub pool_size: usize,
    /// Whether one non-liar is a shill.
    pub allow_shill: bool,
    pub min_liars: Option<usize>,
    pub max_liars: Option<usize>,
    /// Each committed bundle must add a statement kind not used before.
    pub require_diversity: bool,
    /// 0.0 always takes the best greedy candidate; 1.0 takes any improving one.
    pub randomness: f64,
}

impl GenerationConfig {
    /// Create a new configuration with defaults for `num_people`.
    pub fn new(num_people: usize) -> Self {
        Self {
            num_people,
            min_statements: 2,
            max_statements: 2,
            allow_self_reference: false,
            allow_count_statements: true,
            max_attempts: 100,
            pool_size: 50,
            allow_shill: false,
            min_liars: None,
            max_liars: None,
            require_diversity: false,
            randomness: 0.0,
        }
    }

    /// Set the per-speaker statement bounds.
    pub fn with_statements(mut self, min: usize, max: usize) -> Self {
        self.min_statements = min;
        self.max_statements = max;
        self
    }

    pub fn with_self_reference(mut self, allow: bool) -> Self {
        self.allow_self_reference = allow;
        self
    }

    pub fn with_count_statements(mut self, allow: bool) -> Self {
        self.allow_count_statements = allow;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_shill(mut self, allow: bool) -> Self {
        self.allow_shill = allow;
        self
    }

    /// Set the bounds on the number of liars in the target.
    pub fn with_liars(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_liars = min;
        self.max_liars = max;
        self
    }

    pub fn with_diversity(mut self, require: bool) -> Self {
        self.require_diversity = require;
        self
    }

    pub fn with_randomness(mut self, randomness: f64) -> Self {
        self.randomness = randomness;
        self
    }

    /// Checks the parameters that would make generation meaningless.
    ///
    /// Unsatisfiable liar bounds are not an error: they exhaust the attempts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_people == 0 || self.num_people > MAX_PEOPLE {
            return Err(ConfigError::Population(self.num_people));
        }
        if self.min_statements == 0 || self.min_statements > self.max_statements {
            return Err(ConfigError::StatementBounds {
                min: self.min_statements,
                max: self.max_statements,
            });
        }
        if !(0.0..=1.0).contains(&self.randomness) {
            return Err(ConfigError::Randomness(self.randomness));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::PoolSize);
        }
        Ok(())
    }

    /// Inclusive liar-count range of admissible targets.
    ///
    /// With a shill, at least one person must stay truthful.
    pub fn liar_bounds(&self) -> (usize, usize) {
        let ceiling = if self.allow_shill {
            self.num_people.saturating_sub(1)
        } else {
            self.num_people
        };
        let min = self.min_liars.unwrap_or(0);
        let max = self.max_liars.map_or(ceiling, |m| m.min(ceiling));
        (min, max)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(6)
    }
}
