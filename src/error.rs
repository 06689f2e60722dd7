//! Error types.
//!
//! Only data-integrity boundaries produce errors: decoding statements,
//! loading a persisted truth table and validating a configuration.
//! Search failures inside a generation attempt are not errors; see
//! [`SearchFailure`][crate::assemble::SearchFailure].
use std::fmt;
use std::io;

/// Error decoding a statement record or short token.
#[derive(Debug)]
pub enum DecodeError {
    /// Record or token names a statement kind that does not exist.
    UnknownKind(String),
    /// Short token with the wrong shape or non-numeric fields.
    MalformedToken(String),
    /// Count statement with no people in scope.
    EmptyScope,
    /// Statement mentions a person outside the village.
    PersonOutOfRange { person: usize, population: usize },
    /// Record is not valid JSON or misses fields.
    Json(serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Json(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownKind(kind) => write!(f, "Unknown statement kind: {}", kind),
            DecodeError::MalformedToken(token) => write!(f, "Malformed statement token: {:?}", token),
            DecodeError::EmptyScope => write!(f, "Count statement with empty scope"),
            DecodeError::PersonOutOfRange { person, population } => {
                write!(f, "Statement mentions person {} in a village of {}", person, population)
            }
            DecodeError::Json(e) => write!(f, "Invalid statement record: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Error loading or saving a persisted truth table.
#[derive(Debug)]
pub enum CacheError {
    /// File I/O error.
    Io(io::Error),
    /// Stored record could not be parsed.
    Format(String),
    /// Stored population size differs from the requested one.
    Mismatch { stored: usize, requested: usize },
}

impl From<io::Error> for CacheError {
    fn from(e: io::Error) -> Self {
        CacheError::Io(e)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Format(e.to_string())
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io(e) => write!(f, "I/O error: {}", e),
            CacheError::Format(msg) => write!(f, "Invalid cache record: {}", msg),
            CacheError::Mismatch { stored, requested } => {
                write!(f, "Cache built for N={}, requested N={}", stored, requested)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Invalid generation configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Population size is zero or larger than [`MAX_PEOPLE`][crate::types::MAX_PEOPLE].
    Population(usize),
    /// Statement bounds are zero or inverted.
    StatementBounds { min: usize, max: usize },
    /// Randomness dial outside `[0, 1]`.
    Randomness(f64),
    /// Candidate pool size of zero.
    PoolSize,
    /// Truth table was built for another population size.
    TableSize { table: usize, config: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Population(n) => write!(f, "Population size {} is not supported", n),
            ConfigError::StatementBounds { min, max } => {
                write!(f, "Invalid statement bounds {}..={}", min, max)
            }
            ConfigError::Randomness(r) => write!(f, "Randomness {} is outside [0, 1]", r),
            ConfigError::PoolSize => write!(f, "Candidate pool size must be positive"),
            ConfigError::TableSize { table, config } => {
                write!(f, "Truth table is for N={}, configuration has N={}", table, config)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
