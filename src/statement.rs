//! Statements a speaker can make about who is a liar.
//!
//! A [`Statement`] wraps a [`Claim`] (one case per statement kind, each
//! carrying only its own parameters) together with its canonical
//! identifier. Equality, hashing and ordering go through the identifier
//! only, so the constructors normalize everything that must not affect
//! identity:
//!
//! - symmetric relational claims store their pair as `(min, max)`,
//! - count and parity claims store their scope sorted and deduplicated,
//! - directional claims ([`Claim::IfThen`], [`Claim::IfNotThen`]) are kept as given.
//!
//! Equality is syntactic identity of that canonical form. Two different
//! statements can still be logically equivalent (e.g. `IfNotThen(a, b)` and
//! `AtLeastOne(a, b)`); semantic implication between statements is decided on
//! their truth masks instead (see [`crate::bundle`]).
//!
//! Statements have two external encodings:
//!
//! - a structured record ([`StatementRecord`]), serialized as JSON with a
//!   `type` tag, e.g. `{"type": "IfAThenB", "a_index": 5, "b_index": 7}`;
//! - a short token, e.g. `I-5-7` or `E-0.1.2-2`.
//!
//! Both round-trip losslessly.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::types::Assignment;

/// Comparison against the number of liars in a scope.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Comparator {
    Exactly,
    AtMost,
    AtLeast,
}

impl Comparator {
    pub fn test(self, liars: usize, count: usize) -> bool {
        match self {
            Comparator::Exactly => liars == count,
            Comparator::AtMost => liars <= count,
            Comparator::AtLeast => liars >= count,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Parity {
    Even,
    Odd,
}

/// The logical content of a statement.
///
/// Person indices refer to the population; `true` in an assignment means "liar".
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Claim {
    /// If `a` is a liar, then `b` is a liar.
    IfThen { a: usize, b: usize },
    /// If `a` is not a liar, then `b` is a liar.
    ///
    /// Equivalent to [`Claim::AtLeastOne`]; decoded for compatibility, never generated.
    IfNotThen { a: usize, b: usize },
    /// `a` and `b` are both liars, or neither is.
    BothOrNeither { a: usize, b: usize },
    /// At least one of `a`, `b` is a liar.
    AtLeastOne { a: usize, b: usize },
    /// Exactly one of `a`, `b` is a liar.
    ExactlyOne { a: usize, b: usize },
    /// At most one of `a`, `b` is a liar.
    AtMostOne { a: usize, b: usize },
    /// Neither `a` nor `b` is a liar.
    Neither { a: usize, b: usize },
    /// The number of liars in `scope` compares to `count`.
    Count {
        scope: Vec<usize>,
        cmp: Comparator,
        count: usize,
    },
    /// The number of liars in `scope` has the given parity.
    Parity { scope: Vec<usize>, parity: Parity },
}

/// Statement kind without parameters.
///
/// Used for diversity bookkeeping, weights and the two encodings.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StatementKind {
    IfThen,
    IfNotThen,
    BothOrNeither,
    AtLeastOne,
    ExactlyOne,
    AtMostOne,
    Neither,
    Count(Comparator),
    Parity(Parity),
}

impl StatementKind {
    /// Every kind, in token-code order.
    pub const ALL: [StatementKind; 12] = [
        StatementKind::IfThen,
        StatementKind::IfNotThen,
        StatementKind::BothOrNeither,
        StatementKind::AtLeastOne,
        StatementKind::ExactlyOne,
        StatementKind::AtMostOne,
        StatementKind::Neither,
        StatementKind::Count(Comparator::Exactly),
        StatementKind::Count(Comparator::AtMost),
        StatementKind::Count(Comparator::AtLeast),
        StatementKind::Parity(Parity::Even),
        StatementKind::Parity(Parity::Odd),
    ];

    /// Symmetric relational kinds, whose pair is unordered.
    pub const SYMMETRIC: [StatementKind; 5] = [
        StatementKind::BothOrNeither,
        StatementKind::AtLeastOne,
        StatementKind::ExactlyOne,
        StatementKind::AtMostOne,
        StatementKind::Neither,
    ];

    /// One-letter code used in short tokens.
    pub fn code(self) -> char {
        match self {
            StatementKind::IfThen => 'I',
            StatementKind::IfNotThen => 'F',
            StatementKind::BothOrNeither => 'B',
            StatementKind::AtLeastOne => 'A',
            StatementKind::ExactlyOne => 'X',
            StatementKind::AtMostOne => 'U',
            StatementKind::Neither => 'N',
            StatementKind::Count(Comparator::Exactly) => 'E',
            StatementKind::Count(Comparator::AtMost) => 'M',
            StatementKind::Count(Comparator::AtLeast) => 'L',
            StatementKind::Parity(Parity::Even) => 'V',
            StatementKind::Parity(Parity::Odd) => 'O',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| code.len() == 1 && code.starts_with(kind.code()))
    }

    /// Tag of the structured record.
    pub fn record_name(self) -> &'static str {
        match self {
            StatementKind::IfThen => "IfAThenB",
            StatementKind::IfNotThen => "IfNotAThenB",
            StatementKind::BothOrNeither => "BothOrNeither",
            StatementKind::AtLeastOne => "AtLeastOne",
            StatementKind::ExactlyOne => "ExactlyOne",
            StatementKind::AtMostOne => "AtMostOne",
            StatementKind::Neither => "Neither",
            StatementKind::Count(Comparator::Exactly) => "ExactlyKLiars",
            StatementKind::Count(Comparator::AtMost) => "AtMostKLiars",
            StatementKind::Count(Comparator::AtLeast) => "AtLeastKLiars",
            StatementKind::Parity(Parity::Even) => "EvenNumberOfLiars",
            StatementKind::Parity(Parity::Odd) => "OddNumberOfLiars",
        }
    }

    pub fn from_record_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.record_name() == name)
    }

    pub fn is_symmetric(self) -> bool {
        Self::SYMMETRIC.contains(&self)
    }

    pub fn is_relational(self) -> bool {
        !matches!(self, StatementKind::Count(_) | StatementKind::Parity(_))
    }

    /// Static cost of the kind, used only as a bias.
    pub fn complexity_weight(self) -> u32 {
        match self {
            StatementKind::Neither => 2,
            StatementKind::Count(Comparator::Exactly) => 3,
            StatementKind::Count(_) | StatementKind::Parity(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.record_name())
    }
}

/// A statement with its canonical identifier.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "StatementRecord", into = "StatementRecord")]
pub struct Statement {
    claim: Claim,
    id: Arc<str>,
}

impl Statement {
    /// Creates a statement, normalizing symmetric pairs and count scopes.
    ///
    /// # Panics
    ///
    /// Panics if a count or parity claim has an empty scope.
    pub fn new(claim: Claim) -> Self {
        let claim = normalize(claim);
        let id = canonical_id(&claim).into();
        Statement { claim, id }
    }

    pub fn if_then(a: usize, b: usize) -> Self {
        Self::new(Claim::IfThen { a, b })
    }

    pub fn if_not_then(a: usize, b: usize) -> Self {
        Self::new(Claim::IfNotThen { a, b })
    }

    pub fn both_or_neither(a: usize, b: usize) -> Self {
        Self::new(Claim::BothOrNeither { a, b })
    }

    pub fn at_least_one(a: usize, b: usize) -> Self {
        Self::new(Claim::AtLeastOne { a, b })
    }

    pub fn exactly_one(a: usize, b: usize) -> Self {
        Self::new(Claim::ExactlyOne { a, b })
    }

    pub fn at_most_one(a: usize, b: usize) -> Self {
        Self::new(Claim::AtMostOne { a, b })
    }

    pub fn neither(a: usize, b: usize) -> Self {
        Self::new(Claim::Neither { a, b })
    }

    pub fn count(scope: impl IntoIterator<Item = usize>, cmp: Comparator, count: usize) -> Self {
        Self::new(Claim::Count {
            scope: scope.into_iter().collect(),
            cmp,
            count,
        })
    }

    pub fn parity(scope: impl IntoIterator<Item = usize>, parity: Parity) -> Self {
        Self::new(Claim::Parity {
            scope: scope.into_iter().collect(),
            parity,
        })
    }

    /// Builds a relational statement of the given kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a count or parity kind.
    pub fn relational(kind: StatementKind, a: usize, b: usize) -> Self {
        let claim = match kind {
            StatementKind::IfThen => Claim::IfThen { a, b },
            StatementKind::IfNotThen => Claim::IfNotThen { a, b },
            StatementKind::BothOrNeither => Claim::BothOrNeither { a, b },
            StatementKind::AtLeastOne => Claim::AtLeastOne { a, b },
            StatementKind::ExactlyOne => Claim::ExactlyOne { a, b },
            StatementKind::AtMostOne => Claim::AtMostOne { a, b },
            StatementKind::Neither => Claim::Neither { a, b },
            StatementKind::Count(_) | StatementKind::Parity(_) => {
                panic!("{} is not a relational kind", kind)
            }
        };
        Self::new(claim)
    }

    pub fn claim(&self) -> &Claim {
        &self.claim
    }

    /// Canonical identifier, e.g. `IMP(5,7)` or `COUNT_EQ(scope=[0,1,2],count=2)`.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> StatementKind {
        match &self.claim {
            Claim::IfThen { .. } => StatementKind::IfThen,
            Claim::IfNotThen { .. } => StatementKind::IfNotThen,
            Claim::BothOrNeither { .. } => StatementKind::BothOrNeither,
            Claim::AtLeastOne { .. } => StatementKind::AtLeastOne,
            Claim::ExactlyOne { .. } => StatementKind::ExactlyOne,
            Claim::AtMostOne { .. } => StatementKind::AtMostOne,
            Claim::Neither { .. } => StatementKind::Neither,
            Claim::Count { cmp, .. } => StatementKind::Count(*cmp),
            Claim::Parity { parity, .. } => StatementKind::Parity(*parity),
        }
    }

    /// The pair of a relational statement.
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self.claim {
            Claim::IfThen { a, b }
            | Claim::IfNotThen { a, b }
            | Claim::BothOrNeither { a, b }
            | Claim::AtLeastOne { a, b }
            | Claim::ExactlyOne { a, b }
            | Claim::AtMostOne { a, b }
            | Claim::Neither { a, b } => Some((a, b)),
            Claim::Count { .. } | Claim::Parity { .. } => None,
        }
    }

    /// The scope of a count or parity statement.
    pub fn scope(&self) -> Option<&[usize]> {
        match &self.claim {
            Claim::Count { scope, .. } | Claim::Parity { scope, .. } => Some(scope),
            _ => None,
        }
    }

    pub fn referenced_people(&self) -> BTreeSet<usize> {
        match self.pair() {
            Some((a, b)) => [a, b].into_iter().collect(),
            None => self.scope().unwrap_or_default().iter().copied().collect(),
        }
    }

    pub fn references(&self, person: usize) -> bool {
        match self.pair() {
            Some((a, b)) => a == person || b == person,
            None => self.scope().is_some_and(|scope| scope.contains(&person)),
        }
    }

    /// Largest referenced person index.
    pub fn max_person(&self) -> usize {
        match self.pair() {
            Some((a, b)) => a.max(b),
            None => self.scope().and_then(|scope| scope.last().copied()).unwrap_or(0),
        }
    }

    fn holds(&self, liar: impl Fn(usize) -> bool) -> bool {
        match &self.claim {
            &Claim::IfThen { a, b } => !liar(a) || liar(b),
            &Claim::IfNotThen { a, b } => liar(a) || liar(b),
            &Claim::BothOrNeither { a, b } => liar(a) == liar(b),
            &Claim::AtLeastOne { a, b } => liar(a) || liar(b),
            &Claim::ExactlyOne { a, b } => liar(a) != liar(b),
            &Claim::AtMostOne { a, b } => !(liar(a) && liar(b)),
            &Claim::Neither { a, b } => !liar(a) && !liar(b),
            Claim::Count { scope, cmp, count } => {
                let liars = scope.iter().filter(|&&i| liar(i)).count();
                cmp.test(liars, *count)
            }
            Claim::Parity { scope, parity } => {
                let liars = scope.iter().filter(|&&i| liar(i)).count();
                (liars % 2 == 1) == (*parity == Parity::Odd)
            }
        }
    }

    /// Evaluates the statement under an assignment.
    ///
    /// # Panics
    ///
    /// Panics if the statement references a person outside the assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> bool {
        self.holds(|i| assignment.is_liar(i))
    }

    /// Evaluates the statement under the assignment with the given canonical index.
    pub fn evaluate_index(&self, index: usize) -> bool {
        self.holds(|i| (index >> i) & 1 == 1)
    }

    pub fn complexity_weight(&self) -> u32 {
        self.kind().complexity_weight()
    }

    /// Human-readable sentence. Missing names fall back to "Villager i".
    pub fn render<S: AsRef<str>>(&self, names: &[S]) -> String {
        let name = |i: usize| match names.get(i) {
            Some(s) => s.as_ref().to_string(),
            None => format!("Villager {}", i),
        };
        let scope_desc = |scope: &[usize]| match scope {
            [only] => name(*only),
            [x, y] => format!("{} and {}", name(*x), name(*y)),
            [x, y, z] => format!("{}, {}, and {}", name(*x), name(*y), name(*z)),
            _ => format!("{} villagers", scope.len()),
        };
        match &self.claim {
            &Claim::IfThen { a, b } => format!("If {} is a liar, then {} is a liar.", name(a), name(b)),
            &Claim::IfNotThen { a, b } => {
                format!("If {} is not a liar, then {} is a liar.", name(a), name(b))
            }
            &Claim::BothOrNeither { a, b } => {
                format!("{} and {} are both liars, or neither is.", name(a), name(b))
            }
            &Claim::AtLeastOne { a, b } => {
                format!("At least one of {} and {} is a liar.", name(a), name(b))
            }
            &Claim::ExactlyOne { a, b } => {
                format!("Exactly one of {} and {} is a liar.", name(a), name(b))
            }
            &Claim::AtMostOne { a, b } => {
                format!("At most one of {} and {} is a liar.", name(a), name(b))
            }
            &Claim::Neither { a, b } => format!("Neither {} nor {} is a liar.", name(a), name(b)),
            Claim::Count { scope, cmp, count } => {
                let quantifier = match cmp {
                    Comparator::Exactly => "Exactly",
                    Comparator::AtMost => "At most",
                    Comparator::AtLeast => "At least",
                };
                let noun = if *count == 1 { "liar" } else { "liars" };
                format!("{} {} {} among {}.", quantifier, count, noun, scope_desc(scope))
            }
            Claim::Parity { scope, parity } => {
                let word = match parity {
                    Parity::Even => "even",
                    Parity::Odd => "odd",
                };
                format!("An {} number of liars among {}.", word, scope_desc(scope))
            }
        }
    }

    /// Short token, e.g. `I-5-7`, `E-0.1.2-2` or `V-0.1.2`.
    pub fn to_token(&self) -> String {
        let code = self.kind().code();
        match &self.claim {
            Claim::Count { scope, count, .. } => format!("{}-{}-{}", code, join(scope, "."), count),
            Claim::Parity { scope, .. } => format!("{}-{}", code, join(scope, ".")),
            _ => {
                let (a, b) = self.pair().unwrap_or_default();
                format!("{}-{}-{}", code, a, b)
            }
        }
    }

    /// Parses a short token.
    pub fn from_token(token: &str) -> Result<Self, DecodeError> {
        let malformed = || DecodeError::MalformedToken(token.to_string());
        let fields: Vec<&str> = token.split('-').collect();
        let kind = StatementKind::from_code(fields[0]).ok_or_else(|| DecodeError::UnknownKind(fields[0].to_string()))?;
        let number = |s: &str| s.parse::<usize>().map_err(|_| malformed());
        let scope = |s: &str| -> Result<Vec<usize>, DecodeError> {
            if s.is_empty() {
                return Err(DecodeError::EmptyScope);
            }
            s.split('.').map(number).collect()
        };

        let claim = match (kind, fields.len()) {
            (StatementKind::Count(cmp), 3) => Claim::Count {
                scope: scope(fields[1])?,
                cmp,
                count: number(fields[2])?,
            },
            (StatementKind::Parity(parity), 2) => Claim::Parity {
                scope: scope(fields[1])?,
                parity,
            },
            (StatementKind::Count(_) | StatementKind::Parity(_), _) => return Err(malformed()),
            (_, 3) => return Ok(Self::relational(kind, number(fields[1])?, number(fields[2])?)),
            _ => return Err(malformed()),
        };
        Ok(Self::new(claim))
    }

    /// Structured record of this statement.
    pub fn to_record(&self) -> StatementRecord {
        StatementRecord::from(self.clone())
    }

    /// Decodes a structured record given as JSON text.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Decodes a structured record given as a JSON value.
    ///
    /// An unrecognized `type` tag is reported as [`DecodeError::UnknownKind`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        if let Some(tag) = value.get("type").and_then(serde_json::Value::as_str) {
            if StatementKind::from_record_name(tag).is_none() {
                return Err(DecodeError::UnknownKind(tag.to_string()));
            }
        }
        let record: StatementRecord = serde_json::from_value(value)?;
        Statement::try_from(record)
    }
}

fn normalize(claim: Claim) -> Claim {
    fn ordered(a: usize, b: usize) -> (usize, usize) {
        (a.min(b), a.max(b))
    }
    fn canonical_scope(mut scope: Vec<usize>) -> Vec<usize> {
        assert!(!scope.is_empty(), "Count statements need a non-empty scope");
        scope.sort_unstable();
        scope.dedup();
        scope
    }
    match claim {
        Claim::BothOrNeither { a, b } => {
            let (a, b) = ordered(a, b);
            Claim::BothOrNeither { a, b }
        }
        Claim::AtLeastOne { a, b } => {
            let (a, b) = ordered(a, b);
            Claim::AtLeastOne { a, b }
        }
        Claim::ExactlyOne { a, b } => {
            let (a, b) = ordered(a, b);
            Claim::ExactlyOne { a, b }
        }
        Claim::AtMostOne { a, b } => {
            let (a, b) = ordered(a, b);
            Claim::AtMostOne { a, b }
        }
        Claim::Neither { a, b } => {
            let (a, b) = ordered(a, b);
            Claim::Neither { a, b }
        }
        Claim::Count { scope, cmp, count } => Claim::Count {
            scope: canonical_scope(scope),
            cmp,
            count,
        },
        Claim::Parity { scope, parity } => Claim::Parity {
            scope: canonical_scope(scope),
            parity,
        },
        directional @ (Claim::IfThen { .. } | Claim::IfNotThen { .. }) => directional,
    }
}

fn join(values: &[usize], sep: &str) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(sep)
}

fn canonical_id(claim: &Claim) -> String {
    match claim {
        Claim::IfThen { a, b } => format!("IMP({},{})", a, b),
        Claim::IfNotThen { a, b } => format!("IMP_NOT({},{})", a, b),
        Claim::BothOrNeither { a, b } => format!("EQ({},{})", a, b),
        Claim::AtLeastOne { a, b } => format!("OR({},{})", a, b),
        Claim::ExactlyOne { a, b } => format!("XOR({},{})", a, b),
        Claim::AtMostOne { a, b } => format!("NAND({},{})", a, b),
        Claim::Neither { a, b } => format!("NEITHER({},{})", a, b),
        Claim::Count { scope, cmp, count } => {
            let op = match cmp {
                Comparator::Exactly => "EQ",
                Comparator::AtMost => "LE",
                Comparator::AtLeast => "GE",
            };
            format!("COUNT_{}(scope=[{}],count={})", op, join(scope, ","), count)
        }
        Claim::Parity { scope, parity } => {
            let op = match parity {
                Parity::Even => "EVEN",
                Parity::Odd => "ODD",
            };
            format!("COUNT_{}(scope=[{}])", op, join(scope, ","))
        }
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Statement {}

impl Hash for Statement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Statement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Statement {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Statement({})", self.id)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Structured record of a statement, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StatementRecord {
    IfAThenB { a_index: usize, b_index: usize },
    IfNotAThenB { a_index: usize, b_index: usize },
    BothOrNeither { a_index: usize, b_index: usize },
    AtLeastOne { a_index: usize, b_index: usize },
    ExactlyOne { a_index: usize, b_index: usize },
    AtMostOne { a_index: usize, b_index: usize },
    Neither { a_index: usize, b_index: usize },
    ExactlyKLiars { scope_indices: Vec<usize>, count: usize },
    AtMostKLiars { scope_indices: Vec<usize>, count: usize },
    AtLeastKLiars { scope_indices: Vec<usize>, count: usize },
    EvenNumberOfLiars { scope_indices: Vec<usize> },
    OddNumberOfLiars { scope_indices: Vec<usize> },
}

impl From<Statement> for StatementRecord {
    fn from(statement: Statement) -> Self {
        match statement.claim {
            Claim::IfThen { a, b } => StatementRecord::IfAThenB { a_index: a, b_index: b },
            Claim::IfNotThen { a, b } => StatementRecord::IfNotAThenB { a_index: a, b_index: b },
            Claim::BothOrNeither { a, b } => StatementRecord::BothOrNeither { a_index: a, b_index: b },
            Claim::AtLeastOne { a, b } => StatementRecord::AtLeastOne { a_index: a, b_index: b },
            Claim::ExactlyOne { a, b } => StatementRecord::ExactlyOne { a_index: a, b_index: b },
            Claim::AtMostOne { a, b } => StatementRecord::AtMostOne { a_index: a, b_index: b },
            Claim::Neither { a, b } => StatementRecord::Neither { a_index: a, b_index: b },
            Claim::Count { scope, cmp, count } => match cmp {
                Comparator::Exactly => StatementRecord::ExactlyKLiars {
                    scope_indices: scope,
                    count,
                },
                Comparator::AtMost => StatementRecord::AtMostKLiars {
                    scope_indices: scope,
                    count,
                },
                Comparator::AtLeast => StatementRecord::AtLeastKLiars {
                    scope_indices: scope,
                    count,
                },
            },
            Claim::Parity { scope, parity } => match parity {
                Parity::Even => StatementRecord::EvenNumberOfLiars { scope_indices: scope },
                Parity::Odd => StatementRecord::OddNumberOfLiars { scope_indices: scope },
            },
        }
    }
}

impl TryFrom<StatementRecord> for Statement {
    type Error = DecodeError;

    fn try_from(record: StatementRecord) -> Result<Self, Self::Error> {
        let count_claim = |scope: Vec<usize>, cmp, count| {
            if scope.is_empty() {
                return Err(DecodeError::EmptyScope);
            }
            Ok(Claim::Count { scope, cmp, count })
        };
        let parity_claim = |scope: Vec<usize>, parity| {
            if scope.is_empty() {
                return Err(DecodeError::EmptyScope);
            }
            Ok(Claim::Parity { scope, parity })
        };
        let claim = match record {
            StatementRecord::IfAThenB { a_index: a, b_index: b } => Claim::IfThen { a, b },
            StatementRecord::IfNotAThenB { a_index: a, b_index: b } => Claim::IfNotThen { a, b },
            StatementRecord::BothOrNeither { a_index: a, b_index: b } => Claim::BothOrNeither { a, b },
            StatementRecord::AtLeastOne { a_index: a, b_index: b } => Claim::AtLeastOne { a, b },
            StatementRecord::ExactlyOne { a_index: a, b_index: b } => Claim::ExactlyOne { a, b },
            StatementRecord::AtMostOne { a_index: a, b_index: b } => Claim::AtMostOne { a, b },
            StatementRecord::Neither { a_index: a, b_index: b } => Claim::Neither { a, b },
            StatementRecord::ExactlyKLiars { scope_indices, count } => {
                count_claim(scope_indices, Comparator::Exactly, count)?
            }
            StatementRecord::AtMostKLiars { scope_indices, count } => {
                count_claim(scope_indices, Comparator::AtMost, count)?
            }
            StatementRecord::AtLeastKLiars { scope_indices, count } => {
                count_claim(scope_indices, Comparator::AtLeast, count)?
            }
            StatementRecord::EvenNumberOfLiars { scope_indices } => parity_claim(scope_indices, Parity::Even)?,
            StatementRecord::OddNumberOfLiars { scope_indices } => parity_claim(scope_indices, Parity::Odd)?,
        };
        Ok(Statement::new(claim))
    }
}
