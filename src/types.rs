//! Core value types: liar assignments, targets and speaker roles.
//!
//! An [`Assignment`] is a boolean vector over the population where `true`
//! means "this person is a liar". Every assignment has a canonical integer
//! encoding ([`Assignment::index`]) with bit `i` equal to `assignment[i]`;
//! that index is also its bit position in a [`Mask`][crate::mask::Mask].
use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest supported population size.
///
/// Masks have `2^N` bits, so the assignment space stays enumerable.
pub const MAX_PEOPLE: usize = 16;

/// Number of assignments for a population of `n` people.
#[inline]
pub fn space_size(n: usize) -> usize {
    assert!(n <= MAX_PEOPLE, "Population size {} exceeds {}", n, MAX_PEOPLE);
    1 << n
}

/// A liar assignment: `liars[i]` is true iff person `i` is a liar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment(Vec<bool>);

impl Assignment {
    /// Creates an assignment from explicit liar flags.
    pub fn new(liars: Vec<bool>) -> Self {
        Assignment(liars)
    }

    /// Decodes the canonical integer index of an assignment over `n` people.
    pub fn from_index(n: usize, index: usize) -> Self {
        Assignment((0..n).map(|i| (index >> i) & 1 == 1).collect())
    }

    /// Population size.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for an assignment over zero people.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if person `i` is a liar.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the population.
    #[inline]
    pub fn is_liar(&self, i: usize) -> bool {
        assert!(i < self.0.len(), "Person {} out of range for population {}", i, self.0.len());
        self.0[i]
    }

    /// Canonical integer encoding: bit `i` is set iff person `i` is a liar.
    pub fn index(&self) -> usize {
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &liar)| if liar { acc | (1 << i) } else { acc })
    }

    /// Number of liars.
    pub fn liar_count(&self) -> usize {
        self.0.iter().filter(|&&liar| liar).count()
    }

    /// Indices of people who are not liars.
    pub fn truthful_people(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter(|(_, &liar)| !liar).map(|(i, _)| i)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &liar in &self.0 {
            write!(f, "{}", if liar { 'L' } else { 'T' })?;
        }
        Ok(())
    }
}

/// The intended answer of a puzzle under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub assignment: Assignment,
    /// The designated shill, always a non-liar.
    pub shill: Option<usize>,
}

impl Target {
    pub fn new(assignment: Assignment, shill: Option<usize>) -> Self {
        if let Some(s) = shill {
            assert!(!assignment.is_liar(s), "Shill {} must not be a liar", s);
        }
        Target { assignment, shill }
    }

    /// Role of speaker `i` under this target.
    pub fn role(&self, i: usize) -> Role {
        if self.assignment.is_liar(i) {
            Role::Liar
        } else if self.shill == Some(i) {
            Role::Shill
        } else {
            Role::Truthful
        }
    }
}

/// What a speaker's bundle must satisfy on the target assignment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Role {
    /// Every statement is true.
    Truthful,
    /// At least one statement is false.
    Liar,
    /// Not a liar, but allowed (and required) to have a false statement.
    Shill,
}

impl Role {
    /// Returns true if the bundle must be "not all true".
    pub fn must_contain_falsehood(self) -> bool {
        !matches!(self, Role::Truthful)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for index in 0..space_size(5) {
            let a = Assignment::from_index(5, index);
            assert_eq!(a.len(), 5);
            assert_eq!(a.index(), index);
        }
    }

    #[test]
    fn test_index_bit_order() {
        let a = Assignment::new(vec![true, false, true]);
        assert_eq!(a.index(), 0b101);
        assert_eq!(a.liar_count(), 2);
        assert_eq!(a.truthful_people().collect::<Vec<_>>(), vec![1]);
        assert_eq!(a.to_string(), "LTL");
    }

    #[test]
    fn test_roles() {
        let target = Target::new(Assignment::new(vec![true, false, false]), Some(2));
        assert_eq!(target.role(0), Role::Liar);
        assert_eq!(target.role(1), Role::Truthful);
        assert_eq!(target.role(2), Role::Shill);
        assert!(target.role(2).must_contain_falsehood());
        assert!(!target.role(1).must_contain_falsehood());
    }

    #[test]
    #[should_panic(expected = "must not be a liar")]
    fn test_liar_shill_rejected() {
        Target::new(Assignment::new(vec![true, false]), Some(0));
    }
}
