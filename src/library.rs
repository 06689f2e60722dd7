//! The universe of statements a configuration admits.

use log::debug;

use crate::config::GenerationConfig;
use crate::statement::{Comparator, Parity, Statement, StatementKind};

/// Flat list of admissible statements for a population size.
///
/// Built once per configuration and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Library {
    num_people: usize,
    statements: Vec<Statement>,
}

impl Library {
    /// Enumerates every statement the configuration admits.
    ///
    /// - symmetric relational kinds: one statement per unordered pair `a < b`
    ///   (plus `a == b` when self reference is allowed);
    /// - `IfThen`: one statement per ordered pair, `a != b` unless self reference is allowed;
    ///   the legacy `IfNotThen` is never generated, it duplicates `AtLeastOne`;
    /// - count kinds, over everyone and over each "everyone except `s`" scope:
    ///   exactly `1..=len`, at most and at least `0..=len`, even and odd.
    pub fn build(config: &GenerationConfig) -> Self {
        let n = config.num_people;
        let self_ref = config.allow_self_reference;
        let mut statements = Vec::new();

        for a in 0..n {
            for b in a..n {
                if a == b && !self_ref {
                    continue;
                }
                for kind in StatementKind::SYMMETRIC {
                    statements.push(Statement::relational(kind, a, b));
                }
            }
        }

        for a in 0..n {
            for b in 0..n {
                if a == b && !self_ref {
                    continue;
                }
                statements.push(Statement::if_then(a, b));
            }
        }

        if config.allow_count_statements {
            let mut scopes: Vec<Vec<usize>> = vec![(0..n).collect()];
            for speaker in 0..n {
                let scope: Vec<usize> = (0..n).filter(|&i| i != speaker).collect();
                if !scope.is_empty() {
                    scopes.push(scope);
                }
            }
            for scope in scopes {
                let len = scope.len();
                for k in 1..=len {
                    statements.push(Statement::count(scope.iter().copied(), Comparator::Exactly, k));
                }
                for k in 0..=len {
                    statements.push(Statement::count(scope.iter().copied(), Comparator::AtMost, k));
                    statements.push(Statement::count(scope.iter().copied(), Comparator::AtLeast, k));
                }
                statements.push(Statement::parity(scope.iter().copied(), Parity::Even));
                statements.push(Statement::parity(scope, Parity::Odd));
            }
        }

        debug!("Built statement library for N={}: {} statements", n, statements.len());
        Self { num_people: n, statements }
    }

    /// Wraps an explicit statement list.
    ///
    /// # Panics
    ///
    /// Panics if a statement references someone outside the population.
    pub fn from_statements(num_people: usize, statements: Vec<Statement>) -> Self {
        for s in &statements {
            assert!(
                s.max_person() < num_people,
                "Statement {} references a person outside N={}",
                s,
                num_people
            );
        }
        Self { num_people, statements }
    }

    pub fn num_people(&self) -> usize {
        self.num_people
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }
}

impl<'a> IntoIterator for &'a Library {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_relational_only() {
        let config = GenerationConfig::new(4).with_count_statements(false);
        let library = Library::build(&config);
        // 6 unordered pairs * 5 symmetric kinds + 12 ordered pairs
        assert_eq!(library.len(), 6 * 5 + 12);
        assert!(library.iter().all(|s| s.kind().is_relational()));
        assert!(library.iter().all(|s| s.kind() != StatementKind::IfNotThen));
        assert!(library.iter().all(|s| s.pair().is_some_and(|(a, b)| a != b)));
    }

    #[test]
    fn test_self_reference_pairs() {
        let config = GenerationConfig::new(3)
            .with_count_statements(false)
            .with_self_reference(true);
        let library = Library::build(&config);
        // 6 unordered pairs with a <= b, 9 ordered pairs
        assert_eq!(library.len(), 6 * 5 + 9);
        assert!(library.iter().any(|s| s == &Statement::if_then(2, 2)));
    }

    #[test]
    fn test_count_statements() {
        let n = 4;
        let library = Library::build(&GenerationConfig::new(n));
        let counts = library.iter().filter(|s| !s.kind().is_relational()).count();
        // Full scope: 4 exactly + 5 at-most + 5 at-least + 2 parity = 16,
        // each of the 4 "all except s" scopes: 3 + 4 + 4 + 2 = 13.
        assert_eq!(counts, 16 + 4 * 13);
        assert!(library.iter().all(|s| s.max_person() < n));
    }

    #[test]
    fn test_no_duplicates() {
        let library = Library::build(&GenerationConfig::new(5).with_self_reference(true));
        let ids: HashSet<&str> = library.iter().map(|s| s.id()).collect();
        assert_eq!(ids.len(), library.len());
    }

    #[test]
    #[should_panic(expected = "outside N=2")]
    fn test_from_statements_checks_range() {
        Library::from_statements(2, vec![Statement::if_then(0, 2)]);
    }
}
