//! Finished puzzles and their structured record.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::bundle::Bundle;
use crate::error::DecodeError;
use crate::types::Assignment;

const DEFAULT_NAMES: [&str; 6] = [
    "Alchemist Alice",
    "Baker Bob",
    "Captain Charlie",
    "Doctor Doris",
    "Elder Edith",
    "Farmer Frank",
];

/// Display names for a population of `n`.
pub fn default_names(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| match DEFAULT_NAMES.get(i) {
            Some(name) => name.to_string(),
            None => format!("Villager {}", i),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub index: usize,
    pub name: String,
}

/// A village of people, one bundle per person.
///
/// `solution` and `shill` hold the ground truth the puzzle was generated
/// from; both are absent once the puzzle is published.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub people: Vec<Person>,
    pub bundles: Vec<Bundle>,
    pub difficulty: f64,
    pub has_shill: bool,
    pub solution: Option<Assignment>,
    pub shill: Option<usize>,
}

impl Puzzle {
    /// Creates a puzzle with default names and no ground truth.
    pub fn new(bundles: Vec<Bundle>, has_shill: bool) -> Self {
        let people = default_names(bundles.len())
            .into_iter()
            .enumerate()
            .map(|(index, name)| Person { index, name })
            .collect();
        Self {
            people,
            bundles,
            difficulty: 0.0,
            has_shill,
            solution: None,
            shill: None,
        }
    }

    pub fn num_people(&self) -> usize {
        self.bundles.len()
    }

    /// Attaches the ground truth.
    ///
    /// # Panics
    ///
    /// Panics if the assignment has the wrong size or the shill is a liar.
    pub fn with_solution(mut self, solution: Assignment, shill: Option<usize>) -> Self {
        assert_eq!(solution.len(), self.num_people(), "Solution size mismatch");
        if let Some(s) = shill {
            assert!(!solution.is_liar(s), "Shill {} must not be a liar", s);
        }
        self.solution = Some(solution);
        self.shill = shill;
        self
    }

    pub fn with_difficulty(mut self, difficulty: f64) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Strips the ground truth.
    pub fn without_solution(mut self) -> Self {
        self.solution = None;
        self.shill = None;
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.people.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn num_statements(&self) -> usize {
        self.bundles.iter().map(Bundle::len).sum()
    }

    /// All statement tokens, speaker by speaker, joined by `_`.
    pub fn to_short_string(&self) -> String {
        self.bundles
            .iter()
            .flat_map(|b| b.iter().map(|s| s.to_token()))
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Plain-text rendering: one line per speaker.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn to_record(&self) -> PuzzleRecord {
        let n = self.num_people();
        PuzzleRecord {
            people: self.people.clone(),
            statements_by_speaker: self.bundles.clone(),
            difficulty_score: self.difficulty,
            has_shill: self.has_shill,
            solution_assignment: self.solution.clone(),
            shill_assignment: self.shill.map(|s| (0..n).map(|i| i == s).collect()),
        }
    }

    pub fn from_record(record: PuzzleRecord) -> Result<Self, DecodeError> {
        let n = record.statements_by_speaker.len();
        if record.people.len() != n {
            return Err(DecodeError::Json(serde_json::Error::custom(format!(
                "{} people but {} bundles",
                record.people.len(),
                n
            ))));
        }
        for statement in record.statements_by_speaker.iter().flatten() {
            let person = statement.max_person();
            if person >= n {
                return Err(DecodeError::PersonOutOfRange { person, population: n });
            }
        }
        if let Some(solution) = &record.solution_assignment {
            if solution.len() != n {
                return Err(DecodeError::Json(serde_json::Error::custom(format!(
                    "solution for {} people, puzzle has {}",
                    solution.len(),
                    n
                ))));
            }
        }
        let shill = match record.shill_assignment {
            None => None,
            Some(flags) => {
                let marked: Vec<usize> = flags.iter().enumerate().filter(|&(_, &f)| f).map(|(i, _)| i).collect();
                match marked[..] {
                    [s] if flags.len() == n => Some(s),
                    _ => {
                        return Err(DecodeError::Json(serde_json::Error::custom(
                            "shill assignment must mark exactly one person",
                        )))
                    }
                }
            }
        };
        Ok(Self {
            people: record.people,
            bundles: record.statements_by_speaker,
            difficulty: record.difficulty_score,
            has_shill: record.has_shill,
            solution: record.solution_assignment,
            shill,
        })
    }

    pub fn to_json(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Self::from_record(serde_json::from_str(json)?)
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        for (person, bundle) in self.people.iter().zip(&self.bundles) {
            write!(f, "{}:", person.name)?;
            for statement in bundle {
                write!(f, " {}", statement.render(&names))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized form of a [`Puzzle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleRecord {
    pub people: Vec<Person>,
    pub statements_by_speaker: Vec<Bundle>,
    pub difficulty_score: f64,
    pub has_shill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_assignment: Option<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shill_assignment: Option<Vec<bool>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{Comparator, Statement};

    fn sample() -> Puzzle {
        Puzzle::new(
            vec![
                Bundle::new(vec![Statement::if_then(1, 0)]),
                Bundle::new(vec![Statement::both_or_neither(0, 1), Statement::count([0, 1], Comparator::AtMost, 1)]),
            ],
            false,
        )
        .with_solution(Assignment::new(vec![false, false]), None)
        .with_difficulty(7.5)
    }

    #[test]
    fn test_default_names() {
        let names = default_names(8);
        assert_eq!(names[0], "Alchemist Alice");
        assert_eq!(names[5], "Farmer Frank");
        assert_eq!(names[6], "Villager 6");
        assert_eq!(names[7], "Villager 7");
    }

    #[test]
    fn test_short_string() {
        assert_eq!(sample().to_short_string(), "I-1-0_B-0-1_M-0.1-1");
    }

    #[test]
    fn test_record_fields() {
        let value = serde_json::to_value(sample().to_record()).unwrap();
        assert_eq!(value["people"][1]["name"], "Baker Bob");
        assert_eq!(value["statements_by_speaker"][0][0]["type"], "IfAThenB");
        assert_eq!(value["difficulty_score"], 7.5);
        assert_eq!(value["solution_assignment"], serde_json::json!([false, false]));
        assert!(value.get("shill_assignment").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let puzzle = sample();
        let decoded = Puzzle::from_json(&puzzle.to_json().unwrap()).unwrap();
        assert_eq!(decoded, puzzle);

        let hidden = puzzle.without_solution();
        let json = hidden.to_json().unwrap();
        assert!(!json.contains("solution_assignment"));
        assert_eq!(Puzzle::from_json(&json).unwrap().solution, None);
    }

    #[test]
    fn test_shill_record() {
        let puzzle = Puzzle::new(vec![Bundle::default(), Bundle::default(), Bundle::default()], true)
            .with_solution(Assignment::new(vec![true, false, false]), Some(2));
        let record = puzzle.to_record();
        assert_eq!(record.shill_assignment, Some(vec![false, false, true]));
        assert_eq!(Puzzle::from_record(record).unwrap().shill, Some(2));
    }

    #[test]
    fn test_bad_shill_record() {
        let mut record = sample().to_record();
        record.shill_assignment = Some(vec![true, true]);
        assert!(matches!(Puzzle::from_record(record), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_render() {
        let text = sample().render();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Alchemist Alice: If Baker Bob is a liar, then Alchemist Alice is a liar.");
        assert!(lines[1].starts_with("Baker Bob: "));
    }

    fn record_mentioning(person: usize, has_shill: bool) -> PuzzleRecord {
        let mut record = Puzzle::new(vec![Bundle::default(), Bundle::default(), Bundle::default()], has_shill).to_record();
        record.statements_by_speaker[1] = Bundle::new(vec![Statement::if_then(0, person)]);
        record
    }

    #[test]
    fn test_person_out_of_range() {
        for has_shill in [false, true] {
            let json = serde_json::to_string(&record_mentioning(4, has_shill)).unwrap();
            let err = Puzzle::from_json(&json).unwrap_err();
            assert!(
                matches!(err, DecodeError::PersonOutOfRange { person: 4, population: 3 }),
                "{}",
                err
            );
        }
        assert!(Puzzle::from_record(record_mentioning(2, true)).is_ok());
    }

    #[test]
    #[should_panic(expected = "must not be a liar")]
    fn test_liar_shill() {
        Puzzle::new(vec![Bundle::default(), Bundle::default()], true)
            .with_solution(Assignment::new(vec![true, false]), Some(0));
    }
}
