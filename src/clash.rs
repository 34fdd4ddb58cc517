use crate::data::{RollNo, SubjectId};
use crate::roster::Subject;
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

/// A roll enrolled in two subjects of the same session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clash {
    pub subject_a: SubjectId,
    pub subject_b: SubjectId,
    pub roll: RollNo,
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in both {} and {}", self.roll, self.subject_a, self.subject_b)
    }
}

/// Every (subject pair, shared roll) among the active subjects.
///
/// Pairs follow the order the subjects were supplied in and rolls follow the
/// first subject's roster. Detection only; nothing here changes allocation.
pub fn find_clashes(subjects: &[Subject]) -> Vec<Clash> {
    subjects
        .iter()
        .tuple_combinations()
        .flat_map(|(a, b)| {
            let other: HashSet<&str> = b.rolls.iter().map(String::as_str).collect();
            a.rolls
                .iter()
                .filter(move |roll| other.contains(roll.as_str()))
                .map(move |roll| Clash {
                    subject_a: a.id.clone(),
                    subject_b: b.id.clone(),
                    roll: roll.clone(),
                })
        })
        .collect()
}
