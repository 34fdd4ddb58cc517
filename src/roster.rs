use crate::data::{EnrollmentRecord, RollNo, SubjectId};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap, HashSet};

/// A subject sitting in a session together with its roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    /// Sorted, no duplicates.
    pub rolls: Vec<RollNo>,
}

impl Subject {
    pub fn count(&self) -> usize {
        self.rolls.len()
    }
}

/// Per-subject rosters built from the raw course/roll mapping.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    rosters: HashMap<SubjectId, Vec<RollNo>>,
}

impl RosterIndex {
    pub fn from_records(records: &[EnrollmentRecord]) -> Self {
        let mut sets: HashMap<SubjectId, BTreeSet<RollNo>> = HashMap::new();
        let mut dropped = 0usize;
        for record in records {
            let subject = record.course_code.trim();
            let roll = record.rollno.trim();
            if subject.is_empty() || roll.is_empty() {
                dropped += 1;
                continue;
            }
            sets.entry(subject.to_string()).or_default().insert(roll.to_string());
        }
        if dropped > 0 {
            debug!("Dropped {} enrollment records with a blank course or roll.", dropped);
        }

        let rosters = sets
            .into_iter()
            .map(|(subject, rolls)| (subject, rolls.into_iter().collect()))
            .collect();
        Self { rosters }
    }

    /// Roster of `subject`, empty when nobody is enrolled.
    pub fn roster(&self, subject: &str) -> &[RollNo] {
        self.rosters.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Subjects active in one session, in the order given. Repeated ids keep their first position.
    pub fn active<S: AsRef<str>>(&self, subjects: &[S]) -> Vec<Subject> {
        let mut seen = HashSet::new();
        let mut active = Vec::with_capacity(subjects.len());
        for subject in subjects {
            let id = subject.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            if !seen.insert(id) {
                warn!("Subject {} is listed twice in the same session; ignoring the repeat.", id);
                continue;
            }
            active.push(Subject {
                id: id.to_string(),
                rolls: self.roster(id).to_vec(),
            });
        }
        active
    }
}
