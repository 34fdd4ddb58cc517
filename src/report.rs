use crate::allocator::{Allocation, Unseated};
use crate::clash::Clash;
use crate::data::{
    AttendanceSheet, ClashReport, NAME_NOT_FOUND, RollName, Seat, SeatingRow, Session,
    UnseatedReport, VacancyRow,
};
use crate::rooms::{RoomCatalog, SessionCapacity};
use std::collections::HashMap;

/// Roll number to student name lookup for attendance sheets.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    names: HashMap<String, String>,
}

impl NameDirectory {
    pub fn from_records(records: &[RollName]) -> Self {
        let names = records
            .iter()
            .map(|r| (r.roll.trim().to_string(), r.name.trim().to_string()))
            .filter(|(roll, _)| !roll.is_empty())
            .collect();
        Self { names }
    }

    pub fn name(&self, roll: &str) -> &str {
        self.names.get(roll).map(String::as_str).unwrap_or(NAME_NOT_FOUND)
    }
}

pub fn seating_rows(session: &Session, allocations: &[Allocation]) -> Vec<SeatingRow> {
    allocations
        .iter()
        .map(|a| SeatingRow {
            date: session.date.clone(),
            day: session.day.clone(),
            course_code: a.subject.clone(),
            room: a.room.clone(),
            allocated_students_count: a.rolls.len(),
            roll_list: a.rolls.join(";"),
        })
        .collect()
}

/// One row per catalog room. `allotted` is raw capacity minus what is left,
/// so buffered and sparse-held seats count as allotted.
pub fn vacancy_rows(
    session: &Session,
    catalog: &RoomCatalog,
    capacity: &SessionCapacity,
) -> Vec<VacancyRow> {
    catalog
        .rooms()
        .iter()
        .enumerate()
        .map(|(index, room)| {
            let vacant = capacity.remaining(index);
            VacancyRow {
                date: session.date.clone(),
                room_no: room.id.clone(),
                exam_capacity: room.capacity,
                block: room.block.clone(),
                allotted: room.capacity.saturating_sub(vacant),
                vacant,
            }
        })
        .collect()
}

pub fn clash_reports(session: &Session, clashes: &[Clash]) -> Vec<ClashReport> {
    clashes
        .iter()
        .map(|c| ClashReport {
            date: session.date.clone(),
            slot: session.slot.clone(),
            subject_a: c.subject_a.clone(),
            subject_b: c.subject_b.clone(),
            roll: c.roll.clone(),
        })
        .collect()
}

pub fn unseated_reports(session: &Session, unseated: &[Unseated]) -> Vec<UnseatedReport> {
    unseated
        .iter()
        .map(|u| UnseatedReport {
            date: session.date.clone(),
            slot: session.slot.clone(),
            subject: u.subject.clone(),
            count: u.rolls.len(),
            rolls: u.rolls.clone(),
        })
        .collect()
}

/// Seat lists for the attendance sheet renderer, numbered from 1 per room.
pub fn attendance_sheets(
    session: &Session,
    allocations: &[Allocation],
    names: &NameDirectory,
) -> Vec<AttendanceSheet> {
    allocations
        .iter()
        .map(|a| AttendanceSheet {
            date: session.date.clone(),
            day: session.day.clone(),
            slot: session.slot.clone(),
            room: a.room.clone(),
            subject: a.subject.clone(),
            seats: a
                .rolls
                .iter()
                .enumerate()
                .map(|(i, roll)| Seat {
                    seat_no: i + 1,
                    roll: roll.clone(),
                    name: names.name(roll).to_string(),
                })
                .collect(),
        })
        .collect()
}
