use crate::allocator::{self, Allocation, Unseated};
use crate::clash::{self, Clash};
use crate::data::{
    CapacityPolicy, SeatingInput, SeatingOutput, Session, SessionRequest, Slot, SubjectId,
    TimetableEntry,
};
use crate::error::{SolveError, SolveResult};
use crate::report::{self, NameDirectory};
use crate::rooms::{RoomCatalog, SessionCapacity};
use crate::roster::RosterIndex;
use log::{debug, info, trace, warn};
use std::time::Instant;

/// Everything decided for one session, before it is turned into rows.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub session: Session,
    pub allocations: Vec<Allocation>,
    pub clashes: Vec<Clash>,
    pub unseated: Vec<Unseated>,
    /// Seats left in each room once the session is packed.
    pub capacity: SessionCapacity,
}

impl SessionPlan {
    pub fn into_output(self, catalog: &RoomCatalog, names: &NameDirectory) -> SeatingOutput {
        SeatingOutput {
            seating: report::seating_rows(&self.session, &self.allocations),
            vacancies: report::vacancy_rows(&self.session, catalog, &self.capacity),
            clashes: report::clash_reports(&self.session, &self.clashes),
            unseated: report::unseated_reports(&self.session, &self.unseated),
            attendance: report::attendance_sheets(&self.session, &self.allocations, names),
        }
    }
}

/// Detects clashes and packs the active subjects of one session into a fresh
/// copy of the catalog's capacity.
pub fn plan_session<S: AsRef<str>>(
    session: &Session,
    subjects: &[S],
    roster: &RosterIndex,
    catalog: &RoomCatalog,
    policy: &CapacityPolicy,
) -> SessionPlan {
    let subjects = roster.active(subjects);
    let clashes = clash::find_clashes(&subjects);
    if !clashes.is_empty() {
        warn!(
            "{} clashes found for {} {}.",
            clashes.len(),
            session.date,
            session.slot
        );
        for c in &clashes {
            debug!("Clash on {} {}: {}", session.date, session.slot, c);
        }
    }

    let mut capacity = catalog.open_session(policy);
    trace!(
        "Session {} {} opens with {} seats per subject across {} rooms.",
        session.date,
        session.slot,
        capacity.total_remaining(),
        catalog.len()
    );
    let result = allocator::allocate(&subjects, catalog, &mut capacity);

    SessionPlan {
        session: session.clone(),
        allocations: result.allocations,
        clashes,
        unseated: result.unseated,
        capacity,
    }
}

/// Plans a single session given its subjects explicitly.
pub fn solve_session(request: &SessionRequest) -> SolveResult<SeatingOutput> {
    let catalog = RoomCatalog::from_records(&request.rooms);
    if catalog.is_empty() {
        return Err(SolveError::NoRooms);
    }
    let roster = RosterIndex::from_records(&request.enrollments);
    let names = NameDirectory::from_records(&request.roll_names);

    let plan = plan_session(
        &request.session,
        request.subjects.as_slice(),
        &roster,
        &catalog,
        &request.policy,
    );
    Ok(plan.into_output(&catalog, &names))
}

/// Runs every session of the timetable, morning before evening, day by day.
pub fn solve(input: &SeatingInput) -> SolveResult<SeatingOutput> {
    let start_time = Instant::now();

    let catalog = RoomCatalog::from_records(&input.rooms);
    if catalog.is_empty() {
        return Err(SolveError::NoRooms);
    }
    let malformed = catalog.rooms().iter().filter(|r| r.capacity_malformed).count();
    if malformed > 0 {
        warn!("{} rooms have an unreadable capacity and offer no seats.", malformed);
    }
    let sessions = expand_timetable(&input.timetable);
    if sessions.is_empty() {
        return Err(SolveError::NothingToSchedule);
    }

    let roster = RosterIndex::from_records(&input.enrollments);
    let names = NameDirectory::from_records(&input.roll_names);
    info!(
        "Allocating {} sessions over {} rooms (buffer {}, {:?}).",
        sessions.len(),
        catalog.len(),
        input.policy.buffer,
        input.policy.density
    );

    let mut output = SeatingOutput::default();
    for (session, subjects) in &sessions {
        let plan = plan_session(
            session,
            subjects.as_slice(),
            &roster,
            &catalog,
            &input.policy,
        );
        output.append(plan.into_output(&catalog, &names));
    }

    info!(
        "Produced {} seating rows, {} clashes and {} unseated subjects in {:.2?}",
        output.seating.len(),
        output.clashes.len(),
        output.unseated.len(),
        start_time.elapsed()
    );
    Ok(output)
}

/// Sessions with at least one subject, in timetable order.
pub fn expand_timetable(timetable: &[TimetableEntry]) -> Vec<(Session, Vec<SubjectId>)> {
    let mut sessions = Vec::new();
    for entry in timetable {
        let date = normalize_date(&entry.date);
        let day = entry.day.trim();
        for slot in Slot::ALL {
            let subjects = split_subjects(entry.cell(slot));
            if subjects.is_empty() {
                continue;
            }
            sessions.push((
                Session {
                    date: date.clone(),
                    day: day.to_string(),
                    slot: slot.to_string(),
                },
                subjects,
            ));
        }
    }
    sessions
}

// Spreadsheet dates often arrive as "2024-05-01 00:00:00"; keep the date part.
fn normalize_date(raw: &str) -> String {
    raw.split_whitespace().next().unwrap_or("").to_string()
}

fn split_subjects(cell: &str) -> Vec<SubjectId> {
    cell.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Density, EnrollmentRecord, RollName, RoomRecord};
    use serde_json::json;

    fn enroll(course: &str, rolls: &[&str]) -> Vec<EnrollmentRecord> {
        rolls
            .iter()
            .map(|r| EnrollmentRecord {
                course_code: course.to_string(),
                rollno: r.to_string(),
            })
            .collect()
    }

    fn numbered(course: &str, count: usize) -> Vec<EnrollmentRecord> {
        let rolls: Vec<String> = (0..count).map(|n| format!("{course}{n:02}")).collect();
        let refs: Vec<&str> = rolls.iter().map(String::as_str).collect();
        enroll(course, &refs)
    }

    fn room(no: &str, block: &str, capacity: u32) -> RoomRecord {
        RoomRecord {
            room_no: no.to_string(),
            block: block.to_string(),
            exam_capacity: json!(capacity),
        }
    }

    fn entry(date: &str, morning: &str, evening: &str) -> TimetableEntry {
        TimetableEntry {
            date: date.to_string(),
            day: " Monday ".to_string(),
            morning: morning.to_string(),
            evening: evening.to_string(),
        }
    }

    fn policy(buffer: u32, density: Density) -> CapacityPolicy {
        CapacityPolicy { buffer, density }
    }

    #[test]
    fn timetable_expands_into_non_empty_slots() {
        let sessions = expand_timetable(&[
            entry("2024-05-01 00:00:00", "CS101; MA102;;", ""),
            entry("2024-05-02", " ; ", "PH103"),
        ]);
        let flat: Vec<(String, String, String, Vec<String>)> = sessions
            .into_iter()
            .map(|(s, subjects)| (s.date, s.day, s.slot, subjects))
            .collect();
        assert_eq!(
            flat,
            vec![
                (
                    "2024-05-01".to_string(),
                    "Monday".to_string(),
                    "Morning".to_string(),
                    vec!["CS101".to_string(), "MA102".to_string()],
                ),
                (
                    "2024-05-02".to_string(),
                    "Monday".to_string(),
                    "Evening".to_string(),
                    vec!["PH103".to_string()],
                ),
            ]
        );
    }

    #[test]
    fn round_trip_two_subjects_two_rooms() {
        let mut enrollments = numbered("MathA", 15);
        enrollments.extend(numbered("MathB", 10));
        let roster = RosterIndex::from_records(&enrollments);
        let catalog = RoomCatalog::from_records(&[room("R1", "A", 20), room("R2", "A", 20)]);
        let session = Session {
            date: "2024-05-01".to_string(),
            day: "Wed".to_string(),
            slot: "Morning".to_string(),
        };

        let plan = plan_session(
            &session,
            &["MathA", "MathB"],
            &roster,
            &catalog,
            &policy(0, Density::Dense),
        );
        let output = plan.into_output(&catalog, &NameDirectory::default());

        let seating: Vec<(&str, &str, usize)> = output
            .seating
            .iter()
            .map(|r| (r.course_code.as_str(), r.room.as_str(), r.allocated_students_count))
            .collect();
        assert_eq!(
            seating,
            [("MathA", "R1", 15), ("MathB", "R1", 5), ("MathB", "R2", 5)]
        );
        let vacant: Vec<u32> = output.vacancies.iter().map(|v| v.vacant).collect();
        assert_eq!(vacant, [0, 15]);
        assert!(output.clashes.is_empty());
        assert!(output.unseated.is_empty());
        assert_eq!(output.attendance.len(), 3);
    }

    #[test]
    fn clashing_student_is_reported_but_still_seated_twice() {
        let mut enrollments = enroll("X", &["1", "2", "3"]);
        enrollments.extend(enroll("Y", &["2", "3", "4"]));
        let input = SeatingInput {
            timetable: vec![entry("2024-05-01", "X;Y", "")],
            enrollments,
            rooms: vec![room("R1", "A", 10)],
            roll_names: Vec::new(),
            policy: policy(0, Density::Dense),
        };

        let output = solve(&input).unwrap();

        let clashes: Vec<(&str, &str, &str)> = output
            .clashes
            .iter()
            .map(|c| (c.subject_a.as_str(), c.subject_b.as_str(), c.roll.as_str()))
            .collect();
        assert_eq!(clashes, [("X", "Y", "2"), ("X", "Y", "3")]);
        assert_eq!(output.seating.len(), 2);
        assert_eq!(output.seating[0].roll_list, "1;2;3");
        assert_eq!(output.seating[1].roll_list, "2;3;4");
    }

    #[test]
    fn each_session_starts_with_full_rooms() {
        let input = SeatingInput {
            timetable: vec![entry("2024-05-01", "CS101", "MA102")],
            enrollments: [numbered("CS101", 8), numbered("MA102", 8)].concat(),
            rooms: vec![room("R1", "A", 10)],
            roll_names: Vec::new(),
            policy: policy(0, Density::Dense),
        };

        let output = solve(&input).unwrap();

        assert_eq!(output.seating.len(), 2);
        assert!(
            output
                .seating
                .iter()
                .all(|r| r.room == "R1" && r.allocated_students_count == 8)
        );
        assert_eq!(output.vacancies.len(), 2);
        assert!(output.vacancies.iter().all(|v| v.vacant == 2));
    }

    #[test]
    fn over_demand_surfaces_unseated_rolls() {
        let input = SeatingInput {
            timetable: vec![entry("2024-05-01", "Chem", "")],
            enrollments: numbered("Chem", 15),
            rooms: vec![room("R1", "A", 10)],
            roll_names: Vec::new(),
            policy: policy(0, Density::Dense),
        };

        let output = solve(&input).unwrap();

        assert_eq!(output.seating.len(), 1);
        assert_eq!(output.seating[0].allocated_students_count, 10);
        assert_eq!(output.unseated.len(), 1);
        assert_eq!(output.unseated[0].count, 5);
        assert_eq!(output.unseated[0].slot, "Morning");
        assert_eq!(output.unseated[0].rolls[0], "Chem10");
    }

    #[test]
    fn sparse_density_with_buffer_halves_usable_seats() {
        let request = SessionRequest {
            session: Session {
                date: "2024-05-03".to_string(),
                day: "Fri".to_string(),
                slot: "Evening".to_string(),
            },
            subjects: vec!["EE104".to_string()],
            enrollments: numbered("EE104", 20),
            rooms: vec![room("R1", "A", 20), room("R2", "A", 20)],
            roll_names: vec![RollName {
                roll: "EE10400".to_string(),
                name: "Dev".to_string(),
            }],
            policy: policy(5, Density::Sparse),
        };

        let output = solve_session(&request).unwrap();

        let counts: Vec<usize> =
            output.seating.iter().map(|r| r.allocated_students_count).collect();
        assert_eq!(counts, [7, 7]);
        assert_eq!(output.unseated[0].count, 6);
        assert_eq!((output.vacancies[0].allotted, output.vacancies[0].vacant), (20, 0));
        assert_eq!(output.attendance[0].seats[0].name, "Dev");
    }

    #[test]
    fn missing_rooms_or_subjects_are_errors() {
        let mut input = SeatingInput {
            timetable: vec![entry("2024-05-01", "", " ; ")],
            enrollments: Vec::new(),
            rooms: Vec::new(),
            roll_names: Vec::new(),
            policy: CapacityPolicy::default(),
        };
        assert_eq!(solve(&input), Err(SolveError::NoRooms));

        input.rooms = vec![room("R1", "A", 10)];
        assert_eq!(solve(&input), Err(SolveError::NothingToSchedule));
    }

    #[test]
    fn both_entry_points_reject_an_empty_room_list() {
        let request = SessionRequest {
            session: Session {
                date: "2024-05-03".to_string(),
                day: "Fri".to_string(),
                slot: "Morning".to_string(),
            },
            subjects: vec!["EE104".to_string()],
            enrollments: numbered("EE104", 3),
            rooms: Vec::new(),
            roll_names: Vec::new(),
            policy: CapacityPolicy::default(),
        };
        assert_eq!(solve_session(&request), Err(SolveError::NoRooms));

        let input = SeatingInput {
            timetable: vec![entry("2024-05-03", "EE104", "")],
            enrollments: numbered("EE104", 3),
            rooms: Vec::new(),
            roll_names: Vec::new(),
            policy: CapacityPolicy::default(),
        };
        assert_eq!(solve(&input), Err(SolveError::NoRooms));
    }

    #[test]
    fn rooms_without_seats_still_plan_and_report_unseated() {
        let request = SessionRequest {
            session: Session {
                date: "2024-05-03".to_string(),
                day: "Fri".to_string(),
                slot: "Morning".to_string(),
            },
            subjects: vec!["EE104".to_string()],
            enrollments: numbered("EE104", 3),
            rooms: vec![RoomRecord {
                room_no: "R1".to_string(),
                block: String::new(),
                exam_capacity: json!("closed"),
            }],
            roll_names: Vec::new(),
            policy: CapacityPolicy::default(),
        };

        let output = solve_session(&request).unwrap();

        assert!(output.seating.is_empty());
        assert_eq!(output.unseated[0].count, 3);
        assert_eq!(output.vacancies[0].vacant, 0);
    }
}
