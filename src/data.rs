use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type SubjectId = String;
pub type RoomId = String;
pub type RollNo = String;

/// Block assigned to rooms whose block column is blank.
pub const DEFAULT_BLOCK: &str = "Block";
/// Seats held back per room unless the request says otherwise.
pub const DEFAULT_BUFFER: u32 = 5;
/// Printed on attendance sheets for rolls missing from the name directory.
pub const NAME_NOT_FOUND: &str = "(name not found)";

/// How densely a room is filled by a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// Every effective seat is usable by one subject.
    #[default]
    Dense,
    /// Only half of the effective seats (floored) go to one subject.
    Sparse,
}

/// Capacity rules applied to every room for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityPolicy {
    #[serde(default = "default_buffer")]
    pub buffer: u32,
    #[serde(default)]
    pub density: Density,
}

fn default_buffer() -> u32 {
    DEFAULT_BUFFER
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER,
            density: Density::Dense,
        }
    }
}

/// The two exam shifts of a timetable day, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Slot {
    Morning,
    Evening,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Morning, Slot::Evening];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Morning => write!(f, "Morning"),
            Slot::Evening => write!(f, "Evening"),
        }
    }
}

/// Date, day label and slot of one sitting. Passed through verbatim into output rows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub date: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub slot: String,
}

/// One row of the course/roll mapping. Either side may be blank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub rollno: String,
}

/// One row of the room capacity table, exactly as it was ingested.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    #[serde(default)]
    pub room_no: String,
    #[serde(default)]
    pub block: String,
    /// A number, a numeric string, or anything else (which degrades to 0 seats).
    #[serde(default)]
    pub exam_capacity: serde_json::Value,
}

/// Roll number to student name, used only for attendance sheets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollName {
    #[serde(default)]
    pub roll: String,
    #[serde(default)]
    pub name: String,
}

/// One timetable day. Slot cells hold `;`-separated course codes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub morning: String,
    #[serde(default)]
    pub evening: String,
}

impl TimetableEntry {
    pub fn cell(&self, slot: Slot) -> &str {
        match slot {
            Slot::Morning => &self.morning,
            Slot::Evening => &self.evening,
        }
    }
}

/// The complete input for a timetable-wide allocation run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingInput {
    pub timetable: Vec<TimetableEntry>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub rooms: Vec<RoomRecord>,
    #[serde(default)]
    pub roll_names: Vec<RollName>,
    #[serde(flatten)]
    pub policy: CapacityPolicy,
}

/// Input for planning a single session with an explicit subject list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(flatten)]
    pub session: Session,
    pub subjects: Vec<SubjectId>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub rooms: Vec<RoomRecord>,
    #[serde(default)]
    pub roll_names: Vec<RollName>,
    #[serde(flatten)]
    pub policy: CapacityPolicy,
}

/// One row of the overall seating arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingRow {
    pub date: String,
    pub day: String,
    pub course_code: SubjectId,
    pub room: RoomId,
    pub allocated_students_count: usize,
    /// Rolls joined with `;`, in seat order.
    pub roll_list: String,
}

/// Seats left in one room after a session.
///
/// `allotted` is `exam_capacity - vacant` and therefore counts buffered seats
/// as allotted; it is not the number of students actually seated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VacancyRow {
    pub date: String,
    pub room_no: RoomId,
    pub exam_capacity: u32,
    pub block: String,
    pub allotted: u32,
    pub vacant: u32,
}

/// A student enrolled in two subjects sitting in the same session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashReport {
    pub date: String,
    pub slot: String,
    pub subject_a: SubjectId,
    pub subject_b: SubjectId,
    pub roll: RollNo,
}

/// Students of a subject that no room could take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnseatedReport {
    pub date: String,
    pub slot: String,
    pub subject: SubjectId,
    pub count: usize,
    pub rolls: Vec<RollNo>,
}

/// One numbered seat on an attendance sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_no: usize,
    pub roll: RollNo,
    pub name: String,
}

/// Everything an attendance sheet renderer needs for one room and subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub date: String,
    pub day: String,
    pub slot: String,
    pub room: RoomId,
    pub subject: SubjectId,
    pub seats: Vec<Seat>,
}

/// The final output handed to the document and spreadsheet writers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatingOutput {
    pub seating: Vec<SeatingRow>,
    pub vacancies: Vec<VacancyRow>,
    pub clashes: Vec<ClashReport>,
    pub unseated: Vec<UnseatedReport>,
    pub attendance: Vec<AttendanceSheet>,
}

impl SeatingOutput {
    pub fn append(&mut self, other: SeatingOutput) {
        self.seating.extend(other.seating);
        self.vacancies.extend(other.vacancies);
        self.clashes.extend(other.clashes);
        self.unseated.extend(other.unseated);
        self.attendance.extend(other.attendance);
    }
}
