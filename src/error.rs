//! Errors returned by the seating orchestrator.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("no room records were supplied; nothing can be seated")]
    NoRooms,

    #[error("the timetable does not list any subject in any slot")]
    NothingToSchedule,
}

pub type SolveResult<T> = Result<T, SolveError>;
