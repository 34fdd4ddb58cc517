use crate::data::{RollNo, RoomId, SubjectId};
use crate::rooms::{RoomCatalog, SessionCapacity};
use crate::roster::Subject;
use log::{trace, warn};
use std::cmp::Reverse;
use std::fmt;

/// Rolls of one subject seated in one room, in seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub subject: SubjectId,
    pub room: RoomId,
    pub rolls: Vec<RollNo>,
}

/// Tail of a roster that did not fit into any room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unseated {
    pub subject: SubjectId,
    pub rolls: Vec<RollNo>,
}

impl fmt::Display for Unseated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} students of {} could not be seated", self.rolls.len(), self.subject)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationResult {
    /// Grouped by subject in input order, rooms in the order they were filled.
    pub allocations: Vec<Allocation>,
    pub unseated: Vec<Unseated>,
}

/// Greedily packs each subject into rooms, block by block.
///
/// Larger subjects go first; equal sizes keep their input order. Each subject
/// walks blocks and rooms in catalog order and takes as many seats as the room
/// still has, continuing its roster where the previous room stopped. Whatever
/// is left once every room has been visited is returned as [`Unseated`].
pub fn allocate(
    subjects: &[Subject],
    catalog: &RoomCatalog,
    capacity: &mut SessionCapacity,
) -> AllocationResult {
    let mut order: Vec<usize> = (0..subjects.len()).collect();
    order.sort_by_key(|&i| Reverse(subjects[i].count()));

    let mut per_subject: Vec<Vec<Allocation>> = vec![Vec::new(); subjects.len()];
    let mut unseated = Vec::new();

    for i in order {
        let subject = &subjects[i];
        let needed = subject.count();
        let mut assigned = 0;

        'blocks: for block in catalog.blocks() {
            for room in catalog.rooms_in_block(block) {
                if assigned >= needed {
                    break 'blocks;
                }
                let taken = capacity.take(room, needed - assigned);
                if taken == 0 {
                    continue;
                }
                let room_id = &catalog.room(room).id;
                trace!(
                    "Seated {} of {} in room {} of block {} ({} left).",
                    taken,
                    subject.id,
                    room_id,
                    block.id,
                    capacity.remaining(room)
                );
                per_subject[i].push(Allocation {
                    subject: subject.id.clone(),
                    room: room_id.clone(),
                    rolls: subject.rolls[assigned..assigned + taken].to_vec(),
                });
                assigned += taken;
            }
        }

        if assigned < needed {
            let missing = Unseated {
                subject: subject.id.clone(),
                rolls: subject.rolls[assigned..].to_vec(),
            };
            warn!("{}.", missing);
            unseated.push(missing);
        }
    }

    AllocationResult {
        allocations: per_subject.into_iter().flatten().collect(),
        unseated,
    }
}
