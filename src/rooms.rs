use crate::data::{CapacityPolicy, DEFAULT_BLOCK, Density, RoomId, RoomRecord};
use log::{trace, warn};
use serde_json::Value;
use std::collections::HashMap;

/// A physical exam room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub block: String,
    /// Raw exam capacity, before any buffer.
    pub capacity: u32,
    /// The capacity column could not be read and was replaced by 0.
    pub capacity_malformed: bool,
}

impl Room {
    /// Capacity left after holding back `buffer` seats.
    pub fn effective_capacity(&self, buffer: u32) -> u32 {
        self.capacity.saturating_sub(buffer)
    }

    /// Seats one subject may use in this room.
    pub fn per_subject_capacity(&self, policy: &CapacityPolicy) -> u32 {
        let base = self.effective_capacity(policy.buffer);
        match policy.density {
            Density::Dense => base,
            Density::Sparse => base / 2,
        }
    }
}

/// Rooms of one block, as indices into the catalog.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    rooms: Vec<usize>,
}

/// All rooms grouped by block, in the order they were first seen.
///
/// A room listed under several blocks is walked under each of them; seats it
/// gave away the first time are not offered again.
#[derive(Debug, Clone, Default)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
    blocks: Vec<Block>,
}

impl RoomCatalog {
    pub fn from_records(records: &[RoomRecord]) -> Self {
        let mut catalog = RoomCatalog::default();
        let mut room_index: HashMap<String, usize> = HashMap::new();
        let mut block_index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let id = record.room_no.trim();
            if id.is_empty() {
                warn!("Room record with a blank room number is kept as room \"\".");
            }

            let block = match record.block.trim() {
                "" => DEFAULT_BLOCK,
                b => b,
            };
            let (capacity, capacity_malformed) = match parse_capacity(&record.exam_capacity) {
                Some(c) => (c, false),
                None => {
                    warn!(
                        "Room {} has unreadable capacity {}; treating it as 0 seats.",
                        id, record.exam_capacity
                    );
                    (0, true)
                }
            };

            // A repeated room keeps its position but takes the later record's values.
            let room_pos = match room_index.get(id).copied() {
                Some(pos) => {
                    warn!("Room {} appears more than once; the later record replaces it.", id);
                    let room = &mut catalog.rooms[pos];
                    room.block = block.to_string();
                    room.capacity = capacity;
                    room.capacity_malformed = capacity_malformed;
                    pos
                }
                None => {
                    let pos = catalog.rooms.len();
                    catalog.rooms.push(Room {
                        id: id.to_string(),
                        block: block.to_string(),
                        capacity,
                        capacity_malformed,
                    });
                    room_index.insert(id.to_string(), pos);
                    pos
                }
            };

            let block_pos = *block_index.entry(block.to_string()).or_insert_with(|| {
                catalog.blocks.push(Block {
                    id: block.to_string(),
                    rooms: Vec::new(),
                });
                catalog.blocks.len() - 1
            });
            let members = &mut catalog.blocks[block_pos].rooms;
            if !members.contains(&room_pos) {
                members.push(room_pos);
            }
        }
        trace!(
            "Room catalog holds {} rooms in {} blocks.",
            catalog.rooms.len(),
            catalog.blocks.len()
        );
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Rooms in catalog order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, index: usize) -> &Room {
        &self.rooms[index]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Room indices of `block` in the order they were first seen.
    pub fn rooms_in_block<'a>(&'a self, block: &'a Block) -> impl Iterator<Item = usize> + 'a {
        block.rooms.iter().copied()
    }

    /// Fresh seat ledger for one session. Nothing is carried over from earlier sessions.
    pub fn open_session(&self, policy: &CapacityPolicy) -> SessionCapacity {
        SessionCapacity {
            remaining: self
                .rooms
                .iter()
                .map(|room| room.per_subject_capacity(policy))
                .collect(),
        }
    }
}

/// Remaining seats per room during one session, indexed like the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCapacity {
    remaining: Vec<u32>,
}

impl SessionCapacity {
    pub fn remaining(&self, room: usize) -> u32 {
        self.remaining[room]
    }

    /// Takes up to `wanted` seats from `room` and returns how many were taken.
    pub fn take(&mut self, room: usize, wanted: usize) -> usize {
        let left = &mut self.remaining[room];
        let taken = (*left as usize).min(wanted);
        *left -= taken as u32;
        taken
    }

    pub fn total_remaining(&self) -> u64 {
        self.remaining.iter().map(|&r| u64::from(r)).sum()
    }
}

// Numbers and numeric strings are truncated toward zero; anything negative,
// non-finite or too large is unreadable.
fn parse_capacity(raw: &Value) -> Option<u32> {
    let value = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !value.is_finite() {
        return None;
    }
    let whole = value.trunc();
    if whole < 0.0 || whole > f64::from(u32::MAX) {
        return None;
    }
    Some(whole as u32)
}
