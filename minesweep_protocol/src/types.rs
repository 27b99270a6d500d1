// Small shared protocol types.
//
// These are used by both `command.rs` (client requests carry slot indices
// and score submissions) and `response.rs` (listings carry captions and
// leaderboard entries), and by the server's persistence layer.

use std::fmt;

use thiserror::Error;

/// Number of save slots the persistence collaborator offers.
pub const SLOT_COUNT: usize = 5;

/// Number of rows on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("save slot must be between 1 and {SLOT_COUNT}, found {0}")]
pub struct InvalidSlot(pub u64);

/// A save-slot index, validated to 1..=5 at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u8);

impl Slot {
    pub fn new(n: u64) -> Result<Self, InvalidSlot> {
        if (1..=SLOT_COUNT as u64).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(InvalidSlot(n))
        }
    }

    /// The 1-based slot number as it appears on the wire.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The 0-based index into a slot array.
    pub fn index(self) -> usize {
        usize::from(self.0) - 1
    }

    /// All slots in order.
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=SLOT_COUNT as u64).map(|n| Slot(n as u8))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One leaderboard row. The score is the time remaining at the moment the
/// game was won, so higher is better.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
