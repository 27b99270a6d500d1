// Persistence for saved games and the leaderboard.
//
// Sessions see storage only through the narrow `GameStore` trait: five save
// slots (caption + encoded board record) and a leaderboard of exactly five
// rows kept sorted descending by score. Implementations serialize their own
// concurrent access — one store instance is shared by every session behind
// an `Arc<dyn GameStore>`, so each method takes `&self` and locks
// internally.
//
// `JsonFileStore` is the production implementation: the whole store is one
// JSON document rewritten on every mutation. Save files are small (five
// board records) and mutations are rare (explicit SAVETO / NAME commands),
// so read-modify-write of the full document is plenty. `MemoryStore` backs
// the tests with the same state shape minus the file.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use minesweep_protocol::types::{LEADERBOARD_SIZE, SLOT_COUNT, ScoreEntry, Slot};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("save slot {0} is empty")]
    EmptySlot(Slot),
}

/// The persistence collaborator as the session engine sees it.
pub trait GameStore: Send + Sync {
    /// Captions of all five save slots; an empty string marks an unused slot.
    fn list_slots(&self) -> Result<[String; SLOT_COUNT], StoreError>;

    /// The encoded board record saved in a slot.
    fn load_slot(&self, slot: Slot) -> Result<String, StoreError>;

    /// Write (or overwrite) a slot with a caption and an encoded board.
    fn save_slot(&self, slot: Slot, caption: &str, data: &str) -> Result<(), StoreError>;

    /// The leaderboard, best score first.
    fn top_scores(&self) -> Result<Vec<ScoreEntry>, StoreError>;

    /// Insert a score, re-sort descending, and keep the top five.
    fn submit_score(&self, name: &str, score: u32) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SlotRecord {
    caption: String,
    board: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ScoreRow {
    name: String,
    score: u32,
}

/// The full persisted document.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoreState {
    slots: Vec<SlotRecord>,
    scores: Vec<ScoreRow>,
}

impl Default for StoreState {
    fn default() -> Self {
        // A fresh store mirrors the pre-seeded database of the original
        // deployment: five unused slots, five placeholder score rows.
        Self {
            slots: vec![SlotRecord::default(); SLOT_COUNT],
            scores: vec![
                ScoreRow {
                    name: String::new(),
                    score: 0,
                };
                LEADERBOARD_SIZE
            ],
        }
    }
}

impl StoreState {
    fn list_slots(&self) -> [String; SLOT_COUNT] {
        std::array::from_fn(|i| self.slots[i].caption.clone())
    }

    fn load_slot(&self, slot: Slot) -> Result<String, StoreError> {
        let record = &self.slots[slot.index()];
        if record.caption.is_empty() {
            return Err(StoreError::EmptySlot(slot));
        }
        Ok(record.board.clone())
    }

    fn save_slot(&mut self, slot: Slot, caption: &str, data: &str) {
        self.slots[slot.index()] = SlotRecord {
            caption: caption.to_string(),
            board: data.to_string(),
        };
    }

    fn top_scores(&self) -> Vec<ScoreEntry> {
        self.scores
            .iter()
            .map(|row| ScoreEntry::new(row.name.clone(), row.score))
            .collect()
    }

    fn submit_score(&mut self, name: &str, score: u32) {
        self.scores.push(ScoreRow {
            name: name.to_string(),
            score,
        });
        self.scores.sort_by(|a, b| b.score.cmp(&a.score));
        self.scores.truncate(LEADERBOARD_SIZE);
    }
}

/// File-backed store: one JSON document, rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open a store file, creating and seeding it if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            let state = StoreState::default();
            write_state(&path, &state)?;
            state
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }
}

fn write_state(path: &Path, state: &StoreState) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}

impl GameStore for JsonFileStore {
    fn list_slots(&self) -> Result<[String; SLOT_COUNT], StoreError> {
        Ok(self.state.lock().list_slots())
    }

    fn load_slot(&self, slot: Slot) -> Result<String, StoreError> {
        self.state.lock().load_slot(slot)
    }

    fn save_slot(&self, slot: Slot, caption: &str, data: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.save_slot(slot, caption, data);
        write_state(&self.path, &state)
    }

    fn top_scores(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.state.lock().top_scores())
    }

    fn submit_score(&self, name: &str, score: u32) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.submit_score(name, score);
        write_state(&self.path, &state)
    }
}

/// Ephemeral store with the same shape as `JsonFileStore`, for tests and
/// throwaway servers.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn list_slots(&self) -> Result<[String; SLOT_COUNT], StoreError> {
        Ok(self.state.lock().list_slots())
    }

    fn load_slot(&self, slot: Slot) -> Result<String, StoreError> {
        self.state.lock().load_slot(slot)
    }

    fn save_slot(&self, slot: Slot, caption: &str, data: &str) -> Result<(), StoreError> {
        self.state.lock().save_slot(slot, caption, data);
        Ok(())
    }

    fn top_scores(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        Ok(self.state.lock().top_scores())
    }

    fn submit_score(&self, name: &str, score: u32) -> Result<(), StoreError> {
        self.state.lock().submit_score(name, score);
        Ok(())
    }
}
