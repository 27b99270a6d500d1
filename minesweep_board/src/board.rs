// Board state and rules for a single minesweeper game.
//
// `Board` tracks two grids (mine layout, per-cell reveal state) plus the
// countdown clock and the won/lost outcome flags. All mutation happens
// through the methods here; there is no interior locking — the caller that
// shares a board between threads (the session engine and its timer) guards
// it with its own mutex.
//
// Coordinate convention: `(y, x)` = (row, column), matching the wire
// protocol's `UPDATE button,row,col` argument order.

use rand::Rng;
use thiserror::Error;

/// Default board height.
pub const DEFAULT_ROWS: usize = 16;
/// Default board width.
pub const DEFAULT_COLS: usize = 16;
/// Default number of mines on a fresh board.
pub const DEFAULT_MINES: usize = 40;
/// Default countdown starting value, in timer ticks.
pub const DEFAULT_STARTING_TIME: u32 = 1000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("coordinates out of range")]
    InvalidCoords,
    #[error("board dimensions must be non-zero")]
    EmptyBoard,
    #[error("mine count must be less than the cell count")]
    TooManyMines,
    #[error("mine layout rows have unequal lengths")]
    RaggedLayout,
}

/// Per-cell reveal state.
///
/// `set_flag` cycles `Hidden → Flagged → Questioned → Hidden`; `reveal` and
/// the cascade move any of those three one-way to `Revealed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellState {
    Revealed,
    #[default]
    Hidden,
    Flagged,
    Questioned,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    mines: Vec<Vec<bool>>,
    revealed: Vec<Vec<CellState>>,
    time_remaining: u32,
    won: bool,
    lost: bool,
}

impl Board {
    /// Create a board with `mine_count` mines placed uniformly at random
    /// without replacement. All cells start `Hidden`.
    pub fn new(
        rows: usize,
        cols: usize,
        mine_count: usize,
        starting_time: u32,
    ) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyBoard);
        }
        if mine_count >= rows * cols {
            return Err(BoardError::TooManyMines);
        }

        let mut mines = vec![vec![false; cols]; rows];
        let mut rng = rand::rng();
        let mut remaining = mine_count;
        // Rejection sampling: re-roll occupied cells. Terminates because at
        // least one cell is always free (mine_count < rows * cols).
        while remaining > 0 {
            let y = rng.random_range(0..rows);
            let x = rng.random_range(0..cols);
            if !mines[y][x] {
                mines[y][x] = true;
                remaining -= 1;
            }
        }

        Ok(Self {
            mines,
            revealed: vec![vec![CellState::Hidden; cols]; rows],
            time_remaining: starting_time,
            won: false,
            lost: false,
        })
    }

    /// A fresh board with the default dimensions, mine count, and clock.
    pub fn default_game() -> Self {
        match Self::new(DEFAULT_ROWS, DEFAULT_COLS, DEFAULT_MINES, DEFAULT_STARTING_TIME) {
            Ok(board) => board,
            // 40 < 256; the defaults are valid by construction.
            Err(_) => unreachable!("default board parameters are valid"),
        }
    }

    /// Create a board from an explicit mine layout, all cells hidden.
    /// The layout must be rectangular and non-empty. Zero mines is legal.
    pub fn with_mines(mines: Vec<Vec<bool>>, starting_time: u32) -> Result<Self, BoardError> {
        let rows = mines.len();
        let cols = mines.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(BoardError::EmptyBoard);
        }
        if mines.iter().any(|row| row.len() != cols) {
            return Err(BoardError::RaggedLayout);
        }

        Ok(Self {
            mines,
            revealed: vec![vec![CellState::Hidden; cols]; rows],
            time_remaining: starting_time,
            won: false,
            lost: false,
        })
    }

    /// Rebuild a board in an arbitrary state. Only the codec constructs
    /// boards this way; it has already validated grid shape.
    pub(crate) fn from_codec_parts(
        mines: Vec<Vec<bool>>,
        revealed: Vec<Vec<CellState>>,
        time_remaining: u32,
        won: bool,
        lost: bool,
    ) -> Self {
        Self {
            mines,
            revealed,
            time_remaining,
            won,
            lost,
        }
    }

    pub fn rows(&self) -> usize {
        self.mines.len()
    }

    pub fn cols(&self) -> usize {
        self.mines[0].len()
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn lost(&self) -> bool {
        self.lost
    }

    /// Whether the game has reached a terminal outcome.
    pub fn finished(&self) -> bool {
        self.won || self.lost
    }

    pub fn is_mine(&self, y: usize, x: usize) -> bool {
        self.mines[y][x]
    }

    pub fn cell_state(&self, y: usize, x: usize) -> CellState {
        self.revealed[y][x]
    }

    pub(crate) fn mine_grid(&self) -> &[Vec<bool>] {
        &self.mines
    }

    pub(crate) fn state_grid(&self) -> &[Vec<CellState>] {
        &self.revealed
    }

    /// Reveal a cell. No-op unless the cell is `Hidden`. Revealing a mine
    /// loses the game and discloses every mine; revealing a cell with no
    /// adjacent mines cascades into its neighborhood.
    pub fn reveal(&mut self, y: usize, x: usize) -> Result<(), BoardError> {
        self.validate(y, x)?;
        if self.revealed[y][x] != CellState::Hidden {
            return Ok(());
        }
        self.revealed[y][x] = CellState::Revealed;
        if self.mines[y][x] {
            self.mark_lost();
        } else if self.adjacent_mine_count(y, x) == 0 {
            self.cascade(y, x);
        }
        Ok(())
    }

    /// Advance the flag cycle on a non-revealed cell:
    /// `Hidden → Flagged → Questioned → Hidden`. No-op on `Revealed`.
    pub fn set_flag(&mut self, y: usize, x: usize) -> Result<(), BoardError> {
        self.validate(y, x)?;
        self.revealed[y][x] = match self.revealed[y][x] {
            CellState::Revealed => CellState::Revealed,
            CellState::Hidden => CellState::Flagged,
            CellState::Flagged => CellState::Questioned,
            CellState::Questioned => CellState::Hidden,
        };
        Ok(())
    }

    /// Number of mines among the up-to-8 neighbors of `(y, x)`.
    pub fn adjacent_mine_count(&self, y: usize, x: usize) -> u8 {
        let mut count = 0;
        for (ny, nx) in neighbors(self.rows(), self.cols(), y, x) {
            if self.mines[ny][nx] {
                count += 1;
            }
        }
        count
    }

    /// True iff every cell that is not a mine has been revealed.
    pub fn check_win_condition(&self) -> bool {
        for y in 0..self.rows() {
            for x in 0..self.cols() {
                if !self.revealed[y][x].is_revealed() && !self.mines[y][x] {
                    return false;
                }
            }
        }
        true
    }

    /// Saturating countdown step. The caller checks whether the clock
    /// reached zero to trigger the timeout loss.
    pub fn decrement_time(&mut self) {
        if self.time_remaining > 0 {
            self.time_remaining -= 1;
        }
    }

    /// One-way win marker. No-op on a board that has already been lost
    /// (the two outcomes are mutually exclusive).
    pub fn mark_won(&mut self) {
        if !self.lost {
            self.won = true;
        }
    }

    /// One-way loss marker. Also discloses every mine on the board.
    /// No-op on a board that has already been won.
    pub fn mark_lost(&mut self) {
        if self.won {
            return;
        }
        self.lost = true;
        for y in 0..self.rows() {
            for x in 0..self.cols() {
                if self.mines[y][x] {
                    self.revealed[y][x] = CellState::Revealed;
                }
            }
        }
    }

    /// Flood-fill reveal out of a zero-adjacency cell. Reveals every
    /// in-bounds neighbor that is not yet `Revealed` — flags and question
    /// marks do not block the fill — and continues through neighbors whose
    /// own adjacency count is zero. Each cell becomes `Revealed` at most
    /// once, so the fill terminates.
    fn cascade(&mut self, y: usize, x: usize) {
        let mut frontier = vec![(y, x)];
        while let Some((cy, cx)) = frontier.pop() {
            for (ny, nx) in neighbors(self.rows(), self.cols(), cy, cx) {
                if self.revealed[ny][nx].is_revealed() {
                    continue;
                }
                self.revealed[ny][nx] = CellState::Revealed;
                if self.adjacent_mine_count(ny, nx) == 0 {
                    frontier.push((ny, nx));
                }
            }
        }
    }

    fn validate(&self, y: usize, x: usize) -> Result<(), BoardError> {
        if y < self.rows() && x < self.cols() {
            Ok(())
        } else {
            Err(BoardError::InvalidCoords)
        }
    }
}

/// In-bounds cells of the 8-neighborhood of `(y, x)`.
fn neighbors(rows: usize, cols: usize, y: usize, x: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(8);
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dy == 0 && dx == 0 {
                continue;
            }
            let ny = y as i64 + dy;
            let nx = x as i64 + dx;
            if ny >= 0 && nx >= 0 && (ny as usize) < rows && (nx as usize) < cols {
                out.push((ny as usize, nx as usize));
            }
        }
    }
    out
}
