// Text codec for board state.
//
// A board serializes to one line-safe record:
//
//   <time>,<won>,<lost>,<mine-rows>,<revealed-rows>
//
// where `won`/`lost` are `t`/`f`, mine rows are `1`/`0` characters, and
// revealed rows use `_` (revealed), `O` (hidden), `F` (flagged), `X`
// (questioned). Grid rows are space-joined with a trailing space after the
// last row; the decoder tolerates its absence.
//
// The decoder is the strict inverse: any field-count, shape, or character
// inconsistency is a `DecodeError`. An unrecognized revealed-state
// character is rejected rather than silently defaulted to hidden, so a
// corrupt saved record is surfaced to the caller instead of loading as a
// subtly different game.

use thiserror::Error;

use crate::board::{Board, CellState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected 5 comma-separated fields, found {0}")]
    FieldCount(usize),
    #[error("unparsable time field {0:?}")]
    BadTime(String),
    #[error("outcome flag must be 't' or 'f', found {0:?}")]
    BadOutcomeFlag(String),
    #[error("a board cannot be both won and lost")]
    ConflictingOutcomes,
    #[error("board record has no rows")]
    EmptyGrid,
    #[error("mine and revealed grids have inconsistent shape")]
    ShapeMismatch,
    #[error("unrecognized mine character {0:?}")]
    BadMineChar(char),
    #[error("unrecognized cell state character {0:?}")]
    BadStateChar(char),
}

/// Serialize a board to its single-line text record.
pub fn encode(board: &Board) -> String {
    let mut out = String::new();
    out.push_str(&board.time_remaining().to_string());
    out.push(',');
    out.push(if board.won() { 't' } else { 'f' });
    out.push(',');
    out.push(if board.lost() { 't' } else { 'f' });
    out.push(',');
    for row in board.mine_grid() {
        for &mine in row {
            out.push(if mine { '1' } else { '0' });
        }
        out.push(' ');
    }
    out.push(',');
    for row in board.state_grid() {
        for &state in row {
            out.push(state_char(state));
        }
        out.push(' ');
    }
    out
}

/// Parse a text record back into a board. Strict inverse of [`encode`].
pub fn decode(text: &str) -> Result<Board, DecodeError> {
    let fields: Vec<&str> = text.split(',').collect();
    if fields.len() != 5 {
        return Err(DecodeError::FieldCount(fields.len()));
    }

    let time_remaining: u32 = fields[0]
        .parse()
        .map_err(|_| DecodeError::BadTime(fields[0].to_string()))?;
    let won = parse_outcome_flag(fields[1])?;
    let lost = parse_outcome_flag(fields[2])?;
    if won && lost {
        return Err(DecodeError::ConflictingOutcomes);
    }

    let mine_rows: Vec<&str> = fields[3].split(' ').filter(|s| !s.is_empty()).collect();
    let state_rows: Vec<&str> = fields[4].split(' ').filter(|s| !s.is_empty()).collect();
    if mine_rows.is_empty() {
        return Err(DecodeError::EmptyGrid);
    }
    let cols = mine_rows[0].len();
    if cols == 0 || state_rows.len() != mine_rows.len() {
        return Err(DecodeError::ShapeMismatch);
    }

    let mut mines = Vec::with_capacity(mine_rows.len());
    let mut revealed = Vec::with_capacity(state_rows.len());
    for (mine_row, state_row) in mine_rows.iter().zip(&state_rows) {
        if mine_row.len() != cols || state_row.len() != cols {
            return Err(DecodeError::ShapeMismatch);
        }
        let mut mine_cells = Vec::with_capacity(cols);
        for c in mine_row.chars() {
            mine_cells.push(match c {
                '1' => true,
                '0' => false,
                other => return Err(DecodeError::BadMineChar(other)),
            });
        }
        let mut state_cells = Vec::with_capacity(cols);
        for c in state_row.chars() {
            state_cells.push(parse_state_char(c)?);
        }
        mines.push(mine_cells);
        revealed.push(state_cells);
    }

    Ok(Board::from_codec_parts(
        mines,
        revealed,
        time_remaining,
        won,
        lost,
    ))
}

fn parse_outcome_flag(field: &str) -> Result<bool, DecodeError> {
    match field {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(DecodeError::BadOutcomeFlag(other.to_string())),
    }
}

const fn state_char(state: CellState) -> char {
    match state {
        CellState::Revealed => '_',
        CellState::Hidden => 'O',
        CellState::Flagged => 'F',
        CellState::Questioned => 'X',
    }
}

fn parse_state_char(c: char) -> Result<CellState, DecodeError> {
    match c {
        '_' => Ok(CellState::Revealed),
        'O' => Ok(CellState::Hidden),
        'F' => Ok(CellState::Flagged),
        'X' => Ok(CellState::Questioned),
        other => Err(DecodeError::BadStateChar(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The 2x2 reference record: time=5, in progress, mines on the main
    /// diagonal, top row revealed.
    fn reference_board() -> Board {
        Board::from_codec_parts(
            vec![vec![true, false], vec![false, true]],
            vec![
                vec![CellState::Revealed, CellState::Revealed],
                vec![CellState::Hidden, CellState::Hidden],
            ],
            5,
            false,
            false,
        )
    }

    #[test]
    fn encode_reference_record_exactly() {
        assert_eq!(encode(&reference_board()), "5,f,f,10 01 ,__ OO ");
    }

    #[test]
    fn decode_reference_record() {
        let board = decode("5,f,f,10 01 ,__ OO ").unwrap();
        assert_eq!(board, reference_board());
    }

    #[test]
    fn decode_tolerates_missing_trailing_separator() {
        let board = decode("5,f,f,10 01,__ OO").unwrap();
        assert_eq!(board, reference_board());
    }

    #[test]
    fn round_trip_preserves_full_state() {
        let mut board = Board::with_mines(
            vec![
                vec![false, true, false],
                vec![false, false, false],
                vec![true, false, false],
            ],
            321,
        )
        .unwrap();
        board.set_flag(0, 1).unwrap();
        board.set_flag(2, 2).unwrap();
        board.set_flag(2, 2).unwrap(); // Questioned
        board.reveal(0, 0).unwrap();

        let decoded = decode(&encode(&board)).unwrap();
        assert_eq!(decoded, board);
    }

    #[test]
    fn round_trip_preserves_outcomes() {
        let mut won_board = Board::with_mines(vec![vec![true, false]], 7).unwrap();
        won_board.reveal(0, 1).unwrap();
        won_board.mark_won();
        let decoded = decode(&encode(&won_board)).unwrap();
        assert!(decoded.won());
        assert!(!decoded.lost());

        let mut lost_board = Board::with_mines(vec![vec![true, false]], 7).unwrap();
        lost_board.reveal(0, 0).unwrap();
        let decoded = decode(&encode(&lost_board)).unwrap();
        assert!(decoded.lost());
        assert_eq!(decoded, lost_board);
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        assert_eq!(decode("5,f,f,10 01 "), Err(DecodeError::FieldCount(4)));
        assert_eq!(
            decode("5,f,f,10 01 ,__ OO ,extra"),
            Err(DecodeError::FieldCount(6))
        );
    }

    #[test]
    fn decode_rejects_bad_scalar_fields() {
        assert_eq!(
            decode("abc,f,f,10 01 ,__ OO "),
            Err(DecodeError::BadTime("abc".into()))
        );
        assert_eq!(
            decode("5,y,f,10 01 ,__ OO "),
            Err(DecodeError::BadOutcomeFlag("y".into()))
        );
        assert_eq!(
            decode("5,t,t,10 01 ,__ OO "),
            Err(DecodeError::ConflictingOutcomes)
        );
    }

    #[test]
    fn decode_rejects_shape_mismatches() {
        // Revealed grid has fewer rows than the mine grid.
        assert_eq!(
            decode("5,f,f,10 01 ,__ "),
            Err(DecodeError::ShapeMismatch)
        );
        // Ragged row length.
        assert_eq!(
            decode("5,f,f,10 0 ,__ OO "),
            Err(DecodeError::ShapeMismatch)
        );
        assert_eq!(decode("5,f,f, ,"), Err(DecodeError::EmptyGrid));
    }

    #[test]
    fn decode_rejects_unknown_characters() {
        assert_eq!(
            decode("5,f,f,12 01 ,__ OO "),
            Err(DecodeError::BadMineChar('2'))
        );
        assert_eq!(
            decode("5,f,f,10 01 ,__ O? "),
            Err(DecodeError::BadStateChar('?'))
        );
    }

    #[test]
    fn default_game_round_trips() {
        let board = Board::default_game();
        let decoded = decode(&encode(&board)).unwrap();
        assert_eq!(decoded, board);
    }
}
