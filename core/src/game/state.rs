//! The per-turn game state: board, piece bag, score, and combo tracking.

use std::fmt::{self, Display, Formatter};

use crate::{Board, ClearResult, GameError, Move, Piece, Position};

/// The number of pieces dealt each turn.
pub const PIECES_PER_TURN: usize = 3;

/// Encapsulates the complete turn state: the board, the three-piece bag with
/// its used flags, the cumulative game score, and the combo counter.
///
/// The game score follows the puzzle's own rules (piece size plus line and
/// combo bonuses) and is tracked independently of the evaluator's heuristic
/// score. States are plain values: cloning one yields a fully independent
/// copy, which the search relies on for backtracking-free expansion.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    bag: [Option<Piece>; PIECES_PER_TURN],
    used: [bool; PIECES_PER_TURN],
    score: u32,
    combo_count: u32,
}

impl GameState {
    /// Creates a state with an empty board and no pieces dealt.
    pub fn new() -> GameState {
        GameState::default()
    }

    /// Creates a state with an empty board and the given bag.
    pub fn with_pieces(pieces: [Piece; PIECES_PER_TURN]) -> GameState {
        let mut state = GameState::new();
        state.set_pieces(pieces);
        state
    }

    /// The current board.
    #[inline(always)]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replaces the board wholesale.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// The piece in a bag slot, if one is dealt there.
    pub fn piece(&self, index: usize) -> Option<&Piece> {
        self.bag.get(index).and_then(|slot| slot.as_ref())
    }

    /// Indicates whether a bag slot has been played. Out-of-range slots read
    /// as used.
    pub fn is_piece_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(true)
    }

    /// Counts bag slots still holding a playable piece.
    pub fn remaining_pieces(&self) -> usize {
        (0..PIECES_PER_TURN)
            .filter(|&index| self.bag[index].is_some() && !self.used[index])
            .count()
    }

    /// The cumulative game score.
    #[inline(always)]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The number of consecutive line-clearing placements.
    #[inline(always)]
    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    /// Installs a new three-piece bag, clearing all used flags.
    pub fn set_pieces(&mut self, pieces: [Piece; PIECES_PER_TURN]) {
        self.bag = pieces.map(Some);
        self.used = [false; PIECES_PER_TURN];
    }

    /// Applies a move: places the selected rotation at the anchor, marks the
    /// slot used, clears any completed lines, and updates the game score
    /// (piece size, plus 10 per line and an incrementing 5-per-combo bonus
    /// when lines clear; a non-clearing placement resets the combo).
    ///
    /// # Errors
    ///
    /// - `PieceIndexOutOfRange` when the move's slot is not 0..3.
    /// - `PieceAlreadyUsed` when the slot was already played or is vacant.
    /// - `IllegalPlacement` when the rotation index or the placement itself
    ///   is invalid. The state is unchanged on any error.
    pub fn apply(&mut self, mv: &Move) -> Result<ClearResult, GameError> {
        if mv.piece_index >= PIECES_PER_TURN {
            return Err(GameError::PieceIndexOutOfRange {
                index: mv.piece_index,
            });
        }
        let piece = match &self.bag[mv.piece_index] {
            Some(piece) if !self.used[mv.piece_index] => piece,
            _ => {
                return Err(GameError::PieceAlreadyUsed {
                    index: mv.piece_index,
                })
            }
        };
        let variant = piece
            .rotations()
            .get(mv.rotation)
            .ok_or(GameError::IllegalPlacement { anchor: mv.anchor })?;

        self.board.place(variant, mv.anchor)?;
        self.used[mv.piece_index] = true;

        let placed_cells = variant.size() as u32;
        let result = self.board.clear_complete_lines();

        self.score += placed_cells;
        if result.lines_cleared() > 0 {
            self.score += 10 * result.lines_cleared() as u32;
            self.combo_count += 1;
            self.score += 5 * self.combo_count;
        } else {
            self.combo_count = 0;
        }

        Ok(result)
    }

    /// Reverts the cells and the used flag of the most recent `apply`.
    ///
    /// Only valid when that apply cleared no lines: cleared cells cannot be
    /// restored, and score and combo changes are never reverted. Search
    /// paths clone the state per child instead of relying on this; it
    /// remains for enumeration that can prove each step was non-clearing.
    pub fn undo(&mut self, mv: &Move) {
        let Some(piece) = self.bag.get(mv.piece_index).and_then(|slot| slot.as_ref()) else {
            return;
        };
        let Some(variant) = piece.rotations().get(mv.rotation) else {
            return;
        };
        self.board.remove(variant, mv.anchor);
        self.used[mv.piece_index] = false;
    }

    /// Indicates whether at least one unused piece has at least one legal
    /// (rotation, anchor) placement on the current board.
    pub fn has_valid_moves(&self) -> bool {
        for index in 0..PIECES_PER_TURN {
            if self.used[index] {
                continue;
            }
            let Some(piece) = &self.bag[index] else {
                continue;
            };
            for variant in piece.rotations() {
                for y in 0..Board::SIZE as i32 {
                    for x in 0..Board::SIZE as i32 {
                        if self.board.can_place(variant, Position::new(x, y)) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Indicates whether no remaining piece can be played anywhere.
    pub fn is_game_over(&self) -> bool {
        !self.has_valid_moves()
    }

    /// Clears the board, used flags, score, and combo counter. The bag is
    /// kept; `set_pieces` installs the next one.
    pub fn reset(&mut self) {
        self.board.clear();
        self.used = [false; PIECES_PER_TURN];
        self.score = 0;
        self.combo_count = 0;
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Score: {} | Combo: {} | Remaining pieces: {}",
            self.score,
            self.combo_count,
            self.remaining_pieces()
        )?;
        write!(f, "{}", self.board)
    }
}
