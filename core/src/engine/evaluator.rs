//! Heuristic evaluation of board positions.

use serde::{Deserialize, Serialize};

use crate::{Board, GameState, Piece, Position, PIECES_PER_TURN};

/// Tunable weights for the evaluator's scoring components.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Reward per empty cell.
    pub empty_space: f32,
    /// Reward multiplier for the exponential combo bonus.
    pub combo: f32,
    /// Reward per average legal placement of the remaining pieces.
    pub survival: f32,
    /// Weight for column height variance; negative to penalise uneven
    /// surfaces.
    pub height: f32,
    /// Weight per covered hole; negative to penalise burying cells.
    pub holes: f32,
}

impl Default for ScoringWeights {
    fn default() -> ScoringWeights {
        ScoringWeights {
            empty_space: 1.0,
            combo: 10.0,
            survival: 5.0,
            height: -0.5,
            holes: -2.0,
        }
    }
}

/// Scores positions by combining board-quality heuristics: open space,
/// combo momentum, how playable the remaining pieces are, and structural
/// penalties for uneven columns and buried holes. Higher is better.
///
/// For a fixed weight set the evaluation is fully deterministic; components
/// are summed in a fixed order so floating-point results never depend on
/// scheduling.
#[derive(Debug, Default, Copy, Clone)]
pub struct Evaluator {
    weights: ScoringWeights,
}

impl Evaluator {
    /// Creates an evaluator with the given weights.
    pub fn new(weights: ScoringWeights) -> Evaluator {
        Evaluator { weights }
    }

    /// The current weights.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Replaces the weights.
    pub fn set_weights(&mut self, weights: ScoringWeights) {
        self.weights = weights;
    }

    /// Evaluates a state over its board and remaining pieces.
    pub fn evaluate(&self, state: &GameState) -> f32 {
        let board = state.board();

        let mut score = 0.0;
        score += self.weights.empty_space * Self::empty_space_score(board);
        score += self.weights.combo * Self::combo_score(state.combo_count());
        score += self.weights.survival * self.survival_score(state);
        score += self.weights.height * board.height_variance();
        score += self.weights.holes * board.count_holes() as f32;
        score
    }

    /// The count of empty cells; more room is better.
    pub fn empty_space_score(board: &Board) -> f32 {
        board.empty_count() as f32
    }

    /// Exponential bonus for an active combo chain: 2^counter, or 0 when
    /// the counter is 0.
    pub fn combo_score(combo_count: u32) -> f32 {
        if combo_count == 0 {
            0.0
        } else {
            2f32.powi(combo_count as i32)
        }
    }

    /// The mean legal-placement count over the unused pieces, or 0 when no
    /// piece remains. Low values flag boards that are about to trap the
    /// player.
    pub fn survival_score(&self, state: &GameState) -> f32 {
        let mut total_placements = 0;
        let mut pieces = 0;
        for index in 0..PIECES_PER_TURN {
            if state.is_piece_used(index) {
                continue;
            }
            let Some(piece) = state.piece(index) else {
                continue;
            };
            pieces += 1;
            total_placements += Self::count_valid_placements(state.board(), piece);
        }

        if pieces == 0 {
            0.0
        } else {
            total_placements as f32 / pieces as f32
        }
    }

    /// Counts every (rotation, anchor) pair at which the piece can be
    /// placed on the board.
    pub fn count_valid_placements(board: &Board, piece: &Piece) -> usize {
        let mut count = 0;
        for variant in piece.rotations() {
            for y in 0..Board::SIZE as i32 {
                for x in 0..Board::SIZE as i32 {
                    if board.can_place(variant, Position::new(x, y)) {
                        count += 1;
                    }
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn bar8() -> Piece {
        Piece::new((0..8).map(|x| Position::new(x, 0)).collect()).unwrap()
    }

    #[test]
    fn combo_bonus_is_exponential() {
        assert_eq!(Evaluator::combo_score(0), 0.0);
        assert_eq!(Evaluator::combo_score(1), 2.0);
        assert_eq!(Evaluator::combo_score(3), 8.0);
    }

    #[test]
    fn placement_counts_on_an_empty_board() {
        let board = Board::new();
        assert_eq!(
            Evaluator::count_valid_placements(&board, &Shape::Single.piece()),
            64
        );
        // The full-width bar fits at 8 anchors in each of its 2 rotations.
        assert_eq!(Evaluator::count_valid_placements(&board, &bar8()), 16);
        assert_eq!(
            Evaluator::count_valid_placements(&board, &Shape::Square2.piece()),
            49
        );
    }

    #[test]
    fn survival_averages_unused_pieces() {
        let state = GameState::with_pieces([Shape::Single.piece(), bar8(), Shape::Square2.piece()]);
        let evaluator = Evaluator::default();

        let expected = (64.0 + 16.0 + 49.0) / 3.0;
        assert!((evaluator.survival_score(&state) - expected).abs() < 1e-4);
    }

    #[test]
    fn survival_is_zero_without_pieces() {
        let state = GameState::new();
        assert_eq!(Evaluator::default().survival_score(&state), 0.0);
    }

    #[test]
    fn zero_weights_zero_score() {
        let weights = ScoringWeights {
            empty_space: 0.0,
            combo: 0.0,
            survival: 0.0,
            height: 0.0,
            holes: 0.0,
        };
        let state = GameState::with_pieces([
            Shape::Single.piece(),
            Shape::Bar3.piece(),
            Shape::Square2.piece(),
        ]);
        assert_eq!(Evaluator::new(weights).evaluate(&state), 0.0);
    }

    #[test]
    fn empty_board_without_bag_scores_its_space() {
        let state = GameState::new();
        assert_eq!(Evaluator::default().evaluate(&state), 64.0);
    }

    #[test]
    fn structural_penalties_lower_the_score() {
        let evaluator = Evaluator::default();

        let open = GameState::new();

        // One buried column: 63 empty, 7 holes, variance 7.
        let mut board = Board::new();
        board.set_cell(Position::new(0, 0), true);
        let mut cramped = GameState::new();
        cramped.set_board(board);

        let expected = 63.0 - 0.5 * 7.0 - 2.0 * 7.0;
        assert!((evaluator.evaluate(&cramped) - expected).abs() < 1e-4);
        assert!(evaluator.evaluate(&cramped) < evaluator.evaluate(&open));
    }
}
