//! A greedy single-move baseline for benchmarking the beam search.

use crate::{Evaluator, GameState, Move, MoveGenerator, MoveSequence, ScoringWeights,
    PIECES_PER_TURN};

/// Places each piece slot in order at its best immediate position.
///
/// This never looks across piece orderings or ahead of the current
/// placement; it exists as a cheap reference point for benchmarks.
#[derive(Debug, Default, Clone)]
pub struct GreedySolver {
    evaluator: Evaluator,
    move_generator: MoveGenerator,
}

impl GreedySolver {
    /// Creates a greedy solver with the given evaluator weights.
    pub fn new(weights: ScoringWeights) -> GreedySolver {
        GreedySolver {
            evaluator: Evaluator::new(weights),
            move_generator: MoveGenerator::new(),
        }
    }

    /// Plays out the state greedily, mutating it, and returns the moves
    /// taken with their accumulated evaluator scores.
    pub fn solve(&self, state: &mut GameState) -> MoveSequence {
        let mut sequence = MoveSequence::new();

        for index in 0..PIECES_PER_TURN {
            if state.is_piece_used(index) {
                continue;
            }
            let moves = match state.piece(index) {
                Some(piece) => self.move_generator.generate_moves(state.board(), piece, index),
                None => continue,
            };

            let mut best: Option<(Move, f32)> = None;
            for mv in moves {
                let mut candidate = state.clone();
                if candidate.apply(&mv).is_err() {
                    continue;
                }
                let score = self.evaluator.evaluate(&candidate);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((mv, score));
                }
            }

            if let Some((mut mv, score)) = best {
                mv.score = score;
                if state.apply(&mv).is_ok() {
                    sequence.push(mv);
                    sequence.total_score += score;
                }
            }
        }

        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Position, Shape};

    #[test]
    fn places_every_slot_in_order() {
        let mut state = GameState::with_pieces([
            Shape::Single.piece(),
            Shape::Bar2.piece(),
            Shape::Square2.piece(),
        ]);

        let sequence = GreedySolver::default().solve(&mut state);
        assert_eq!(sequence.pieces_placed(), 3);
        assert!(sequence.total_score > 0.0);
        assert_eq!(
            sequence.moves.iter().map(|mv| mv.piece_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(state.remaining_pieces(), 0);
        assert_eq!(state.board().occupied_count(), 7);
    }

    #[test]
    fn skips_unplayable_slots() {
        // The first square has no room, the single completes the board and
        // blasts it empty, and the last square then fits again.
        let mut state = GameState::with_pieces([
            Shape::Square2.piece(),
            Shape::Single.piece(),
            Shape::Square2.piece(),
        ]);
        state.set_board(Board::from_bitboard(!1));

        let sequence = GreedySolver::default().solve(&mut state);
        assert_eq!(sequence.pieces_placed(), 2);
        assert_eq!(sequence.moves[0].piece_index, 1);
        assert_eq!(sequence.moves[0].anchor, Position::new(0, 0));
        assert_eq!(sequence.moves[1].piece_index, 2);
        assert!(state.is_piece_used(1));
        assert!(!state.is_piece_used(0));
    }
}
