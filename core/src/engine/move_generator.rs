//! Enumeration of legal moves and ordered move sequences.

use crate::{Board, GameState, Move, MoveSequence, Piece, Position, PIECES_PER_TURN};

/// Enumerates legal placements for pieces on a board.
#[derive(Debug, Default, Copy, Clone)]
pub struct MoveGenerator;

impl MoveGenerator {
    /// Creates a new move generator.
    pub fn new() -> MoveGenerator {
        MoveGenerator
    }

    /// Generates every legal move for one piece: rotation indices ascending,
    /// anchors row-major within each rotation. The order is stable and
    /// observable; solver tie-breaks rely on it.
    pub fn generate_moves(&self, board: &Board, piece: &Piece, piece_index: usize) -> Vec<Move> {
        let mut moves = Vec::new();
        for (rotation, variant) in piece.rotations().iter().enumerate() {
            for y in 0..Board::SIZE as i32 {
                for x in 0..Board::SIZE as i32 {
                    let anchor = Position::new(x, y);
                    if board.can_place(variant, anchor) {
                        moves.push(Move::new(piece_index, anchor, rotation));
                    }
                }
            }
        }
        moves
    }

    /// Enumerates ordered move sequences depth-first over the unused piece
    /// slots, cloning the state per step so line clears cannot corrupt
    /// backtracking. A sequence is emitted once three pieces are placed or
    /// when no further move is legal; enumeration stops after `limit`
    /// sequences.
    pub fn generate_all_sequences(&self, state: &GameState, limit: usize) -> Vec<MoveSequence> {
        let mut sequences = Vec::new();
        self.sequences_from(state, &MoveSequence::new(), limit, &mut sequences);
        sequences
    }

    fn sequences_from(
        &self,
        state: &GameState,
        current: &MoveSequence,
        limit: usize,
        out: &mut Vec<MoveSequence>,
    ) {
        if out.len() >= limit {
            return;
        }
        if current.pieces_placed() == PIECES_PER_TURN || state.remaining_pieces() == 0 {
            if current.pieces_placed() > 0 {
                out.push(current.clone());
            }
            return;
        }

        let mut extended = false;
        for index in 0..PIECES_PER_TURN {
            if state.is_piece_used(index) {
                continue;
            }
            let Some(piece) = state.piece(index) else {
                continue;
            };
            for mv in self.generate_moves(state.board(), piece, index) {
                let mut child = state.clone();
                if child.apply(&mv).is_err() {
                    continue;
                }
                extended = true;

                let mut sequence = current.clone();
                sequence.push(mv);
                self.sequences_from(&child, &sequence, limit, out);
                if out.len() >= limit {
                    return;
                }
            }
        }

        if !extended && current.pieces_placed() > 0 {
            out.push(current.clone());
        }
    }

    /// Returns at most `max` moves sampled at a uniform index stride from
    /// the full move list, for callers that accept approximate coverage.
    pub fn generate_pruned_moves(
        &self,
        board: &Board,
        piece: &Piece,
        piece_index: usize,
        max: usize,
    ) -> Vec<Move> {
        if max == 0 {
            return Vec::new();
        }
        let moves = self.generate_moves(board, piece, piece_index);
        if moves.len() <= max {
            return moves;
        }

        let stride = moves.len() / max;
        moves.into_iter().step_by(stride).take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    #[test]
    fn moves_match_can_place_exactly() {
        let mut board = Board::new();
        for x in 0..6 {
            board.set_cell(Position::new(x, 3), true);
        }
        let piece = Shape::SmallL.piece();

        let moves = MoveGenerator::new().generate_moves(&board, &piece, 1);

        let mut expected = Vec::new();
        for (rotation, variant) in piece.rotations().iter().enumerate() {
            for y in 0..Board::SIZE as i32 {
                for x in 0..Board::SIZE as i32 {
                    let anchor = Position::new(x, y);
                    if board.can_place(variant, anchor) {
                        expected.push((rotation, anchor));
                    }
                }
            }
        }

        assert_eq!(moves.len(), expected.len());
        for (mv, (rotation, anchor)) in moves.iter().zip(expected) {
            assert_eq!(mv.piece_index, 1);
            assert_eq!(mv.rotation, rotation);
            assert_eq!(mv.anchor, anchor);
        }
    }

    #[test]
    fn move_counts_on_an_empty_board() {
        let generator = MoveGenerator::new();
        let board = Board::new();

        assert_eq!(
            generator
                .generate_moves(&board, &Shape::Single.piece(), 0)
                .len(),
            64
        );
        // Four rotations of the small L, each with a 2x2 bounding box.
        assert_eq!(
            generator
                .generate_moves(&board, &Shape::SmallL.piece(), 0)
                .len(),
            4 * 49
        );
    }

    #[test]
    fn moves_are_ordered_rotation_then_row_major() {
        let moves = MoveGenerator::new().generate_moves(&Board::new(), &Shape::Bar2.piece(), 0);

        assert_eq!(moves[0].rotation, 0);
        assert_eq!(moves[0].anchor, Position::new(0, 0));
        assert_eq!(moves[1].anchor, Position::new(1, 0));

        let horizontal = 7 * 8;
        assert_eq!(moves[horizontal].rotation, 1);
        assert_eq!(moves[horizontal].anchor, Position::new(0, 0));
    }

    #[test]
    fn sequences_use_distinct_slots_and_honour_the_limit() {
        let state = GameState::with_pieces([
            Shape::Single.piece(),
            Shape::Single.piece(),
            Shape::Single.piece(),
        ]);

        let sequences = MoveGenerator::new().generate_all_sequences(&state, 25);
        assert_eq!(sequences.len(), 25);
        for sequence in &sequences {
            assert_eq!(sequence.pieces_placed(), 3);
            let mut indices: Vec<usize> =
                sequence.moves.iter().map(|mv| mv.piece_index).collect();
            indices.sort_unstable();
            indices.dedup();
            assert_eq!(indices.len(), 3);
        }
    }

    #[test]
    fn partial_sequences_emit_when_play_is_blocked() {
        // Two free corner cells. Filling either completes its row and
        // column, leaving a one-wide cross plus the far corner; the squares
        // cannot fit anywhere in that, so every sequence stops at one move.
        let mut board = Board::from_bitboard(u64::MAX);
        board.set_cell(Position::new(0, 0), false);
        board.set_cell(Position::new(7, 7), false);

        let mut state = GameState::with_pieces([
            Shape::Single.piece(),
            Shape::Square2.piece(),
            Shape::Square2.piece(),
        ]);
        state.set_board(board);

        let sequences = MoveGenerator::new().generate_all_sequences(&state, 1000);
        assert_eq!(sequences.len(), 2);
        for sequence in &sequences {
            assert_eq!(sequence.pieces_placed(), 1);
            assert_eq!(sequence.moves[0].piece_index, 0);
        }
        assert_eq!(sequences[0].moves[0].anchor, Position::new(0, 0));
        assert_eq!(sequences[1].moves[0].anchor, Position::new(7, 7));
    }

    #[test]
    fn no_sequences_on_a_dead_board() {
        let mut state = GameState::with_pieces([
            Shape::Square2.piece(),
            Shape::Square2.piece(),
            Shape::Square2.piece(),
        ]);
        state.set_board(Board::from_bitboard(u64::MAX));

        assert!(MoveGenerator::new()
            .generate_all_sequences(&state, 100)
            .is_empty());
    }

    #[test]
    fn pruned_moves_sample_at_a_stride() {
        let generator = MoveGenerator::new();
        let board = Board::new();
        let single = Shape::Single.piece();

        let all = generator.generate_moves(&board, &single, 0);
        let pruned = generator.generate_pruned_moves(&board, &single, 0, 10);

        assert_eq!(pruned.len(), 10);
        assert_eq!(pruned[0].anchor, all[0].anchor);
        assert_eq!(pruned[1].anchor, all[6].anchor);

        // Under the cap, the full list comes back.
        assert_eq!(
            generator.generate_pruned_moves(&board, &single, 0, 100).len(),
            64
        );
        assert!(generator.generate_pruned_moves(&board, &single, 0, 0).is_empty());
    }
}
