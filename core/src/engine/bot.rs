//! The engine facade used by front-ends.

use std::time::Duration;

use crate::{
    Board, GameError, GameState, MoveSequence, Piece, ScoringWeights, SearchStats, Solver,
    SolverConfig, PIECES_PER_TURN,
};

/// A complete Block Blast bot: a game state plus a configured solver.
///
/// Front-ends feed it a board and a three-piece bag, ask for the best move
/// sequence, and apply it; everything else (rendering, input, piece
/// catalogues) stays outside.
///
/// # Example
///
/// ```rust
/// use block_blast_ai::{Bot, Shape, SolverConfig};
///
/// let mut bot = Bot::new(SolverConfig::default()).unwrap();
/// bot.set_pieces([
///     Shape::Single.piece(),
///     Shape::Bar2.piece(),
///     Shape::Square2.piece(),
/// ]);
///
/// let sequence = bot.find_best_sequence();
/// assert_eq!(sequence.pieces_placed(), 3);
/// assert!(bot.apply_sequence(&sequence));
/// assert_eq!(bot.state().remaining_pieces(), 0);
/// ```
pub struct Bot {
    state: GameState,
    solver: Solver,
}

impl Bot {
    /// Creates a bot from a solver configuration.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidConfig` when the configuration is
    /// rejected; see `SolverConfig::validate`.
    pub fn new(config: SolverConfig) -> Result<Bot, GameError> {
        Ok(Bot {
            state: GameState::new(),
            solver: Solver::new(config)?,
        })
    }

    /// The current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Counters from the most recent search.
    pub fn stats(&self) -> &SearchStats {
        self.solver.stats()
    }

    /// The active solver configuration.
    pub fn config(&self) -> &SolverConfig {
        self.solver.config()
    }

    /// Resets the board, score, combo, and used flags for a fresh game.
    pub fn new_game(&mut self) {
        self.state.reset();
    }

    /// Installs the three-piece bag for the current turn.
    pub fn set_pieces(&mut self, pieces: [Piece; PIECES_PER_TURN]) {
        self.state.set_pieces(pieces);
    }

    /// Replaces the board wholesale.
    pub fn set_board(&mut self, board: Board) {
        self.state.set_board(board);
    }

    /// Loads a board given as 64 row-major cell occupancies.
    pub fn load_cells(&mut self, cells: &[bool; Board::CELLS]) {
        self.state.set_board(Board::from_cells(cells));
    }

    /// Replaces the evaluator weights.
    pub fn set_weights(&mut self, weights: ScoringWeights) {
        self.solver.set_weights(weights);
    }

    /// Computes the best move sequence for the current state. An empty
    /// sequence means no piece can be placed: the game is over.
    pub fn find_best_sequence(&mut self) -> MoveSequence {
        self.solver.find_best_sequence(&self.state)
    }

    /// Computes the best sequence within a wall-clock budget by iterative
    /// deepening.
    pub fn find_best_sequence_within(&mut self, budget: Duration) -> MoveSequence {
        self.solver.solve_iterative_deepening(&self.state, budget)
    }

    /// Applies a sequence to the game state, stopping at the first move
    /// that fails. Returns whether every move applied.
    pub fn apply_sequence(&mut self, sequence: &MoveSequence) -> bool {
        for mv in &sequence.moves {
            if self.state.apply(mv).is_err() {
                return false;
            }
        }
        true
    }

    /// Indicates whether no remaining piece can be played.
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    /// Renders the board for diagnostics.
    pub fn board_as_string(&self) -> String {
        self.state.board().to_string()
    }
}
